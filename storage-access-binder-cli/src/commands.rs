//! Command handlers for the CLI

use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use storage_access_binder_policy::{
    self as binder, BackendDefinition, BackendOutputs, StorageOutputs,
};

fn read_definition(path: &Path) -> Result<BackendDefinition> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read backend definition: {}", path.display()))?;
    BackendDefinition::from_toml(&source)
        .with_context(|| format!("Invalid backend definition: {}", path.display()))
}

fn read_storage(path: &Path) -> Result<StorageOutputs> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read storage outputs: {}", path.display()))?;
    StorageOutputs::from_json(&json)
        .with_context(|| format!("Invalid storage outputs: {}", path.display()))
}

fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, format!("{content}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}

pub(crate) fn synth(
    config: &Path,
    storage: &Path,
    output: Option<&Path>,
    pretty: bool,
) -> Result<()> {
    let definition = read_definition(config)?;
    let storage = read_storage(storage)?;
    let deployment = binder::synthesize(&definition, storage)?;
    emit(&deployment.to_json(pretty)?, output)
}

pub(crate) fn plan(
    config: &Path,
    storage: &Path,
    output: Option<&Path>,
    pretty: bool,
) -> Result<()> {
    let definition = read_definition(config)?;
    let storage = read_storage(storage)?;
    let plan = binder::plan(&definition, &storage)?;
    emit(&plan.to_json(pretty)?, output)
}

pub(crate) fn outputs(storage: Option<&Path>, schema: bool, output: Option<&Path>) -> Result<()> {
    if schema {
        return emit(&BackendOutputs::schema_json()?, output);
    }
    let path = storage.context("--storage is required unless --schema is given")?;
    let outputs = BackendOutputs {
        storage: read_storage(path)?,
    };
    emit(&outputs.to_json_pretty()?, output)
}

pub(crate) fn validate(config: &Path, storage: &Path) -> Result<()> {
    let definition = read_definition(config)?;
    let storage = read_storage(storage)?;
    let deployment = binder::synthesize(&definition, storage)?;
    let declared_paths = deployment
        .outputs
        .storage
        .bucket(&deployment.bucket.name, &deployment.bucket.region)
        .map_or(0, |bucket| bucket.paths.len());

    println!(
        "OK: {} policy attachment(s) on bucket '{}' cover {} declared path(s)",
        deployment.attachments.len(),
        deployment.bucket.name,
        declared_paths
    );
    for attachment in &deployment.attachments {
        println!(
            "  {} -> {} ({} statement(s))",
            attachment.role,
            attachment.policy_name,
            attachment.policy_document.statement.len()
        );
    }
    Ok(())
}
