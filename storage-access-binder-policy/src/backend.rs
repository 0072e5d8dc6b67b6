//! Backend synthesis: one pass from definition and storage outputs to the
//! manifest handed to the deployment platform.

use log::{debug, info};
use serde::Serialize;

use crate::binder::{derive_policies, Attachment, BackendConfig, Binder, RoleBinding};
use crate::bucket::{BucketResolver, ImportedBucket};
use crate::config::BackendDefinition;
use crate::descriptor::{BackendOutputs, StorageOutputs};
use crate::error::{ConfigurationError, Result};
use crate::identity::AuthResource;
use crate::types::{PrincipalClass, ResolvedBucketRef};

/// Everything produced by a successful build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deployment {
    /// Stack holding the bucket import.
    pub stack: String,
    /// Logical id of the imported bucket.
    pub bucket_id: String,
    pub bucket: ResolvedBucketRef,
    pub attachments: Vec<Attachment>,
    pub outputs: BackendOutputs,
}

impl Deployment {
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        to_json(self, pretty)
    }
}

/// Policies derived for the imported bucket, before anything is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingPlan {
    pub bucket: ResolvedBucketRef,
    pub bindings: Vec<RoleBinding>,
}

impl BindingPlan {
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        to_json(self, pretty)
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn import_bucket(definition: &BackendDefinition) -> Result<ImportedBucket> {
    ImportedBucket::from_bucket_attributes(
        definition.bucket.id.clone(),
        definition.bucket.arn.clone(),
        definition.bucket.region.clone(),
    )
}

/// Every bucket the outputs advertise must be the one policies are bound on.
fn check_unbound_buckets(storage: &StorageOutputs, bucket: &ResolvedBucketRef) -> Result<()> {
    for declared in &storage.buckets {
        if declared.bucket_name == bucket.name && declared.aws_region == bucket.region {
            continue;
        }
        let unbound = declared
            .paths
            .iter()
            .find_map(|(pattern, access)| access.keys().next().map(|principal| (pattern, principal)));
        if let Some((pattern, principal)) = unbound {
            debug!(
                "Bucket '{}' in '{}' is declared but not imported",
                declared.bucket_name, declared.aws_region
            );
            return Err(ConfigurationError::UncoveredPath {
                principal: principal.to_string(),
                path: pattern.to_string(),
            });
        }
    }
    Ok(())
}

/// Derive the policies for the imported bucket without binding them.
pub fn plan(definition: &BackendDefinition, storage: &StorageOutputs) -> Result<BindingPlan> {
    let imported = import_bucket(definition)?;
    let bucket = imported.resolve(&storage.bucket_name, &storage.aws_region)?;

    let declared = storage.bucket(&bucket.name, &bucket.region).ok_or_else(|| {
        ConfigurationError::descriptor(format!(
            "imported bucket '{}' in '{}' is not declared in the storage outputs",
            bucket.name, bucket.region
        ))
    })?;

    let bindings = derive_policies(&bucket, declared, &definition.policy_prefix);
    Ok(BindingPlan { bucket, bindings })
}

/// Build the full deployment: import, derive, bind, and verify coverage.
pub fn synthesize(definition: &BackendDefinition, storage: StorageOutputs) -> Result<Deployment> {
    storage.validate()?;

    let auth = AuthResource::from_definition(&definition.auth);
    let binder = Binder::new(&auth);
    let BindingPlan { bucket, bindings } = plan(definition, &storage)?;

    check_unbound_buckets(&storage, &bucket)?;

    let principals: Vec<&PrincipalClass> = bindings.iter().map(|b| &b.principal).collect();
    info!(
        "Binding {} policies on bucket '{}' for {:?}",
        bindings.len(),
        bucket.name,
        principals
    );

    let config = binder.bind_all(&BackendConfig::new(storage), &bucket, bindings)?;
    binder.verify_coverage(&config, &bucket)?;

    let attachments = config.attachments();
    info!(
        "Synthesized stack '{}' with {} policy attachment(s)",
        definition.stack,
        attachments.len()
    );

    Ok(Deployment {
        stack: definition.stack.clone(),
        bucket_id: definition.bucket.id.clone(),
        bucket,
        attachments,
        outputs: BackendOutputs {
            storage: config.storage().clone(),
        },
    })
}
