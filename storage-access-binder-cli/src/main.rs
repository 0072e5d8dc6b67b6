use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use log::debug;
use storage_access_binder_policy::ConfigurationError;

mod commands;

/// Exit code for configuration errors raised while building the backend.
const EXIT_CONFIGURATION: u8 = 1;
/// Exit code for usage and I/O errors.
const EXIT_USAGE: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "storage-access-binder",
    version,
    about = "Bind storage path rules to auth roles as IAM policies",
    long_about = "Derives IAM policies for each principal class declared in the storage outputs, \
                  attaches them to the matching auth roles, and checks that the declared and \
                  enforced access stay in sync."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Backend definition and storage outputs shared by the build commands.
#[derive(Args, Debug)]
struct Inputs {
    /// Backend definition (TOML)
    #[arg(short, long, env = "STORAGE_BINDER_CONFIG")]
    config: PathBuf,

    /// Storage outputs (JSON, bare or wrapped in {"storage": ...})
    #[arg(short, long, env = "STORAGE_BINDER_OUTPUTS")]
    storage: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bind all policies and write the deployment manifest
    Synth {
        #[command(flatten)]
        inputs: Inputs,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Show the policies that would be attached, without binding them
    Plan {
        #[command(flatten)]
        inputs: Inputs,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Emit the storage outputs consumed by client SDKs
    Outputs {
        /// Storage outputs to normalize and emit
        #[arg(
            short,
            long,
            env = "STORAGE_BINDER_OUTPUTS",
            required_unless_present = "schema"
        )]
        storage: Option<PathBuf>,

        /// Print the JSON schema of the outputs document instead
        #[arg(long)]
        schema: bool,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build the backend and report whether it is consistent
    Validate {
        #[command(flatten)]
        inputs: Inputs,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!("{:?}", cli.command);

    let result = match cli.command {
        Command::Synth {
            inputs,
            output,
            pretty,
        } => commands::synth(&inputs.config, &inputs.storage, output.as_deref(), pretty),
        Command::Plan {
            inputs,
            output,
            pretty,
        } => commands::plan(&inputs.config, &inputs.storage, output.as_deref(), pretty),
        Command::Outputs {
            storage,
            schema,
            output,
        } => commands::outputs(storage.as_deref(), schema, output.as_deref()),
        Command::Validate { inputs } => commands::validate(&inputs.config, &inputs.storage),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            if err.downcast_ref::<ConfigurationError>().is_some() {
                ExitCode::from(EXIT_CONFIGURATION)
            } else {
                ExitCode::from(EXIT_USAGE)
            }
        }
    }
}
