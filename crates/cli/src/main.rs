mod commands;
mod config;
mod logging;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use frota_core::EntityKind;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Frota fleet-rental back office: entity schemas, validation and submission.
#[derive(Parser)]
#[command(
    name = "frota",
    version,
    about = "Frota back office: validate and submit fleet-rental entities"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Configuration file (default: ./frota.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List entity kinds and their list routes
    Entities,

    /// Print the validation schema of an entity kind
    Schema {
        /// Entity kind (supplier, contract, user, access_level)
        kind: EntityKind,
        /// Print a JSON Schema (draft 2020-12) of the normalized record instead
        #[arg(long)]
        json_schema: bool,
    },

    /// Validate a record file; prints the normalized record when valid
    Validate {
        /// Entity kind (supplier, contract, user, access_level)
        kind: EntityKind,
        /// Path to a JSON object with the record fields
        file: PathBuf,
    },

    /// Submit a record file through a form to the configured store
    Submit {
        /// Entity kind (supplier, contract, user, access_level)
        kind: EntityKind,
        /// Path to a JSON object with the record fields
        file: PathBuf,
        /// Update the entity with this id instead of creating one
        #[arg(long)]
        id: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            report_error(&e.to_string(), cli.output, cli.quiet);
            process::exit(1);
        }
    };
    logging::init(&config.logging);

    match cli.command {
        Commands::Entities => {
            commands::entities::cmd_entities(cli.output, cli.quiet);
        }
        Commands::Schema { kind, json_schema } => {
            commands::schema::cmd_schema(kind, json_schema);
        }
        Commands::Validate { kind, file } => {
            commands::validate::cmd_validate(kind, &file, cli.output, cli.quiet);
        }
        Commands::Submit { kind, file, id } => {
            commands::submit::cmd_submit(
                kind,
                &file,
                id.as_deref(),
                &config,
                cli.output,
                cli.quiet,
            );
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
