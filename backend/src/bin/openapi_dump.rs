//! Print the OpenAPI document for the SEED ledger API.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use seed_ledger::ApiDoc;
use utoipa::OpenApi;

/// Dump the OpenAPI document as JSON or YAML.
#[derive(Debug, Parser)]
#[command(name = "openapi-dump", about = "Print the SEED ledger OpenAPI document")]
struct Cli {
    /// Emit YAML instead of JSON.
    #[arg(long)]
    yaml: bool,
    /// Write to this file instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let doc = ApiDoc::openapi();
    let rendered = if cli.yaml {
        doc.to_yaml().wrap_err("render OpenAPI YAML")?
    } else {
        doc.to_pretty_json().wrap_err("render OpenAPI JSON")?
    };

    match cli.output {
        Some(path) => fs::write(&path, rendered)
            .wrap_err_with(|| format!("write OpenAPI document to {}", path.display()))?,
        None => println!("{rendered}"),
    }
    Ok(())
}
