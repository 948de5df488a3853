use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use datasets::InMemoryDatasetRegistry;
use viewdoc::{ParseError, ViewDocument, resolve_references};

#[derive(Parser)]
#[command(name = "mapview", about = "Inspect and normalize saved map view documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a document and report every validation issue at once.
    Validate {
        doc: PathBuf,
        /// Emit the issue list as JSON on stdout.
        #[arg(long)]
        json: bool,
    },
    /// Check every dataset reference against a registry snapshot file.
    Resolve {
        doc: PathBuf,
        registry: PathBuf,
        /// Emit the resolution report as JSON on stdout.
        #[arg(long)]
        json: bool,
    },
    /// Rewrite a document with all defaults materialized.
    Normalize { doc: PathBuf, out: PathBuf },
    /// Print the content hash of a document.
    Hash { doc: PathBuf },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Validate { doc, json } => cmd_validate(&doc, json),
        Command::Resolve { doc, registry, json } => cmd_resolve(&doc, &registry, json),
        Command::Normalize { doc, out } => cmd_normalize(&doc, &out),
        Command::Hash { doc } => cmd_hash(&doc),
    }
}

fn load_document(path: &Path) -> Result<ViewDocument, String> {
    let payload = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    ViewDocument::from_json_str(&payload).map_err(|e| format!("parse {path:?}: {e}"))
}

fn cmd_validate(path: &Path, json: bool) -> Result<(), String> {
    let payload = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    match ViewDocument::from_json_str(&payload) {
        Ok(doc) => {
            if json {
                println!("[]");
            }
            info!(
                layers = doc.vis_state.layers.len(),
                hash = %doc.content_hash(),
                "document is valid"
            );
            Ok(())
        }
        Err(ParseError::Invalid(err)) => {
            if json {
                let report = serde_json::to_string_pretty(err.issues())
                    .map_err(|e| format!("json: {e}"))?;
                println!("{report}");
            }
            Err(err.to_string())
        }
        Err(e) => Err(e.to_string()),
    }
}

fn cmd_resolve(doc_path: &Path, registry_path: &Path, json: bool) -> Result<(), String> {
    let doc = load_document(doc_path)?;
    let payload =
        fs::read_to_string(registry_path).map_err(|e| format!("read {registry_path:?}: {e}"))?;
    let registry = InMemoryDatasetRegistry::from_json_str(&payload)
        .map_err(|e| format!("parse registry {registry_path:?}: {e}"))?;

    let resolution = resolve_references(&doc, &registry).map_err(|e| e.to_string())?;
    for warning in &resolution.unknown_fields {
        warn!(
            data_id = %warning.data_id,
            field = %warning.field,
            path = %warning.path,
            "field not declared by dataset"
        );
    }
    if json {
        let report =
            serde_json::to_string_pretty(&resolution).map_err(|e| format!("json: {e}"))?;
        println!("{report}");
    }

    match resolution.into_result() {
        Ok(_) => {
            info!("all dataset references resolve");
            Ok(())
        }
        Err(e) => Err(e.to_string()),
    }
}

fn cmd_normalize(doc_path: &Path, out_path: &Path) -> Result<(), String> {
    let doc = load_document(doc_path)?;
    let payload = doc.to_json_string_pretty().map_err(|e| format!("json: {e}"))?;
    fs::write(out_path, payload).map_err(|e| format!("write {out_path:?}: {e}"))?;
    info!("wrote {}", out_path.display());
    Ok(())
}

fn cmd_hash(doc_path: &Path) -> Result<(), String> {
    let doc = load_document(doc_path)?;
    println!("{}", doc.content_hash());
    Ok(())
}
