//! Formwright CLI entry point.
//!
//! `fill` runs one fill pass over a page fixture from a field-data
//! document; `inspect` prints the descriptors the matchers would see.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use formwright::config::FormwrightConfig;
use formwright::credentials::{self, Credentials};
use formwright::extract;
use formwright::fields::FieldSet;
use formwright::fill::FillEngine;
use formwright::logging;
use formwright::page::FormPage;

/// Formwright — headless form-fill engine.
#[derive(Parser)]
#[command(name = "formwright", version, about)]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Fill a page fixture from a field-data document.
    Fill {
        /// Path to the page fixture JSON.
        #[arg(long)]
        page: PathBuf,
        /// Path to the field-data JSON (bare map or stored document).
        #[arg(long)]
        fields: PathBuf,
        /// Write the mutated page as JSON to this path (`-` for stdout).
        #[arg(long)]
        dump: Option<PathBuf>,
        /// Credentials file overriding the default `~/.formwright/.env`.
        #[arg(long)]
        env_file: Option<PathBuf>,
    },
    /// Print the extracted control descriptors of a page fixture.
    Inspect {
        /// Path to the page fixture JSON.
        #[arg(long)]
        page: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_cli();
    let cli = Cli::parse();

    match cli.command {
        Command::Fill {
            page,
            fields,
            dump,
            env_file,
        } => handle_fill(&page, &fields, dump.as_deref(), env_file.as_deref()).await,
        Command::Inspect { page } => handle_inspect(&page),
    }
}

/// Run one fill pass and print the outcome.
async fn handle_fill(
    page_path: &Path,
    fields_path: &Path,
    dump: Option<&Path>,
    env_file: Option<&Path>,
) -> anyhow::Result<()> {
    let config = FormwrightConfig::load().context("failed to load configuration")?;
    let creds: Credentials = match env_file {
        Some(path) => credentials::load_credentials(path)?,
        None => credentials::load_default_credentials()?,
    };

    let page = load_page(page_path)?;
    let fields = load_fields(fields_path)?;

    let engine = FillEngine::from_config(&config, &creds);
    let outcome = engine.fill(&page, &fields).await;
    println!("Filled {} form fields", outcome.filled);

    if let Some(dump_path) = dump {
        let json = page.to_json().context("failed to serialize page")?;
        if dump_path == Path::new("-") {
            println!("{json}");
        } else {
            std::fs::write(dump_path, json)
                .with_context(|| format!("failed to write {}", dump_path.display()))?;
        }
    }

    Ok(())
}

/// Print the descriptors a matcher would see for a page fixture.
fn handle_inspect(page_path: &Path) -> anyhow::Result<()> {
    let page = load_page(page_path)?;
    let descriptors = extract::describe(&page);
    let json =
        serde_json::to_string_pretty(&descriptors).context("failed to serialize descriptors")?;
    println!("{json}");
    Ok(())
}

/// Load a page fixture from disk.
fn load_page(path: &Path) -> anyhow::Result<FormPage> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read page fixture {}", path.display()))?;
    FormPage::from_json(&contents)
        .with_context(|| format!("failed to parse page fixture {}", path.display()))
}

/// Load a field-data document from disk.
fn load_fields(path: &Path) -> anyhow::Result<FieldSet> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read field data {}", path.display()))?;
    FieldSet::from_json(&contents)
        .with_context(|| format!("failed to parse field data {}", path.display()))
}
