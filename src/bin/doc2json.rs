//! CLI binary for doc2json.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ClientConfig` / `ConvertConfig` and prints results.

use anyhow::Result;
use clap::{Parser, Subcommand};
use doc2json::{ClientConfig, ConvertConfig, Converter, ParseClient};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

// ── CLI definition ───────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "doc2json",
    version,
    about = "Upload documents to a file-parsing service; convert legacy office files"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload one or more files and print the parse result as JSON
    Parse {
        /// Files to upload, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Parsing service endpoint
        #[arg(long, env = "DOC2JSON_BASE_URL", default_value = doc2json::DEFAULT_BASE_URL)]
        base_url: String,

        /// Request timeout in seconds
        #[arg(long, default_value_t = doc2json::DEFAULT_TIMEOUT_SECS)]
        timeout: u64,

        /// Write the pretty-printed result to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Convert a legacy document with LibreOffice (.doc -> .docx)
    Convert {
        /// Input document
        file: PathBuf,

        /// Target format handed to --convert-to
        #[arg(long = "to", default_value = "docx")]
        target: String,

        /// Conversion command to invoke
        #[arg(long, env = "DOC2JSON_SOFFICE", default_value = "soffice")]
        soffice: String,
    },

    /// Check whether the parsing service is reachable
    Ping {
        /// Parsing service endpoint
        #[arg(long, env = "DOC2JSON_BASE_URL", default_value = doc2json::DEFAULT_BASE_URL)]
        base_url: String,
    },
}

// ── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Parse {
            files,
            base_url,
            timeout,
            output,
        } => run_parse(files, base_url, timeout, output).await,
        Command::Convert {
            file,
            target,
            soffice,
        } => run_convert(file, target, soffice),
        Command::Ping { base_url } => run_ping(base_url).await,
    }
}

async fn run_parse(
    files: Vec<PathBuf>,
    base_url: String,
    timeout: u64,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = ClientConfig::builder()
        .base_url(base_url)
        .timeout_secs(timeout)
        .build()?;
    let client = ParseClient::new(config)?;

    let bar = upload_spinner(files.len());
    let outcome = match output {
        Some(out_path) => {
            let written = client.parse_to_file(&files, &out_path).await;
            bar.finish_and_clear();
            if written? {
                println!("{} {}", green("✓"), out_path.display());
                return Ok(());
            }
            None
        }
        None => {
            let result = client.parse(&files).await;
            bar.finish_and_clear();
            result?
        }
    };

    match outcome {
        Some(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        None => {
            eprintln!("{}", red("parse failed — the service returned no result"));
            eprintln!("{}", dim("run with RUST_LOG=debug for the full exchange"));
            std::process::exit(1);
        }
    }
}

fn run_convert(file: PathBuf, target: String, soffice: String) -> Result<()> {
    let converter = Converter::new(ConvertConfig {
        soffice_bin: soffice,
        target_format: target,
    });

    match converter.convert(&file)? {
        Some(path) => {
            println!("{} {}", green("✓"), path.display());
            Ok(())
        }
        None => {
            eprintln!("{}", red("conversion failed — see logs"));
            std::process::exit(1);
        }
    }
}

async fn run_ping(base_url: String) -> Result<()> {
    let config = ClientConfig::builder().base_url(base_url).build()?;
    let client = ParseClient::new(config)?;

    if client.test_connection().await {
        println!("{}", green("ok"));
        Ok(())
    } else {
        println!("{}", red("unreachable"));
        std::process::exit(1);
    }
}

fn upload_spinner(file_count: usize) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(format!("uploading {file_count} file(s)…"));
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}
