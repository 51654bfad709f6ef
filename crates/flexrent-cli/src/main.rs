use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use flexrent_core::{Assessment, ConfigFile, IncomeExtractor, TableBackend};
use flexrent_pdf_mupdf::MupdfBackend;

mod output;

use output::ColorMode;

/// FlexRent statement parser - sum the credits in a bank statement PDF
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Total the credit column of a statement and assess creditworthiness
    Analyze {
        /// Path to the statement PDF
        file_path: PathBuf,

        /// Password for an encrypted PDF (or FLEXRENT_PDF_PASSWORD)
        #[arg(long)]
        password: Option<String>,

        /// Income above which the applicant is creditworthy
        #[arg(long)]
        threshold: Option<f64>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Path to output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the tables detected on each page as tab-separated rows
    Tables {
        /// Path to the statement PDF
        file_path: PathBuf,

        /// Password for an encrypted PDF (or FLEXRENT_PDF_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Write the effective configuration to the platform config file
        #[arg(long)]
        save: bool,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so JSON on stdout stays parseable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = flexrent_core::load_config();

    match cli.command {
        Command::Analyze {
            file_path,
            password,
            threshold,
            json,
            no_color,
            output,
        } => analyze(
            &config,
            &file_path,
            resolve_password(password),
            threshold,
            json,
            no_color,
            output,
        ),
        Command::Tables {
            file_path,
            password,
        } => tables(&config, &file_path, resolve_password(password)),
        Command::Config { save } => show_config(&config, save),
    }
}

/// CLI flag > env var. An empty password counts as none.
fn resolve_password(flag: Option<String>) -> Option<String> {
    flag.or_else(|| std::env::var("FLEXRENT_PDF_PASSWORD").ok())
        .filter(|p| !p.is_empty())
}

fn build_backend(config: &ConfigFile) -> MupdfBackend {
    let backend = MupdfBackend::new().with_layout(config.layout_config());
    match config.gap_ratio() {
        Some(ratio) => backend.with_gap_ratio(ratio),
        None => backend,
    }
}

fn read_pdf(file_path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(file_path).with_context(|| format!("Failed to read {}", file_path.display()))
}

fn display_name(file_path: &Path) -> String {
    file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_path.display().to_string())
}

/// Stdout, or `path` created (or truncated) when given.
fn open_writer(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(std::io::stdout())),
    }
}

fn analyze(
    config: &ConfigFile,
    file_path: &Path,
    password: Option<String>,
    threshold: Option<f64>,
    json: bool,
    no_color: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let data = read_pdf(file_path)?;
    let filename = display_name(file_path);
    let threshold = threshold.unwrap_or_else(|| config.threshold());

    let use_color = !no_color && !json && output.is_none();
    let color = ColorMode(use_color);

    let pages = match build_backend(config).extract_tables(&data, password.as_deref()) {
        Ok(pages) => pages,
        Err(e) => {
            if json {
                let body = if e.is_password_error() {
                    output::password_required_json()
                } else {
                    output::error_json(&e.to_string())
                };
                output::print_json(&mut *open_writer(output.as_deref())?, &body)?;
            }
            if e.is_password_error() {
                anyhow::bail!(
                    "{} is password protected ({}). Pass --password or set FLEXRENT_PDF_PASSWORD.",
                    filename,
                    e
                );
            }
            return Err(e).with_context(|| format!("Failed to analyze {}", filename));
        }
    };

    let extractor = IncomeExtractor::with_config(config.extractor_config());
    let summary = extractor.summarize_pages(&pages);
    let assessment = Assessment::new(summary.total, threshold);
    tracing::debug!(
        filename = %filename,
        pages = pages.len(),
        total = summary.total,
        "statement analyzed"
    );

    let mut writer = open_writer(output.as_deref())?;
    if json {
        output::print_json(
            &mut *writer,
            &output::analysis_json(&filename, &summary, &assessment),
        )?;
    } else {
        output::print_assessment(
            &mut *writer,
            &filename,
            pages.len(),
            &summary,
            &assessment,
            color,
        )?;
    }

    if let Some(ref output_path) = output {
        eprintln!("Output written to {}", output_path.display());
    }
    Ok(())
}

fn tables(config: &ConfigFile, file_path: &Path, password: Option<String>) -> anyhow::Result<()> {
    let data = read_pdf(file_path)?;
    let pages = build_backend(config)
        .extract_tables(&data, password.as_deref())
        .with_context(|| format!("Failed to extract tables from {}", file_path.display()))?;

    let mut stdout = std::io::stdout().lock();
    output::print_tables(&mut stdout, &pages)?;
    Ok(())
}

fn show_config(config: &ConfigFile, save: bool) -> anyhow::Result<()> {
    let effective = config.resolved();
    if save {
        let path = flexrent_core::save_config(&effective)?;
        println!("Configuration saved to {}", path.display());
        return Ok(());
    }

    let rendered = toml::to_string_pretty(&effective).context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}
