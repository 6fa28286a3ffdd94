use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use boardfoot::config::AppConfig;
use boardfoot::output::csv::{dated_output_path, write_records};
use boardfoot::output::{DimensionSorter, PanelSorter};
use boardfoot::runner::{RunCoordinator, RunRequest};
use boardfoot::session::ChromeProvider;

#[derive(Parser)]
#[command(name = "boardfoot", version, about = "Lumber catalog price extraction")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk a paginated listing and export its records to CSV
    Scrape {
        /// Identifier attached to logs, the report, and the export filename
        #[arg(long)]
        run_id: String,
        /// First page of the listing
        #[arg(long)]
        url: String,
        /// Export path; defaults to a dated file under the configured dir
        #[arg(long)]
        output: Option<PathBuf>,
        /// Sort the export by lumber dimensions after a completed run
        #[arg(long)]
        sort: bool,
        /// Debug-level logging
        #[arg(short, long)]
        verbose: bool,
    },
    /// Sort an existing CSV export
    Sort {
        /// CSV file to sort
        file: PathBuf,
        /// Sorting strategy
        #[arg(long, value_enum, default_value = "dimension")]
        mode: SortMode,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortMode {
    /// Order rows by the lumber dimensions parsed out of each name
    Dimension,
    /// Standardize sheet-good names and order them alphabetically
    Panel,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Scrape {
            run_id,
            url,
            output,
            sort,
            verbose,
        } => {
            init_tracing(verbose)?;
            scrape(run_id, url, output, sort).await
        }
        Command::Sort { file, mode } => {
            init_tracing(false)?;
            let path = match mode {
                SortMode::Dimension => DimensionSorter::new().sort_file(&file)?,
                SortMode::Panel => PanelSorter::new().sort_file(&file)?,
            };
            println!("{}", path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let directive = if verbose {
        "boardfoot=debug"
    } else {
        "boardfoot=info"
    };

    // Logs go to stderr; stdout carries the run report
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn scrape(
    run_id: String,
    url: String,
    output: Option<PathBuf>,
    sort: bool,
) -> Result<ExitCode> {
    let config = AppConfig::from_env()?;

    let provider = ChromeProvider::new(config.browser.clone(), config.screenshots.clone());
    let coordinator = RunCoordinator::new(config.clone());
    let request = RunRequest {
        run_id,
        target_url: url,
    };

    let report = coordinator.execute(&provider, &request).await;

    // Machine-readable boundary for the calling orchestrator
    println!("{}", serde_json::to_string(&report)?);

    // A failed run still produces a (header-only) export
    let path = output.unwrap_or_else(|| dated_output_path(&config.output.dir, &request.run_id));
    write_records(&path, &report.records)?;
    info!("Export written to {}", path.display());

    if !report.status.is_completed() {
        return Ok(ExitCode::FAILURE);
    }

    if sort {
        match DimensionSorter::new().sort_file(&path) {
            Ok(sorted) => info!("Sorted export written to {}", sorted.display()),
            Err(e) => error!("Post-run sort failed: {}", e),
        }
    }

    Ok(ExitCode::SUCCESS)
}
