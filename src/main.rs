use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use podvtt::catalog::SqliteCatalog;
use podvtt::config::Config;
use podvtt::pipeline::{print_summary, write_report, BatchConfig, BatchRunner};
use podvtt::resolver::CacheResolver;
use podvtt::sink::DirectorySink;
use podvtt::subtitle::ExtractOptions;
use podvtt::{reveal, ttml_to_vtt_with_options};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "podvtt")]
#[command(version, about = "Extract podcast transcripts as WebVTT subtitles")]
#[command(long_about = "Find transcripts referenced by the local Podcasts library, convert their TTML captions to WebVTT and save one folder per podcast.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every transcript listed in the Podcasts library
    Extract(ExtractArgs),

    /// Convert a single TTML file
    Convert {
        /// Input TTML file
        input: PathBuf,

        /// Output VTT file (defaults to input name with .vtt extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave out cues whose paragraph has no words
        #[arg(long)]
        drop_empty: bool,
    },
}

#[derive(Args)]
struct ExtractArgs {
    /// Podcasts library database (MTLibrary.sqlite)
    #[arg(long)]
    library: Option<PathBuf>,

    /// Transcript cache directory
    #[arg(long)]
    ttml_root: Option<PathBuf>,

    /// Output directory for per-podcast folders
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of transcripts converted at the same time
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Do not open the output directory when done
    #[arg(long)]
    no_open: bool,

    /// Also save the raw TTML next to each VTT
    #[arg(long)]
    copy_ttml: bool,

    /// Leave out cues whose paragraph has no words
    #[arg(long)]
    drop_empty: bool,

    /// Write a JSON report of every episode to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

/// `PODVTT_LOG` takes precedence over the `--verbose` level.
fn log_filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_env("PODVTT_LOG").unwrap_or_else(|_| EnvFilter::new(default))
}

fn init_logging(verbose: bool) {
    FmtSubscriber::builder()
        .with_env_filter(log_filter(verbose))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn derive_output_path(input: &Path) -> PathBuf {
    input.with_extension("vtt")
}

fn apply_args(config: &mut Config, args: &ExtractArgs) {
    if let Some(ref path) = args.library {
        config.library_db = Some(path.clone());
    }
    if let Some(ref path) = args.ttml_root {
        config.ttml_root = Some(path.clone());
    }
    if let Some(ref path) = args.output {
        config.output_dir = Some(path.clone());
    }
    if let Some(c) = args.concurrency {
        config.concurrency = c;
    }
    if args.no_open {
        config.open_output = false;
    }
    if args.copy_ttml {
        config.copy_ttml = true;
    }
    if args.drop_empty {
        config.keep_empty_cues = false;
    }
}

fn convert_file(input: &Path, output: Option<PathBuf>, drop_empty: bool) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    let output = output.unwrap_or_else(|| derive_output_path(input));

    let ttml = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let vtt = ttml_to_vtt_with_options(&ttml, ExtractOptions { keep_empty: !drop_empty })
        .with_context(|| format!("Failed to convert {}", input.display()))?;
    std::fs::write(&output, vtt)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Saved: {}", output.display());
    Ok(())
}

async fn extract(args: ExtractArgs) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;
    apply_args(&mut config, &args);
    config.validate().context("Configuration validation failed")?;

    let library_db = config.library_db_path()?;
    let ttml_root = config.ttml_root_path()?;
    let output_dir = config.output_dir_path()?;

    info!("Library:  {}", library_db.display());
    info!("TTML:     {}", ttml_root.display());
    info!("Output:   {}", output_dir.display());

    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::Relaxed);
    })
    .context("Failed to install Ctrl+C handler")?;

    let batch_config = BatchConfig {
        concurrency: config.concurrency,
        extract: ExtractOptions {
            keep_empty: config.keep_empty_cues,
        },
        copy_ttml: config.copy_ttml,
        show_progress: !args.quiet,
    };

    let runner = BatchRunner::new(
        Arc::new(SqliteCatalog::new(library_db)),
        Arc::new(CacheResolver::new(ttml_root)),
        Arc::new(DirectorySink::new(&output_dir)),
        batch_config,
    )
    .with_cancel(cancelled.clone());

    let result = runner.run().await.context("Could not read the podcast library")?;
    print_summary(&result, &output_dir);

    if let Some(ref path) = args.report {
        write_report(path, &result)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    if config.open_output && !result.cancelled && output_dir.exists() {
        if let Err(e) = reveal::reveal(&output_dir) {
            warn!("Could not open output directory: {}", e);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Extract(args) => extract(args).await,
        Commands::Convert {
            input,
            output,
            drop_empty,
        } => convert_file(&input, output, drop_empty),
    }
}
