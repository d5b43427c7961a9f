//! Inspection Cleaner CLI
//!
//! Cleans a raw NYC restaurant inspection CSV into the fixed 16-column
//! output and reports the run counters.

use anyhow::{Context, Result};
use clap::Parser;
use inspection_cleaner::prelude::*;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Clean NYC restaurant inspection records.
#[derive(Debug, Parser)]
#[command(name = "inspection-cleaner", version, about)]
struct Cli {
    /// Raw inspection CSV ("-" for stdin)
    input: PathBuf,

    /// Cleaned CSV to write ("-" for stdout)
    output: PathBuf,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the counter snapshot as JSON to this file
    #[arg(long)]
    counters: Option<PathBuf>,

    /// Clean on the current thread only
    #[arg(long)]
    sequential: bool,

    /// Worker threads (0 = all available)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Input lines per batch
    #[arg(long)]
    batch_size: Option<usize>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    log::info!(
        "Inspection Cleaner v{} (window starts {})",
        inspection_cleaner::VERSION,
        config.analysis_window_start
    );

    let counters = Arc::new(Counters::new());
    let cleaner = RecordCleaner::from_config(&config, counters)?;
    let engine = CleaningEngine::new(cleaner);

    let options = config.execution_options().with_progress(|update| match update {
        ProgressUpdate::BatchCompleted {
            batch,
            emitted,
            total_lines,
            ..
        } => {
            log::debug!(
                "batch {} done: {} emitted, {} lines read",
                batch,
                emitted,
                total_lines
            );
        }
        ProgressUpdate::Completed {
            lines,
            emitted,
            duration_ms,
        } => {
            log::info!("complete in {}ms ({} lines, {} emitted)", duration_ms, lines, emitted);
        }
        ProgressUpdate::Started => {}
    });

    let input = open_input(&cli.input)?;
    let output = open_output(&cli.output)?;
    let summary = engine
        .run(input, output, Some(options))
        .context("cleaning run failed")?;

    for line in summary.counters.report() {
        log::info!("  {}", line);
    }

    if let Some(path) = &cli.counters {
        let file = File::create(path)
            .with_context(|| format!("failed to create counters file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &summary.counters)
            .with_context(|| format!("failed to write counters to {}", path.display()))?;
        writer.flush()?;
        log::info!("counters written to {}", path.display());
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<CleanerConfig> {
    let mut config = match &cli.config {
        Some(path) => CleanerConfig::load(path)?,
        None => CleanerConfig::default(),
    };

    if cli.sequential {
        config.parallel = false;
    }
    if let Some(threads) = cli.threads {
        config.max_threads = threads;
    }
    if let Some(batch_size) = cli.batch_size {
        config.batch_size = batch_size;
    }

    config.validate()?;
    Ok(config)
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn open_input(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    if is_stdio(path) {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

fn open_output(path: &Path) -> Result<Box<dyn Write + Send>> {
    if is_stdio(path) {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}
