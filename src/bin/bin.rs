use anyhow::{Context, Result};
use log::{error, info};
use logsift::{
    config::{DEFAULT_ENTRY_PATTERN, DEFAULT_NORMALIZATION_PATTERN},
    report, source, AnalysisConfig, AnalysisEngine, BarProgress, ContinuationPolicy, ReportFormat,
};
use std::{env, io, path::PathBuf};
use structopt::StructOpt;

/// Group the errors in a log file by signature and write a report of how often each occurred.
#[derive(StructOpt)]
struct Options {
    /// Regex a whole line must match to start an error block [env: LOGSIFT_ENTRY_PATTERN]
    #[structopt(short, long)]
    entry_pattern: Option<String>,
    /// Regex for variable content (timestamps, worker ids) to strip from each block [env: LOGSIFT_NORMALIZE_PATTERN]
    #[structopt(short, long)]
    normalize_pattern: Option<String>,
    /// Literal put in place of each normalized match [env: LOGSIFT_REPLACEMENT]
    #[structopt(short, long)]
    replacement: Option<String>,
    /// What a non-start line does to an open block: greedy, level-aware or strict
    #[structopt(short, long, default_value = "level-aware")]
    continuation: ContinuationPolicy,
    /// Directory for the report [default: ~/Desktop/logs]
    #[structopt(short, long, parse(from_os_str))]
    output_dir: Option<PathBuf>,
    /// Report format: csv or json
    #[structopt(short, long, default_value = "csv")]
    format: ReportFormat,
    /// Print the report to stdout instead of writing a file
    #[structopt(long)]
    stdout: bool,
    /// Show a progress bar while analyzing. Reads the file twice to know its length
    #[structopt(short, long)]
    progress: bool,
    #[structopt(parse(from_os_str))]
    log_file: PathBuf,
}

impl Options {
    fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            entry_pattern: setting(&self.entry_pattern, "LOGSIFT_ENTRY_PATTERN", DEFAULT_ENTRY_PATTERN),
            normalization_pattern: setting(
                &self.normalize_pattern,
                "LOGSIFT_NORMALIZE_PATTERN",
                DEFAULT_NORMALIZATION_PATTERN,
            ),
            replacement: setting(&self.replacement, "LOGSIFT_REPLACEMENT", ""),
            continuation: self.continuation,
        }
    }
}

/// Command line first, then the environment, then the built-in default.
fn setting(flag: &Option<String>, var: &str, default: &str) -> String {
    flag.clone().or_else(|| env::var(var).ok()).unwrap_or_else(|| default.to_owned())
}

fn main() -> Result<()> {
    // Load from .env file if it is present
    dotenv::dotenv().ok();
    // Initialize logging
    env_logger::init();
    // Get command line arguments
    let options = Options::from_args();
    if let Err(error) = run(&options) {
        error!("{}: {:#}", options.log_file.display(), error);
        return Err(error);
    }
    Ok(())
}

fn run(options: &Options) -> Result<()> {
    // Patterns are compiled before the file is touched
    let engine = AnalysisEngine::from_config(&options.analysis_config())?;
    let path = &options.log_file;
    info!("Analyzing {}", path.display());

    let table = if options.progress {
        let total = source::count_lines(path).with_context(|| format!("failed to read {}", path.display()))?;
        let lines = source::read_lines(path).with_context(|| format!("failed to open {}", path.display()))?;
        let progress = BarProgress::new(total);
        let table = engine.analyze_with(lines, &progress, Some(total));
        progress.finish();
        table?
    } else {
        engine.analyze_file(path)?
    };

    if options.stdout {
        let stdout = io::stdout();
        options.format.sink(stdout.lock()).write_table(&table)?;
    } else {
        let dir = options.output_dir.clone().unwrap_or_else(report::default_output_dir);
        let report_path = report::write_report(dir, options.format, &table)?;
        println!("Report generated: {}", report_path.display());
    }
    Ok(())
}
