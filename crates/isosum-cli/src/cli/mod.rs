//! CLI for isosum: scan a directory and print a checksum line per image.

mod progress;

use anyhow::Result;
use clap::Parser;
use isosum_core::algorithm::HashAlgorithm;
use isosum_core::config::{self, IsosumConfig};
use isosum_core::control::ScanControl;
use isosum_core::error::ScanError;
use isosum_core::logging;
use isosum_core::progress::{NoProgress, ProgressObserver};
use isosum_core::retry::RetryPolicy;
use isosum_core::scan::{self, ScanOptions};
use isosum_core::task::BatchSummary;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use progress::ProgressDisplay;

/// Exit code when the scan itself failed (e.g. invalid directory).
pub const EXIT_SCAN_FAILED: i32 = 1;

/// Exit code when the scan was interrupted with Ctrl-C.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Compute checksums for every matching file in a directory.
#[derive(Debug, Parser)]
#[command(name = "isosum")]
#[command(about = "Calculate BLAKE2b checksums for disk images in a directory", long_about = None)]
pub struct Cli {
    /// Directory to scan (default: current directory).
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Show per-file progress bars and debug-level logs.
    #[arg(short, long)]
    pub verbose: bool,

    /// File extension to process (default: .iso).
    #[arg(short = 'e', long = "ext", value_name = "EXT")]
    pub ext: Option<String>,

    /// Read chunk size in bytes.
    #[arg(short = 'c', long, value_name = "BYTES")]
    pub chunk_size: Option<NonZeroUsize>,

    /// Hash at most N files at once (default: no cap).
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<NonZeroUsize>,

    /// Checksum algorithm: blake2b, blake2b-256 or sha256.
    #[arg(short = 'a', long, value_name = "ALGO")]
    pub algorithm: Option<HashAlgorithm>,

    /// Retry transient read failures up to N times per file (default: 0).
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Use this config file instead of ~/.config/isosum/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Merge flags over the config file; flags win.
    pub fn resolve_options(&self, cfg: &IsosumConfig) -> ScanOptions {
        let retry = match self.retries {
            Some(n) => RetryPolicy::with_retries(n),
            None => cfg.retry_policy(),
        };
        ScanOptions {
            directory: self.directory.clone(),
            extension: self.ext.clone().unwrap_or_else(|| cfg.extension.clone()),
            chunk_size: Some(
                self.chunk_size
                    .map(NonZeroUsize::get)
                    .unwrap_or(cfg.chunk_size),
            ),
            max_concurrent: self.jobs.map(NonZeroUsize::get).or(cfg.max_concurrent),
            algorithm: self.algorithm.unwrap_or(cfg.algorithm),
            retry,
        }
    }

    fn load_config(&self) -> Result<IsosumConfig> {
        match &self.config {
            Some(path) => config::load_from(path),
            None => config::load_or_init(),
        }
    }

    /// Run the scan; returns the process exit code.
    pub async fn run(self) -> Result<i32> {
        // Logging isn't up yet; report config problems once it is.
        let (cfg, cfg_err) = match self.load_config() {
            Ok(cfg) => (cfg, None),
            Err(e) => (IsosumConfig::default(), Some(e)),
        };

        // In verbose mode the bars own stderr; logs go through them unless
        // a log file is configured.
        let display = self.verbose.then(|| Arc::new(ProgressDisplay::new()));
        match (&display, cfg.log_file.as_deref()) {
            (Some(display), None) => logging::init_logging_with_writer(
                self.verbose,
                BoxMakeWriter::new(display.log_writer()),
            ),
            (_, log_file) => {
                if let Err(e) = logging::init_logging(self.verbose, log_file) {
                    logging::init_logging_stderr(self.verbose);
                    tracing::warn!("log file unavailable, logging to stderr: {:#}", e);
                }
            }
        }
        if let Some(e) = cfg_err {
            tracing::warn!("using default configuration: {:#}", e);
        }
        if self.verbose {
            eprintln!("Verbose mode enabled: showing detailed processing logs...");
        }

        let options = self.resolve_options(&cfg);
        tracing::debug!("scan options: {:?}", options);

        let observer: Arc<dyn ProgressObserver> = match display {
            Some(display) => display as Arc<dyn ProgressObserver>,
            None => Arc::new(NoProgress),
        };

        let control = ScanControl::new();
        let interrupt = control.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received; stopping after current chunks");
                interrupt.request_abort();
            }
        });

        let directory = options.directory.clone();
        let res = scan::run_scan(options, observer, control.clone(), std::io::stdout()).await;
        if let Err(e) = &res {
            eprintln!("isosum error: scan of {} failed: {}", directory.display(), e);
        }
        Ok(exit_code(&res, control.is_aborted()))
    }
}

/// Map a scan outcome to the process exit code. Only a failed scan (bad
/// directory, lost worker, closed stdout) is non-zero; individual file
/// failures are reported in the output and still exit 0.
pub fn exit_code(res: &Result<BatchSummary, ScanError>, aborted: bool) -> i32 {
    match res {
        Err(_) => EXIT_SCAN_FAILED,
        Ok(_) if aborted => EXIT_INTERRUPTED,
        Ok(_) => 0,
    }
}
