// crates/fz_cli/src/logging.rs
//
// Subscriber setup: one EnvFilter (FZ_LOG, default "info"), a console layer on
// stderr and an optional plain-text file layer `logs__<stamp>.txt`.
// `--quiet` lowers the console layer to warnings; the file keeps everything the filter lets through.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

pub const LOG_ENV: &str = "FZ_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

pub struct LogOptions<'a> {
    pub quiet: bool,
    /// `None` disables the log file.
    pub dir: Option<&'a Path>,
    pub stamp: &'a str,
}

pub fn log_file_name(stamp: &str) -> String {
    format!("logs__{stamp}.txt")
}

/// Install the global subscriber. Returns the log file path, if one was opened.
pub fn init(opts: &LogOptions<'_>) -> io::Result<Option<PathBuf>> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let console_level = if opts.quiet { LevelFilter::WARN } else { LevelFilter::TRACE };
    let console = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(console_level);

    let (file_layer, path) = match opts.dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let path = dir.join(log_file_name(opts.stamp));
            let file = fs::File::create(&path)?;
            let layer = fmt::layer().with_ansi(false).with_writer(Mutex::new(file));
            (Some(layer), Some(path))
        }
        None => (None, None),
    };

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry().with(filter).with(console).with(file_layer).try_init();
    Ok(path)
}
