use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Where tracing output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    /// The TUI owns the terminal; anything on stderr would draw over it.
    Off,
}

impl LogTarget {
    pub fn select(log_file: Option<PathBuf>, interactive: bool) -> Self {
        match log_file {
            Some(path) => LogTarget::File(path),
            None if interactive => LogTarget::Off,
            None => LogTarget::Stderr,
        }
    }

    /// Install the global subscriber. `RUST_LOG` picks the level.
    pub fn init(&self) -> anyhow::Result<()> {
        let subscriber = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
        match self {
            LogTarget::File(path) => {
                let file = std::fs::File::create(path)?;
                subscriber.with_writer(Mutex::new(file)).with_ansi(false).init();
            }
            LogTarget::Stderr => subscriber.with_writer(std::io::stderr).init(),
            LogTarget::Off => tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("off"))
                .init(),
        }
        Ok(())
    }
}
