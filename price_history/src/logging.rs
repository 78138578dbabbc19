//! Diagnostic output for one invocation.
//!
//! [`init`] installs a `tracing` subscriber as the thread's default and hands
//! back the guard; the subscriber lives exactly as long as the guard, so
//! nothing process-wide is left behind.

use std::fmt;

use clap::ValueEnum;
use tracing::{level_filters::LevelFilter, subscriber::DefaultGuard};
use tracing_subscriber::{EnvFilter, fmt as tfmt, layer::SubscriberExt, util::SubscriberInitExt};

/// `-v` levels, matched case-insensitively on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Verbosity {
    Debug,
    Info,
    Warning,
    Error,
    /// Nothing is emitted at this level: no event in the crate is more severe than an error.
    #[default]
    Critical,
}

impl Verbosity {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Debug => LevelFilter::DEBUG,
            Verbosity::Info => LevelFilter::INFO,
            Verbosity::Warning => LevelFilter::WARN,
            Verbosity::Error => LevelFilter::ERROR,
            Verbosity::Critical => LevelFilter::OFF,
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verbosity::Debug => "DEBUG",
            Verbosity::Info => "INFO",
            Verbosity::Warning => "WARNING",
            Verbosity::Error => "ERROR",
            Verbosity::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

/// `RUST_LOG` if set and valid, otherwise the level picked with `-v`.
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.level_filter().to_string()))
}

/// Install a stderr subscriber for the current thread until the guard drops.
pub fn init(verbosity: Verbosity) -> DefaultGuard {
    tracing_subscriber::registry()
        .with(env_filter(verbosity))
        .with(tfmt::layer().with_writer(std::io::stderr).with_target(false))
        .set_default()
}
