//! Tracing setup for pantryctl
//!
//! Logs go to stderr so command output on stdout stays clean.
//! `PANTRY_LOG` takes precedence over `RUST_LOG`, which takes precedence
//! over the configured level.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PANTRY_LOG";

pub fn filter_directive(configured: &str) -> String {
    std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| configured.to_string())
}

pub fn init(configured_level: &str) {
    let directive = filter_directive(configured_level);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init in the same process is a no-op
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
