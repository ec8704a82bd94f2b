//! Log subscriber setup.

use tracing_subscriber::EnvFilter;

/// Installs a stderr subscriber.
///
/// Without `-v` the filter comes from `RUST_LOG`, defaulting to warnings.
/// Each `-v` raises the level for the rowseek crates and overrides
/// `RUST_LOG`.
pub fn init(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        v => EnvFilter::new(directives(v)),
    };

    // A subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn directives(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,rowseek=debug,rowseek_cli=debug",
        _ => "info,rowseek=trace,rowseek_cli=trace",
    }
}
