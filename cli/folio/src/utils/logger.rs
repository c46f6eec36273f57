use tracing_subscriber::EnvFilter;

use crate::commands::Verbosity;

/// The log filter used when `RUST_LOG` is not set.
pub(crate) fn log_filter(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "off",
        // Only show warnings
        Verbosity::Verbose(0) => "off,folio=warn,folio_catalog=warn",
        // Show our own info logs
        Verbosity::Verbose(1) => "off,folio=info,folio_catalog=info",
        Verbosity::Verbose(2) => "off,folio=debug,folio_catalog=debug",
        Verbosity::Verbose(3) => "off,folio=trace,folio_catalog=trace",
        // Also show trace from the HTTP stack
        Verbosity::Verbose(_) => "trace",
    }
}

/// Install a stderr subscriber; `RUST_LOG` overrides the verbosity flags.
pub(crate) fn init_logger(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_filter(verbosity)))
        .unwrap_or_else(|err| {
            eprintln!("Invalid log filter, falling back to warnings: {err}");
            EnvFilter::new("warn")
        });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
