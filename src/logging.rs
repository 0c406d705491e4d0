//! Diagnostics via `tracing`, always on stderr so stdout stays machine-readable

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive for the given verbosity flags
pub fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "mention_loader=error"
    } else if verbose {
        "mention_loader=debug"
    } else {
        "mention_loader=warn"
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the flags when set.
pub fn init_logging(verbose: bool, quiet: bool, ansi: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    // A second init (tests, embedding hosts) is not an error
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(ansi)
                .without_time(),
        )
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false, false), "mention_loader=warn");
        assert_eq!(default_directive(true, false), "mention_loader=debug");
        assert_eq!(default_directive(true, true), "mention_loader=error");
    }
}
