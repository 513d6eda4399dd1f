use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "flagpost=info,warn";

/// Install the global subscriber. Logs go to stderr so command output stays parseable.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("flagpost=debug,flagpost_security=trace,warn")
        } else {
            EnvFilter::new(DEFAULT_FILTER)
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
