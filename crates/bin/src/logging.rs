use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the workspace crates log at `info`,
/// or `debug` when `verbose` is set. Output goes to stderr so it does not mix
/// with the run summary on stdout.
pub(crate) fn init_logging(verbose: bool) {
    let default = if verbose { "nport=debug" } else { "nport=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
