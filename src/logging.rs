//! Diagnostic logging to stderr.
//!
//! User-facing results go to stdout through the CLI; everything emitted here is
//! for troubleshooting and can be tuned with `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `verbose` selects `debug` for this crate
/// and the default is `error`; the CLI prints no-match warnings itself.
pub fn init(verbose: bool) {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    let default_directive = if verbose {
        "snippet_patcher=debug"
    } else {
        "snippet_patcher=error"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    if let Err(e) = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init()
    {
        eprintln!("Warning: logging initialization failed: {}", e);
    }
}
