//! Logging init: structured logs on stderr, kept quiet unless asked for.
//!
//! Per-item decisions are already reported on stdout, so the default filter
//! only lets errors through. `RUST_LOG` wins over `--verbose`.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "error";
const VERBOSE_FILTER: &str = "info,modelgrab=debug,modelgrab_core=debug";

pub fn init_logging(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}
