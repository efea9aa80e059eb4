use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "ecoconvert=info,ecoconvert_core=info";
const VERBOSE_DIRECTIVES: &str = "ecoconvert=debug,ecoconvert_core=debug";

/// Install the stderr subscriber. `RUST_LOG` wins over `verbose` when set.
pub fn init(verbose: bool) {
    let fallback = if verbose {
        VERBOSE_DIRECTIVES
    } else {
        DEFAULT_DIRECTIVES
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A subscriber may already be installed (e.g. by a test harness).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
