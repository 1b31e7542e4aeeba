use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr so stdout stays clean for reports and `--json`.
/// `RUST_LOG` takes precedence over the flags.
pub fn init(verbose: bool, quiet: bool) {
    let default_level = default_level(verbose, quiet);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("repohealth={default_level}")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn default_level(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}
