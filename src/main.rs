//! rvcheck CLI entry point

fn main() {
    // Structured logging with env-based filter. Defaults to warn so the report table stays readable.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    rvcheck::cli::run();
}
