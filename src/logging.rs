use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a compact stderr logger for the command line tools.
///
/// `RUST_LOG` wins when set. Otherwise the crate logs at `info`, or `debug`
/// when `verbose` is true.
pub fn init_logger(verbose: bool) {
    let default = if verbose {
        "terra_dataaccess=debug,info"
    } else {
        "terra_dataaccess=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
