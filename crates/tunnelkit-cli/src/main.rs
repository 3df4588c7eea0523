mod cli;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    std::process::exit(cli::run_from_env());
}
