mod app;
mod cli;
mod config;
mod consts;
mod error;
mod ledger;
mod output;
mod utils;

use clap::Parser;
use tracing::debug;

use cli::Cli;
use config::Config;
use error::AppError;
use utils::init_logging;

fn main() {
    let config = Config::load();
    let cli = Cli::parse().with_config(&config);
    init_logging(cli.debug);

    if let Some(path) = &config.source {
        debug!(path = %path.display(), "loaded config");
    }

    if let Err(e) = app::run(&cli) {
        if let AppError::Ledger(inner) = &e {
            debug!(recoverable = inner.is_recoverable(), error = ?inner, "command rejected");
        }
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
