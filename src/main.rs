use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

mod cli;

use cli::{load_config, run_command, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let from_env = EnvFilter::try_from_default_env().ok();
    let explicit = cli.debug || from_env.is_some();
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        from_env.unwrap_or_else(|| EnvFilter::new("info"))
    };
    let (filter, filter_handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // The config file's level applies only when neither --debug nor RUST_LOG chose one
    if !explicit {
        filter_handle.reload(EnvFilter::new(&config.logging.level))?;
    }

    if let Err(e) = run_command(cli, config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
