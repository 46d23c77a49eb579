//! Mock-API hub entry point: parse flags, load configuration, wire logging, run the hub until
//! interrupted.

use clap::Parser;

use mockhub::config::AppConfig;
use mockhub::fileio::RealFileOps;
use mockhub::hub::HubController;
use mockhub::loader::TomlConfigLoader;
use mockhub::logging::{init_logging, LoggingConfig};

#[derive(Parser)]
#[command(name = "mockhubd", about = "Mock-API hub", version)]
struct Cli {
    /// Path to the top-level application configuration
    #[arg(long, default_value = "app_config.toml")]
    config: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config_path = std::env::var("MOCKHUB_CONFIG").unwrap_or(cli.config);

    let app_config = match AppConfig::load_from(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load {config_path}: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = app_config.validate() {
        eprintln!("invalid configuration: {err}");
        std::process::exit(1);
    }

    let logging = LoggingConfig::from_app_log_config(&app_config.log);
    if let Err(err) = init_logging(&logging) {
        eprintln!("failed to initialise logging: {err}");
        std::process::exit(1);
    }

    let file_io = std::sync::Arc::new(RealFileOps);
    let loader = std::sync::Arc::new(TomlConfigLoader::new(file_io.clone()));

    let mut hub = match HubController::new(app_config, file_io, loader) {
        Ok(hub) => hub,
        Err(err) => {
            log::error!("failed to construct hub controller: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = hub.start_hub().await {
        log::error!("failed to start hub: {err}");
        std::process::exit(1);
    }

    log::info!("mock-API hub running");

    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("failed to install interrupt handler: {err}");
    }

    log::info!("shutting down");
    hub.stop_hub().await;
}
