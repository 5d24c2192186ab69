//! Main application entry point (native).

use clap::Parser;
use inkboard_app::{App, AppConfig, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match AppConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config.with_output_dir(cli.out.clone()),
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    log::info!("Starting {}", config.title);

    match App::with_config(config).and_then(|mut app| app.run(&cli)) {
        Ok(report) => {
            for notice in &report.notices {
                println!("{}", notice);
            }
            for path in &report.exports {
                println!("Whiteboard exported to {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
