mod app;
mod commands;
mod config;
mod error;
mod ui;

use std::{fs::OpenOptions, sync::Mutex};

use clap::Parser;
use client::{ApiClient, FileStorage, SessionContext};

use crate::{
    commands::Services,
    config::{AppConfig, Cli, Command},
    error::Result,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        tracing::error!("{err}");
        eprintln!("error: {}", err.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = config::load(&cli)?;
    let dashboard = matches!(cli.command, Command::Dashboard);
    init_logging(&settings, dashboard)?;

    let session = SessionContext::new(FileStorage::new(settings.session_path.clone()));
    let api = ApiClient::new(&settings.base_url, session)?;
    let services = Services::new(api);
    services.auth.restore().await;

    if dashboard {
        let mut app = app::App::new(services, settings.poll_interval()).await;
        return app.run().await;
    }
    commands::run(cli.command, &services).await
}

fn init_logging(settings: &AppConfig, to_file: bool) -> Result<()> {
    let filter = format!(
        "tracker_tui={level},client={level},engine={level}",
        level = settings.level
    );

    if to_file {
        let path = settings.log_path();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}
