use eframe::egui;
use egui::ViewportBuilder;
use std::sync::Arc;
use tracing::{error, info};

mod app;
mod config;
mod controller;
mod db;
mod hn_client;
mod models;
mod stories;

use crate::app::{HackerStoriesApp, THEME_STORAGE_KEY};
use crate::config::AppConfig;
use crate::controller::StoryListController;
use crate::db::Database;
use crate::hn_client::AlgoliaClient;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn build_controller(config: &AppConfig) -> anyhow::Result<StoryListController<Database>> {
    let database = Database::open(&config.database_path)?;
    let client = AlgoliaClient::new(config.request_timeout())?;
    Ok(StoryListController::new(Arc::new(client), database, config))
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load()?;
    info!(database = %config.database_path.display(), "Starting Hacker Stories");

    let controller = build_controller(&config)?;

    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([960.0, 720.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Hacker Stories"),
        ..Default::default()
    };

    eframe::run_native(
        "Hacker Stories",
        options,
        Box::new(move |cc| {
            let is_dark_mode = cc
                .storage
                .and_then(|storage| storage.get_string(THEME_STORAGE_KEY))
                .and_then(|value| value.parse::<bool>().ok())
                .unwrap_or(true);

            Ok(Box::new(HackerStoriesApp::new(controller, is_dark_mode)))
        }),
    )
    .map_err(|e| {
        error!("UI exited with error: {}", e);
        anyhow::anyhow!("failed to run UI: {}", e)
    })
}
