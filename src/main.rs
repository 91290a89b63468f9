use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;

use outsync_core::Config;
use outsync_graph::{GraphClient, SyncWindow};
use outsync_store::SyncStore;
use outsync_sync::SyncEngine;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging and load config
    outsync_core::init()?;
    let (config, _) = Config::load_validated()?;

    let token = env::var("OUTSYNC_GRAPH_TOKEN")
        .context("OUTSYNC_GRAPH_TOKEN is not set; export a Graph access token first")?;

    let client = GraphClient::with_options(
        &config.graph.base_url,
        &token,
        config.graph.page_size,
        Duration::from_secs(config.graph.timeout_secs),
    )?;
    let store = SyncStore::new(&config.sync.store_path)?;
    let engine = SyncEngine::new(client, store);

    let window = SyncWindow::from_days(
        Utc::now(),
        config.sync.lookback_days,
        config.sync.lookahead_days,
    );

    tracing::info!("Starting full sync against {}", config.graph.base_url);
    let report = engine.full_sync(&window).await?;

    println!("Outsync - Outlook calendar sync");
    println!("\nSynced this run:");
    println!("  Users:            {}", report.users);
    println!("  Calendar entries: {}", report.calendar_entries);
    println!("  Attendees:        {}", report.attendees);
    println!("  Personal events:  {}", report.personal_events);

    let counts = engine.store().counts()?;
    println!("\nStore now holds:");
    println!("  Users:            {}", counts.users);
    println!("  Calendar entries: {}", counts.calendar_entries);
    println!("  Attendees:        {}", counts.attendees);
    println!("  Personal events:  {}", counts.personal_events);
    println!("\nStore path: {}", config.sync.store_path.display());

    Ok(())
}
