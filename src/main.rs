use anyhow::Context;
use chrono::Utc;
use geopath::config::AppConfig;
use geopath::enrichment::{Enricher, GeminiClient};
use geopath::location::{FeedSource, WatchOptions};
use geopath::models::Coordinate;
use geopath::recorder;
use geopath::repository::Repository;
use geopath::tracker::Tracker;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting GeoPath trip recorder...");

    let repository = Arc::new(Repository::with_sample_data());
    let enricher = Arc::new(
        Enricher::new(GeminiClient::from_config(&config))
            .with_timeout(config.enrichment_timeout()),
    );
    if config.api_key.is_empty() {
        warn!("API_KEY not set, trip summaries will use the fallback text");
    }

    let samples = match &config.replay_file {
        Some(path) => load_replay(path)?,
        None => demo_line(),
    };
    info!("Replaying {} samples", samples.len());

    let source = FeedSource::new();
    let mut tracker = Tracker::new(
        source.clone(),
        WatchOptions {
            high_accuracy: config.location_high_accuracy,
        },
    );
    tracker.start()?;

    let feeder = tokio::spawn(replay(source, samples, config.replay_interval()));

    tokio::select! {
        _ = async { while tracker.next_event().await.is_some() {} } => {}
        _ = feeder => {}
    }

    let session = tracker.session();
    info!(
        "Stopping after {} samples ({:.2} km)",
        session.path().len(),
        session.distance_km()
    );

    match tracker.stop() {
        Some(draft) => {
            let trip = recorder::spawn_enrichment(enricher, repository.clone(), draft)
                .await
                .context("enrichment task panicked")?;
            info!("Summary: {}", trip.summary.as_deref().unwrap_or_default());
        }
        None => warn!("Session too short, no trip recorded"),
    }

    println!("{}", serde_json::to_string_pretty(&repository.trips())?);
    Ok(())
}

fn load_replay(path: &Path) -> anyhow::Result<Vec<Coordinate>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading replay file {}", path.display()))?;
    let samples = serde_json::from_str(&raw)
        .with_context(|| format!("parsing replay file {}", path.display()))?;
    Ok(samples)
}

/// Five samples one second apart along a 100 m northbound line.
fn demo_line() -> Vec<Coordinate> {
    let start = Utc::now().timestamp_millis();
    let step = 0.1 / 4.0 / 111.195;
    (0..5)
        .map(|i| {
            Coordinate::new(55.6761 + step * i as f64, 12.5683, start + i * 1000)
                .with_speed(25.0)
        })
        .collect()
}

async fn replay(source: FeedSource, samples: Vec<Coordinate>, interval: Duration) {
    let now = Utc::now().timestamp_millis();
    let offset = samples.first().map(|c| now - c.timestamp).unwrap_or(0);
    for (i, sample) in samples.into_iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(interval).await;
        }
        source.push(Coordinate {
            timestamp: sample.timestamp + offset,
            ..sample
        });
    }
    // Let the tracker pick up the last fix before the session is stopped.
    tokio::time::sleep(interval / 2).await;
}
