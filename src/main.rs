mod args;

use args::{NavArgs, NavCommand};
use clap::Parser;
use indoornav::algorithms::WifiObservation;
use indoornav::config::{self, Config};
use indoornav::feed::JsonFileFeed;
use indoornav::matching::{DestinationMatcher, LocationDirectory};
use indoornav::positioning::{JsonFileScanSource, Positioner, ScanSource, StaticScanSource, spawn_position_polling};
use indoornav::storage::JsonFileStore;
use std::sync::Arc;

/// Returns the level to install and whether the configured value was understood.
fn max_level(level: &str) -> (tracing::Level, bool) {
    match level.trim().parse::<tracing::Level>() {
        Ok(parsed) => (parsed, true),
        Err(_) => (tracing::Level::INFO, false),
    }
}

fn init_tracing(level: &str) {
    let (max, recognized) = max_level(level);
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(max)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install tracing subscriber: {}", e);
        return;
    }
    if !recognized {
        tracing::warn!(level, "Unknown log level in [logging].level, using info");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = NavArgs::parse();
    let config = config::load_from_path(&args.config)?;
    init_tracing(&config.logging.level);
    tracing::info!(app = %config.app.name, config_path = %args.config.display(), "starting");

    match args.command {
        NavCommand::Update(cmd) => {
            let positioner = positioner(&config);
            let database = positioner.update(&JsonFileFeed::new(cmd.scans))?;
            println!(
                "{} fingerprints stored in {}",
                database.len(),
                config.database_path().display()
            );
        }
        NavCommand::Locate(cmd) => {
            let contents = std::fs::read_to_string(&cmd.scan)?;
            let scan: Vec<WifiObservation> = serde_json::from_str(&contents)?;
            let positioner = positioner(&config);
            let estimate = positioner.locate_with(&StaticScanSource::new(scan.clone()));
            println!("{}", estimate);

            if cmd.top > 0 {
                if let Some(database) = positioner.database()? {
                    for candidate in positioner.locator().rank(&scan, &database).iter().take(cmd.top) {
                        println!("  {}", candidate);
                    }
                }
            }
        }
        NavCommand::Watch(cmd) => {
            let positioner = Arc::new(positioner(&config));
            let source: Arc<dyn ScanSource> = Arc::new(JsonFileScanSource::new(cmd.scan));
            let interval = config.poll_interval();
            tracing::info!(interval_secs = interval.as_secs(), "Starting position polling");

            let (handle, mut rx) = spawn_position_polling(positioner, source, interval, 4);
            let mut received = 0usize;
            while let Some(estimate) = rx.recv().await {
                println!("{}", estimate);
                received += 1;
                if cmd.count.is_some_and(|count| received >= count) {
                    break;
                }
            }
            drop(rx);
            handle.await?;
        }
        NavCommand::Resolve(cmd) => {
            let directory = directory(&config)?;
            let matcher = DestinationMatcher::new(config.matcher_config(), config.complex_names());
            let text = cmd.text.join(" ");
            match matcher.find_best_match(&text, directory.locations()) {
                Some(result) => {
                    println!("{}", result);
                    println!("destination: {}", result.location.destination_key());
                }
                None => {
                    println!("Ziel nicht erkannt. Bitte wiederholen");
                    for candidate in matcher.rank_candidates(&text, directory.locations(), 3) {
                        println!("  {} ({:.0}%)", candidate.location.name, candidate.score * 100.0);
                    }
                }
            }
        }
        NavCommand::Search(cmd) => {
            let directory = directory(&config)?;
            for location in directory.filter_by_prefix(&cmd.query) {
                println!("{}", location);
            }
        }
        NavCommand::Signage(cmd) => {
            let directory = directory(&config)?;
            match directory.find_signage_by_room(&cmd.room) {
                Some(signage) => println!("{} ({:?}): {}", signage.visual_sign, signage.sign_color, signage.tactile_sign),
                None => println!("no signage for room {}", cmd.room),
            }
        }
    }

    Ok(())
}

fn positioner(config: &Config) -> Positioner<JsonFileStore> {
    Positioner::new(JsonFileStore::new(config.database_path()), config.locator_config())
}

fn directory(config: &Config) -> Result<LocationDirectory, indoornav::NavError> {
    let mut directory = match config.directory_path() {
        Some(path) => LocationDirectory::load_from_path(path)?,
        None => {
            tracing::warn!("No directory path configured, only generated rooms available");
            LocationDirectory::default()
        }
    };
    if let Some((count, prefix)) = config.room_numbers() {
        directory = directory.with_room_numbers(count, prefix);
    }
    tracing::info!(locations = directory.len(), "Location directory loaded");
    Ok(directory)
}
