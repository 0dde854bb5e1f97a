mod bootstrap;
mod render;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use schedule_core::favorites::FavoritesStore;
use schedule_core::settings::Settings;
use schedule_data::filter::Segment;
use schedule_data::source::{FetchOptions, ScheduleSource};
use schedule_runtime::provider::ConferenceData;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("conference-schedule v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Source: {}, Segment: {}",
        settings.view,
        settings.source,
        settings.segment
    );

    let favorites = update_favorites(&settings)?;

    let source = ScheduleSource::parse(&settings.source)?;
    let options = FetchOptions {
        timeout: Duration::from_secs(settings.timeout_secs),
        ..FetchOptions::default()
    };
    let provider = ConferenceData::with_options(source, options, Arc::new(favorites));

    tokio::select! {
        result = run(&settings, &provider) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; aborting");
            Ok(())
        }
    }
}

/// Load the favorites file and apply any `--add-favorite` /
/// `--remove-favorite` edits, saving only when something changed.
fn update_favorites(settings: &Settings) -> Result<FavoritesStore> {
    let path = settings.favorites_path();
    let mut store = FavoritesStore::load_from(&path)
        .with_context(|| format!("loading favorites from {}", path.display()))?;

    let mut changed = false;
    for name in &settings.add_favorites {
        changed |= store.add(name.trim());
    }
    for name in &settings.remove_favorites {
        changed |= store.remove(name.trim());
    }

    if changed {
        store
            .save_to(&path)
            .with_context(|| format!("saving favorites to {}", path.display()))?;
        tracing::info!(count = store.len(), "favorites updated");
    }

    Ok(store)
}

async fn run(settings: &Settings, provider: &ConferenceData) -> Result<()> {
    let json = settings.format == "json";
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match settings.view.as_str() {
        "timeline" => {
            let segment: Segment = settings.segment.parse()?;
            let days = match settings.day {
                Some(index) => vec![
                    provider
                        .day_timeline(index, &settings.query, &settings.exclude_tracks, segment)
                        .await?,
                ],
                None => {
                    provider
                        .timeline(&settings.query, &settings.exclude_tracks, segment)
                        .await?
                }
            };
            if json {
                render::write_json(&mut out, &days)?;
            } else {
                render::write_timeline(&mut out, &days, settings.show_hidden)?;
            }
        }

        "speakers" => {
            let speakers = provider.speakers().await?;
            if json {
                render::write_json(&mut out, &speakers)?;
            } else {
                render::write_speakers(&mut out, &speakers)?;
            }
        }

        "tracks" => {
            let tracks = provider.tracks().await?;
            if json {
                render::write_json(&mut out, &tracks)?;
            } else {
                render::write_tracks(&mut out, &tracks)?;
            }
        }

        "map" => {
            let map = provider.map().await?;
            if json {
                render::write_json(&mut out, &map)?;
            } else {
                render::write_map(&mut out, &map)?;
            }
        }

        "days" => {
            let days = provider.conf_days().await?;
            if json {
                render::write_json(&mut out, &days)?;
            } else {
                render::write_days(&mut out, &days)?;
            }
        }

        unknown => anyhow::bail!("Unknown view: {unknown}"),
    }

    out.flush()?;
    Ok(())
}
