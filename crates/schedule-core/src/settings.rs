use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the schedule document is fetched from when nothing else is given.
pub const DEFAULT_SOURCE: &str = "http://ar.pycon.org/schedule.json";

pub const VIEWS: [&str; 5] = ["timeline", "speakers", "tracks", "map", "days"];
pub const SEGMENTS: [&str; 2] = ["all", "favorites"];
pub const FORMATS: [&str; 2] = ["text", "json"];

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Browse a conference schedule from the terminal
#[derive(Parser, Debug, Clone)]
#[command(
    name = "conference-schedule",
    about = "Browse a conference schedule from the terminal",
    version
)]
pub struct Settings {
    /// What to show
    #[arg(long, default_value = "timeline", value_parser = VIEWS)]
    pub view: String,

    /// Schedule document: an http(s) URL or a local JSON file
    #[arg(long, env = "CONFERENCE_SCHEDULE_SOURCE", default_value = DEFAULT_SOURCE)]
    pub source: String,

    /// Only show this day (0-based) in the timeline
    #[arg(long)]
    pub day: Option<usize>,

    /// Free-text filter applied to session names
    #[arg(long, default_value = "")]
    pub query: String,

    /// Hide sessions whose every track is excluded (repeatable)
    #[arg(long = "exclude-track")]
    pub exclude_tracks: Vec<String>,

    /// Session segment
    #[arg(long, default_value = "all", value_parser = SEGMENTS)]
    pub segment: String,

    /// Favorites file (defaults to ~/.conference-schedule/favorites.json)
    #[arg(long)]
    pub favorites_file: Option<PathBuf>,

    /// Mark a session name as favorite (repeatable)
    #[arg(long = "add-favorite")]
    pub add_favorites: Vec<String>,

    /// Unmark a favorite session name (repeatable)
    #[arg(long = "remove-favorite")]
    pub remove_favorites: Vec<String>,

    /// Output format
    #[arg(long, default_value = "text", value_parser = FORMATS)]
    pub format: String,

    /// Include hidden sessions in text output
    #[arg(long)]
    pub show_hidden: bool,

    /// HTTP timeout in seconds (1-300)
    #[arg(long, default_value = "20", value_parser = clap::value_parser!(u64).range(1..=300))]
    pub timeout_secs: u64,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.conference-schedule/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_tracks: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl LastUsedParams {
    /// Default path of the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".conference-schedule").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with explicit args and config
    /// path, so tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!(error = %e, "could not clear saved configuration");
            }
            return Self::resolve(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI (or environment) always wins over persisted values. The day,
        // query and favorites edits are per-invocation and never persisted.
        if !is_arg_user_set(&matches, "view") {
            if let Some(v) = accepted("view", last.view, &VIEWS) {
                settings.view = v;
            }
        }
        if !is_arg_user_set(&matches, "source") {
            if let Some(v) = last.source {
                settings.source = v;
            }
        }
        if !is_arg_user_set(&matches, "segment") {
            if let Some(v) = accepted("segment", last.segment, &SEGMENTS) {
                settings.segment = v;
            }
        }
        if !is_arg_user_set(&matches, "exclude_tracks") {
            if let Some(v) = last.exclude_tracks {
                settings.exclude_tracks = v;
            }
        }
        if !is_arg_user_set(&matches, "format") {
            if let Some(v) = accepted("format", last.format, &FORMATS) {
                settings.format = v;
            }
        }

        settings = Self::resolve(settings);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!(error = %e, "could not persist configuration");
        }

        settings
    }

    /// Normalise free-form values and apply the `--debug` flag.
    fn resolve(mut settings: Settings) -> Settings {
        let trimmed = settings.source.trim();
        settings.source = if trimmed.is_empty() {
            DEFAULT_SOURCE.to_string()
        } else {
            trimmed.to_string()
        };

        settings.exclude_tracks.retain(|t| !t.trim().is_empty());

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }

    /// Favorites file to use, honouring `--favorites-file`.
    pub fn favorites_path(&self) -> PathBuf {
        self.favorites_file
            .clone()
            .unwrap_or_else(crate::favorites::FavoritesStore::default_path)
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            view: Some(s.view.clone()),
            source: Some(s.source.clone()),
            segment: Some(s.segment.clone()),
            exclude_tracks: Some(s.exclude_tracks.clone()),
            format: Some(s.format.clone()),
        }
    }
}

/// Keep a persisted value only if the CLI would have accepted it.
fn accepted(name: &str, value: Option<String>, allowed: &[&str]) -> Option<String> {
    let value = value?;
    if allowed.contains(&value.as_str()) {
        Some(value)
    } else {
        tracing::warn!(setting = name, value = %value, "ignoring invalid saved setting");
        None
    }
}

/// Returns `true` when `name` was supplied on the command line or through its
/// environment variable, as opposed to a default value.
fn is_arg_user_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(clap::parser::ValueSource::CommandLine) | Some(clap::parser::ValueSource::EnvVariable)
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────
