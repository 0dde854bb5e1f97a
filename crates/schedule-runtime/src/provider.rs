//! Load-once schedule provider.
//!
//! [`ConferenceData`] fetches and normalizes the schedule on first use and
//! keeps the result for its own lifetime. Concurrent first callers await the
//! same fetch; a failed fetch is not remembered, so the next call tries again.
//! Every query re-derives visibility from its arguments.

use std::sync::Arc;

use schedule_core::error::{Result, ScheduleError};
use schedule_core::favorites::FavoriteLookup;
use schedule_core::models::{Day, MapLocation, Schedule, Speaker};
use schedule_data::filter::{
    build_day_timeline, build_timeline, Segment, TimelineDay, TimelineFilter,
};
use schedule_data::normalize::normalize;
use schedule_data::source::{fetch_raw, FetchOptions, ScheduleSource};
use tokio::sync::OnceCell;

// ── ConferenceData ────────────────────────────────────────────────────────────

/// Schedule provider backed by a single memoized load.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use schedule_core::favorites::NoFavorites;
/// use schedule_data::filter::Segment;
/// use schedule_data::source::ScheduleSource;
/// use schedule_runtime::provider::ConferenceData;
///
/// # async fn demo() -> schedule_core::error::Result<()> {
/// let source = ScheduleSource::parse("schedule.json")?;
/// let data = ConferenceData::new(source, Arc::new(NoFavorites));
/// for day in data.timeline("django", &[], Segment::All).await? {
///     println!("{}: {} sessions", day.date, day.shown_sessions);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ConferenceData {
    /// `None` for providers built over an in-memory schedule.
    source: Option<ScheduleSource>,
    options: FetchOptions,
    favorites: Arc<dyn FavoriteLookup>,
    data: OnceCell<Arc<Schedule>>,
}

impl ConferenceData {
    pub fn new(source: ScheduleSource, favorites: Arc<dyn FavoriteLookup>) -> Self {
        Self::with_options(source, FetchOptions::default(), favorites)
    }

    pub fn with_options(
        source: ScheduleSource,
        options: FetchOptions,
        favorites: Arc<dyn FavoriteLookup>,
    ) -> Self {
        Self {
            source: Some(source),
            options,
            favorites,
            data: OnceCell::new(),
        }
    }

    /// Provider over an already built schedule; [`ConferenceData::load`]
    /// never fetches.
    pub fn from_schedule(schedule: Schedule, favorites: Arc<dyn FavoriteLookup>) -> Self {
        Self {
            source: None,
            options: FetchOptions::default(),
            favorites,
            data: OnceCell::from(Arc::new(schedule)),
        }
    }

    /// `true` once a load has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.data.initialized()
    }

    /// Return the normalized schedule, fetching it on first use.
    pub async fn load(&self) -> Result<Arc<Schedule>> {
        if let Some(schedule) = self.data.get() {
            tracing::debug!("returning memoized schedule");
            return Ok(Arc::clone(schedule));
        }

        let schedule = self
            .data
            .get_or_try_init(|| async {
                let source = self
                    .source
                    .as_ref()
                    .ok_or_else(|| ScheduleError::InvalidSource("no schedule source".to_string()))?;
                let raw = fetch_raw(source, &self.options).await?;
                Ok::<_, ScheduleError>(Arc::new(normalize(raw)))
            })
            .await?;
        Ok(Arc::clone(schedule))
    }

    /// Filtered timeline of every conference day.
    pub async fn timeline(
        &self,
        query_text: &str,
        exclude_tracks: &[String],
        segment: Segment,
    ) -> Result<Vec<TimelineDay>> {
        let schedule = self.load().await?;
        let filter = TimelineFilter::new(query_text, exclude_tracks, segment);
        Ok(build_timeline(&schedule, &filter, &*self.favorites))
    }

    /// Filtered timeline of one day.
    pub async fn day_timeline(
        &self,
        day_index: usize,
        query_text: &str,
        exclude_tracks: &[String],
        segment: Segment,
    ) -> Result<TimelineDay> {
        let schedule = self.load().await?;
        let filter = TimelineFilter::new(query_text, exclude_tracks, segment);
        build_day_timeline(&schedule, day_index, &filter, &*self.favorites).ok_or(
            ScheduleError::DayOutOfRange {
                index: day_index,
                count: schedule.days.len(),
            },
        )
    }

    /// Named speakers, sorted by the last word of their name.
    pub async fn speakers(&self) -> Result<Vec<Speaker>> {
        let schedule = self.load().await?;
        let mut speakers: Vec<Speaker> = schedule
            .speakers
            .iter()
            .filter(|s| !s.name.is_empty())
            .cloned()
            .collect();
        speakers.sort_by(|a, b| {
            let (a, b) = (a.last_name(), b.last_name());
            a.to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b))
        });
        Ok(speakers)
    }

    /// Every track name, sorted.
    pub async fn tracks(&self) -> Result<Vec<String>> {
        let schedule = self.load().await?;
        let mut tracks = schedule.tracks.clone();
        tracks.sort();
        Ok(tracks)
    }

    pub async fn map(&self) -> Result<Vec<MapLocation>> {
        Ok(self.load().await?.map.clone())
    }

    /// Conference days in agenda order.
    pub async fn conf_days(&self) -> Result<Vec<Day>> {
        Ok(self.load().await?.days.clone())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use schedule_core::favorites::NoFavorites;
    use std::collections::HashSet;
    use tempfile::TempDir;

    const DOCUMENT: &str = r#"{
        "schedule": [
            { "date": "2024-11-22", "groups": [
                { "time": "09:00", "sessions": [
                    { "name": "Async Python", "kind": "charla", "tracks": ["Python"], "speakerNames": ["Ana Pérez"] },
                    { "name": "Django REST", "kind": "charla", "tracks": ["Web"], "speakerNames": ["luis zapata"] }
                ]}
            ]},
            { "date": "2024-11-23", "groups": [
                { "time": "09:00", "sessions": [
                    { "name": "Pandas tips", "kind": "charla", "tracks": ["Data"], "speakerNames": ["Bea Alonso"] }
                ]}
            ]}
        ],
        "speakers": [
            { "name": "Ana Pérez" },
            { "name": "luis zapata" },
            { "name": "" },
            { "name": "Bea Alonso" }
        ],
        "map": [ { "name": "Main hall", "lat": -34.6, "lng": -58.4, "center": true } ]
    }"#;

    fn provider_with_file(
        favorites: Arc<dyn FavoriteLookup>,
    ) -> (ConferenceData, TempDir, std::path::PathBuf) {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("schedule.json");
        std::fs::write(&path, DOCUMENT).expect("write fixture");
        let provider = ConferenceData::new(ScheduleSource::File(path.clone()), favorites);
        (provider, dir, path)
    }

    #[tokio::test]
    async fn test_load_is_memoized() {
        let (provider, _dir, path) = provider_with_file(Arc::new(NoFavorites));
        assert!(!provider.is_loaded());

        let first = provider.load().await.expect("first load");
        assert!(provider.is_loaded());

        // The document is gone, but the memoized schedule is still served.
        std::fs::remove_file(&path).unwrap();
        let second = provider.load().await.expect("memoized load");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_concurrent_first_loads_share_result() {
        let (provider, _dir, _path) = provider_with_file(Arc::new(NoFavorites));
        let (a, b) = tokio::join!(provider.load(), provider.load());
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schedule.json");
        let provider = ConferenceData::new(ScheduleSource::File(path.clone()), Arc::new(NoFavorites));

        assert!(provider.load().await.is_err());
        assert!(!provider.is_loaded());

        std::fs::write(&path, DOCUMENT).unwrap();
        assert!(provider.load().await.is_ok());
    }

    #[tokio::test]
    async fn test_timeline_filters_all_days() {
        let (provider, _dir, _path) = provider_with_file(Arc::new(NoFavorites));

        let days = provider.timeline("", &[], Segment::All).await.unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].shown_sessions, 2);
        assert_eq!(days[1].shown_sessions, 1);

        let excluded = vec!["Web".to_string()];
        let days = provider.timeline("", &excluded, Segment::All).await.unwrap();
        assert_eq!(days[0].shown_sessions, 1);
        assert!(days[0].groups[0].sessions[1].hide);
    }

    #[tokio::test]
    async fn test_timeline_favorites_segment() {
        let favorites: HashSet<String> = ["Pandas tips".to_string()].into_iter().collect();
        let (provider, _dir, _path) = provider_with_file(Arc::new(favorites));

        let days = provider.timeline("", &[], Segment::Favorites).await.unwrap();
        assert_eq!(days[0].shown_sessions, 0);
        assert!(days[0].groups[0].hide);
        assert_eq!(days[1].shown_sessions, 1);
    }

    #[tokio::test]
    async fn test_day_timeline_out_of_range() {
        let (provider, _dir, _path) = provider_with_file(Arc::new(NoFavorites));

        let day = provider.day_timeline(1, "", &[], Segment::All).await.unwrap();
        assert_eq!(day.date, "2024-11-23");

        let err = provider
            .day_timeline(7, "", &[], Segment::All)
            .await
            .unwrap_err();
        assert!(matches!(err, ScheduleError::DayOutOfRange { index: 7, count: 2 }));
    }

    #[tokio::test]
    async fn test_speakers_sorted_by_last_name_without_blanks() {
        let (provider, _dir, _path) = provider_with_file(Arc::new(NoFavorites));

        let names: Vec<String> = provider
            .speakers()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Bea Alonso", "Ana Pérez", "luis zapata"]);
    }

    #[tokio::test]
    async fn test_speakers_same_last_name_uppercase_first() {
        let named = |name: &str| Speaker {
            name: name.to_string(),
            ..Default::default()
        };
        let schedule = Schedule {
            speakers: vec![named("Ana zed"), named("Bob Zed"), named("Cleo Abel")],
            ..Default::default()
        };
        let provider = ConferenceData::from_schedule(schedule, Arc::new(NoFavorites));

        let names: Vec<String> = provider
            .speakers()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Cleo Abel", "Bob Zed", "Ana zed"]);
    }

    #[tokio::test]
    async fn test_speakers_carry_session_back_references() {
        let (provider, _dir, _path) = provider_with_file(Arc::new(NoFavorites));
        let schedule = provider.load().await.unwrap();

        let speakers = provider.speakers().await.unwrap();
        let ana = speakers.iter().find(|s| s.name == "Ana Pérez").unwrap();
        let session = schedule.session(ana.sessions[0]).unwrap();
        assert_eq!(session.name, "Async Python");
    }

    #[tokio::test]
    async fn test_tracks_sorted() {
        let (provider, _dir, _path) = provider_with_file(Arc::new(NoFavorites));
        assert_eq!(provider.tracks().await.unwrap(), vec!["Data", "Python", "Web"]);
    }

    #[tokio::test]
    async fn test_map_and_conf_days() {
        let (provider, _dir, _path) = provider_with_file(Arc::new(NoFavorites));

        let map = provider.map().await.unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map[0].name, "Main hall");

        let days = provider.conf_days().await.unwrap();
        let dates: Vec<&str> = days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-11-22", "2024-11-23"]);
    }

    #[tokio::test]
    async fn test_from_schedule_never_fetches() {
        let provider = ConferenceData::from_schedule(Schedule::default(), Arc::new(NoFavorites));
        assert!(provider.is_loaded());
        assert!(provider.timeline("", &[], Segment::All).await.unwrap().is_empty());
    }
}
