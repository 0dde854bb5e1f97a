//! Session visibility and timeline views.
//!
//! Visibility is derived on every call from a [`TimelineFilter`]; nothing is
//! written back into the [`Schedule`], so one loaded schedule can serve any
//! number of differently filtered views.

use std::fmt;
use std::str::FromStr;

use schedule_core::error::ScheduleError;
use schedule_core::favorites::FavoriteLookup;
use schedule_core::models::{Day, Schedule, Session, SessionRef};
use schedule_core::text::query_words;
use serde::{Deserialize, Serialize};

// ── Segment ───────────────────────────────────────────────────────────────────

/// Named subset of sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    #[default]
    All,
    Favorites,
}

impl FromStr for Segment {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Segment::All),
            "favorites" => Ok(Segment::Favorites),
            other => Err(ScheduleError::InvalidSegment(other.to_string())),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::All => f.write_str("all"),
            Segment::Favorites => f.write_str("favorites"),
        }
    }
}

// ── TimelineFilter ────────────────────────────────────────────────────────────

/// Everything that decides whether a session is shown.
#[derive(Debug, Clone, Default)]
pub struct TimelineFilter {
    /// Lowercase query words; empty means "match everything".
    pub query_words: Vec<String>,
    pub exclude_tracks: Vec<String>,
    pub segment: Segment,
}

impl TimelineFilter {
    pub fn new(query_text: &str, exclude_tracks: &[String], segment: Segment) -> Self {
        Self {
            query_words: query_words(query_text),
            exclude_tracks: exclude_tracks.to_vec(),
            segment,
        }
    }

    fn matches_query(&self, session: &Session) -> bool {
        if session.is_free_slot() {
            return false;
        }
        if self.query_words.is_empty() {
            return true;
        }
        let name = session.name.to_lowercase();
        self.query_words.iter().any(|w| name.contains(w.as_str()))
    }

    fn matches_tracks(&self, session: &Session) -> bool {
        session
            .tracks
            .iter()
            .any(|t| !self.exclude_tracks.contains(t))
    }

    fn matches_segment(&self, session: &Session, favorites: &dyn FavoriteLookup) -> bool {
        match self.segment {
            Segment::All => true,
            Segment::Favorites => favorites.has_favorite(&session.name),
        }
    }

    /// `true` when the session passes the query, track and segment tests.
    pub fn is_visible(&self, session: &Session, favorites: &dyn FavoriteLookup) -> bool {
        self.matches_query(session)
            && self.matches_tracks(session)
            && self.matches_segment(session, favorites)
    }
}

// ── Views ─────────────────────────────────────────────────────────────────────

/// A session as shown in a timeline, with its visibility for this query.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineSession {
    pub reference: SessionRef,
    pub name: String,
    pub kind: String,
    pub tracks: Vec<String>,
    /// Display names of the linked speakers.
    pub speakers: Vec<String>,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
    pub location: Option<String>,
    pub hide: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineGroup {
    pub time: String,
    /// Hidden when none of its sessions is visible.
    pub hide: bool,
    pub sessions: Vec<TimelineSession>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineDay {
    pub index: usize,
    pub date: String,
    pub shown_sessions: usize,
    pub groups: Vec<TimelineGroup>,
}

impl TimelineDay {
    /// Whether anything on this day survived the filter.
    pub fn show(&self) -> bool {
        self.shown_sessions > 0
    }
}

/// Filtered view of every conference day.
pub fn build_timeline(
    schedule: &Schedule,
    filter: &TimelineFilter,
    favorites: &dyn FavoriteLookup,
) -> Vec<TimelineDay> {
    schedule
        .days
        .iter()
        .enumerate()
        .map(|(index, day)| build_day(schedule, index, day, filter, favorites))
        .collect()
}

/// Filtered view of a single day, or `None` if the index is out of range.
pub fn build_day_timeline(
    schedule: &Schedule,
    index: usize,
    filter: &TimelineFilter,
    favorites: &dyn FavoriteLookup,
) -> Option<TimelineDay> {
    schedule
        .days
        .get(index)
        .map(|day| build_day(schedule, index, day, filter, favorites))
}

fn build_day(
    schedule: &Schedule,
    index: usize,
    day: &Day,
    filter: &TimelineFilter,
    favorites: &dyn FavoriteLookup,
) -> TimelineDay {
    let mut shown_sessions = 0;

    let groups = day
        .groups
        .iter()
        .enumerate()
        .map(|(group_idx, group)| {
            let sessions: Vec<TimelineSession> = group
                .sessions
                .iter()
                .enumerate()
                .map(|(session_idx, session)| {
                    let hide = !filter.is_visible(session, favorites);
                    if !hide {
                        shown_sessions += 1;
                    }
                    TimelineSession {
                        reference: SessionRef {
                            day: index,
                            group: group_idx,
                            session: session_idx,
                        },
                        name: session.name.clone(),
                        kind: session.kind.clone(),
                        tracks: session.tracks.clone(),
                        speakers: session
                            .speakers
                            .iter()
                            .filter_map(|id| schedule.speaker(*id))
                            .map(|s| s.name.clone())
                            .collect(),
                        time_start: session.time_start.clone(),
                        time_end: session.time_end.clone(),
                        location: session.location.clone(),
                        hide,
                    }
                })
                .collect();

            TimelineGroup {
                time: group.time.clone(),
                hide: sessions.iter().all(|s| s.hide),
                sessions,
            }
        })
        .collect();

    TimelineDay {
        index,
        date: day.date.clone(),
        shown_sessions,
        groups,
    }
}
