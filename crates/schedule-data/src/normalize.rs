//! Builds the linked [`Schedule`] graph from a [`RawSchedule`].
//!
//! Speakers are matched to sessions by exact name, every session gets a
//! back-reference on each of its speakers, and the set of tracks is collected
//! in first-seen order.

use schedule_core::models::{
    Day, Group, RawSchedule, RawSession, Schedule, Session, SessionRef, Speaker, SpeakerId,
};
use schedule_core::text::{clean_plenary_name, PLENARY_KIND};
use tracing::debug;

/// Track assigned to sessions that do not list any.
pub const DEFAULT_TRACK: &str = "Python";

/// Normalize a raw document into the linked schedule graph.
pub fn normalize(raw: RawSchedule) -> Schedule {
    let mut speakers: Vec<Speaker> = raw.speakers.into_iter().map(Speaker::from).collect();
    let mut tracks: Vec<String> = Vec::new();

    let days = raw
        .schedule
        .into_iter()
        .enumerate()
        .map(|(day_idx, raw_day)| Day {
            date: raw_day.date,
            groups: raw_day
                .groups
                .into_iter()
                .enumerate()
                .map(|(group_idx, raw_group)| Group {
                    time: raw_group.time,
                    sessions: raw_group
                        .sessions
                        .into_iter()
                        .enumerate()
                        .map(|(session_idx, raw_session)| {
                            let at = SessionRef {
                                day: day_idx,
                                group: group_idx,
                                session: session_idx,
                            };
                            normalize_session(raw_session, at, &mut speakers, &mut tracks)
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    let schedule = Schedule {
        days,
        speakers,
        tracks,
        map: raw.map,
    };

    debug!(
        days = schedule.days.len(),
        sessions = schedule.session_count(),
        speakers = schedule.speakers.len(),
        tracks = schedule.tracks.len(),
        "schedule normalized"
    );

    schedule
}

/// Session name after plenary cleanup and slot relabelling.
pub fn display_name(name: &str, kind: &str) -> String {
    let name = if kind == PLENARY_KIND {
        clean_plenary_name(name)
    } else {
        name.to_string()
    };

    // Break and lunch slots are labelled by their kind; free slots stay
    // "slot" so the filter can drop them.
    if name.eq_ignore_ascii_case("slot") && !kind.eq_ignore_ascii_case("libre") {
        kind.to_string()
    } else {
        name
    }
}

fn normalize_session(
    raw: RawSession,
    at: SessionRef,
    speakers: &mut [Speaker],
    tracks: &mut Vec<String>,
) -> Session {
    let name = display_name(&raw.name, &raw.kind);

    let mut linked = Vec::new();
    for speaker_name in raw.speaker_names.iter().flatten() {
        match speakers.iter().position(|s| &s.name == speaker_name) {
            Some(idx) if !speakers[idx].name.is_empty() => {
                speakers[idx].sessions.push(at);
                linked.push(SpeakerId(idx));
            }
            _ => debug!(speaker = %speaker_name, session = %name, "speaker not found"),
        }
    }

    let session_tracks = raw
        .tracks
        .unwrap_or_else(|| vec![DEFAULT_TRACK.to_string()]);
    for track in &session_tracks {
        if !tracks.contains(track) {
            tracks.push(track.clone());
        }
    }

    Session {
        id: raw.id,
        name,
        kind: raw.kind,
        tracks: session_tracks,
        speakers: linked,
        time_start: raw.time_start,
        time_end: raw.time_end,
        location: raw.location,
        description: raw.description,
        extra: raw.extra,
    }
}
