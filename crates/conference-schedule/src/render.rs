//! Plain-text and JSON output for the CLI views.

use std::io::{self, Write};

use schedule_core::models::{Day, MapLocation, Speaker};
use schedule_data::filter::TimelineDay;
use serde::Serialize;

/// Pretty-print any view as JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

pub fn write_timeline<W: Write>(
    out: &mut W,
    days: &[TimelineDay],
    show_hidden: bool,
) -> io::Result<()> {
    for day in days {
        if !day.show() && !show_hidden {
            continue;
        }
        writeln!(
            out,
            "== Day {}: {} ({} sessions)",
            day.index + 1,
            day.date,
            day.shown_sessions
        )?;

        for group in &day.groups {
            if group.hide && !show_hidden {
                continue;
            }
            writeln!(out, "  {}", group.time)?;

            for session in &group.sessions {
                if session.hide && !show_hidden {
                    continue;
                }
                let marker = if session.hide { "  (hidden)" } else { "" };
                write!(out, "    {}", session.name)?;
                if !session.kind.is_empty() {
                    write!(out, " [{}]", session.kind)?;
                }
                if !session.speakers.is_empty() {
                    write!(out, " by {}", session.speakers.join(", "))?;
                }
                if let Some(location) = session.location.as_deref().filter(|l| !l.is_empty()) {
                    write!(out, " @ {location}")?;
                }
                writeln!(out, "{marker}")?;
                if !session.tracks.is_empty() {
                    writeln!(out, "      tracks: {}", session.tracks.join(", "))?;
                }
            }
        }
    }

    if days.iter().all(|d| !d.show()) {
        writeln!(out, "No sessions match.")?;
    }
    Ok(())
}

pub fn write_speakers<W: Write>(out: &mut W, speakers: &[Speaker]) -> io::Result<()> {
    for speaker in speakers {
        let count = speaker.sessions.len();
        let noun = if count == 1 { "session" } else { "sessions" };
        writeln!(out, "{} ({count} {noun})", speaker.name)?;
    }
    Ok(())
}

pub fn write_tracks<W: Write>(out: &mut W, tracks: &[String]) -> io::Result<()> {
    for track in tracks {
        writeln!(out, "{track}")?;
    }
    Ok(())
}

pub fn write_map<W: Write>(out: &mut W, locations: &[MapLocation]) -> io::Result<()> {
    for loc in locations {
        let center = if loc.center { "  (center)" } else { "" };
        writeln!(out, "{}  {:.5}, {:.5}{center}", loc.name, loc.lat, loc.lng)?;
    }
    Ok(())
}

pub fn write_days<W: Write>(out: &mut W, days: &[Day]) -> io::Result<()> {
    for (index, day) in days.iter().enumerate() {
        let sessions: usize = day.groups.iter().map(|g| g.sessions.len()).sum();
        match day.parsed_date() {
            Some(date) => writeln!(
                out,
                "{index}  {}  ({sessions} sessions)",
                date.format("%A %d %B %Y")
            )?,
            None => writeln!(out, "{index}  {}  ({sessions} sessions)", day.date)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use schedule_core::models::{Group, SessionRef};
    use schedule_data::filter::{TimelineGroup, TimelineSession};

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).expect("write to vec");
        String::from_utf8(buf).expect("utf8")
    }

    fn timeline_session(name: &str, hide: bool) -> TimelineSession {
        TimelineSession {
            reference: SessionRef { day: 0, group: 0, session: 0 },
            name: name.to_string(),
            kind: "charla".to_string(),
            tracks: vec!["Python".to_string()],
            speakers: vec!["Ana Pérez".to_string()],
            time_start: None,
            time_end: None,
            location: Some("Aula 1".to_string()),
            hide,
        }
    }

    fn day() -> TimelineDay {
        TimelineDay {
            index: 0,
            date: "2024-11-22".to_string(),
            shown_sessions: 1,
            groups: vec![TimelineGroup {
                time: "09:00".to_string(),
                hide: false,
                sessions: vec![
                    timeline_session("Async Python", false),
                    timeline_session("Django REST", true),
                ],
            }],
        }
    }

    #[test]
    fn test_write_timeline_skips_hidden() {
        let text = render(|out| write_timeline(out, &[day()], false));
        assert!(text.contains("== Day 1: 2024-11-22 (1 sessions)"));
        assert!(text.contains("Async Python [charla] by Ana Pérez @ Aula 1"));
        assert!(!text.contains("Django REST"));
    }

    #[test]
    fn test_write_timeline_show_hidden_marks_sessions() {
        let text = render(|out| write_timeline(out, &[day()], true));
        assert!(text.contains("Django REST [charla] by Ana Pérez @ Aula 1  (hidden)"));
    }

    #[test]
    fn test_write_timeline_nothing_matches() {
        let mut empty = day();
        empty.shown_sessions = 0;
        empty.groups[0].hide = true;
        let text = render(|out| write_timeline(out, &[empty], false));
        assert_eq!(text, "No sessions match.\n");
    }

    #[test]
    fn test_write_speakers_pluralizes() {
        let one = Speaker {
            name: "Ana Pérez".to_string(),
            sessions: vec![SessionRef { day: 0, group: 0, session: 0 }],
            ..Default::default()
        };
        let none = Speaker {
            name: "Bea Alonso".to_string(),
            ..Default::default()
        };
        let text = render(|out| write_speakers(out, &[one, none]));
        assert_eq!(text, "Ana Pérez (1 session)\nBea Alonso (0 sessions)\n");
    }

    #[test]
    fn test_write_days_formats_iso_dates() {
        let days = vec![
            Day {
                date: "2024-11-22".to_string(),
                groups: vec![Group::default()],
            },
            Day {
                date: "Sprints".to_string(),
                groups: vec![],
            },
        ];
        let text = render(|out| write_days(out, &days));
        assert!(text.starts_with("0  Friday 22 November 2024  (0 sessions)\n"));
        assert!(text.ends_with("1  Sprints  (0 sessions)\n"));
    }

    #[test]
    fn test_write_map() {
        let loc = MapLocation {
            name: "Main hall".to_string(),
            lat: -34.6,
            lng: -58.4,
            center: true,
        };
        let text = render(|out| write_map(out, &[loc]));
        assert_eq!(text, "Main hall  -34.60000, -58.40000  (center)\n");
    }

    #[test]
    fn test_write_json_tracks() {
        let text = render(|out| write_json(out, &vec!["Data".to_string()]));
        assert_eq!(text, "[\n  \"Data\"\n]\n");
    }
}
