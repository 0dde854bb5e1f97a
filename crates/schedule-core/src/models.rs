use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Fields present in the document that the provider does not interpret.
pub type ExtraFields = BTreeMap<String, Value>;

// ── Raw document ──────────────────────────────────────────────────────────────

/// The schedule document exactly as served, before speaker linking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSchedule {
    /// Conference days in agenda order.
    #[serde(default)]
    pub schedule: Vec<RawDay>,
    /// Every speaker known to the conference.
    #[serde(default)]
    pub speakers: Vec<RawSpeaker>,
    /// Venue locations.
    #[serde(default)]
    pub map: Vec<MapLocation>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// One day of the raw agenda.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDay {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub groups: Vec<RawGroup>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A timeline group: sessions that share a start time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawGroup {
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub sessions: Vec<RawSession>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A session as served. `tracks` and `speaker_names` may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSession {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub tracks: Option<Vec<String>>,
    #[serde(default)]
    pub speaker_names: Option<Vec<String>>,
    #[serde(default)]
    pub time_start: Option<String>,
    #[serde(default)]
    pub time_end: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A speaker as served.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSpeaker {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile_pic: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A point of interest on the venue map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapLocation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
    #[serde(default)]
    pub center: bool,
}

// ── Normalized graph ──────────────────────────────────────────────────────────

/// Index of a speaker inside [`Schedule::speakers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeakerId(pub usize);

/// Position of a session inside [`Schedule::days`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionRef {
    pub day: usize,
    pub group: usize,
    pub session: usize,
}

/// The denormalized schedule, built once per load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Conference days, in document order.
    pub days: Vec<Day>,
    /// Speakers in document order, each carrying its session back-references.
    pub speakers: Vec<Speaker>,
    /// Unique track names in first-seen order.
    pub tracks: Vec<String>,
    pub map: Vec<MapLocation>,
}

impl Schedule {
    /// Look up a session by its position.
    pub fn session(&self, at: SessionRef) -> Option<&Session> {
        self.days
            .get(at.day)?
            .groups
            .get(at.group)?
            .sessions
            .get(at.session)
    }

    /// Look up a speaker by id.
    pub fn speaker(&self, id: SpeakerId) -> Option<&Speaker> {
        self.speakers.get(id.0)
    }

    /// Total number of sessions across all days.
    pub fn session_count(&self) -> usize {
        self.days
            .iter()
            .flat_map(|d| d.groups.iter())
            .map(|g| g.sessions.len())
            .sum()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Day {
    pub date: String,
    pub groups: Vec<Group>,
}

impl Day {
    /// The day's date when it is written as `YYYY-MM-DD`.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Group {
    pub time: String,
    pub sessions: Vec<Session>,
}

/// A session after name cleanup, track defaulting and speaker linking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub id: Option<Value>,
    pub name: String,
    pub kind: String,
    pub tracks: Vec<String>,
    pub speakers: Vec<SpeakerId>,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: ExtraFields,
}

impl Session {
    /// Placeholder slot with nothing scheduled in it.
    pub fn is_free_slot(&self) -> bool {
        self.name.eq_ignore_ascii_case("slot") && self.kind.eq_ignore_ascii_case("libre")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Speaker {
    pub id: Option<Value>,
    pub name: String,
    pub profile_pic: Option<String>,
    pub twitter: Option<String>,
    pub about: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Sessions this speaker appears in.
    pub sessions: Vec<SessionRef>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: ExtraFields,
}

impl Speaker {
    /// Last whitespace-separated word of the name, used as the sort key.
    pub fn last_name(&self) -> &str {
        self.name.split_whitespace().next_back().unwrap_or("")
    }
}

impl From<RawSpeaker> for Speaker {
    fn from(raw: RawSpeaker) -> Self {
        Speaker {
            id: raw.id,
            name: raw.name,
            profile_pic: raw.profile_pic,
            twitter: raw.twitter,
            about: raw.about,
            location: raw.location,
            email: raw.email,
            phone: raw.phone,
            sessions: Vec::new(),
            extra: raw.extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_session_camel_case_fields() {
        let raw: RawSession = serde_json::from_value(serde_json::json!({
            "name": "Async Python",
            "kind": "charla",
            "speakerNames": ["Ana Pérez"],
            "timeStart": "10:00",
            "timeEnd": "10:45",
            "room": "A1"
        }))
        .unwrap();

        assert_eq!(raw.name, "Async Python");
        assert_eq!(raw.speaker_names, Some(vec!["Ana Pérez".to_string()]));
        assert_eq!(raw.time_start.as_deref(), Some("10:00"));
        assert!(raw.tracks.is_none());
        assert_eq!(raw.extra.get("room"), Some(&serde_json::json!("A1")));
    }

    #[test]
    fn test_raw_schedule_defaults_when_sections_missing() {
        let raw: RawSchedule = serde_json::from_str("{}").unwrap();
        assert!(raw.schedule.is_empty());
        assert!(raw.speakers.is_empty());
        assert!(raw.map.is_empty());
    }

    #[test]
    fn test_map_location_lenient() {
        let loc: MapLocation =
            serde_json::from_value(serde_json::json!({"name": "Main hall", "lat": -34.6})).unwrap();
        assert_eq!(loc.name, "Main hall");
        assert!((loc.lat + 34.6).abs() < f64::EPSILON);
        assert_eq!(loc.lng, 0.0);
        assert!(!loc.center);
    }

    #[test]
    fn test_speaker_last_name() {
        let speaker = Speaker {
            name: "Guido van Rossum".to_string(),
            ..Default::default()
        };
        assert_eq!(speaker.last_name(), "Rossum");

        let blank = Speaker::default();
        assert_eq!(blank.last_name(), "");
    }

    #[test]
    fn test_day_parsed_date() {
        let day = Day {
            date: "2024-11-22".to_string(),
            groups: vec![],
        };
        assert_eq!(day.parsed_date(), NaiveDate::from_ymd_opt(2024, 11, 22));

        let free_form = Day {
            date: "Viernes".to_string(),
            groups: vec![],
        };
        assert!(free_form.parsed_date().is_none());
    }

    #[test]
    fn test_session_is_free_slot() {
        let free = Session {
            name: "Slot".to_string(),
            kind: "LIBRE".to_string(),
            ..Default::default()
        };
        assert!(free.is_free_slot());

        let lunch = Session {
            name: "slot".to_string(),
            kind: "almuerzo".to_string(),
            ..Default::default()
        };
        assert!(!lunch.is_free_slot());
    }

    #[test]
    fn test_schedule_session_lookup() {
        let schedule = Schedule {
            days: vec![Day {
                date: "2024-11-22".to_string(),
                groups: vec![Group {
                    time: "09:00".to_string(),
                    sessions: vec![Session {
                        name: "Opening".to_string(),
                        ..Default::default()
                    }],
                }],
            }],
            ..Default::default()
        };

        let at = SessionRef { day: 0, group: 0, session: 0 };
        assert_eq!(schedule.session(at).map(|s| s.name.as_str()), Some("Opening"));
        assert!(schedule.session(SessionRef { day: 1, ..at }).is_none());
        assert_eq!(schedule.session_count(), 1);
    }
}
