//! Runtime layer for the conference schedule provider.
//!
//! [`provider::ConferenceData`] loads the schedule once per process and
//! answers every timeline, speaker, track, map and day query from memory.

pub mod provider;
