//! Shared types for the conference schedule provider.
//!
//! Holds the raw and normalized schedule models, the error type, CLI
//! settings, the favorites store and the small text helpers used while
//! normalizing session names.

pub mod error;
pub mod favorites;
pub mod models;
pub mod settings;
pub mod text;
