//! Data layer for the conference schedule provider.
//!
//! Fetches the raw schedule document from a file or URL, normalizes it into
//! the linked [`schedule_core::models::Schedule`] graph and derives filtered
//! timeline views from it.

pub mod filter;
pub mod normalize;
pub mod source;
