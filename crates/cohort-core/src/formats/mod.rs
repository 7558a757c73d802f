//! # Formats Module
//!
//! Serialization formats for roster snapshots.

pub mod roster_file;

pub use roster_file::{MAX_ROSTER_FILE_SIZE, RosterFile, roster_from_json, roster_to_json};
