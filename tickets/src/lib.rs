//! Shared data layer between the relay and the client-side crates.
//!
//! Holds the wire payloads exchanged with the relay and the typed ClickUp
//! task shapes, so both sides decode the exact same structures.

pub mod clickup;
pub mod models;

pub use models::MARKER_TAG;
