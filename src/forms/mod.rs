//! Input forms and their validated payloads.
//!
//! The presentation shell deserializes raw request data into these forms;
//! `TryFrom` conversions produce the typed payloads consumed by the service
//! layer, rejecting anything malformed instead of clamping it.

pub mod catalog;
pub mod orders;
