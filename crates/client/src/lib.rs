//! The decode → apply → display pipeline for one server connection.
//!
//! # Invariants
//! - Messages are handled strictly one at a time; no overlapping decodes.
//! - A decode failure never mutates the entity table.
//! - Every recovered error is logged; nothing is silently swallowed.

pub mod session;

pub use session::{MessageOutcome, Session, SessionConfig, SessionStats};
