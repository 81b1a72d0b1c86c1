//! Shared value types exchanged between the wire decoder and the entity table.
//!
//! # Invariants
//! - `EntityId` is a plain integer key; wire-format floats are normalized
//!   before one is ever constructed.
//! - `PartialUpdate` fields are optional; absent fields mean "no change".

pub mod types;

pub use types::{EntityId, HealthTier, ModelIndex, PartialUpdate, UpdateBatch};
