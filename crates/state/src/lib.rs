//! Client-side entity state: the persistent table of tracked entities.
//!
//! # Invariants
//! - The table is additive-only; the observed protocol has no removal signal.
//! - Partial updates merge field-by-field; absent fields never clear state.
//! - Batch application is deterministic (BTreeMap order) and idempotent.

pub mod table;

pub use table::{EntityTable, Touched, TrackedEntity};
