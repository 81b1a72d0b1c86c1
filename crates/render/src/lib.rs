//! Display-side collaborator interface.
//!
//! The session pushes touched-entity snapshots and status text through
//! [`SceneSink`]; everything visual (meshes, materials, the mapping of health
//! tiers to colors) lives behind that trait, outside this repository.

pub mod scene;

pub use scene::{SceneSink, TextScene};
