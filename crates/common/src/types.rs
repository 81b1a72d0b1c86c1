use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a tracked entity.
///
/// The server allocates these sequentially as 32-bit integers but widens them
/// to float32 on the wire; the decoder normalizes back to `u32` before an id
/// reaches any table or map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index selecting a visual archetype. Opaque to the state model; only the
/// rendering collaborator gives it meaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelIndex(pub u32);

/// Five ordered severity classes derived from an entity's health scalar.
///
/// Thresholds are fixed by the protocol contract; what each class looks like
/// on screen is the renderer's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthTier {
    /// health > 0.99
    Full,
    /// health > 0.98
    Scuffed,
    /// health > 0.66
    Stable,
    /// health > 0.10
    Wounded,
    /// everything else, including NaN
    Critical,
}

impl HealthTier {
    /// Classify a health scalar into its severity class.
    pub fn classify(health: f32) -> Self {
        if health > 0.99 {
            Self::Full
        } else if health > 0.98 {
            Self::Scuffed
        } else if health > 0.66 {
            Self::Stable
        } else if health > 0.10 {
            Self::Wounded
        } else {
            Self::Critical
        }
    }

    /// Severity index, 0 (best) through 4 (worst).
    pub fn severity(self) -> u8 {
        match self {
            Self::Full => 0,
            Self::Scuffed => 1,
            Self::Stable => 2,
            Self::Wounded => 3,
            Self::Critical => 4,
        }
    }
}

/// Accumulated partial state for one entity within a single decoded message.
///
/// Fields left `None` were absent from the wire and must not overwrite
/// previously known entity state when the update is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialUpdate {
    pub position: Option<Vec3>,
    pub orientation: Option<Quat>,
    pub model: Option<ModelIndex>,
    pub scale: Option<Vec3>,
    pub health: Option<f32>,
}

/// Batch of per-entity partial updates decoded from one message.
///
/// BTreeMap so iteration (and therefore application) order is deterministic.
pub type UpdateBatch = BTreeMap<EntityId, PartialUpdate>;

impl PartialUpdate {
    /// Whether no field was set by the wire stream.
    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.orientation.is_none()
            && self.model.is_none()
            && self.scale.is_none()
            && self.health.is_none()
    }
}
