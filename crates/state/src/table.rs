use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vantage_common::{EntityId, HealthTier, ModelIndex, PartialUpdate, UpdateBatch};

/// Last-known state for one entity the server has referenced.
///
/// Created the first time an id appears in any update and never removed.
/// The derived tier is kept in sync with health on every merge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedEntity {
    pub id: EntityId,
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: Vec3,
    pub model: ModelIndex,
    pub health: f32,
    pub tier: HealthTier,
}

impl TrackedEntity {
    /// A freshly referenced entity the server has told us nothing about yet:
    /// origin, identity orientation, unit scale, default archetype, no health.
    fn new(id: EntityId) -> Self {
        Self {
            id,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            scale: Vec3::ONE,
            model: ModelIndex::default(),
            health: 0.0,
            tier: HealthTier::classify(0.0),
        }
    }

    /// Merge the fields present in `update`; absent fields keep their value.
    fn merge(&mut self, update: &PartialUpdate) {
        if let Some(position) = update.position {
            self.position = position;
        }
        if let Some(orientation) = update.orientation {
            self.orientation = orientation;
        }
        if let Some(model) = update.model {
            self.model = model;
        }
        if let Some(scale) = update.scale {
            self.scale = scale;
        }
        if let Some(health) = update.health {
            self.health = health;
            self.tier = HealthTier::classify(health);
        }
    }
}

/// An entity touched by one applied batch, with the first-reference signal
/// the rendering collaborator needs to do first-time setup (instancing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Touched {
    pub id: EntityId,
    pub created: bool,
}

/// The persistent store of every entity the connection has mentioned.
///
/// Owned by exactly one session; collaborators only ever see snapshots.
/// BTreeMap keyed by `EntityId` for deterministic iteration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityTable {
    entities: BTreeMap<EntityId, TrackedEntity>,
}

impl EntityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&TrackedEntity> {
        self.entities.get(&id)
    }

    /// Read-only view of all tracked entities.
    pub fn entities(&self) -> &BTreeMap<EntityId, TrackedEntity> {
        &self.entities
    }

    /// Forget everything. For reconnection; only meaningful between messages.
    pub fn reset(&mut self) {
        tracing::debug!(entities = self.entities.len(), "resetting entity table");
        self.entities.clear();
    }

    /// Apply one decoded batch.
    ///
    /// Unknown ids are created with default fields and reported as such.
    /// Infallible: a batch that reached this point decoded completely, so
    /// there is no partial-failure path that could commit partial mutations.
    pub fn apply(&mut self, batch: &UpdateBatch) -> Vec<Touched> {
        let mut touched = Vec::with_capacity(batch.len());
        for (&id, update) in batch {
            let created = !self.entities.contains_key(&id);
            let entity = self
                .entities
                .entry(id)
                .or_insert_with(|| TrackedEntity::new(id));
            entity.merge(update);
            tracing::trace!(%id, created, "applied entity update");
            touched.push(Touched { id, created });
        }
        touched
    }
}
