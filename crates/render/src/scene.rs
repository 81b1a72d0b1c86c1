use std::collections::BTreeMap;
use vantage_common::EntityId;
use vantage_state::TrackedEntity;

/// Sink for decoded state changes — the boundary to the rendering layer.
///
/// Sinks observe snapshots; they never reach back into the table. `created`
/// is the first-reference signal: a real renderer instances a visual for the
/// entity there, this crate's text backend just records it.
pub trait SceneSink {
    /// An entity was created or some of its fields changed.
    fn entity_changed(&mut self, entity: &TrackedEntity, created: bool);

    /// A line from the side informational channel, ready for display.
    fn status_text(&mut self, text: &str);
}

/// Text backend for the scene sink.
///
/// Keeps one human-readable line per entity plus the last status line.
/// Stands in for the GPU renderer in the CLI and in tests.
#[derive(Debug, Default)]
pub struct TextScene {
    lines: BTreeMap<EntityId, String>,
    status: String,
    created: usize,
}

impl TextScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities this scene has instanced so far.
    pub fn created_count(&self) -> usize {
        self.created
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn line(&self, id: EntityId) -> Option<&str> {
        self.lines.get(&id).map(String::as_str)
    }

    /// Render the whole scene as text, one entity per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.status.is_empty() {
            out.push_str(&format!("status: {}\n", self.status));
        }
        for line in self.lines.values() {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

impl SceneSink for TextScene {
    fn entity_changed(&mut self, entity: &TrackedEntity, created: bool) {
        if created {
            self.created += 1;
            tracing::debug!(id = %entity.id, "instancing entity");
        }
        let p = entity.position;
        let s = entity.scale;
        self.lines.insert(
            entity.id,
            format!(
                "[{:>6}] model={} pos=({:.2}, {:.2}, {:.2}) scale=({:.1}, {:.1}, {:.1}) health={:.2} ({:?})",
                entity.id, entity.model.0, p.x, p.y, p.z, s.x, s.y, s.z, entity.health, entity.tier,
            ),
        );
    }

    fn status_text(&mut self, text: &str) {
        self.status = text.to_owned();
    }
}
