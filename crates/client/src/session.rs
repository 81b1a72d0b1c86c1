use vantage_render::SceneSink;
use vantage_state::EntityTable;
use vantage_wire::{DecodeConfig, DecodeError, DecodedBody, Envelope, decode};

/// Per-connection session settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub decode: DecodeConfig,
    /// Drop messages whose timestamp is older than the newest seen.
    /// Off by default: arrival order wins unless the operator opts in.
    pub drop_stale: bool,
}

/// What became of one handled message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// An update batch was applied.
    Applied { touched: usize, created: usize },
    /// An informational record was forwarded to the sink.
    Info,
    /// Older than the newest seen timestamp while `drop_stale` is on.
    DroppedStale,
}

/// Lifetime counters for one session, for instrumentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub received: u64,
    pub applied: u64,
    pub info: u64,
    pub dropped_stale: u64,
    pub failed: u64,
}

/// One connection's worth of decode-and-apply state.
///
/// Owns the entity table. `handle` takes `&mut self`, so overlapping
/// in-flight decodes cannot be expressed; the transport hands over one
/// complete buffer at a time and the next message waits for this one.
#[derive(Debug, Default)]
pub struct Session {
    config: SessionConfig,
    table: EntityTable,
    stats: SessionStats,
    last_envelope: Option<Envelope>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Read-only view of the tracked entities.
    pub fn table(&self) -> &EntityTable {
        &self.table
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Header of the newest message that was accepted.
    pub fn last_envelope(&self) -> Option<Envelope> {
        self.last_envelope
    }

    /// Clear all connection state for a reconnect.
    ///
    /// Callers invoke this between messages only; `&mut self` makes calling
    /// it mid-decode unrepresentable.
    pub fn reset(&mut self) {
        tracing::info!(entities = self.table.len(), "resetting session");
        self.table.reset();
        self.stats = SessionStats::default();
        self.last_envelope = None;
    }

    /// Decode one message buffer and apply its effects.
    ///
    /// On error the table is untouched; the caller logs-and-continues with
    /// the next message. Nothing here is fatal to the connection.
    pub fn handle(
        &mut self,
        buf: &[u8],
        sink: &mut dyn SceneSink,
    ) -> Result<MessageOutcome, DecodeError> {
        self.stats.received += 1;

        let (envelope, body) = match decode(buf, self.config.decode) {
            Ok(decoded) => decoded,
            Err(err) => {
                self.stats.failed += 1;
                tracing::warn!(%err, len = buf.len(), "dropping undecodable message");
                return Err(err);
            }
        };

        if self.config.drop_stale
            && let Some(last) = self.last_envelope
            && envelope.timestamp < last.timestamp
        {
            self.stats.dropped_stale += 1;
            tracing::debug!(
                timestamp = envelope.timestamp,
                newest = last.timestamp,
                "dropping stale message"
            );
            return Ok(MessageOutcome::DroppedStale);
        }
        self.last_envelope = Some(envelope);

        match body {
            DecodedBody::EntityUpdates(batch) => {
                let touched = self.table.apply(&batch);
                let mut created = 0;
                for entry in &touched {
                    if entry.created {
                        created += 1;
                    }
                    if let Some(entity) = self.table.get(entry.id) {
                        sink.entity_changed(entity, entry.created);
                    }
                }
                self.stats.applied += 1;
                tracing::debug!(
                    tick = envelope.server_tick,
                    touched = touched.len(),
                    created,
                    "applied update batch"
                );
                Ok(MessageOutcome::Applied {
                    touched: touched.len(),
                    created,
                })
            }
            DecodedBody::EntityInfo(info) => {
                self.stats.info += 1;
                let line = if info.text.is_empty() {
                    format!("{} {}", info.code, info.id)
                } else {
                    format!("{} {} {}", info.code, info.id, info.text)
                };
                sink.status_text(&line);
                Ok(MessageOutcome::Info)
            }
        }
    }
}
