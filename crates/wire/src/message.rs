//! Message envelope decode and per-type body dispatch.

use crate::cursor::{ByteCursor, ByteOrder};
use crate::error::DecodeError;
use crate::instruction::{self, UnknownOpcodePolicy};
use serde::{Deserialize, Serialize};
use vantage_common::{EntityId, UpdateBatch};

/// Message type tag for a batch of entity field updates.
pub const MSG_ENTITY_UPDATE: u8 = 1;
/// Message type tag for the side informational channel.
pub const MSG_ENTITY_INFO: u8 = 2;

/// Fixed-layout header prefixed to every message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Server wall/sim time. Informational; ordering is a session policy,
    /// not enforced here.
    pub timestamp: f64,
    pub message_type: u8,
    /// Server-authoritative tick counter.
    pub server_tick: f32,
}

/// One record on the informational channel: a code and entity id the server
/// wants surfaced to the operator, plus optional display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityInfo {
    pub code: u8,
    pub id: EntityId,
    /// Display-only; empty when the server sent none.
    pub text: String,
}

/// Decoded message body, tagged by the envelope's message type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DecodedBody {
    EntityUpdates(UpdateBatch),
    EntityInfo(EntityInfo),
}

/// Per-connection decode settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeConfig {
    pub order: ByteOrder,
    pub unknown_opcode: UnknownOpcodePolicy,
}

/// Decode one complete message buffer into its envelope and body.
///
/// Pure with respect to caller state: the only output is the returned value.
pub fn decode(buf: &[u8], config: DecodeConfig) -> Result<(Envelope, DecodedBody), DecodeError> {
    let mut cursor = ByteCursor::new(buf, config.order);
    let envelope = Envelope {
        timestamp: cursor.read_f64()?,
        message_type: cursor.read_u8()?,
        server_tick: cursor.read_f32()?,
    };

    let body = match envelope.message_type {
        MSG_ENTITY_UPDATE => DecodedBody::EntityUpdates(instruction::decode_update_stream(
            &mut cursor,
            config.unknown_opcode,
        )?),
        MSG_ENTITY_INFO => DecodedBody::EntityInfo(decode_entity_info(&mut cursor)?),
        other => return Err(DecodeError::UnknownMessageType(other)),
    };

    Ok((envelope, body))
}

fn decode_entity_info(cursor: &mut ByteCursor<'_>) -> Result<EntityInfo, DecodeError> {
    let code = cursor.read_u8()?;
    let id = instruction::read_entity_id(cursor)?;
    // Whatever follows is display text; tolerate stray bytes rather than
    // failing the message over an encoding hiccup.
    let text = String::from_utf8_lossy(cursor.rest()).into_owned();
    cursor.skip_to_end();
    Ok(EntityInfo { code, id, text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{Instruction, encode_info_message, encode_update_message};
    use glam::Vec3;

    #[test]
    fn update_message_round_trip() {
        let buf = encode_update_message(
            12.5,
            42.0,
            &[
                Instruction::SelectEntity(EntityId(7)),
                Instruction::SetPosition(Vec3::new(1.0, 2.0, 3.0)),
            ],
            ByteOrder::Big,
        );

        let (envelope, body) = decode(&buf, DecodeConfig::default()).unwrap();
        assert_eq!(envelope.timestamp, 12.5);
        assert_eq!(envelope.message_type, MSG_ENTITY_UPDATE);
        assert_eq!(envelope.server_tick, 42.0);

        let DecodedBody::EntityUpdates(batch) = body else {
            panic!("expected update body");
        };
        assert_eq!(
            batch[&EntityId(7)].position,
            Some(Vec3::new(1.0, 2.0, 3.0))
        );
    }

    #[test]
    fn info_message_round_trip() {
        let buf = encode_info_message(1.0, 2.0, 9, EntityId(31), "offline", ByteOrder::Big);
        let (envelope, body) = decode(&buf, DecodeConfig::default()).unwrap();
        assert_eq!(envelope.message_type, MSG_ENTITY_INFO);
        assert_eq!(
            body,
            DecodedBody::EntityInfo(EntityInfo {
                code: 9,
                id: EntityId(31),
                text: "offline".to_owned(),
            })
        );
    }

    #[test]
    fn info_text_may_be_empty() {
        let buf = encode_info_message(1.0, 2.0, 3, EntityId(4), "", ByteOrder::Big);
        let (_, body) = decode(&buf, DecodeConfig::default()).unwrap();
        let DecodedBody::EntityInfo(info) = body else {
            panic!("expected info body");
        };
        assert!(info.text.is_empty());
    }

    #[test]
    fn unknown_message_type_is_rejected() {
        let mut buf = encode_update_message(0.0, 0.0, &[], ByteOrder::Big);
        buf[8] = 9; // message type byte sits after the f64 timestamp
        assert_eq!(
            decode(&buf, DecodeConfig::default()),
            Err(DecodeError::UnknownMessageType(9))
        );
    }

    #[test]
    fn truncated_envelope_is_rejected() {
        let buf = [0u8; 9]; // f64 + u8, missing the tick f32
        assert!(matches!(
            decode(&buf, DecodeConfig::default()),
            Err(DecodeError::Truncated { needed: 4, .. })
        ));
    }

    #[test]
    fn little_endian_connection() {
        let config = DecodeConfig {
            order: ByteOrder::Little,
            ..Default::default()
        };
        let buf = encode_update_message(
            7.0,
            3.0,
            &[
                Instruction::SelectEntity(EntityId(1)),
                Instruction::SetHealth(0.25),
            ],
            ByteOrder::Little,
        );
        let (envelope, body) = decode(&buf, config).unwrap();
        assert_eq!(envelope.timestamp, 7.0);
        let DecodedBody::EntityUpdates(batch) = body else {
            panic!("expected update body");
        };
        assert_eq!(batch[&EntityId(1)].health, Some(0.25));
    }
}
