//! Encode support: the byte-exact mirror of the decoder.
//!
//! The production writer is the server; this module exists so tests and the
//! viewer's replay demo can synthesize streams without one.

use crate::cursor::ByteOrder;
use crate::instruction::Opcode;
use crate::message::{Envelope, MSG_ENTITY_INFO, MSG_ENTITY_UPDATE};
use glam::{Quat, Vec3};
use vantage_common::{EntityId, ModelIndex};

/// One encodable instruction, payload included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    SelectEntity(EntityId),
    SetPosition(Vec3),
    SetRotation(Quat),
    SetModel(ModelIndex),
    SetScale(Vec3),
    SetHealth(f32),
}

impl Instruction {
    pub fn opcode(self) -> Opcode {
        match self {
            Self::SelectEntity(_) => Opcode::SelectEntity,
            Self::SetPosition(_) => Opcode::SetPosition,
            Self::SetRotation(_) => Opcode::SetRotation,
            Self::SetModel(_) => Opcode::SetModel,
            Self::SetScale(_) => Opcode::SetScale,
            Self::SetHealth(_) => Opcode::SetHealth,
        }
    }

    /// Append the opcode byte and payload scalars.
    pub fn encode(self, out: &mut Vec<u8>, order: ByteOrder) {
        out.push(self.opcode().to_wire());
        match self {
            Self::SelectEntity(id) => put_f32(out, id.0 as f32, order),
            Self::SetPosition(v) | Self::SetScale(v) => {
                put_f32(out, v.x, order);
                put_f32(out, v.y, order);
                put_f32(out, v.z, order);
            }
            // Scalar first on the wire, mirroring the decoder.
            Self::SetRotation(q) => {
                put_f32(out, q.w, order);
                put_f32(out, q.x, order);
                put_f32(out, q.y, order);
                put_f32(out, q.z, order);
            }
            Self::SetModel(m) => put_f32(out, m.0 as f32, order),
            Self::SetHealth(h) => put_f32(out, h, order),
        }
    }
}

/// Append an envelope header.
pub fn encode_envelope(envelope: &Envelope, out: &mut Vec<u8>, order: ByteOrder) {
    put_f64(out, envelope.timestamp, order);
    out.push(envelope.message_type);
    put_f32(out, envelope.server_tick, order);
}

/// Build a complete entity-update message.
pub fn encode_update_message(
    timestamp: f64,
    server_tick: f32,
    instructions: &[Instruction],
    order: ByteOrder,
) -> Vec<u8> {
    let mut out = Vec::new();
    encode_envelope(
        &Envelope {
            timestamp,
            message_type: MSG_ENTITY_UPDATE,
            server_tick,
        },
        &mut out,
        order,
    );
    for instruction in instructions {
        instruction.encode(&mut out, order);
    }
    out
}

/// Build a complete entity-info message.
pub fn encode_info_message(
    timestamp: f64,
    server_tick: f32,
    code: u8,
    id: EntityId,
    text: &str,
    order: ByteOrder,
) -> Vec<u8> {
    let mut out = Vec::new();
    encode_envelope(
        &Envelope {
            timestamp,
            message_type: MSG_ENTITY_INFO,
            server_tick,
        },
        &mut out,
        order,
    );
    out.push(code);
    put_f32(&mut out, id.0 as f32, order);
    out.extend_from_slice(text.as_bytes());
    out
}

fn put_f32(out: &mut Vec<u8>, v: f32, order: ByteOrder) {
    match order {
        ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
        ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
    }
}

fn put_f64(out: &mut Vec<u8>, v: f64, order: ByteOrder) {
    match order {
        ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
        ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
    }
}
