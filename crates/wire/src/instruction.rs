//! The opcode-tagged instruction stream carried by entity-update messages.
//!
//! Field instructions apply to the most recently selected entity. The scope
//! of a selection is one message; nothing carries over between buffers.

use crate::cursor::ByteCursor;
use crate::error::DecodeError;
use glam::{Quat, Vec3};
use vantage_common::{EntityId, ModelIndex, PartialUpdate, UpdateBatch};

/// Instruction opcodes. The wire byte is validated into this closed set
/// before any payload is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Switch the entity the following field instructions apply to.
    SelectEntity,
    SetPosition,
    SetRotation,
    SetModel,
    SetScale,
    SetHealth,
}

impl Opcode {
    /// Decode a wire byte. `None` for bytes outside the table.
    pub fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::SelectEntity),
            2 => Some(Self::SetPosition),
            3 => Some(Self::SetRotation),
            4 => Some(Self::SetModel),
            5 => Some(Self::SetScale),
            6 => Some(Self::SetHealth),
            _ => None,
        }
    }

    /// The byte this opcode puts on the wire.
    pub fn to_wire(self) -> u8 {
        match self {
            Self::SelectEntity => 1,
            Self::SetPosition => 2,
            Self::SetRotation => 3,
            Self::SetModel => 4,
            Self::SetScale => 5,
            Self::SetHealth => 6,
        }
    }

    /// Number of float32 scalars following the opcode byte.
    pub fn arity(self) -> usize {
        match self {
            Self::SelectEntity | Self::SetModel | Self::SetHealth => 1,
            Self::SetPosition | Self::SetScale => 3,
            Self::SetRotation => 4,
        }
    }
}

/// Disposition for instruction bytes outside the opcode table.
///
/// Payload scalars are untagged, so once an unknown byte appears the stream
/// offset can no longer be trusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownOpcodePolicy {
    /// Fail the whole batch.
    #[default]
    Fail,
    /// Keep the updates decoded so far and discard the rest of the buffer.
    SkipRest,
}

/// Decode instructions until end of buffer.
///
/// A field instruction before any `SelectEntity` in the same message is a
/// malformed stream and fails the batch; it is never written to a stale
/// target. Re-selecting an id already seen in this batch continues
/// accumulating into its existing record.
pub fn decode_update_stream(
    cursor: &mut ByteCursor<'_>,
    policy: UnknownOpcodePolicy,
) -> Result<UpdateBatch, DecodeError> {
    let mut batch = UpdateBatch::new();
    let mut current: Option<EntityId> = None;

    while !cursor.is_eof() {
        let at = cursor.offset();
        let byte = cursor.read_u8()?;
        let Some(opcode) = Opcode::from_wire(byte) else {
            match policy {
                UnknownOpcodePolicy::Fail => {
                    return Err(DecodeError::UnknownOpcode {
                        opcode: byte,
                        offset: at,
                    });
                }
                UnknownOpcodePolicy::SkipRest => {
                    tracing::warn!(
                        opcode = byte,
                        offset = at,
                        "unknown opcode, discarding rest of update stream"
                    );
                    cursor.skip_to_end();
                    break;
                }
            }
        };

        match opcode {
            Opcode::SelectEntity => {
                let id = read_entity_id(cursor)?;
                batch.entry(id).or_default();
                current = Some(id);
            }
            Opcode::SetPosition => {
                let target = field_target(&mut batch, current, opcode)?;
                target.position = Some(read_vec3(cursor)?);
            }
            Opcode::SetRotation => {
                let target = field_target(&mut batch, current, opcode)?;
                target.orientation = Some(read_quat(cursor)?);
            }
            Opcode::SetModel => {
                let target = field_target(&mut batch, current, opcode)?;
                // The index travels as a float; truncate toward zero.
                let raw = cursor.read_f32()?;
                target.model = Some(ModelIndex(raw as u32));
            }
            Opcode::SetScale => {
                let target = field_target(&mut batch, current, opcode)?;
                target.scale = Some(read_vec3(cursor)?);
            }
            Opcode::SetHealth => {
                let target = field_target(&mut batch, current, opcode)?;
                target.health = Some(cursor.read_f32()?);
            }
        }
    }

    Ok(batch)
}

fn field_target<'b>(
    batch: &'b mut UpdateBatch,
    current: Option<EntityId>,
    opcode: Opcode,
) -> Result<&'b mut PartialUpdate, DecodeError> {
    let id = current.ok_or(DecodeError::NoCurrentEntity { opcode })?;
    Ok(batch.entry(id).or_default())
}

/// Normalize a wire-format float id to the integer key it represents.
///
/// The server allocates ids as sequential u32; anything non-finite, negative,
/// or fractional here means the stream is corrupt or out of sync.
pub(crate) fn read_entity_id(cursor: &mut ByteCursor<'_>) -> Result<EntityId, DecodeError> {
    let raw = cursor.read_f32()?;
    if !raw.is_finite() || raw < 0.0 || raw.fract() != 0.0 || raw >= u32::MAX as f32 {
        return Err(DecodeError::InvalidEntityId(raw));
    }
    Ok(EntityId(raw as u32))
}

fn read_vec3(cursor: &mut ByteCursor<'_>) -> Result<Vec3, DecodeError> {
    let x = cursor.read_f32()?;
    let y = cursor.read_f32()?;
    let z = cursor.read_f32()?;
    Ok(Vec3::new(x, y, z))
}

/// Wire order is w,x,y,z. Only the scalar component moves when repacking
/// into glam's x,y,z,w layout; axes are never permuted.
fn read_quat(cursor: &mut ByteCursor<'_>) -> Result<Quat, DecodeError> {
    let w = cursor.read_f32()?;
    let x = cursor.read_f32()?;
    let y = cursor.read_f32()?;
    let z = cursor.read_f32()?;
    Ok(Quat::from_xyzw(x, y, z, w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::ByteOrder;
    use crate::encode::Instruction;

    fn decode_body(instructions: &[Instruction]) -> Result<UpdateBatch, DecodeError> {
        decode_body_with(instructions, UnknownOpcodePolicy::Fail)
    }

    fn decode_body_with(
        instructions: &[Instruction],
        policy: UnknownOpcodePolicy,
    ) -> Result<UpdateBatch, DecodeError> {
        let mut buf = Vec::new();
        for instruction in instructions {
            instruction.encode(&mut buf, ByteOrder::Big);
        }
        let mut cursor = ByteCursor::new(&buf, ByteOrder::Big);
        decode_update_stream(&mut cursor, policy)
    }

    #[test]
    fn opcode_table_round_trips() {
        for opcode in [
            Opcode::SelectEntity,
            Opcode::SetPosition,
            Opcode::SetRotation,
            Opcode::SetModel,
            Opcode::SetScale,
            Opcode::SetHealth,
        ] {
            assert_eq!(Opcode::from_wire(opcode.to_wire()), Some(opcode));
        }
        assert_eq!(Opcode::from_wire(0), None);
        assert_eq!(Opcode::from_wire(7), None);
    }

    #[test]
    fn select_then_fields_accumulate() {
        let batch = decode_body(&[
            Instruction::SelectEntity(EntityId(7)),
            Instruction::SetPosition(Vec3::new(1.0, 2.0, 3.0)),
            Instruction::SetHealth(0.97),
        ])
        .unwrap();

        assert_eq!(batch.len(), 1);
        let update = &batch[&EntityId(7)];
        assert_eq!(update.position, Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(update.health, Some(0.97));
        assert_eq!(update.orientation, None);
        assert_eq!(update.scale, None);
        assert_eq!(update.model, None);
    }

    #[test]
    fn multiple_entities_in_one_stream() {
        let batch = decode_body(&[
            Instruction::SelectEntity(EntityId(1)),
            Instruction::SetHealth(0.5),
            Instruction::SelectEntity(EntityId(2)),
            Instruction::SetScale(Vec3::splat(2.0)),
        ])
        .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[&EntityId(1)].health, Some(0.5));
        assert_eq!(batch[&EntityId(1)].scale, None);
        assert_eq!(batch[&EntityId(2)].scale, Some(Vec3::splat(2.0)));
    }

    #[test]
    fn reselect_keeps_earlier_fields() {
        let batch = decode_body(&[
            Instruction::SelectEntity(EntityId(3)),
            Instruction::SetPosition(Vec3::X),
            Instruction::SelectEntity(EntityId(4)),
            Instruction::SetHealth(0.2),
            Instruction::SelectEntity(EntityId(3)),
            Instruction::SetHealth(0.8),
        ])
        .unwrap();

        let three = &batch[&EntityId(3)];
        assert_eq!(three.position, Some(Vec3::X));
        assert_eq!(three.health, Some(0.8));
    }

    #[test]
    fn field_before_select_is_rejected() {
        let err = decode_body(&[Instruction::SetPosition(Vec3::ONE)]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::NoCurrentEntity {
                opcode: Opcode::SetPosition,
            }
        );
    }

    #[test]
    fn rotation_components_are_not_permuted() {
        let q = Quat::from_xyzw(0.1, 0.2, 0.3, 0.9);
        let batch = decode_body(&[
            Instruction::SelectEntity(EntityId(1)),
            Instruction::SetRotation(q),
        ])
        .unwrap();
        let decoded = batch[&EntityId(1)].orientation.unwrap();
        assert_eq!(decoded.w, 0.9);
        assert_eq!(decoded.x, 0.1);
        assert_eq!(decoded.y, 0.2);
        assert_eq!(decoded.z, 0.3);
    }

    #[test]
    fn model_index_truncates_toward_zero() {
        let mut buf = Vec::new();
        Instruction::SelectEntity(EntityId(1)).encode(&mut buf, ByteOrder::Big);
        buf.push(Opcode::SetModel.to_wire());
        buf.extend_from_slice(&2.9f32.to_be_bytes());

        let mut cursor = ByteCursor::new(&buf, ByteOrder::Big);
        let batch = decode_update_stream(&mut cursor, UnknownOpcodePolicy::Fail).unwrap();
        assert_eq!(batch[&EntityId(1)].model, Some(ModelIndex(2)));
    }

    #[test]
    fn unknown_opcode_fails_with_offset() {
        let mut buf = Vec::new();
        Instruction::SelectEntity(EntityId(1)).encode(&mut buf, ByteOrder::Big);
        buf.push(0xAB);

        let mut cursor = ByteCursor::new(&buf, ByteOrder::Big);
        let err = decode_update_stream(&mut cursor, UnknownOpcodePolicy::Fail).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnknownOpcode {
                opcode: 0xAB,
                offset: 5,
            }
        );
    }

    #[test]
    fn unknown_opcode_skip_rest_keeps_prefix() {
        let mut buf = Vec::new();
        Instruction::SelectEntity(EntityId(1)).encode(&mut buf, ByteOrder::Big);
        Instruction::SetHealth(0.5).encode(&mut buf, ByteOrder::Big);
        buf.push(0xAB);
        // Garbage that would otherwise decode as instructions.
        buf.extend_from_slice(&[9, 9, 9, 9]);

        let mut cursor = ByteCursor::new(&buf, ByteOrder::Big);
        let batch = decode_update_stream(&mut cursor, UnknownOpcodePolicy::SkipRest).unwrap();
        assert!(cursor.is_eof());
        assert_eq!(batch[&EntityId(1)].health, Some(0.5));
    }

    #[test]
    fn truncated_payload_fails() {
        let mut buf = Vec::new();
        Instruction::SelectEntity(EntityId(1)).encode(&mut buf, ByteOrder::Big);
        buf.push(Opcode::SetScale.to_wire());
        // Only two of the three scale floats.
        buf.extend_from_slice(&1.0f32.to_be_bytes());
        buf.extend_from_slice(&1.0f32.to_be_bytes());

        let mut cursor = ByteCursor::new(&buf, ByteOrder::Big);
        let err = decode_update_stream(&mut cursor, UnknownOpcodePolicy::Fail).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { needed: 4, .. }));
    }

    #[test]
    fn entity_id_must_be_integral() {
        for raw in [-1.0f32, 1.5, f32::NAN, f32::INFINITY] {
            let mut buf = vec![Opcode::SelectEntity.to_wire()];
            buf.extend_from_slice(&raw.to_be_bytes());
            let mut cursor = ByteCursor::new(&buf, ByteOrder::Big);
            let err = decode_update_stream(&mut cursor, UnknownOpcodePolicy::Fail).unwrap_err();
            assert!(matches!(err, DecodeError::InvalidEntityId(_)), "raw={raw}");
        }
    }

    #[test]
    fn empty_body_is_an_empty_batch() {
        let mut cursor = ByteCursor::new(&[], ByteOrder::Big);
        let batch = decode_update_stream(&mut cursor, UnknownOpcodePolicy::Fail).unwrap();
        assert!(batch.is_empty());
    }
}
