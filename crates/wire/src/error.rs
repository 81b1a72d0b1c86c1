use crate::instruction::Opcode;

/// Errors from decoding one message buffer.
///
/// Every variant is scoped to the message that produced it; none is fatal to
/// the connection or the process. A failed decode leaves the entity table
/// untouched because application only ever starts after a complete decode.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("message truncated: needed {needed} bytes at offset {offset}, {remaining} left")]
    Truncated {
        needed: usize,
        remaining: usize,
        offset: usize,
    },
    #[error("unknown message type {0}")]
    UnknownMessageType(u8),
    #[error("unknown opcode {opcode:#04x} at offset {offset}")]
    UnknownOpcode { opcode: u8, offset: usize },
    #[error("{opcode:?} instruction before any entity was selected")]
    NoCurrentEntity { opcode: Opcode },
    #[error("entity id {0} is not a non-negative integer")]
    InvalidEntityId(f32),
}
