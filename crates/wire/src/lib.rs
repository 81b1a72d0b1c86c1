//! Wire protocol for server-pushed scene updates.
//!
//! The transport delivers one complete message per buffer; framing and
//! reconnection live outside this crate. A message is an [`Envelope`] header
//! followed by a body selected by the envelope's message type: an
//! opcode-tagged stream of per-entity field updates, or a one-entity
//! informational record.
//!
//! # Invariants
//! - A read past the end of the buffer is a `Truncated` error, never
//!   undefined data.
//! - The opcode table is closed; dispatch on it is exhaustive.
//! - Decoding is pure: no state is applied here, only produced.

pub mod cursor;
pub mod encode;
pub mod error;
pub mod instruction;
pub mod message;

pub use cursor::{ByteCursor, ByteOrder};
pub use error::DecodeError;
pub use instruction::{Opcode, UnknownOpcodePolicy};
pub use message::{DecodeConfig, DecodedBody, EntityInfo, Envelope, decode};
pub use vantage_common::UpdateBatch;
