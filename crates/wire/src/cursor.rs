use crate::error::DecodeError;

/// Byte order for all multi-byte scalar fields on the wire.
///
/// The transport pins this per connection. Network order (big-endian) is the
/// default, matching the browser client this protocol was first deployed
/// against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ByteOrder {
    #[default]
    Big,
    Little,
}

/// Sequential reader over one complete message buffer.
///
/// Tracks a read offset into an immutable byte slice. Each typed read
/// advances by the scalar's fixed width and fails with
/// [`DecodeError::Truncated`] when fewer bytes remain.
#[derive(Debug)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    offset: usize,
    order: ByteOrder,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8], order: ByteOrder) -> Self {
        Self {
            buf,
            offset: 0,
            order,
        }
    }

    /// Current read offset from the start of the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    /// True iff every byte has been consumed.
    ///
    /// A partial scalar still in the buffer is not EOF; it surfaces as
    /// `Truncated` on the next read.
    pub fn is_eof(&self) -> bool {
        self.offset == self.buf.len()
    }

    /// The unread tail of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.offset..]
    }

    /// Consume everything left.
    pub fn skip_to_end(&mut self) {
        self.offset = self.buf.len();
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        if self.remaining() < N {
            return Err(DecodeError::Truncated {
                needed: N,
                remaining: self.remaining(),
                offset: self.offset,
            });
        }
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.buf[self.offset..self.offset + N]);
        self.offset += N;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take::<1>()?[0])
    }

    pub fn read_f32(&mut self) -> Result<f32, DecodeError> {
        let bytes = self.take::<4>()?;
        Ok(match self.order {
            ByteOrder::Big => f32::from_be_bytes(bytes),
            ByteOrder::Little => f32::from_le_bytes(bytes),
        })
    }

    pub fn read_f64(&mut self) -> Result<f64, DecodeError> {
        let bytes = self.take::<8>()?;
        Ok(match self.order {
            ByteOrder::Big => f64::from_be_bytes(bytes),
            ByteOrder::Little => f64::from_le_bytes(bytes),
        })
    }
}
