//! Errors produced while configuring and driving the decoders.

use thiserror::Error;

use crate::packet::HEADER_SIZE;

/// An error constructing a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InitError {
    /// The destination buffer cannot hold a packet header.
    #[error("Buffer of {capacity} bytes cannot hold a packet header ({} bytes).", HEADER_SIZE)]
    BufferTooSmall { capacity: usize },
}

/// The cause of an interrupted decode.
///
/// Every kind is recoverable: the decoder is left ready to resynchronize on the
/// bytes that follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// A byte other than the packet magic started a packet.
    #[error("Incorrect packet magic ({0:#04x}).")]
    PacketMagic(u8),
    /// A packet declared more payload than the destination buffer can hold.
    #[error("Packet of {size} bytes exceeds buffer capacity ({capacity} bytes).")]
    Capacity { size: usize, capacity: usize },
    /// A byte other than the frame magic started a frame.
    #[error("Incorrect frame magic ({0:#04x}).")]
    FrameMagic(u8),
}

impl ErrorKind {
    /// Whether the error was raised by the frame layer, rather than by the
    /// packet layer while consuming frame payload.
    pub fn is_framing(&self) -> bool {
        matches!(self, Self::FrameMagic(_))
    }
}

/// An error interrupting a call to `process`.
///
/// Decoding stops at the offending byte. `consumed` counts the bytes of the
/// chunk consumed by the call, the offending byte included; the remainder of
/// the chunk may be passed to `process` again to resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} (after {consumed} bytes)")]
pub struct Error {
    pub consumed: usize,
    pub kind: ErrorKind,
}

impl Error {
    /// Move the error's position forward by `offset` bytes.
    pub(crate) fn rebase(self, offset: usize) -> Self {
        Self {
            consumed: self.consumed + offset,
            ..self
        }
    }
}
