//! Resumable finite-state machines for decoding capture streams.
//!
//! Neither decoder performs I/O. Bytes are pushed in by the caller, in chunks
//! of any size split at any boundary, and completed packets are pushed out to a
//! [`Receiver`](crate::packet::Receiver) during the same call.
//!
//! # Architecture
//!
//! A capture stream is made of frames, each wrapping a span of packet bytes:
//!
//! ```text
//! frame:   D0 nn <(nn + 1) * 2 bytes of packet stream>
//! packet:  A0 <flags: u16> <size: u16> <timestamp: u24> <size bytes of payload>
//! ```
//!
//! All multi-byte fields are little-endian. A packet may span any number of
//! frames.
//!
//! [`frame::FrameDecoder`] consumes frame headers itself and forwards frame
//! payload to the [`packet::PacketDecoder`] it owns. Each state machine is a
//! closed enumeration with an explicit transition function; see
//! [`packet::PacketState`] and [`frame::FrameState`].
//!
//! # Errors and resynchronization
//!
//! A call to `process` stops at the first byte that violates the protocol,
//! reporting how many bytes it consumed. The offending byte is always
//! consumed, and the decoder is left ready to decode the bytes after it:
//!
//! - An incorrect magic byte is discarded; the decoder keeps waiting for magic.
//! - A packet too large for the destination buffer is abandoned; the decoder
//!   waits for the next packet magic. The abandoned payload is then skipped
//!   byte by byte as magic errors.
//! - A packet error inside a frame leaves the frame layer untouched. The frame
//!   length remains authoritative, and the rest of the frame is still
//!   forwarded to the packet layer once `process` is called again.
//!
//! Feeding the remainder of a chunk back into `process` after each error thus
//! scans forward one byte at a time until a record boundary is found again.
//! [`crate::stream::feed`] implements this loop.

use crate::error::Error;

pub mod frame;
pub mod packet;

/// Push bytes into a decoder.
pub trait Decode {
    /// Decode a chunk of bytes, publishing completed packets to the decoder's
    /// receiver.
    ///
    /// On success, every byte of the chunk was consumed. On failure, decoding
    /// stopped after [`Error::consumed`] bytes.
    fn process(&mut self, r: &[u8]) -> Result<(), Error>;
}
