//! Decoded packet records and their receivers.

use tartan_bitfield::bitfield;
use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
    little_endian::{U16, U32},
};

/// Size of the in-memory packet header, in bytes.
///
/// A destination buffer must hold at least this many bytes, plus the largest
/// payload it is expected to receive.
pub const HEADER_SIZE: usize = size_of::<PacketHeader>();

/// Fixed header stored at the start of the destination buffer.
///
/// Fields are kept little-endian and unaligned, so the layout is the same on
/// every host and the header can sit at any offset of a byte buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
pub struct PacketHeader {
    pub flags: U16,
    pub size: U16,
    pub timestamp: U32,
}

impl PacketHeader {
    /// Byte offset of `flags` within the header.
    pub(crate) const FLAGS: usize = 0;
    /// Byte offset of `size` within the header.
    pub(crate) const SIZE: usize = 2;
    /// Byte offset of `timestamp` within the header.
    pub(crate) const TIMESTAMP: usize = 4;
}

bitfield! {
    /// Capture status bits carried in a packet's flags.
    ///
    /// The decoder never acts on these; they are exposed for consumers.
    pub struct Flags(u16) {
        /// The analyzer saw a bus error while capturing the packet.
        [0] pub error,
        /// The analyzer's capture buffer overflowed before this packet.
        [1] pub overflow,
        /// The packet was clipped by the analyzer.
        [2] pub clipped,
        /// The payload was truncated before reaching the host.
        [3] pub truncated,
        /// First packet after capture start.
        [4] pub first,
        /// Last packet before capture stop.
        [5] pub last,
    }
}

/// A read-only view of a completely decoded packet.
///
/// The view borrows the decoder's destination buffer, which is reused for the
/// next record; it cannot outlive a call to [`Receiver::receive`].
#[derive(Debug, Clone, Copy)]
pub struct Packet<'a> {
    header: PacketHeader,
    bytes: &'a [u8],
}

impl<'a> Packet<'a> {
    /// Create a view over a header and the contiguous record bytes it
    /// describes (header followed by exactly `size` payload bytes).
    pub(crate) fn new(header: PacketHeader, bytes: &'a [u8]) -> Self {
        debug_assert_eq!(bytes.len(), HEADER_SIZE + header.size.get() as usize);
        Self { header, bytes }
    }

    /// The raw 16-bit flags.
    pub fn flags(&self) -> u16 {
        self.header.flags.get()
    }

    /// The flags as named capture status bits.
    pub fn status(&self) -> Flags {
        Flags(self.flags())
    }

    /// The payload length, in bytes.
    pub fn size(&self) -> u16 {
        self.header.size.get()
    }

    /// The capture timestamp.
    ///
    /// Only the low 24 bits are carried on the wire; the high byte is always
    /// zero.
    pub fn timestamp(&self) -> u32 {
        self.header.timestamp.get()
    }

    /// The payload bytes, exactly [`size`](Self::size) of them.
    pub fn data(&self) -> &'a [u8] {
        &self.bytes[HEADER_SIZE..]
    }

    pub fn header(&self) -> &PacketHeader {
        &self.header
    }

    /// The whole record as stored in the destination buffer: header, then
    /// payload.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

/// Receive packets as they are completed.
///
/// A receiver is the decoder's callback together with any context it needs.
/// It runs synchronously on the thread driving the decoder and cannot fail the
/// decoder.
///
/// Implemented for every `FnMut(Packet<'_>)`.
pub trait Receiver {
    /// Receive one completely decoded packet.
    fn receive(&mut self, packet: Packet<'_>);
}

impl<F: FnMut(Packet<'_>)> Receiver for F {
    fn receive(&mut self, packet: Packet<'_>) {
        self(packet)
    }
}
