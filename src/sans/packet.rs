//! Decoder for packet records.

use tracing::{debug, trace};
use zerocopy::{FromZeros, IntoBytes};

use crate::{
    error::{Error, ErrorKind, InitError},
    packet::{HEADER_SIZE, Packet, PacketHeader, Receiver},
};

use super::Decode;

/// Marker byte starting every packet.
pub const PACKET_MAGIC: u8 = 0xA0;

/// States of the packet decoder.
///
/// Each header state consumes exactly one byte. [`PacketState::AwaitData`]
/// consumes as many payload bytes as are available, up to the packet's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketState {
    AwaitMagic,
    AwaitFlagsLo,
    AwaitFlagsHi,
    AwaitLengthLo,
    AwaitLengthHi,
    AwaitTimestampLo,
    AwaitTimestampMid,
    AwaitTimestampHi,
    AwaitData,
}

impl PacketState {
    /// The state following this one in a well-formed packet.
    pub fn successor(self) -> Self {
        use PacketState::*;

        match self {
            AwaitMagic => AwaitFlagsLo,
            AwaitFlagsLo => AwaitFlagsHi,
            AwaitFlagsHi => AwaitLengthLo,
            AwaitLengthLo => AwaitLengthHi,
            AwaitLengthHi => AwaitTimestampLo,
            AwaitTimestampLo => AwaitTimestampMid,
            AwaitTimestampMid => AwaitTimestampHi,
            AwaitTimestampHi => AwaitData,
            AwaitData => AwaitMagic,
        }
    }
}

/// Decode packets into a caller-supplied buffer.
///
/// Each packet is assembled at the start of the buffer, header first, payload
/// immediately after, and published to the receiver once its last byte
/// arrives. The buffer is reused for every packet and never resized.
pub struct PacketDecoder<'a, R> {
    buf: &'a mut [u8],
    /// Bytes of the in-progress packet written to `buf`.
    written: usize,
    /// Header fields of the in-progress packet.
    header: PacketHeader,
    state: PacketState,
    diagnostic: Option<ErrorKind>,
    receiver: R,
}

impl<'a, R: Receiver> PacketDecoder<'a, R> {
    /// Create a decoder writing packets into `buf`.
    ///
    /// The buffer must hold at least [`HEADER_SIZE`] bytes; packets with more
    /// payload than fits after the header are rejected while decoding.
    pub fn new(buf: &'a mut [u8], receiver: R) -> Result<Self, InitError> {
        check_capacity(buf)?;

        Ok(Self {
            buf,
            written: 0,
            header: PacketHeader::new_zeroed(),
            state: PacketState::AwaitMagic,
            diagnostic: None,
            receiver,
        })
    }

    /// Decode a chunk of bytes, publishing completed packets to the receiver.
    ///
    /// On success, every byte of the chunk was consumed. On failure, the
    /// offending byte and those before it were consumed, and the decoder is
    /// ready to continue from the byte after it.
    pub fn process(&mut self, r: &[u8]) -> Result<(), Error> {
        let mut i = 0;

        while i < r.len() {
            match self.advance(&r[i..]) {
                Ok(n) => i += n,
                Err(kind) => {
                    self.diagnostic = Some(kind);
                    return Err(Error {
                        consumed: i + 1,
                        kind,
                    });
                }
            }
        }

        Ok(())
    }

    /// Consume the next field from a non-empty slice, returning the number of
    /// bytes consumed.
    ///
    /// Errors always consume exactly one byte.
    fn advance(&mut self, r: &[u8]) -> Result<usize, ErrorKind> {
        use PacketState::*;

        let b = r[0];

        match self.state {
            AwaitMagic => {
                if b != PACKET_MAGIC {
                    debug!(found = b, "incorrect packet magic");
                    return Err(ErrorKind::PacketMagic(b));
                }

                self.header = PacketHeader::new_zeroed();
                self.written = 0;
            }
            AwaitFlagsLo => self.set_header_byte(PacketHeader::FLAGS, b),
            AwaitFlagsHi => self.set_header_byte(PacketHeader::FLAGS + 1, b),
            AwaitLengthLo => self.set_header_byte(PacketHeader::SIZE, b),
            AwaitLengthHi => {
                self.set_header_byte(PacketHeader::SIZE + 1, b);

                let size = self.size();
                let capacity = self.buf.len();

                if HEADER_SIZE + size > capacity {
                    debug!(size, capacity, "packet exceeds buffer capacity");
                    self.state = AwaitMagic;
                    self.written = 0;
                    return Err(ErrorKind::Capacity { size, capacity });
                }
            }
            AwaitTimestampLo => self.set_header_byte(PacketHeader::TIMESTAMP, b),
            AwaitTimestampMid => self.set_header_byte(PacketHeader::TIMESTAMP + 1, b),
            AwaitTimestampHi => {
                self.set_header_byte(PacketHeader::TIMESTAMP + 2, b);

                // The high timestamp byte is never sent and stays zeroed.
                self.buf[..HEADER_SIZE].copy_from_slice(self.header.as_bytes());
                self.written = HEADER_SIZE;

                if self.size() == 0 {
                    self.complete();
                    return Ok(1);
                }
            }
            AwaitData => return Ok(self.copy_payload(r)),
        }

        self.state = self.state.successor();
        Ok(1)
    }

    fn set_header_byte(&mut self, offset: usize, b: u8) {
        self.header.as_mut_bytes()[offset] = b;
        self.written += 1;
    }

    fn copy_payload(&mut self, r: &[u8]) -> usize {
        let end = HEADER_SIZE + self.size();
        let n = r.len().min(end - self.written);

        self.buf[self.written..self.written + n].copy_from_slice(&r[..n]);
        self.written += n;

        if self.written == end {
            self.complete();
        }

        n
    }

    /// Publish the assembled packet and wait for the next one.
    fn complete(&mut self) {
        trace!(
            flags = self.header.flags.get(),
            size = self.header.size.get(),
            timestamp = self.header.timestamp.get(),
            "packet complete"
        );

        let packet = Packet::new(self.header, &self.buf[..self.written]);
        self.receiver.receive(packet);

        self.state = PacketState::AwaitMagic;
        self.written = 0;
        self.diagnostic = None;
    }

    fn size(&self) -> usize {
        self.header.size.get() as usize
    }
}

impl<'a, R> PacketDecoder<'a, R> {
    pub fn state(&self) -> PacketState {
        self.state
    }

    /// The most recent error, cleared once a packet completes.
    pub fn diagnostic(&self) -> Option<ErrorKind> {
        self.diagnostic
    }

    /// Total size of the destination buffer, header included.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Abandon any in-progress packet and wait for packet magic.
    pub fn reset(&mut self) {
        self.state = PacketState::AwaitMagic;
        self.written = 0;
        self.diagnostic = None;
    }

    /// Continue decoding into a fresh buffer.
    ///
    /// Any in-progress packet is abandoned. On error, the current buffer is
    /// kept.
    pub fn replace_buffer(&mut self, buf: &'a mut [u8]) -> Result<(), InitError> {
        check_capacity(buf)?;

        self.buf = buf;
        self.reset();

        Ok(())
    }

    pub fn receiver(&self) -> &R {
        &self.receiver
    }

    pub fn receiver_mut(&mut self) -> &mut R {
        &mut self.receiver
    }

    pub fn into_receiver(self) -> R {
        self.receiver
    }
}

impl<R: Receiver> Decode for PacketDecoder<'_, R> {
    fn process(&mut self, r: &[u8]) -> Result<(), Error> {
        PacketDecoder::process(self, r)
    }
}

fn check_capacity(buf: &[u8]) -> Result<(), InitError> {
    if buf.len() < HEADER_SIZE {
        Err(InitError::BufferTooSmall {
            capacity: buf.len(),
        })?;
    }

    Ok(())
}
