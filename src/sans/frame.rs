//! Decoder for the framing layer wrapping packets.

use tracing::{debug, trace};

use crate::{
    error::{Error, ErrorKind, InitError},
    packet::Receiver,
};

use super::{
    Decode,
    packet::{PacketDecoder, PacketState},
};

/// Marker byte starting every frame.
pub const FRAME_MAGIC: u8 = 0xD0;

/// Largest number of payload bytes a single frame can carry.
pub const MAX_FRAME_PAYLOAD: usize = frame_payload_length(u8::MAX);

/// Number of payload bytes declared by a frame's length byte.
///
/// The length byte counts 16-bit words, less one, so every frame carries an
/// even number of bytes between 2 and [`MAX_FRAME_PAYLOAD`].
pub const fn frame_payload_length(n: u8) -> usize {
    (n as usize + 1) * 2
}

/// States of the frame decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    AwaitFrameMagic,
    AwaitFrameLength,
    AwaitFrameData,
}

impl FrameState {
    /// The state following this one in a well-formed frame.
    pub fn successor(self) -> Self {
        use FrameState::*;

        match self {
            AwaitFrameMagic => AwaitFrameLength,
            AwaitFrameLength => AwaitFrameData,
            AwaitFrameData => AwaitFrameMagic,
        }
    }
}

/// Decode frames, forwarding their payload to an owned [`PacketDecoder`].
///
/// The declared frame length is authoritative. Exactly that many bytes after
/// the frame header are forwarded to the packet layer, whatever they contain;
/// bytes beyond it begin the next frame. Packets may span frames.
pub struct FrameDecoder<'a, R> {
    packets: PacketDecoder<'a, R>,
    state: FrameState,
    /// Frame payload bytes not yet forwarded.
    required_length: usize,
    diagnostic: Option<ErrorKind>,
}

impl<'a, R: Receiver> FrameDecoder<'a, R> {
    /// Create a decoder writing packets into `buf`.
    ///
    /// See [`PacketDecoder::new`].
    pub fn new(buf: &'a mut [u8], receiver: R) -> Result<Self, InitError> {
        Ok(Self::from_packet_decoder(PacketDecoder::new(buf, receiver)?))
    }

    /// Wrap an existing packet decoder, keeping any packet it has in progress.
    pub fn from_packet_decoder(packets: PacketDecoder<'a, R>) -> Self {
        Self {
            packets,
            state: FrameState::AwaitFrameMagic,
            required_length: 0,
            diagnostic: None,
        }
    }

    /// Decode a chunk of bytes, publishing completed packets to the receiver.
    ///
    /// On success, every byte of the chunk was consumed. On failure, decoding
    /// stopped after [`Error::consumed`] bytes. Errors raised by the packet
    /// layer inside a frame are returned as-is; the frame's remaining length
    /// already accounts for every byte the packet layer consumed, so the rest
    /// of the chunk can be passed back to continue the frame.
    pub fn process(&mut self, r: &[u8]) -> Result<(), Error> {
        use FrameState::*;

        let mut i = 0;

        while i < r.len() {
            match self.state {
                AwaitFrameMagic => {
                    let b = r[i];
                    i += 1;

                    if b != FRAME_MAGIC {
                        debug!(found = b, "incorrect frame magic");
                        let kind = ErrorKind::FrameMagic(b);
                        self.diagnostic = Some(kind);
                        return Err(Error { consumed: i, kind });
                    }

                    self.state = self.state.successor();
                }
                AwaitFrameLength => {
                    self.required_length = frame_payload_length(r[i]);
                    i += 1;

                    trace!(length = self.required_length, "frame header");
                    self.state = self.state.successor();
                }
                AwaitFrameData => {
                    let n = self.required_length.min(r.len() - i);
                    let result = self.packets.process(&r[i..i + n]);

                    let consumed = match &result {
                        Ok(()) => n,
                        Err(err) => err.consumed,
                    };

                    self.required_length -= consumed;
                    let start = i;
                    i += consumed;

                    if self.required_length == 0 {
                        self.state = self.state.successor();
                        self.diagnostic = None;
                    }

                    if let Err(err) = result {
                        self.diagnostic = Some(err.kind);
                        return Err(err.rebase(start));
                    }
                }
            }
        }

        Ok(())
    }
}

impl<'a, R> FrameDecoder<'a, R> {
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Frame payload bytes still expected before the next frame header.
    pub fn required_length(&self) -> usize {
        self.required_length
    }

    /// The most recent error, cleared once a frame completes.
    pub fn diagnostic(&self) -> Option<ErrorKind> {
        self.diagnostic
    }

    /// Whether the decoder sits between frames and between packets.
    pub fn is_idle(&self) -> bool {
        self.state == FrameState::AwaitFrameMagic
            && self.packets.state() == PacketState::AwaitMagic
    }

    /// Abandon any in-progress frame and packet.
    pub fn reset(&mut self) {
        self.state = FrameState::AwaitFrameMagic;
        self.required_length = 0;
        self.diagnostic = None;
        self.packets.reset();
    }

    pub fn packet_decoder(&self) -> &PacketDecoder<'a, R> {
        &self.packets
    }

    pub fn packet_decoder_mut(&mut self) -> &mut PacketDecoder<'a, R> {
        &mut self.packets
    }

    pub fn into_packet_decoder(self) -> PacketDecoder<'a, R> {
        self.packets
    }
}

impl<R: Receiver> Decode for FrameDecoder<'_, R> {
    fn process(&mut self, r: &[u8]) -> Result<(), Error> {
        FrameDecoder::process(self, r)
    }
}
