//! Resynchronizing drivers for the state machines in [`crate::sans`].

use tracing::debug;

use crate::{
    error::{Error, InitError},
    packet::{Packet, Receiver},
    sans::{Decode, frame::FrameDecoder},
};

/// Decode a whole chunk, skipping past every error.
///
/// Each error is reported to `on_error` with [`Error::consumed`] rebased to
/// count from the start of `r`, then decoding resumes with the byte after the
/// offending one. Returns the number of errors reported.
pub fn feed<D: Decode + ?Sized>(decoder: &mut D, r: &[u8], mut on_error: impl FnMut(Error)) -> usize {
    let mut offset = 0;
    let mut errors = 0;

    while let Err(err) = decoder.process(&r[offset..]) {
        let err = err.rebase(offset);
        offset = err.consumed;
        errors += 1;

        on_error(err);
    }

    errors
}

/// Counts from decoding a whole capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Packets published to the receiver.
    pub packets: usize,
    /// Errors skipped while resynchronizing.
    pub errors: usize,
    /// Whether the capture ended inside a frame or a packet.
    pub truncated: bool,
}

/// Decode a complete framed capture held in a slice, publishing packets to a
/// receiver.
///
/// Packets are assembled in `buf`. Errors are skipped as by [`feed`].
pub fn decode_slice(buf: &mut [u8], r: &[u8], receiver: &mut impl Receiver) -> Result<Summary, InitError> {
    let mut packets = 0;
    let mut decoder = FrameDecoder::new(buf, |packet: Packet<'_>| {
        packets += 1;
        receiver.receive(packet);
    })?;

    let errors = feed(&mut decoder, r, |_| {});
    let truncated = !decoder.is_idle();

    drop(decoder);

    if errors != 0 {
        debug!(errors, "skipped errors while decoding capture");
    }

    Ok(Summary {
        packets,
        errors,
        truncated,
    })
}
