#![no_std]

//! A resumable decoder for USB protocol analyzer capture streams.
//!
//! An analyzer streams captured traffic to the host over a bulk endpoint as a
//! sequence of frames, each wrapping a span of packet records. Transport reads
//! split this stream at arbitrary byte boundaries. Ovframe reassembles packets
//! from chunks of any size, without allocating, into a buffer supplied by the
//! caller, and hands each one to a [`Receiver`] as soon as it is complete.
//!
//! Most users should construct a [`FrameDecoder`] and push every chunk read
//! from the transport into it, either directly through
//! [`FrameDecoder::process`] or through [`stream::feed`] to skip past
//! protocol errors. The state machines are described in the [`sans`] module.
//!
//! ```
//! let mut buf = [0; 1024];
//! let mut decoder = FrameDecoder::new(&mut buf, |packet: Packet<'_>| {
//!     println!("[{:04x}] {} bytes at {}", packet.flags(), packet.size(), packet.timestamp());
//! })?;
//!
//! for chunk in transport {
//!     stream::feed(&mut decoder, chunk, |err| eprintln!("{err}"));
//! }
//! ```
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `std`: implement `std::error::Error` for error types, and let `tracing`
//!   use the standard library (default).

pub mod error;
pub mod packet;
pub mod sans;
pub mod stream;

pub use error::{Error, ErrorKind, InitError};
pub use packet::{HEADER_SIZE, Packet, Receiver};
pub use sans::{Decode, frame::FrameDecoder, packet::PacketDecoder};
