//! Wire protocol for the controller/dongle radio link.
//!
//! The two devices exchange fixed-shape frames over a shared serial line:
//!
//! ```text
//! [sync0][sync1][sync2][command_id][payload...]
//! ```
//!
//! The sync marker is a fixed 3-byte constant, the command identifier is
//! drawn from a small closed set, and every command has a statically known
//! payload length — there is no length field on the wire, so both ends must
//! agree on the [`Command`] table.
//!
//! # Overview
//!
//! - [`command`]: command identifiers and the payload-length table
//! - [`frame`]: frame encoding and the byte-level [`FrameParser`]
//! - [`peer`]: the versioned [`PeerState`] snapshot codec
//!
//! # Resynchronization
//!
//! The parser tolerates corruption at any point: an unexpected byte in any
//! state abandons the current frame and returns the parser to the first
//! sync state, so a single bad byte costs at most one frame. Stray bytes
//! seen outside a frame are surfaced as [`ParserEvent::Stray`] so the
//! caller can treat them as incidental diagnostic text from the peer.
//!
//! # Features
//!
//! - **`std`**: standard library support (host testing)
//! - **`defmt`**: defmt formatting for embedded logging
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod command;
pub mod frame;
pub mod peer;

pub use command::{Command, UnknownCommand, MAX_PAYLOAD_LEN, PEER_STATE_LEN, SYNC};
pub use frame::{encode_frame, Frame, FrameError, FrameParser, ParserEvent, MAX_FRAME_LEN};
pub use peer::{PeerState, PeerStateError, FLAG_WIRELESS};
