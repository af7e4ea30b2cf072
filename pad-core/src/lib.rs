//! Platform-agnostic core of the controller/dongle firmware.
//!
//! This crate holds the state and logic that is identical on both sides of
//! the radio link and testable on the host:
//!
//! - [`ring`]: SPSC byte ring between the receive interrupt and the main loop
//! - [`nvm`]: storage layout, access trait, and record codecs
//! - [`config`]: write-back cache over the persisted configuration record
//! - [`profile`]: versioned input-mapping profile slots
//! - [`templates`]: built-in profile archetypes
//! - [`link`]: frame pump, command dispatch, and frame sending
//! - [`admin`]: debug-console operations
//! - [`device`]: description of the running hardware variant
//!
//! The platform layer owns the peripherals and provides the seams: an
//! [`nvm::Nvm`] backend, a [`link::SerialTx`] writer, and the sinks for
//! reports, peer state, and power control.
//!
//! # Execution model
//!
//! A single cooperative main loop plus one receive context. The receive
//! path only pushes bytes into the ring; parsing, dispatch, and every
//! cache mutation happen inside the main-loop tick, so the stores need no
//! locking and setters always complete before anything else observes the
//! cache.
//!
//! # Features
//!
//! - **`std`**: standard library support (host testing, in-memory NVM)
//! - **`defmt`**: defmt logging for embedded builds

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(any(test, feature = "std"))]
extern crate std;

#[macro_use]
mod fmt;

pub mod admin;
pub mod config;
pub mod device;
pub mod link;
pub mod nvm;
pub mod profile;
pub mod ring;
pub mod templates;

pub use admin::{AdminOp, CalibrationResult, Calibrator, SelfTest};
pub use config::{ConfigRecord, ConfigStore, Gains, Problem, ProtocolChange, TuneMode};
pub use device::{BoardRevision, DeviceRole, DeviceSpec, UnknownRevision};
pub use link::{
    battery_percentage, FrameSender, LinkService, PeerSink, PowerControl, ReportSink, SerialTx,
};
pub use nvm::{Nvm, NvmError};
pub use profile::{CopySource, ProfileRecord, ProfileStore, SectionUpdate};
pub use templates::Template;
