//! RP2040 firmware binding for the controller/dongle link core.
//!
//! The platform-agnostic logic lives in [`pad_core`]; this crate owns the
//! peripherals and provides the seams the core expects:
//!
//! - [`flash`]: [`pad_core::Nvm`] over the on-chip flash
//! - [`uart_link`]: radio-link UART (receive task, blocking transmit,
//!   dual-baud line modes)
//! - [`board`]: power control and the board-revision probe
//! - [`report`]: report plumbing at the HID collaborator boundary
//!
//! # Architecture
//!
//! Two binaries share this crate: `controller` (the handheld) and `dongle`
//! (the radio bridge). Each runs the Embassy executor with two tasks: the
//! UART receive task pushing bytes into the SPSC ring, and the main tick
//! loop that pumps the link, re-sends the latest input report, and flushes
//! the config/profile caches on the flash-wear cadence.

#![no_std]

pub mod board;
pub mod flash;
pub mod report;
pub mod uart_link;

// Re-export core types the binaries wire together
pub use pad_core::{
    BoardRevision, ConfigStore, DeviceRole, DeviceSpec, FrameSender, LinkService, ProfileStore,
};
