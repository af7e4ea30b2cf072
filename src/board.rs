//! Board-level services: power transitions and the revision probe.

use defmt::info;
use embassy_rp::gpio::Input;
use pad_core::device::{BoardRevision, UnknownRevision};
use pad_core::link::PowerControl;

/// Power state transitions via the SCB / boot ROM.
pub struct Power;

impl PowerControl for Power {
    fn restart(&mut self) {
        info!("power: restart");
        cortex_m::peripheral::SCB::sys_reset();
    }

    fn bootloader(&mut self) {
        info!("power: usb bootloader");
        embassy_rp::rom_data::reset_to_usb_boot(0, 0);
        // The ROM call does not return; park the core until it takes over.
        loop {
            cortex_m::asm::wfe();
        }
    }
}

/// Read the board revision from the strap pins.
///
/// Straps are pulled up; populated resistors pull their pin low, so the
/// probe value is the inverted pin pattern.
pub fn probe_revision(strap_a: &Input<'_>, strap_b: &Input<'_>) -> Result<BoardRevision, UnknownRevision> {
    let raw = ((strap_b.is_low() as u8) << 1) | strap_a.is_low() as u8;
    BoardRevision::from_probe(raw)
}

/// Park the device after an unrecoverable condition.
///
/// Running with an unresolved hardware identity is worse than stopping:
/// downstream code branches on the revision unconditionally.
pub fn halt() -> ! {
    loop {
        cortex_m::asm::wfe();
    }
}
