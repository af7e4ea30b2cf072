//! Radio-link UART: receive task, blocking transmit, and line modes.
//!
//! The same physical line runs in two modes: a low-speed command mode used
//! while the radio module bootstraps, and the high-speed data mode that
//! carries the framed protocol. Switching reinitializes the line at the
//! new bit rate; the caller must also discard the receive ring (stale
//! bytes from the old rate are garbage).

use defmt::{info, warn};
use embassy_rp::uart::{Async, Config as UartConfig, Uart, UartRx, UartTx};
use pad_core::link::SerialTx;
use pad_core::ring::RingProducer;

/// Bit rate of the bootstrap/administrative command mode.
pub const COMMAND_BAUD: u32 = 115_200;

/// Bit rate of the framed data mode.
pub const DATA_BAUD: u32 = 1_000_000;

/// Receive ring capacity; the hardware FIFO alone is too shallow for a
/// full tick of frames at the data rate.
pub const RX_RING_SIZE: usize = 512;

/// Line modes of the shared serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum LineMode {
    /// Low-speed bootstrap/administrative mode.
    Command,
    /// High-speed framed-protocol mode.
    Data,
}

impl LineMode {
    pub const fn baud(self) -> u32 {
        match self {
            LineMode::Command => COMMAND_BAUD,
            LineMode::Data => DATA_BAUD,
        }
    }
}

/// UART configuration for a line mode.
pub fn line_config(mode: LineMode) -> UartConfig {
    let mut config = UartConfig::default();
    config.baudrate = mode.baud();
    config
}

/// Reinitialize the line at the data rate once the radio module is up.
pub fn enter_data_mode(uart: &mut Uart<'_, Async>) {
    info!("link: line mode {} ({} baud)", LineMode::Data, DATA_BAUD);
    uart.set_baudrate(DATA_BAUD);
}

/// Receive task: drain the UART into the ring, byte by byte.
///
/// This is the producer side of the SPSC ring; it never blocks on the
/// consumer. A full ring drops the byte — downstream resynchronization
/// recovers, blocking here would not.
#[embassy_executor::task]
pub async fn rx_task(mut rx: UartRx<'static, Async>, mut ring: RingProducer<'static, RX_RING_SIZE>) {
    let mut byte = [0u8; 1];
    loop {
        match rx.read(&mut byte).await {
            Ok(()) => {
                if !ring.push(byte[0]) {
                    warn!("link: rx ring full, byte dropped");
                }
            }
            Err(e) => warn!("link: uart rx error {}", e),
        }
    }
}

/// Blocking transmit half of the link.
///
/// Frames are small and fixed-size, so holding the main loop for one
/// write is acceptable; there is no acknowledgement or retry.
pub struct LinkTx {
    tx: UartTx<'static, Async>,
}

impl LinkTx {
    pub fn new(tx: UartTx<'static, Async>) -> Self {
        Self { tx }
    }
}

impl SerialTx for LinkTx {
    fn write_all(&mut self, bytes: &[u8]) {
        // Loss is tolerated by the protocol; a failed write is not.
        if self.tx.blocking_write(bytes).is_err() {
            warn!("link: uart tx error");
        }
    }
}
