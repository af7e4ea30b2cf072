//! Report plumbing at the HID collaborator boundary.
//!
//! Input conditioning, HID report construction, and the USB stack are
//! separate subsystems; these types are the hand-off points between them
//! and the link core.

use defmt::debug;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use pad_core::link::{PeerSink, ReportSink};
use pad_proto::command::INPUT_REPORT_DATA_LEN;
use pad_proto::PeerState;

/// Report id used by the gamepad report pipeline.
pub const REPORT_ID_GAMEPAD: u8 = 1;

/// A locally produced input report: report id plus data bytes.
pub type LocalReport = (u8, [u8; INPUT_REPORT_DATA_LEN]);

/// Latest-value latch between the input pipeline and the tick loop.
///
/// The pipeline signals each new report; the tick loop re-sends the
/// latest one every tick whether or not it changed, so a lost frame is
/// repaired by the next tick rather than by retries.
pub struct ReportLatch {
    signal: &'static Signal<CriticalSectionRawMutex, LocalReport>,
    latest: LocalReport,
}

impl ReportLatch {
    pub fn new(signal: &'static Signal<CriticalSectionRawMutex, LocalReport>) -> Self {
        Self {
            signal,
            latest: (REPORT_ID_GAMEPAD, [0u8; INPUT_REPORT_DATA_LEN]),
        }
    }

    /// Current report, updated from the signal if the pipeline produced
    /// a newer one since the last tick.
    pub fn latest(&mut self) -> LocalReport {
        if let Some(report) = self.signal.try_take() {
            self.latest = report;
        }
        self.latest
    }
}

/// Incoming input reports handed to the local HID emission path.
pub struct HidReportOut;

impl ReportSink for HidReportOut {
    fn report(&mut self, report_id: u8, data: &[u8]) {
        debug!("hid: emit report {} ({} bytes)", report_id, data.len());
    }
}

/// Bridge side: snapshots are relayed onward to the host interface.
pub struct HostPeerRelay;

impl PeerSink for HostPeerRelay {
    fn deliver(&mut self, state: PeerState) {
        debug!("host: relay snapshot kind {} flags {}", state.kind, state.flags);
    }
}

/// Controller side: snapshots are applied as if they were local state.
pub struct LocalPeerApply;

impl PeerSink for LocalPeerApply {
    fn deliver(&mut self, state: PeerState) {
        debug!("local: apply snapshot kind {} flags {}", state.kind, state.flags);
    }
}
