//! Wireless link service: drains the receive ring, reassembles frames,
//! and dispatches them; builds and sends outgoing frames.
//!
//! Everything here runs synchronously inside the main-loop tick. Frames
//! are dispatched in exact arrival order, one at a time. The transport is
//! best-effort with no acknowledgement: input reports are re-sent every
//! tick anyway, and configuration frames are idempotent when replayed.

use pad_proto::command::{BATTERY_LEN, INPUT_REPORT_DATA_LEN, LINK_MODE_LEN};
use pad_proto::{encode_frame, Command, Frame, FrameParser, ParserEvent, PeerState, MAX_FRAME_LEN};

use crate::config::{ConfigStore, Problem, ProtocolChange};
use crate::device::{DeviceRole, DeviceSpec};
use crate::nvm::{Nvm, NvmError};
use crate::ring::RingConsumer;

/// Raw battery level of an empty cell.
pub const BATTERY_MIN: u32 = 3_050;
/// Raw span between empty and full.
pub const BATTERY_CAPACITY: u32 = 1_100;
/// Below this raw level the low-battery condition is raised.
pub const BATTERY_LOW_THRESHOLD: u32 = 3_250;

/// Config log-mask bit enabling link telemetry logging.
pub const LOG_MASK_LINK: u8 = 0x01;

/// Normalize a raw battery level to a percentage.
#[must_use]
pub fn battery_percentage(level: u32) -> u8 {
    let above_min = level.saturating_sub(BATTERY_MIN) as u64;
    let normalized = above_min * 100 / BATTERY_CAPACITY as u64;
    normalized.min(100) as u8
}

/// Blocking serial transmit path.
///
/// A send keeps the caller busy for the frame duration; acceptable because
/// payloads are small and fixed-size. Loss is tolerated, so the write
/// itself reports nothing.
pub trait SerialTx {
    fn write_all(&mut self, bytes: &[u8]);
}

/// Local input-report emission path (the HID side of the device).
pub trait ReportSink {
    /// Emit a report as if it came from local input hardware.
    fn report(&mut self, report_id: u8, data: &[u8]);
}

/// Consumer for peer-state snapshots that crossed the link.
///
/// The bridge implementation relays the snapshot onward to the host-facing
/// interface; the controller implementation applies it as local state.
pub trait PeerSink {
    fn deliver(&mut self, state: PeerState);
}

/// Power state transitions, implemented by the platform layer.
pub trait PowerControl {
    fn restart(&mut self);
    fn bootloader(&mut self);
}

/// Serializes outgoing command frames onto the transport.
pub struct FrameSender<S: SerialTx> {
    tx: S,
}

impl<S: SerialTx> FrameSender<S> {
    pub fn new(tx: S) -> Self {
        Self { tx }
    }

    /// Build a frame and write it in one blocking operation.
    pub fn send(&mut self, command: Command, payload: &[u8]) {
        let mut buf = [0u8; MAX_FRAME_LEN];
        match encode_frame(command, payload, &mut buf) {
            Ok(len) => self.tx.write_all(&buf[..len]),
            // Payload sizes are fixed by the typed helpers below; a
            // mismatch is a programming error, not transport loss.
            Err(_) => error!("link: frame encode failed for command {}", command.id()),
        }
    }

    pub fn send_input_report(&mut self, report_id: u8, data: &[u8; INPUT_REPORT_DATA_LEN]) {
        let mut payload = [0u8; 1 + INPUT_REPORT_DATA_LEN];
        payload[0] = report_id;
        payload[1..].copy_from_slice(data);
        self.send(Command::InputReport, &payload);
    }

    /// Send a snapshot to the peer, stamping the transport-origin flag.
    pub fn send_peer_state(&mut self, state: &PeerState) {
        let mut state = *state;
        state.mark_wireless();
        self.send(Command::PeerState, &state.encode());
    }

    pub fn send_battery(&mut self, level: u32) {
        let payload: [u8; BATTERY_LEN] = level.to_le_bytes();
        self.send(Command::Battery, &payload);
    }

    pub fn send_link_mode(&mut self, preset: u8) {
        let payload: [u8; LINK_MODE_LEN] = [preset];
        self.send(Command::LinkMode, &payload);
    }
}

/// Receive-side service: ring consumer, frame parser, and dispatch state.
pub struct LinkService<'a, const N: usize> {
    spec: DeviceSpec,
    rx: RingConsumer<'a, N>,
    parser: FrameParser,
    stray: heapless::Vec<u8, 64>,
    battery_low_latched: bool,
    pending_protocol: Option<u8>,
}

impl<'a, const N: usize> LinkService<'a, N> {
    pub fn new(spec: DeviceSpec, rx: RingConsumer<'a, N>) -> Self {
        Self {
            spec,
            rx,
            parser: FrameParser::new(),
            stray: heapless::Vec::new(),
            battery_low_latched: false,
            pending_protocol: None,
        }
    }

    /// Discard buffered bytes and any partial frame, e.g. after the serial
    /// line was reinitialized at a different bit rate.
    pub fn reset_rx(&mut self) {
        self.rx.clear();
        self.parser.reset();
    }

    /// Drain the ring and dispatch every frame completed this tick.
    pub fn pump<M, R, P, W>(
        &mut self,
        config: &mut ConfigStore,
        nvm: &mut M,
        reports: &mut R,
        peer: &mut P,
        power: &mut W,
    ) -> Result<(), NvmError>
    where
        M: Nvm,
        R: ReportSink,
        P: PeerSink,
        W: PowerControl,
    {
        while let Some(byte) = self.rx.pop() {
            match self.parser.feed(byte) {
                ParserEvent::None => {}
                ParserEvent::Stray(b) => self.log_stray(b),
                ParserEvent::UnknownCommand(id) => {
                    warn!("link: unknown command {}", id);
                }
                ParserEvent::Frame(frame) => {
                    self.dispatch(&frame, config, nvm, reports, peer, power)?;
                }
            }
        }
        Ok(())
    }

    fn dispatch<M, R, P, W>(
        &mut self,
        frame: &Frame,
        config: &mut ConfigStore,
        nvm: &mut M,
        reports: &mut R,
        peer: &mut P,
        power: &mut W,
    ) -> Result<(), NvmError>
    where
        M: Nvm,
        R: ReportSink,
        P: PeerSink,
        W: PowerControl,
    {
        match frame.command {
            Command::InputReport => {
                reports.report(frame.payload[0], &frame.payload[1..]);
            }
            Command::PeerState => match PeerState::decode(&frame.payload) {
                Ok(mut state) => {
                    state.mark_wireless();
                    peer.deliver(state);
                }
                Err(_) => warn!("link: peer state rejected"),
            },
            Command::Battery => {
                let mut raw = [0u8; BATTERY_LEN];
                raw.copy_from_slice(&frame.payload);
                self.handle_battery(u32::from_le_bytes(raw), config);
            }
            Command::LinkMode => {
                let change = config.set_protocol(frame.payload[0], nvm)?;
                self.apply_protocol_change(change, power);
            }
        }
        Ok(())
    }

    /// Low readings raise the low-battery condition exactly once; a
    /// recovered reading clears the latch so a later drop re-raises it.
    fn handle_battery(&mut self, level: u32, config: &mut ConfigStore) {
        if !self.spec.has_battery_monitor {
            return;
        }
        if config.read().log_mask & LOG_MASK_LINK != 0 {
            info!(
                "link: battery at {}% ({})",
                battery_percentage(level),
                level
            );
        }
        if level < BATTERY_LOW_THRESHOLD {
            if !self.battery_low_latched {
                self.battery_low_latched = true;
                config.set_problem(Problem::LowBattery, true);
            }
        } else {
            self.battery_low_latched = false;
            config.set_problem(Problem::LowBattery, false);
        }
    }

    /// Act on a protocol-preset change: the bridge restarts on the spot,
    /// the controller defers until the peer has been notified.
    pub fn apply_protocol_change<W: PowerControl>(
        &mut self,
        change: ProtocolChange,
        power: &mut W,
    ) {
        match change {
            ProtocolChange::Unchanged => {}
            ProtocolChange::Changed(preset) => match self.spec.role {
                DeviceRole::Bridge => power.restart(),
                DeviceRole::Controller => self.pending_protocol = Some(preset),
            },
        }
    }

    /// Complete a deferred protocol change: mirror the new preset to the
    /// peer, then restart so it takes effect cleanly.
    pub fn flush_pending<S: SerialTx, W: PowerControl>(
        &mut self,
        sender: &mut FrameSender<S>,
        power: &mut W,
    ) {
        if let Some(preset) = self.pending_protocol.take() {
            sender.send_link_mode(preset);
            power.restart();
        }
    }

    /// Stray bytes are incidental text from the peer (boot chatter, log
    /// lines), buffered per line and forwarded to the diagnostic log.
    fn log_stray(&mut self, byte: u8) {
        if byte == b'\n' {
            self.flush_stray();
            return;
        }
        if self.stray.push(byte).is_err() {
            self.flush_stray();
            let _ = self.stray.push(byte);
        }
    }

    fn flush_stray(&mut self) {
        if self.stray.is_empty() {
            return;
        }
        if let Ok(text) = core::str::from_utf8(&self.stray) {
            info!("peer: {=str}", text.trim_end_matches('\r'));
        }
        self.stray.clear();
    }
}
