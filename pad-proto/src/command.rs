//! Command identifiers and the static payload-length table.
//!
//! Payload lengths are a fixed function of the command identifier; the
//! receiver must know this table a priori. Adding a command means updating
//! both ends of the link.

/// Fixed 3-byte synchronization marker that prefixes every frame.
pub const SYNC: [u8; 3] = [0xAA, 0x55, 0x5A];

/// Opaque data bytes carried by an input report (after the report id).
pub const INPUT_REPORT_DATA_LEN: usize = 12;

/// Input report payload: 1 report-id byte plus the report data.
pub const INPUT_REPORT_LEN: usize = 1 + INPUT_REPORT_DATA_LEN;

/// Peer-state snapshot payload length, see [`crate::peer::PeerState`].
pub const PEER_STATE_LEN: usize = 32;

/// Battery telemetry payload: raw level as a little-endian u32.
pub const BATTERY_LEN: usize = 4;

/// Mode-change payload: a single protocol preset identifier.
pub const LINK_MODE_LEN: usize = 1;

/// Largest payload any command can carry.
pub const MAX_PAYLOAD_LEN: usize = PEER_STATE_LEN;

/// Commands understood on both sides of the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// HID input report relayed between the devices.
    InputReport = 0x01,
    /// Structurally-typed state snapshot, relayed or applied per role.
    PeerState = 0x02,
    /// Raw battery level from the controller's fuel gauge.
    Battery = 0x03,
    /// Active communication-protocol preset changed.
    LinkMode = 0x04,
}

/// Byte did not name a known command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownCommand(pub u8);

impl Command {
    /// Wire identifier for this command.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Statically known payload length for this command.
    #[inline]
    #[must_use]
    pub const fn payload_len(self) -> usize {
        match self {
            Command::InputReport => INPUT_REPORT_LEN,
            Command::PeerState => PEER_STATE_LEN,
            Command::Battery => BATTERY_LEN,
            Command::LinkMode => LINK_MODE_LEN,
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = UnknownCommand;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0x01 => Ok(Command::InputReport),
            0x02 => Ok(Command::PeerState),
            0x03 => Ok(Command::Battery),
            0x04 => Ok(Command::LinkMode),
            other => Err(UnknownCommand(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_roundtrip() {
        for cmd in [
            Command::InputReport,
            Command::PeerState,
            Command::Battery,
            Command::LinkMode,
        ] {
            assert_eq!(Command::try_from(cmd.id()), Ok(cmd));
        }
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(Command::try_from(0x00), Err(UnknownCommand(0x00)));
        assert_eq!(Command::try_from(0x7F), Err(UnknownCommand(0x7F)));
    }

    #[test]
    fn test_max_payload_covers_table() {
        for cmd in [
            Command::InputReport,
            Command::PeerState,
            Command::Battery,
            Command::LinkMode,
        ] {
            assert!(cmd.payload_len() <= MAX_PAYLOAD_LEN);
        }
    }
}
