//! Versioned codec for the peer-state snapshot.
//!
//! The snapshot is the one structurally-typed payload on the link: a small
//! header plus an opaque data area. It is encoded field by field rather
//! than by memory layout so both ends can evolve the schema behind the
//! version byte.

use crate::command::PEER_STATE_LEN;

/// Current snapshot schema version.
pub const PEER_STATE_VERSION: u8 = 1;

/// Usable data bytes in a snapshot.
pub const PEER_STATE_DATA_LEN: usize = PEER_STATE_LEN - 4;

/// Snapshot crossed the wireless hop before reaching this consumer.
pub const FLAG_WIRELESS: u8 = 1 << 0;

/// Decode failures for a snapshot payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeerStateError {
    /// Wire bytes shorter than a snapshot.
    Truncated,
    /// Unsupported schema version.
    Version(u8),
    /// Declared data length exceeds the data area.
    Length(u8),
}

/// State snapshot exchanged between the devices.
///
/// On the bridge an incoming snapshot is relayed onward to the host-facing
/// side; on the controller it is applied as if it were local input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeerState {
    /// Message kind discriminator, opaque to the transport.
    pub kind: u8,
    /// Transport flags, see [`FLAG_WIRELESS`].
    pub flags: u8,
    /// Valid bytes in `data`.
    pub len: u8,
    /// Data area; bytes past `len` are zero.
    pub data: [u8; PEER_STATE_DATA_LEN],
}

impl PeerState {
    /// Build a snapshot from a kind and data slice.
    pub fn new(kind: u8, data: &[u8]) -> Result<Self, PeerStateError> {
        if data.len() > PEER_STATE_DATA_LEN {
            return Err(PeerStateError::Length(data.len() as u8));
        }
        let mut buf = [0u8; PEER_STATE_DATA_LEN];
        buf[..data.len()].copy_from_slice(data);
        Ok(Self {
            kind,
            flags: 0,
            len: data.len() as u8,
            data: buf,
        })
    }

    /// Valid portion of the data area.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    /// Stamp the transport-origin flag before relaying.
    #[inline]
    pub fn mark_wireless(&mut self) {
        self.flags |= FLAG_WIRELESS;
    }

    /// Whether this snapshot crossed the wireless hop.
    #[inline]
    #[must_use]
    pub fn is_wireless(&self) -> bool {
        self.flags & FLAG_WIRELESS != 0
    }

    /// Encode to the fixed wire layout.
    #[must_use]
    pub fn encode(&self) -> [u8; PEER_STATE_LEN] {
        let mut buf = [0u8; PEER_STATE_LEN];
        buf[0] = PEER_STATE_VERSION;
        buf[1] = self.kind;
        buf[2] = self.flags;
        buf[3] = self.len;
        buf[4..].copy_from_slice(&self.data);
        buf
    }

    /// Decode from wire bytes, validating version and declared length.
    pub fn decode(buf: &[u8]) -> Result<Self, PeerStateError> {
        if buf.len() < PEER_STATE_LEN {
            return Err(PeerStateError::Truncated);
        }
        if buf[0] != PEER_STATE_VERSION {
            return Err(PeerStateError::Version(buf[0]));
        }
        let len = buf[3];
        if len as usize > PEER_STATE_DATA_LEN {
            return Err(PeerStateError::Length(len));
        }
        let mut data = [0u8; PEER_STATE_DATA_LEN];
        data.copy_from_slice(&buf[4..PEER_STATE_LEN]);
        Ok(Self {
            kind: buf[1],
            flags: buf[2],
            len,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let state = PeerState::new(7, &[1, 2, 3, 4, 5]).unwrap();
        let wire = state.encode();
        let back = PeerState::decode(&wire).unwrap();
        assert_eq!(back, state);
        assert_eq!(back.payload(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_wireless_flag() {
        let mut state = PeerState::new(1, &[]).unwrap();
        assert!(!state.is_wireless());
        state.mark_wireless();
        assert!(state.is_wireless());
        let back = PeerState::decode(&state.encode()).unwrap();
        assert!(back.is_wireless());
    }

    #[test]
    fn test_rejects_bad_version() {
        let mut wire = PeerState::new(1, &[9]).unwrap().encode();
        wire[0] = 0xFE;
        assert_eq!(PeerState::decode(&wire), Err(PeerStateError::Version(0xFE)));
    }

    #[test]
    fn test_rejects_bad_length() {
        let mut wire = PeerState::new(1, &[9]).unwrap().encode();
        wire[3] = PEER_STATE_DATA_LEN as u8 + 1;
        assert!(matches!(
            PeerState::decode(&wire),
            Err(PeerStateError::Length(_))
        ));
    }

    #[test]
    fn test_rejects_oversized_data() {
        let data = [0u8; PEER_STATE_DATA_LEN + 1];
        assert!(PeerState::new(0, &data).is_err());
    }

    #[test]
    fn test_rejects_truncated_wire() {
        let wire = [0u8; PEER_STATE_LEN - 1];
        assert_eq!(PeerState::decode(&wire), Err(PeerStateError::Truncated));
    }
}
