//! Description of the running hardware variant.
//!
//! One firmware core serves several SKUs; instead of compiling per-variant
//! branches, the boot code builds a [`DeviceSpec`] describing the variant's
//! capability set and the core consumes it uniformly.

/// Which side of the radio link this device is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceRole {
    /// Handheld controller board.
    Controller,
    /// Radio bridge relaying frames to the host interface.
    Bridge,
}

/// Board revision, probed from strap pins at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardRevision {
    Gen1,
    Gen2,
    Gen3,
}

/// The revision probe returned a pattern no known board produces.
///
/// Downstream code branches on the revision unconditionally, so callers
/// must treat this as fatal and halt rather than guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownRevision(pub u8);

impl BoardRevision {
    pub fn from_probe(raw: u8) -> Result<Self, UnknownRevision> {
        match raw {
            0 => Ok(BoardRevision::Gen1),
            1 => Ok(BoardRevision::Gen2),
            2 => Ok(BoardRevision::Gen3),
            other => Err(UnknownRevision(other)),
        }
    }
}

/// Capability set of the active hardware variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceSpec {
    pub role: DeviceRole,
    pub revision: BoardRevision,
    /// Profile slots this variant persists.
    pub profile_slots: u8,
    /// Whether a battery fuel gauge reports over the link.
    pub has_battery_monitor: bool,
    /// Whether the board carries a right thumbstick.
    pub has_right_stick: bool,
}

impl DeviceSpec {
    /// Controller board capability set for the given revision.
    pub fn controller(revision: BoardRevision) -> Self {
        Self {
            role: DeviceRole::Controller,
            revision,
            profile_slots: crate::nvm::PROFILE_SLOTS as u8,
            has_battery_monitor: matches!(revision, BoardRevision::Gen2 | BoardRevision::Gen3),
            has_right_stick: !matches!(revision, BoardRevision::Gen1),
        }
    }

    /// Radio bridge capability set. The bridge persists no profiles and
    /// has no local inputs; it only mirrors the shared configuration.
    pub fn bridge(revision: BoardRevision) -> Self {
        Self {
            role: DeviceRole::Bridge,
            revision,
            profile_slots: 0,
            has_battery_monitor: false,
            has_right_stick: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_probe() {
        assert_eq!(BoardRevision::from_probe(0), Ok(BoardRevision::Gen1));
        assert_eq!(BoardRevision::from_probe(2), Ok(BoardRevision::Gen3));
        assert_eq!(BoardRevision::from_probe(7), Err(UnknownRevision(7)));
    }

    #[test]
    fn test_variant_capabilities() {
        let v1 = DeviceSpec::controller(BoardRevision::Gen1);
        assert!(!v1.has_battery_monitor);
        assert!(!v1.has_right_stick);

        let v2 = DeviceSpec::controller(BoardRevision::Gen2);
        assert!(v2.has_battery_monitor);
        assert!(v2.has_right_stick);

        let bridge = DeviceSpec::bridge(BoardRevision::Gen1);
        assert_eq!(bridge.profile_slots, 0);
        assert!(!bridge.has_battery_monitor);
    }
}
