//! Versioned input-mapping profiles, one per storage slot.
//!
//! Slot 0 is the home/menu profile and carries a stricter minimum-version
//! policy: a home profile authored under an older schema is rejected
//! sooner than a regular one. Every slot is independently dirty-tracked so
//! an edit to one never forces a write of the others.

use core::fmt::Write as _;

use heapless::String;

use crate::nvm::{profile_addr, Nvm, NvmError, Reader, Writer, CONTROL_BYTE, PROFILE_SLOTS};
use crate::templates::Template;

/// Version stamped into profiles authored by this firmware.
pub const PROFILE_VERSION: (u8, u8, u8) = (1, 3, 0);
/// Minimum acceptable version for regular slots.
pub const MIN_PROFILE_VERSION: (u8, u8, u8) = (1, 0, 0);
/// Minimum acceptable version for the home slot.
pub const MIN_HOME_VERSION: (u8, u8, u8) = (1, 2, 0);

/// Slots at and above this index are user-custom and get numbered names.
pub const FIRST_CUSTOM_SLOT: u8 = 9;

/// Encoded size of one profile record.
pub const PROFILE_RECORD_LEN: usize = 308;

/// Profile flushes share the flash-wear cadence of the config cache.
pub const SYNC_INTERVAL: u16 = crate::config::SYNC_INTERVAL;

pub const NAME_LEN: usize = 24;

/// Four action codes bound to one trigger level.
pub type Actions = [u8; 4];

pub const STICK_MODE_OFF: u8 = 0;
pub const STICK_MODE_4DIR: u8 = 1;
pub const STICK_MODE_ANALOG: u8 = 2;

pub const GYRO_MODE_OFF: u8 = 0;
pub const GYRO_MODE_TOUCH: u8 = 1;
pub const GYRO_MODE_ALWAYS: u8 = 2;

/// Physical buttons a profile binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ButtonSlot {
    A,
    B,
    X,
    Y,
    DpadLeft,
    DpadRight,
    DpadUp,
    DpadDown,
    Select1,
    Select2,
    Start1,
    Start2,
    L1,
    R1,
    L2,
    R2,
    L4,
    R4,
}

pub const BUTTON_COUNT: usize = 18;

impl ButtonSlot {
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonBinding {
    pub mode: u8,
    pub actions: Actions,
    pub actions_secondary: Actions,
}

/// Rotary encoder bindings: one action set per step direction and mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RotaryBinding {
    pub up: [Actions; 5],
    pub down: [Actions; 5],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StickBinding {
    pub mode: u8,
    pub overlap: u8,
    pub saturation: u8,
    /// Left, right, up, down.
    pub directions: [Actions; 4],
    pub push: Actions,
}

impl Default for StickBinding {
    fn default() -> Self {
        Self {
            mode: STICK_MODE_OFF,
            overlap: 50,
            saturation: 100,
            directions: [[0; 4]; 4],
            push: [0; 4],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroAxis {
    pub angle_min: i8,
    pub angle_max: i8,
    pub actions_neg: Actions,
    pub actions_pos: Actions,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroBinding {
    pub mode: u8,
    pub engage: u8,
    pub x: GyroAxis,
    pub y: GyroAxis,
    pub z: GyroAxis,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileMeta {
    pub version: (u8, u8, u8),
    pub name: String<NAME_LEN>,
}

/// One input-mapping profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileRecord {
    pub meta: ProfileMeta,
    pub buttons: [ButtonBinding; BUTTON_COUNT],
    pub rotary: RotaryBinding,
    /// Left and right thumbstick.
    pub sticks: [StickBinding; 2],
    pub gyro: GyroBinding,
}

impl ProfileRecord {
    pub fn button(&self, slot: ButtonSlot) -> &ButtonBinding {
        &self.buttons[slot.index()]
    }
}

/// Whole-section overwrite applied to a slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionUpdate {
    Meta(ProfileMeta),
    Button(ButtonSlot, ButtonBinding),
    Rotary(RotaryBinding),
    LeftStick(StickBinding),
    RightStick(StickBinding),
    Gyro(GyroBinding),
}

/// Source for a whole-slot copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopySource {
    /// Another live slot.
    Slot(u8),
    /// A built-in template.
    Template(Template),
}

#[inline]
const fn version_scalar(version: (u8, u8, u8)) -> u32 {
    version.0 as u32 * 1_000_000 + version.1 as u32 * 1_000 + version.2 as u32
}

/// Minimum acceptable version for a given slot.
#[inline]
fn min_version(slot: u8) -> (u8, u8, u8) {
    if slot == 0 {
        MIN_HOME_VERSION
    } else {
        MIN_PROFILE_VERSION
    }
}

pub(crate) fn encode_record(record: &ProfileRecord, buf: &mut [u8]) -> usize {
    let mut w = Writer::new(buf);
    w.u8(CONTROL_BYTE);
    w.u8(record.meta.version.0);
    w.u8(record.meta.version.1);
    w.u8(record.meta.version.2);
    let mut name = [0u8; NAME_LEN];
    name[..record.meta.name.len()].copy_from_slice(record.meta.name.as_bytes());
    w.bytes(&name);
    for button in &record.buttons {
        w.u8(button.mode);
        w.bytes(&button.actions);
        w.bytes(&button.actions_secondary);
    }
    for actions in record.rotary.up.iter().chain(record.rotary.down.iter()) {
        w.bytes(actions);
    }
    for stick in &record.sticks {
        w.u8(stick.mode);
        w.u8(stick.overlap);
        w.u8(stick.saturation);
        for actions in &stick.directions {
            w.bytes(actions);
        }
        w.bytes(&stick.push);
    }
    w.u8(record.gyro.mode);
    w.u8(record.gyro.engage);
    for axis in [&record.gyro.x, &record.gyro.y, &record.gyro.z] {
        w.u8(axis.angle_min as u8);
        w.u8(axis.angle_max as u8);
        w.bytes(&axis.actions_neg);
        w.bytes(&axis.actions_pos);
    }
    w.pos()
}

pub(crate) fn decode_record(buf: &[u8]) -> Option<ProfileRecord> {
    let mut r = Reader::new(buf);
    if r.u8()? != CONTROL_BYTE {
        return None;
    }
    let mut record = ProfileRecord {
        meta: ProfileMeta {
            version: (r.u8()?, r.u8()?, r.u8()?),
            name: String::new(),
        },
        ..ProfileRecord::default()
    };
    let name = r.bytes(NAME_LEN)?;
    let end = name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
    let text = core::str::from_utf8(&name[..end]).ok()?;
    record.meta.name.push_str(text).ok()?;
    for button in record.buttons.iter_mut() {
        button.mode = r.u8()?;
        button.actions.copy_from_slice(r.bytes(4)?);
        button.actions_secondary.copy_from_slice(r.bytes(4)?);
    }
    for actions in record
        .rotary
        .up
        .iter_mut()
        .chain(record.rotary.down.iter_mut())
    {
        actions.copy_from_slice(r.bytes(4)?);
    }
    for stick in record.sticks.iter_mut() {
        stick.mode = r.u8()?;
        stick.overlap = r.u8()?;
        stick.saturation = r.u8()?;
        for actions in stick.directions.iter_mut() {
            actions.copy_from_slice(r.bytes(4)?);
        }
        stick.push.copy_from_slice(r.bytes(4)?);
    }
    record.gyro.mode = r.u8()?;
    record.gyro.engage = r.u8()?;
    for axis in [
        &mut record.gyro.x,
        &mut record.gyro.y,
        &mut record.gyro.z,
    ] {
        axis.angle_min = r.u8()? as i8;
        axis.angle_max = r.u8()? as i8;
        axis.actions_neg.copy_from_slice(r.bytes(4)?);
        axis.actions_pos.copy_from_slice(r.bytes(4)?);
    }
    Some(record)
}

/// In-memory mirror of the profile slots with per-slot dirty tracking.
pub struct ProfileStore {
    slots: [ProfileRecord; PROFILE_SLOTS],
    synced: [bool; PROFILE_SLOTS],
    sync_tick: u16,
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileStore {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| ProfileRecord::default()),
            synced: [false; PROFILE_SLOTS],
            sync_tick: 0,
        }
    }

    /// Load every slot from storage, defaulting the invalid ones.
    pub fn load_all<N: Nvm>(&mut self, nvm: &mut N) -> Result<(), NvmError> {
        info!("nvm: loading profiles");
        for slot in 0..PROFILE_SLOTS as u8 {
            self.load(slot, nvm)?;
        }
        Ok(())
    }

    /// Load one slot. A record failing the header or the slot's minimum
    /// version is replaced by its built-in default and persisted
    /// immediately, so the next boot is clean.
    pub fn load<N: Nvm>(&mut self, slot: u8, nvm: &mut N) -> Result<(), NvmError> {
        debug!("profile: load slot {}", slot);
        self.slots[slot as usize] = ProfileRecord::default();
        let mut buf = [0u8; PROFILE_RECORD_LEN];
        nvm.read(profile_addr(slot), &mut buf)?;
        let record = match decode_record(&buf) {
            Some(record) => record,
            None => {
                warn!("profile: slot {} missing or corrupt, using default", slot);
                return self.default(slot, Template::for_slot(slot), nvm);
            }
        };
        if version_scalar(record.meta.version) < version_scalar(min_version(slot)) {
            warn!("profile: slot {} has incompatible version, using default", slot);
            return self.default(slot, Template::for_slot(slot), nvm);
        }
        self.slots[slot as usize] = record;
        self.synced[slot as usize] = true;
        Ok(())
    }

    /// Persist one slot and mark it synced.
    pub fn write<N: Nvm>(&mut self, slot: u8, nvm: &mut N) -> Result<(), NvmError> {
        info!("nvm: profile {} write", slot);
        let mut buf = [0u8; PROFILE_RECORD_LEN];
        let len = encode_record(&self.slots[slot as usize], &mut buf);
        nvm.write(profile_addr(slot), &buf[..len])?;
        self.synced[slot as usize] = true;
        Ok(())
    }

    /// Reset a slot from a built-in template and persist it immediately.
    /// Custom slots get a numbered display name.
    pub fn default<N: Nvm>(
        &mut self,
        slot: u8,
        template: Template,
        nvm: &mut N,
    ) -> Result<(), NvmError> {
        info!("profile: slot {} init from template", slot);
        let mut record = template.record();
        if template == Template::Custom && slot >= FIRST_CUSTOM_SLOT {
            record.meta.name.clear();
            // Name fits: "Custom " plus one digit.
            let _ = write!(record.meta.name, "Custom {}", slot - FIRST_CUSTOM_SLOT + 1);
        }
        self.slots[slot as usize] = record;
        self.write(slot, nvm)
    }

    /// Reset every slot from its default template.
    pub fn default_all<N: Nvm>(&mut self, nvm: &mut N) -> Result<(), NvmError> {
        debug!("profile: init all slots from templates");
        for slot in 0..PROFILE_SLOTS as u8 {
            self.default(slot, Template::for_slot(slot), nvm)?;
        }
        Ok(())
    }

    /// Copy a slot or template into `dst`, preserving the destination's
    /// display name. The slot is left dirty for the next sync tick.
    pub fn overwrite(&mut self, dst: u8, source: CopySource) {
        debug!("profile: overwrite slot {}", dst);
        let name = self.slots[dst as usize].meta.name.clone();
        let mut record = match source {
            CopySource::Slot(src) => self.slots[src as usize].clone(),
            CopySource::Template(template) => template.record(),
        };
        record.meta.name = name;
        self.slots[dst as usize] = record;
        self.synced[dst as usize] = false;
    }

    /// Whole-section overwrite; marks only the touched slot dirty.
    pub fn set_section(&mut self, slot: u8, section: SectionUpdate) {
        let record = &mut self.slots[slot as usize];
        match section {
            SectionUpdate::Meta(meta) => record.meta = meta,
            SectionUpdate::Button(which, binding) => record.buttons[which.index()] = binding,
            SectionUpdate::Rotary(rotary) => record.rotary = rotary,
            SectionUpdate::LeftStick(stick) => record.sticks[0] = stick,
            SectionUpdate::RightStick(stick) => record.sticks[1] = stick,
            SectionUpdate::Gyro(gyro) => record.gyro = gyro,
        }
        self.synced[slot as usize] = false;
    }

    /// Flag a slot's persisted/in-memory agreement without writing.
    pub fn set_sync(&mut self, slot: u8, state: bool) {
        self.synced[slot as usize] = state;
    }

    pub fn is_dirty(&self, slot: u8) -> bool {
        !self.synced[slot as usize]
    }

    pub fn record(&self, slot: u8) -> &ProfileRecord {
        &self.slots[slot as usize]
    }

    /// Periodic flush on the shared flash-wear cadence; writes only the
    /// slots whose flag says they diverged from storage.
    pub fn sync<N: Nvm>(&mut self, nvm: &mut N) -> Result<(), NvmError> {
        self.sync_tick += 1;
        if self.sync_tick < SYNC_INTERVAL {
            return Ok(());
        }
        self.sync_tick = 0;
        for slot in 0..PROFILE_SLOTS as u8 {
            if !self.synced[slot as usize] {
                self.write(slot, nvm)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nvm::MemNvm;

    fn loaded_store(nvm: &mut MemNvm) -> ProfileStore {
        let mut store = ProfileStore::new();
        store.load_all(nvm).unwrap();
        store
    }

    /// Persist a forged record with an arbitrary version into a slot.
    fn forge_version(nvm: &mut MemNvm, slot: u8, version: (u8, u8, u8)) {
        let mut record = Template::for_slot(slot).record();
        record.meta.version = version;
        let mut buf = [0u8; PROFILE_RECORD_LEN];
        let len = encode_record(&record, &mut buf);
        use crate::nvm::Nvm as _;
        nvm.write(profile_addr(slot), &buf[..len]).unwrap();
    }

    #[test]
    fn test_record_len_constant_matches_codec() {
        let mut buf = [0u8; PROFILE_RECORD_LEN];
        let len = encode_record(&ProfileRecord::default(), &mut buf);
        assert_eq!(len, PROFILE_RECORD_LEN);
    }

    #[test]
    fn test_codec_roundtrip() {
        let mut record = Template::FpsFusion.record();
        record.buttons[ButtonSlot::A.index()] = ButtonBinding {
            mode: 3,
            actions: [1, 2, 3, 4],
            actions_secondary: [5, 6, 7, 8],
        };
        record.gyro.x.angle_min = -45;
        let mut buf = [0u8; PROFILE_RECORD_LEN];
        encode_record(&record, &mut buf);
        assert_eq!(decode_record(&buf), Some(record));
    }

    #[test]
    fn test_first_boot_defaults_all_slots() {
        let mut nvm = MemNvm::new();
        let store = loaded_store(&mut nvm);
        assert_eq!(store.record(0).meta.name.as_str(), "Home");
        assert_eq!(store.record(2).meta.name.as_str(), "Racing");
        assert!(!store.is_dirty(0));

        // Defaults were persisted: a fresh store loads them unchanged.
        let reloaded = loaded_store(&mut nvm);
        assert_eq!(reloaded.record(2), store.record(2));
    }

    #[test]
    fn test_custom_slots_get_numbered_names() {
        let mut nvm = MemNvm::new();
        let store = loaded_store(&mut nvm);
        assert_eq!(store.record(9).meta.name.as_str(), "Custom 1");
        assert_eq!(store.record(12).meta.name.as_str(), "Custom 4");
    }

    #[test]
    fn test_old_version_replaced_and_persisted() {
        let mut nvm = MemNvm::new();
        loaded_store(&mut nvm);
        forge_version(&mut nvm, 3, (0, 9, 0));

        let mut store = ProfileStore::new();
        store.load(3, &mut nvm).unwrap();
        assert_eq!(store.record(3).meta.version, PROFILE_VERSION);
        assert!(!store.is_dirty(3));

        // The replacement was written back immediately.
        let mut reloaded = ProfileStore::new();
        reloaded.load(3, &mut nvm).unwrap();
        assert_eq!(reloaded.record(3).meta.version, PROFILE_VERSION);
    }

    #[test]
    fn test_home_slot_minimum_is_stricter() {
        let mut nvm = MemNvm::new();
        loaded_store(&mut nvm);
        // Below the home minimum but above the regular one.
        forge_version(&mut nvm, 0, (1, 1, 0));
        forge_version(&mut nvm, 1, (1, 1, 0));

        let mut store = ProfileStore::new();
        store.load(0, &mut nvm).unwrap();
        store.load(1, &mut nvm).unwrap();
        assert_eq!(store.record(0).meta.version, PROFILE_VERSION);
        assert_eq!(store.record(1).meta.version, (1, 1, 0));
    }

    #[test]
    fn test_valid_slot_left_untouched_and_synced() {
        let mut nvm = MemNvm::new();
        let mut store = loaded_store(&mut nvm);
        forge_version(&mut nvm, 5, (2, 0, 0));
        store.load(5, &mut nvm).unwrap();
        assert_eq!(store.record(5).meta.version, (2, 0, 0));
        assert!(!store.is_dirty(5));
    }

    #[test]
    fn test_overwrite_preserves_name() {
        let mut nvm = MemNvm::new();
        let mut store = loaded_store(&mut nvm);
        store.overwrite(2, CopySource::Slot(1));
        assert_eq!(store.record(2).meta.name.as_str(), "Racing");
        assert_eq!(store.record(2).gyro, store.record(1).gyro);
        assert!(store.is_dirty(2));

        store.overwrite(9, CopySource::Template(Template::Flight));
        assert_eq!(store.record(9).meta.name.as_str(), "Custom 1");
    }

    #[test]
    fn test_section_update_dirties_only_that_slot() {
        let mut nvm = MemNvm::new();
        let mut store = loaded_store(&mut nvm);
        store.set_section(
            4,
            SectionUpdate::Button(
                ButtonSlot::X,
                ButtonBinding {
                    mode: 1,
                    actions: [9, 0, 0, 0],
                    actions_secondary: [0; 4],
                },
            ),
        );
        assert!(store.is_dirty(4));
        for slot in (0..PROFILE_SLOTS as u8).filter(|&s| s != 4) {
            assert!(!store.is_dirty(slot));
        }
        assert_eq!(store.record(4).button(ButtonSlot::X).actions[0], 9);
    }

    #[test]
    fn test_sync_writes_only_dirty_slots() {
        let mut nvm = MemNvm::new();
        let mut store = loaded_store(&mut nvm);
        store.set_section(6, SectionUpdate::Gyro(GyroBinding {
            mode: GYRO_MODE_ALWAYS,
            ..GyroBinding::default()
        }));
        for _ in 0..SYNC_INTERVAL {
            store.sync(&mut nvm).unwrap();
        }
        assert!(!store.is_dirty(6));

        let reloaded = loaded_store(&mut nvm);
        assert_eq!(reloaded.record(6).gyro.mode, GYRO_MODE_ALWAYS);
    }

    #[test]
    fn test_set_sync_flags_without_writing() {
        let mut nvm = MemNvm::new();
        let mut store = loaded_store(&mut nvm);
        store.set_sync(7, false);
        assert!(store.is_dirty(7));
        store.set_sync(7, true);
        assert!(!store.is_dirty(7));
    }
}
