//! Built-in profile templates.
//!
//! Each archetype produces a complete [`ProfileRecord`] stamped with the
//! current profile version. Action codes are opaque to this layer; the
//! templates only shape the input-element modes and ranges, the action
//! tables are filled by the host-side editor.

use heapless::String;

use crate::profile::{
    GyroBinding, ProfileMeta, ProfileRecord, GYRO_MODE_ALWAYS, GYRO_MODE_OFF, GYRO_MODE_TOUCH,
    PROFILE_VERSION, STICK_MODE_4DIR, STICK_MODE_ANALOG, STICK_MODE_OFF,
};

/// Built-in profile archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Template {
    /// Home/menu profile for slot 0.
    Home,
    /// General-purpose aim profile blending stick and gyro.
    FpsFusion,
    Racing,
    Console,
    Desktop,
    FpsWasd,
    Flight,
    ConsoleLegacy,
    Rts,
    /// Fully blank profile for user-custom slots.
    Custom,
}

impl Template {
    /// Default template for a storage slot.
    pub fn for_slot(slot: u8) -> Template {
        match slot {
            0 => Template::Home,
            1 => Template::FpsFusion,
            2 => Template::Racing,
            3 => Template::Console,
            4 => Template::Desktop,
            5 => Template::FpsWasd,
            6 => Template::Flight,
            7 => Template::ConsoleLegacy,
            8 => Template::Rts,
            _ => Template::Custom,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Template::Home => "Home",
            Template::FpsFusion => "FPS Fusion",
            Template::Racing => "Racing",
            Template::Console => "Console",
            Template::Desktop => "Desktop",
            Template::FpsWasd => "FPS WASD",
            Template::Flight => "Flight",
            Template::ConsoleLegacy => "Console Legacy",
            Template::Rts => "RTS",
            Template::Custom => "Custom",
        }
    }

    /// Build the template's profile record.
    pub fn record(self) -> ProfileRecord {
        let mut name = String::new();
        // Template names all fit the 24-byte field.
        let _ = name.push_str(self.name());
        let mut record = ProfileRecord {
            meta: ProfileMeta {
                version: PROFILE_VERSION,
                name,
            },
            ..ProfileRecord::default()
        };
        match self {
            Template::Home | Template::Custom => {}
            Template::FpsFusion => {
                record.sticks[0].mode = STICK_MODE_4DIR;
                record.gyro = GyroBinding {
                    mode: GYRO_MODE_TOUCH,
                    engage: 1,
                    ..GyroBinding::default()
                };
                record.gyro.x.angle_min = -90;
                record.gyro.x.angle_max = 90;
                record.gyro.y.angle_min = -90;
                record.gyro.y.angle_max = 90;
            }
            Template::Racing => {
                record.sticks[0].mode = STICK_MODE_ANALOG;
                record.sticks[0].saturation = 100;
                record.gyro.mode = GYRO_MODE_OFF;
            }
            Template::Console | Template::ConsoleLegacy => {
                record.sticks[0].mode = STICK_MODE_ANALOG;
                record.sticks[1].mode = STICK_MODE_ANALOG;
                record.sticks[1].saturation = 70;
            }
            Template::Desktop => {
                record.sticks[0].mode = STICK_MODE_4DIR;
                record.gyro = GyroBinding {
                    mode: GYRO_MODE_ALWAYS,
                    engage: 0,
                    ..GyroBinding::default()
                };
            }
            Template::FpsWasd => {
                record.sticks[0].mode = STICK_MODE_4DIR;
                record.sticks[0].overlap = 65;
                record.gyro.mode = GYRO_MODE_TOUCH;
            }
            Template::Flight => {
                record.sticks[0].mode = STICK_MODE_OFF;
                record.sticks[1].mode = STICK_MODE_OFF;
                record.sticks[1].saturation = 70;
                record.gyro.mode = GYRO_MODE_OFF;
            }
            Template::Rts => {
                record.sticks[0].mode = STICK_MODE_4DIR;
                record.gyro.mode = GYRO_MODE_OFF;
            }
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_mapping() {
        assert_eq!(Template::for_slot(0), Template::Home);
        assert_eq!(Template::for_slot(6), Template::Flight);
        assert_eq!(Template::for_slot(9), Template::Custom);
        assert_eq!(Template::for_slot(12), Template::Custom);
    }

    #[test]
    fn test_records_carry_current_version_and_name() {
        for slot in 0..13 {
            let template = Template::for_slot(slot);
            let record = template.record();
            assert_eq!(record.meta.version, PROFILE_VERSION);
            assert_eq!(record.meta.name.as_str(), template.name());
        }
    }

    #[test]
    fn test_archetypes_differ() {
        let fusion = Template::FpsFusion.record();
        let racing = Template::Racing.record();
        assert_ne!(fusion.gyro.mode, racing.gyro.mode);
        assert_ne!(fusion.sticks[0].mode, racing.sticks[0].mode);
    }

    #[test]
    fn test_custom_is_blank() {
        let custom = Template::Custom.record();
        assert_eq!(custom.gyro.mode, GYRO_MODE_OFF);
        assert_eq!(custom.sticks[0].mode, STICK_MODE_OFF);
        assert!(custom.buttons.iter().all(|b| b.actions == [0; 4]));
    }
}
