//! Administrative operations behind the debug-console boundary.
//!
//! The console accepts single-character commands; scanning the line is the
//! platform's job, this module only maps characters to operations and runs
//! them against the owned services.

use crate::config::{ConfigStore, Problem};
use crate::link::PowerControl;
use crate::nvm::{Nvm, NvmError};
use crate::profile::ProfileStore;

/// Measured calibration offsets, produced by the platform routine.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CalibrationResult {
    /// Thumbstick center offsets: left x/y, right x/y.
    pub thumbstick: (f32, f32, f32, f32),
    pub gyro_0: [f32; 3],
    pub gyro_1: [f32; 3],
}

/// Measurement routine run while the device rests on a flat surface.
pub trait Calibrator {
    fn run(&mut self) -> CalibrationResult;
}

/// Hardware self-test routine.
pub trait SelfTest {
    /// Returns whether all checks passed.
    fn run(&mut self) -> bool;
}

/// Operations reachable from the debug console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdminOp {
    Restart,
    Bootloader,
    Calibrate,
    FactoryReset,
    ConfigReset,
    ProfileReset,
    SelfTest,
}

impl AdminOp {
    /// Map a console character to its operation.
    pub fn from_char(c: u8) -> Option<AdminOp> {
        match c {
            b'R' => Some(AdminOp::Restart),
            b'B' => Some(AdminOp::Bootloader),
            b'C' => Some(AdminOp::Calibrate),
            b'F' => Some(AdminOp::FactoryReset),
            b'D' => Some(AdminOp::ConfigReset),
            b'P' => Some(AdminOp::ProfileReset),
            b'T' => Some(AdminOp::SelfTest),
            _ => None,
        }
    }
}

/// Run one administrative operation.
pub fn handle<N, W, C, T>(
    op: AdminOp,
    config: &mut ConfigStore,
    profiles: &mut ProfileStore,
    nvm: &mut N,
    power: &mut W,
    calibrator: &mut C,
    self_test: &mut T,
) -> Result<(), NvmError>
where
    N: Nvm,
    W: PowerControl,
    C: Calibrator,
    T: SelfTest,
{
    match op {
        AdminOp::Restart => {
            info!("admin: restart");
            power.restart();
        }
        AdminOp::Bootloader => {
            info!("admin: bootloader mode");
            power.bootloader();
        }
        AdminOp::Calibrate => {
            info!("admin: calibration starting, leave the device on a flat surface");
            let result = calibrator.run();
            let (lx, ly, rx, ry) = result.thumbstick;
            config.set_thumbstick_offset(lx, ly, rx, ry);
            config.set_gyro_offset(result.gyro_0, result.gyro_1);
            config.set_problem(Problem::Calibration, false);
            config.write(nvm)?;
            info!("admin: calibration completed");
        }
        AdminOp::FactoryReset => {
            info!("admin: reset to factory defaults");
            profiles.default_all(nvm)?;
            config.delete(nvm)?;
            power.restart();
        }
        AdminOp::ConfigReset => {
            info!("admin: reset config");
            config.delete(nvm)?;
            power.restart();
        }
        AdminOp::ProfileReset => {
            info!("admin: reset profiles");
            profiles.default_all(nvm)?;
            power.restart();
        }
        AdminOp::SelfTest => {
            if self_test.run() {
                info!("admin: self-test passed");
            } else {
                error!("admin: self-test failed");
            }
        }
    }
    Ok(())
}
