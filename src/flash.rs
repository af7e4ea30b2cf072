//! Record storage on the RP2040 on-chip flash.
//!
//! The store occupies the last sectors of flash. Each record slot is one
//! erase sector, so a record rewrite is a single erase + program cycle;
//! a write torn by power loss leaves an invalid header that the core
//! treats as an absent record on the next load.

use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use pad_core::nvm::{Nvm, NvmError, SLOT_SIZE, STORE_SIZE};

/// Total flash size (2MB on the stock boards).
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Flash program page; writes are padded up to this granularity.
const PAGE_SIZE: usize = 256;

/// Base offset of the record store, at the top of flash.
pub const STORE_BASE: u32 = FLASH_SIZE as u32 - STORE_SIZE;

// One record slot must be one erase sector for the single-erase rewrite.
const _: () = assert!(SLOT_SIZE as usize == ERASE_SIZE);

/// [`Nvm`] backend over the blocking flash driver.
pub struct FlashNvm<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
}

impl<'d> FlashNvm<'d> {
    pub fn new(flash: Peri<'d, FLASH>) -> Self {
        Self {
            flash: Flash::new_blocking(flash),
        }
    }
}

impl Nvm for FlashNvm<'_> {
    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), NvmError> {
        if addr + buf.len() as u32 > STORE_SIZE {
            return Err(NvmError::OutOfBounds);
        }
        self.flash
            .blocking_read(STORE_BASE + addr, buf)
            .map_err(|_| NvmError::Read)
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), NvmError> {
        if addr % ERASE_SIZE as u32 != 0 || data.len() > ERASE_SIZE {
            return Err(NvmError::OutOfBounds);
        }
        if addr + data.len() as u32 > STORE_SIZE {
            return Err(NvmError::OutOfBounds);
        }
        let start = STORE_BASE + addr;
        self.flash
            .blocking_erase(start, start + ERASE_SIZE as u32)
            .map_err(|_| NvmError::Write)?;

        // Program full pages; the padding stays in the erased state.
        let mut page = [0xFFu8; PAGE_SIZE];
        for (i, chunk) in data.chunks(PAGE_SIZE).enumerate() {
            page.fill(0xFF);
            page[..chunk.len()].copy_from_slice(chunk);
            self.flash
                .blocking_write(start + (i * PAGE_SIZE) as u32, &page)
                .map_err(|_| NvmError::Write)?;
        }
        Ok(())
    }
}
