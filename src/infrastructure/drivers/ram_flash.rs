//! In-memory NOR flash.
//!
//! Behaves like the real part: erase sets whole sectors to `0xFF`, writes can
//! only clear bits. Used as the host flash and in tests.

use alloc::{vec, vec::Vec};

use embedded_storage::nor_flash::{
    ErrorType,
    NorFlash,
    NorFlashError,
    NorFlashErrorKind,
    ReadNorFlash,
};

use crate::config::{ERASED_BYTE, SECTOR_SIZE, WORD_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RamFlashError {
    OutOfBounds,
    NotAligned,
    /// Failure requested through [`RamFlash::fail_erase`] or
    /// [`RamFlash::fail_write`]
    Injected,
}

impl NorFlashError for RamFlashError {
    fn kind(&self) -> NorFlashErrorKind {
        match self {
            RamFlashError::OutOfBounds => NorFlashErrorKind::OutOfBounds,
            RamFlashError::NotAligned => NorFlashErrorKind::NotAligned,
            RamFlashError::Injected => NorFlashErrorKind::Other,
        }
    }
}

pub struct RamFlash {
    data: Vec<u8>,
    fail_erase: bool,
    fail_write: bool,
}

impl RamFlash {
    /// Fully erased flash of `sectors` sectors.
    pub fn new(sectors: u32) -> Self {
        Self {
            data: vec![ERASED_BYTE; (sectors * SECTOR_SIZE) as usize],
            fail_erase: false,
            fail_write: false,
        }
    }

    /// Flash filled with `byte`, as if it held an older image.
    pub fn filled(sectors: u32, byte: u8) -> Self {
        let mut flash = Self::new(sectors);
        flash.data.fill(byte);
        flash
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Make every following erase fail.
    pub fn fail_erase(&mut self, fail: bool) {
        self.fail_erase = fail;
    }

    /// Make every following write fail.
    pub fn fail_write(&mut self, fail: bool) {
        self.fail_write = fail;
    }

    fn check_range(&self, offset: u32, length: usize) -> Result<(), RamFlashError> {
        let end = (offset as usize)
            .checked_add(length)
            .ok_or(RamFlashError::OutOfBounds)?;
        if end > self.data.len() {
            return Err(RamFlashError::OutOfBounds);
        }
        Ok(())
    }
}

impl ErrorType for RamFlash {
    type Error = RamFlashError;
}

impl ReadNorFlash for RamFlash {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.check_range(offset, bytes.len())?;
        let start = offset as usize;
        bytes.copy_from_slice(&self.data[start..start + bytes.len()]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }
}

impl NorFlash for RamFlash {
    const WRITE_SIZE: usize = WORD_SIZE;
    const ERASE_SIZE: usize = SECTOR_SIZE as usize;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        if from > to || to as usize > self.data.len() {
            return Err(RamFlashError::OutOfBounds);
        }
        if !from.is_multiple_of(SECTOR_SIZE) || !to.is_multiple_of(SECTOR_SIZE) {
            return Err(RamFlashError::NotAligned);
        }
        if self.fail_erase {
            return Err(RamFlashError::Injected);
        }
        self.data[from as usize..to as usize].fill(ERASED_BYTE);
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        self.check_range(offset, bytes.len())?;
        if !(offset as usize).is_multiple_of(WORD_SIZE) || !bytes.len().is_multiple_of(WORD_SIZE) {
            return Err(RamFlashError::NotAligned);
        }
        if self.fail_write {
            return Err(RamFlashError::Injected);
        }
        let start = offset as usize;
        for (cell, byte) in self.data[start..start + bytes.len()].iter_mut().zip(bytes) {
            *cell &= *byte;
        }
        Ok(())
    }
}
