use core::fmt;

use crate::domain::entity::{FlashSizeMap, UserBin};

/// Error type for the raw flash operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashError {
    /// Sector erase was refused by the driver
    Erase,
    /// Word write was refused by the driver
    Write,
    /// Read was refused by the driver
    Read,
    /// Address range is outside of the device
    OutOfBounds,
    /// Offset or length is not word aligned
    NotAligned,
}

impl fmt::Display for FlashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlashError::Erase => f.write_str("flash erase failed"),
            FlashError::Write => f.write_str("flash write failed"),
            FlashError::Read => f.write_str("flash read failed"),
            FlashError::OutOfBounds => f.write_str("flash access out of bounds"),
            FlashError::NotAligned => f.write_str("flash access not aligned"),
        }
    }
}

/// Raw SPI flash access used by the upgrade cursor.
pub trait FlashDriver {
    /// Erase one sector, leaving every byte at `0xFF`.
    fn erase_sector(&mut self, sector: u16) -> Result<(), FlashError>;

    /// Write whole words at an absolute, word aligned byte offset.
    fn write_words(&mut self, offset: u32, data: &[u8]) -> Result<(), FlashError>;

    /// Give other tasks a chance to run between long flash operations.
    fn relax(&mut self) {}
}

impl<T: FlashDriver + ?Sized> FlashDriver for &mut T {
    fn erase_sector(&mut self, sector: u16) -> Result<(), FlashError> {
        (**self).erase_sector(sector)
    }

    fn write_words(&mut self, offset: u32, data: &[u8]) -> Result<(), FlashError> {
        (**self).write_words(offset, data)
    }

    fn relax(&mut self) {
        (**self).relax();
    }
}

/// Flash geometry queries
pub trait FlashGeometry {
    /// Flash density and partition layout of the device
    fn flash_size_map(&self) -> FlashSizeMap;

    /// Slot the running firmware was booted from
    fn running_bin(&self) -> UserBin;
}
