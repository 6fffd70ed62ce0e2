use embedded_storage::nor_flash::{NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash};

use crate::{
    config::SECTOR_SIZE,
    domain::ports::{FlashDriver, FlashError},
};

/// [`FlashDriver`] over any `embedded-storage` NOR flash.
///
/// The flash `ERASE_SIZE` has to divide [`SECTOR_SIZE`].
pub struct NorFlashDriver<F> {
    flash: F,
}

impl<F: NorFlash> NorFlashDriver<F> {
    pub fn new(flash: F) -> Self {
        Self { flash }
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn into_inner(self) -> F {
        self.flash
    }

    pub fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), FlashError> {
        self.flash
            .read(offset, bytes)
            .map_err(|err| map_error(&err, FlashError::Read))
    }
}

fn map_error(err: &impl NorFlashError, fallback: FlashError) -> FlashError {
    match err.kind() {
        NorFlashErrorKind::OutOfBounds => FlashError::OutOfBounds,
        NorFlashErrorKind::NotAligned => FlashError::NotAligned,
        _ => fallback,
    }
}

impl<F: NorFlash> FlashDriver for NorFlashDriver<F> {
    fn erase_sector(&mut self, sector: u16) -> Result<(), FlashError> {
        let from = u32::from(sector)
            .checked_mul(SECTOR_SIZE)
            .ok_or(FlashError::OutOfBounds)?;
        self.flash
            .erase(from, from + SECTOR_SIZE)
            .map_err(|err| map_error(&err, FlashError::Erase))
    }

    fn write_words(&mut self, offset: u32, data: &[u8]) -> Result<(), FlashError> {
        self.flash
            .write(offset, data)
            .map_err(|err| map_error(&err, FlashError::Write))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::drivers::RamFlash;

    #[test]
    fn erases_whole_sector() {
        let mut driver = NorFlashDriver::new(RamFlash::filled(3, 0));
        driver.erase_sector(1).unwrap();

        let image = driver.flash().as_slice();
        let sector = SECTOR_SIZE as usize;
        assert!(image[..sector].iter().all(|b| *b == 0));
        assert!(image[sector..2 * sector].iter().all(|b| *b == 0xFF));
        assert!(image[2 * sector..].iter().all(|b| *b == 0));
    }

    #[test]
    fn maps_driver_errors() {
        let mut driver = NorFlashDriver::new(RamFlash::new(1));
        assert_eq!(driver.erase_sector(1), Err(FlashError::OutOfBounds));
        assert_eq!(driver.write_words(1, &[0; 4]), Err(FlashError::NotAligned));

        let mut flash = RamFlash::new(1);
        flash.fail_erase(true);
        let mut driver = NorFlashDriver::new(flash);
        assert_eq!(driver.erase_sector(0), Err(FlashError::Erase));
    }

    #[test]
    fn reads_back_written_words() {
        let mut driver = NorFlashDriver::new(RamFlash::new(1));
        driver.write_words(8, &[1, 2, 3, 4]).unwrap();

        let mut buf = [0u8; 6];
        driver.read(6, &mut buf).unwrap();
        assert_eq!(buf, [0xFF, 0xFF, 1, 2, 3, 4]);
    }
}
