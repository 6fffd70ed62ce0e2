//! ESP8266 vendor SDK bindings.
//!
//! The symbols come from the SDK libraries the firmware links against; this
//! module only declares and wraps them.

use alloc::vec::Vec;
use core::ffi::c_int;

use crate::{
    config::{ERASE_RELAX_MS, WORD_SIZE},
    domain::{
        entity::{FlashSizeMap, UserBin},
        ports::{FlashDriver, FlashError, FlashGeometry, Random},
    },
};

/// FreeRTOS tick period on the ESP8266 SDK.
const PORT_TICK_RATE_MS: u32 = 10;

/// `SpiFlashOpResult::SPI_FLASH_RESULT_OK`
const SPI_FLASH_RESULT_OK: c_int = 0;

unsafe extern "C" {
    fn spi_flash_erase_sector(sec: u16) -> c_int;
    fn spi_flash_write(des_addr: u32, src_addr: *const u32, size: u32) -> c_int;
    fn system_get_flash_size_map() -> c_int;
    fn system_upgrade_userbin_check() -> u8;
    fn vTaskDelay(ticks: u32);
    fn rand() -> c_int;
}

/// SPI flash through `spi_flash_erase_sector` / `spi_flash_write`.
#[derive(Debug, Default)]
pub struct SdkFlash;

impl SdkFlash {
    pub fn new() -> Self {
        Self
    }
}

impl FlashDriver for SdkFlash {
    fn erase_sector(&mut self, sector: u16) -> Result<(), FlashError> {
        let result = unsafe { spi_flash_erase_sector(sector) };
        if result == SPI_FLASH_RESULT_OK {
            Ok(())
        } else {
            Err(FlashError::Erase)
        }
    }

    fn write_words(&mut self, offset: u32, data: &[u8]) -> Result<(), FlashError> {
        if !(offset as usize).is_multiple_of(WORD_SIZE) || !data.len().is_multiple_of(WORD_SIZE) {
            return Err(FlashError::NotAligned);
        }
        let size = u32::try_from(data.len()).map_err(|_| FlashError::OutOfBounds)?;

        // The SDK reads the source a word at a time
        let copied: Vec<u32>;
        let words: &[u32] = if let Ok(words) = bytemuck::try_cast_slice(data) {
            words
        } else {
            copied = bytemuck::pod_collect_to_vec(data);
            &copied
        };

        let result = unsafe { spi_flash_write(offset, words.as_ptr(), size) };
        if result == SPI_FLASH_RESULT_OK {
            Ok(())
        } else {
            Err(FlashError::Write)
        }
    }

    fn relax(&mut self) {
        unsafe { vTaskDelay(ERASE_RELAX_MS / PORT_TICK_RATE_MS) };
    }
}

/// Geometry queried from the SDK at runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct SdkGeometry;

impl FlashGeometry for SdkGeometry {
    fn flash_size_map(&self) -> FlashSizeMap {
        let raw = unsafe { system_get_flash_size_map() };
        u8::try_from(raw).map_or(FlashSizeMap::Other(u8::MAX), FlashSizeMap::from_u8)
    }

    fn running_bin(&self) -> UserBin {
        UserBin::from_u8(unsafe { system_upgrade_userbin_check() })
    }
}

/// newlib `rand()` as linked into the SDK image.
#[derive(Debug, Default, Clone, Copy)]
pub struct SdkRandom;

impl Random for SdkRandom {
    fn next_u32(&mut self) -> u32 {
        // rand() stays within 0..=RAND_MAX, so the top bit is spare
        (unsafe { rand() }).cast_unsigned() << 1
    }

    fn random(&mut self) -> i32 {
        unsafe { rand() }
    }
}
