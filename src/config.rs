/// SPI flash erase unit in bytes.
pub const SECTOR_SIZE: u32 = 4096;

/// Flash write granularity in bytes. Every write must start on and cover
/// whole words.
pub const WORD_SIZE: usize = 4;

/// First sector of the user bin 1 slot, for every flash layout.
pub const USER_BIN1_START: u16 = 1;

/// Slot size, in sectors, for the 512KB + 512KB layouts.
pub const SYSTEM_BIN_MAP_512_512_MAX_SECTOR: u16 = 0x7B;
/// Slot size, in sectors, for the 1024KB + 1024KB layouts.
pub const SYSTEM_BIN_MAP_1024_1024_MAX_SECTOR: u16 = 0xFB;
/// Slot size, in sectors, for the default 256KB + 256KB layout.
pub const SYSTEM_BIN_NO_MAP_MAX_SECTOR: u16 = 0x3B;

/// Delay handed to the scheduler between two sector erases.
pub const ERASE_RELAX_MS: u32 = 10;

/// Byte used to pad the last partial word of an image.
pub const ERASED_BYTE: u8 = 0xFF;
