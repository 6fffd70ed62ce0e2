use crate::config::SECTOR_SIZE;

/// Firmware slot the device is currently running from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserBin {
    Bin1,
    Bin2,
}

impl UserBin {
    /// Decode the value reported by `system_upgrade_userbin_check`.
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => UserBin::Bin2,
            _ => UserBin::Bin1,
        }
    }

    pub const fn as_u8(self) -> u8 {
        match self {
            UserBin::Bin1 => 0,
            UserBin::Bin2 => 1,
        }
    }

    /// The slot a new image has to be written to.
    pub const fn other(self) -> Self {
        match self {
            UserBin::Bin1 => UserBin::Bin2,
            UserBin::Bin2 => UserBin::Bin1,
        }
    }
}

/// Flash density and partition layout, as reported by
/// `system_get_flash_size_map`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashSizeMap {
    Size4mMap256x256,
    Size2m,
    Size8mMap512x512,
    Size16mMap512x512,
    Size32mMap512x512,
    Size16mMap1024x1024,
    Size32mMap1024x1024,
    /// Any id this crate has no dedicated layout for.
    Other(u8),
}

impl FlashSizeMap {
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => FlashSizeMap::Size4mMap256x256,
            1 => FlashSizeMap::Size2m,
            2 => FlashSizeMap::Size8mMap512x512,
            3 => FlashSizeMap::Size16mMap512x512,
            4 => FlashSizeMap::Size32mMap512x512,
            5 => FlashSizeMap::Size16mMap1024x1024,
            6 => FlashSizeMap::Size32mMap1024x1024,
            other => FlashSizeMap::Other(other),
        }
    }

    pub const fn as_u8(self) -> u8 {
        match self {
            FlashSizeMap::Size4mMap256x256 => 0,
            FlashSizeMap::Size2m => 1,
            FlashSizeMap::Size8mMap512x512 => 2,
            FlashSizeMap::Size16mMap512x512 => 3,
            FlashSizeMap::Size32mMap512x512 => 4,
            FlashSizeMap::Size16mMap1024x1024 => 5,
            FlashSizeMap::Size32mMap1024x1024 => 6,
            FlashSizeMap::Other(value) => value,
        }
    }
}

/// Sector range reserved for one firmware slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLayout {
    pub base_sector: u16,
    pub sector_count: u16,
}

impl SlotLayout {
    pub const fn new(base_sector: u16, sector_count: u16) -> Self {
        Self {
            base_sector,
            sector_count,
        }
    }

    /// One past the last sector of the slot.
    pub const fn end_sector(&self) -> u32 {
        self.base_sector as u32 + self.sector_count as u32
    }

    /// Absolute address of the first byte of the slot.
    pub const fn start_address(&self) -> u32 {
        self.base_sector as u32 * SECTOR_SIZE
    }

    /// Absolute address one past the last byte of the slot.
    pub const fn end_address(&self) -> u32 {
        self.end_sector() * SECTOR_SIZE
    }

    pub const fn contains_sector(&self, sector: u32) -> bool {
        sector >= self.base_sector as u32 && sector < self.end_sector()
    }

    /// Whether two slots share at least one sector.
    pub const fn overlaps(&self, other: &SlotLayout) -> bool {
        (self.base_sector as u32) < other.end_sector()
            && (other.base_sector as u32) < self.end_sector()
    }
}
