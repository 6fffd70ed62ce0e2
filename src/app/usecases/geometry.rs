use crate::{
    config::{
        SYSTEM_BIN_MAP_512_512_MAX_SECTOR,
        SYSTEM_BIN_MAP_1024_1024_MAX_SECTOR,
        SYSTEM_BIN_NO_MAP_MAX_SECTOR,
        USER_BIN1_START,
    },
    domain::entity::{FlashSizeMap, SlotLayout, UserBin},
};

/// Start sector of user bin 2 and the slot size for a flash layout.
const fn layout_table(size_map: FlashSizeMap) -> (u16, u16) {
    match size_map {
        FlashSizeMap::Size8mMap512x512
        | FlashSizeMap::Size16mMap512x512
        | FlashSizeMap::Size32mMap512x512 => (129, SYSTEM_BIN_MAP_512_512_MAX_SECTOR),
        FlashSizeMap::Size16mMap1024x1024 | FlashSizeMap::Size32mMap1024x1024 => {
            (257, SYSTEM_BIN_MAP_1024_1024_MAX_SECTOR)
        }
        _ => (65, SYSTEM_BIN_NO_MAP_MAX_SECTOR),
    }
}

/// Resolve the slot a new image must be written to.
///
/// The new image always goes to the slot the device is *not* running from.
/// Layouts without a dedicated entry fall back to the 256KB + 256KB map.
pub const fn resolve(size_map: FlashSizeMap, running: UserBin) -> SlotLayout {
    let (user_bin2_start, sector_count) = layout_table(size_map);
    let base_sector = match running.other() {
        UserBin::Bin1 => USER_BIN1_START,
        UserBin::Bin2 => user_bin2_start,
    };
    SlotLayout::new(base_sector, sector_count)
}
