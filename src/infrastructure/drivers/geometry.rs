use crate::domain::{
    entity::{FlashSizeMap, UserBin},
    ports::FlashGeometry,
};

/// Geometry known ahead of time, e.g. from the host configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticGeometry {
    pub size_map: FlashSizeMap,
    pub running: UserBin,
}

impl StaticGeometry {
    pub const fn new(size_map: FlashSizeMap, running: UserBin) -> Self {
        Self { size_map, running }
    }
}

impl FlashGeometry for StaticGeometry {
    fn flash_size_map(&self) -> FlashSizeMap {
        self.size_map
    }

    fn running_bin(&self) -> UserBin {
        self.running
    }
}
