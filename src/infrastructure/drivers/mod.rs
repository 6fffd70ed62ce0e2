#[cfg(feature = "esp8266")]
pub mod esp8266;
#[cfg(feature = "std")]
mod file_flash;
mod geometry;
mod nor_flash;
mod ram_flash;
#[cfg(feature = "std")]
mod random;

#[cfg(feature = "std")]
pub use file_flash::{FileFlash, FileFlashError};
pub use geometry::StaticGeometry;
pub use nor_flash::NorFlashDriver;
pub use ram_flash::{RamFlash, RamFlashError};
#[cfg(feature = "std")]
pub use random::HostRandom;
