#[cfg(feature = "esp8266")]
pub mod sdk_stdio;
#[cfg(feature = "std")]
mod std_stdio;

#[cfg(feature = "std")]
pub use std_stdio::{StdFile, StdFileSystem, StdoutConsole};
