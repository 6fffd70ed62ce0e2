//! stdio-like helpers on top of the [`Console`](crate::domain::ports::Console)
//! and [`FileSystem`](crate::domain::ports::FileSystem) ports.

mod console;
mod format;
mod hexdump;

pub use console::SharedConsole;
pub use format::{format_bounded, printf, snprintf, sprintf};
pub use hexdump::{HexDump, print_buffer};

/// `printf` to a [`Console`](crate::domain::ports::Console).
#[macro_export]
macro_rules! pal_printf {
    ($console:expr, $($arg:tt)*) => {
        $crate::pal::printf($console, format_args!($($arg)*))
    };
}

/// `snprintf` into a byte buffer, NUL terminated.
#[macro_export]
macro_rules! pal_snprintf {
    ($buf:expr, $($arg:tt)*) => {
        $crate::pal::snprintf($buf, format_args!($($arg)*))
    };
}
