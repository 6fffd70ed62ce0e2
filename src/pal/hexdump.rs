use core::fmt;

use super::format::printf;
use crate::domain::ports::{Console, StdioError};

/// Hex listing of a byte buffer: a `len = N, msg` header, then the bytes
/// grouped by four and sixteen to a line.
pub struct HexDump<'a> {
    pub msg: &'a str,
    pub bytes: &'a [u8],
}

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "len = {}, {}", self.bytes.len(), self.msg)?;
        for (i, byte) in self.bytes.iter().enumerate() {
            write!(f, "{byte:02x} ")?;
            if (i + 1) % 4 == 0 {
                f.write_str("| ")?;
            }
            if (i + 1) % 16 == 0 {
                f.write_str("\n")?;
            }
        }
        f.write_str("\n")
    }
}

/// Print a [`HexDump`] of `bytes`.
pub fn print_buffer<C: Console + ?Sized>(
    console: &mut C,
    msg: &str,
    bytes: &[u8],
) -> Result<usize, StdioError> {
    printf(console, format_args!("{}", HexDump { msg, bytes }))
}
