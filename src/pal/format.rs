use alloc::string::String;
use core::fmt::{self, Write};

use crate::domain::ports::{Console, StdioError};

/// Forwards formatted text to a console and counts the bytes.
struct ConsoleWriter<'a, C: ?Sized> {
    console: &'a mut C,
    written: usize,
    error: Option<StdioError>,
}

impl<C: Console + ?Sized> Write for ConsoleWriter<'_, C> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        match self.console.write_str(s) {
            Ok(()) => {
                self.written += s.len();
                Ok(())
            }
            Err(err) => {
                self.error = Some(err);
                Err(fmt::Error)
            }
        }
    }
}

/// Format to the console and return the number of bytes written.
pub fn printf<C: Console + ?Sized>(
    console: &mut C,
    args: fmt::Arguments<'_>,
) -> Result<usize, StdioError> {
    let mut writer = ConsoleWriter {
        console,
        written: 0,
        error: None,
    };
    match writer.write_fmt(args) {
        Ok(()) => Ok(writer.written),
        Err(_) => Err(writer.error.unwrap_or(StdioError::Io)),
    }
}

/// Format into an owned string.
pub fn sprintf(args: fmt::Arguments<'_>) -> String {
    alloc::fmt::format(args)
}

/// Byte sink that keeps the last byte of the buffer for the terminator.
struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
    total: usize,
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        self.total += bytes.len();

        let room = self.buf.len().saturating_sub(1).saturating_sub(self.pos);
        let take = room.min(bytes.len());
        self.buf[self.pos..self.pos + take].copy_from_slice(&bytes[..take]);
        self.pos += take;
        Ok(())
    }
}

/// Format into `buf`, truncating as needed, and NUL terminate it.
///
/// Returns the length the complete output would have had, so a return value
/// of `buf.len()` or more means the output was truncated.
pub fn snprintf(buf: &mut [u8], args: fmt::Arguments<'_>) -> usize {
    let mut writer = SliceWriter {
        buf,
        pos: 0,
        total: 0,
    };
    // SliceWriter never fails, a Display impl that does just ends the output
    let _ = writer.write_fmt(args);

    let SliceWriter { buf, pos, total } = writer;
    if let Some(terminator) = buf.get_mut(pos) {
        *terminator = 0;
    }
    total
}

/// Pushes whole characters while they fit, drops the rest.
struct BoundedWriter<'a, const N: usize> {
    out: &'a mut heapless::String<N>,
    full: bool,
}

impl<const N: usize> Write for BoundedWriter<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.full || self.out.push(c).is_err() {
                self.full = true;
                break;
            }
        }
        Ok(())
    }
}

/// Format into a fixed-capacity string, truncated on a character boundary.
pub fn format_bounded<const N: usize>(args: fmt::Arguments<'_>) -> heapless::String<N> {
    let mut out = heapless::String::new();
    let mut writer = BoundedWriter {
        out: &mut out,
        full: false,
    };
    let _ = writer.write_fmt(args);
    out
}
