//! stdio on the ESP8266 SDK, through the newlib C library it ships.

use alloc::ffi::CString;
use core::{
    ffi::{c_char, c_int, c_long, c_void},
    ptr::NonNull,
};

use embedded_io::{ErrorType, Read, Seek, SeekFrom, Write};

use crate::domain::ports::{ByteStream, Console, FileSystem, OpenMode, StdioError};

#[repr(C)]
struct FILE {
    _private: [u8; 0],
}

const SEEK_SET: c_int = 0;
const SEEK_CUR: c_int = 1;
const SEEK_END: c_int = 2;

unsafe extern "C" {
    fn fopen(path: *const c_char, mode: *const c_char) -> *mut FILE;
    fn fread(ptr: *mut c_void, size: usize, count: usize, stream: *mut FILE) -> usize;
    fn fwrite(ptr: *const c_void, size: usize, count: usize, stream: *mut FILE) -> usize;
    fn fseek(stream: *mut FILE, offset: c_long, origin: c_int) -> c_int;
    fn ftell(stream: *mut FILE) -> c_long;
    fn fflush(stream: *mut FILE) -> c_int;
    fn fclose(stream: *mut FILE) -> c_int;
    fn ferror(stream: *mut FILE) -> c_int;
    fn printf(fmt: *const c_char, ...) -> c_int;
}

/// Files on whatever VFS the SDK has mounted.
#[derive(Debug, Default, Clone, Copy)]
pub struct SdkFileSystem;

impl FileSystem for SdkFileSystem {
    type Stream = SdkFile;

    fn open(&mut self, path: &str, mode: OpenMode) -> Result<SdkFile, StdioError> {
        let mode = mode.fopen_mode()?;
        let path = CString::new(path).map_err(|_| StdioError::InvalidInput)?;
        let stream = unsafe { fopen(path.as_ptr(), mode.as_ptr()) };
        NonNull::new(stream)
            .map(|stream| SdkFile { stream })
            .ok_or(StdioError::NotFound)
    }
}

/// Open `FILE *`, closed on drop.
pub struct SdkFile {
    stream: NonNull<FILE>,
}

impl SdkFile {
    fn failed(&self) -> bool {
        unsafe { ferror(self.stream.as_ptr()) != 0 }
    }
}

impl ErrorType for SdkFile {
    type Error = StdioError;
}

impl Read for SdkFile {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StdioError> {
        let n = unsafe { fread(buf.as_mut_ptr().cast(), 1, buf.len(), self.stream.as_ptr()) };
        if n == 0 && !buf.is_empty() && self.failed() {
            return Err(StdioError::Io);
        }
        Ok(n)
    }
}

impl Write for SdkFile {
    fn write(&mut self, buf: &[u8]) -> Result<usize, StdioError> {
        let n = unsafe { fwrite(buf.as_ptr().cast(), 1, buf.len(), self.stream.as_ptr()) };
        if n == 0 && !buf.is_empty() {
            return Err(StdioError::Io);
        }
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), StdioError> {
        match unsafe { fflush(self.stream.as_ptr()) } {
            0 => Ok(()),
            _ => Err(StdioError::Io),
        }
    }
}

impl Seek for SdkFile {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, StdioError> {
        let (offset, origin) = match pos {
            SeekFrom::Start(offset) => (
                c_long::try_from(offset).map_err(|_| StdioError::InvalidInput)?,
                SEEK_SET,
            ),
            SeekFrom::End(offset) => (
                c_long::try_from(offset).map_err(|_| StdioError::InvalidInput)?,
                SEEK_END,
            ),
            SeekFrom::Current(offset) => (
                c_long::try_from(offset).map_err(|_| StdioError::InvalidInput)?,
                SEEK_CUR,
            ),
        };
        if unsafe { fseek(self.stream.as_ptr(), offset, origin) } != 0 {
            return Err(StdioError::Io);
        }
        let position = unsafe { ftell(self.stream.as_ptr()) };
        u64::try_from(position).map_err(|_| StdioError::Io)
    }
}

impl ByteStream for SdkFile {
    fn close(self) -> Result<(), StdioError> {
        let stream = self.stream;
        core::mem::forget(self);
        match unsafe { fclose(stream.as_ptr()) } {
            0 => Ok(()),
            _ => Err(StdioError::Io),
        }
    }
}

impl Drop for SdkFile {
    fn drop(&mut self) {
        unsafe { fclose(self.stream.as_ptr()) };
    }
}

/// UART console through the SDK `printf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SdkConsole;

impl Console for SdkConsole {
    fn write_str(&mut self, s: &str) -> Result<(), StdioError> {
        let len = c_int::try_from(s.len()).map_err(|_| StdioError::InvalidInput)?;
        let written = unsafe { printf(c"%.*s".as_ptr(), len, s.as_ptr().cast::<c_char>()) };
        if written < 0 {
            return Err(StdioError::Io);
        }
        Ok(())
    }
}
