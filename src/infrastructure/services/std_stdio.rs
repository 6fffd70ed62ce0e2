use std::{
    fs::{File, OpenOptions},
    io::{self, Read as _, Seek as _, Write as _},
};

use embedded_io::{ErrorType, Read, Seek, SeekFrom, Write};

use crate::domain::ports::{ByteStream, Console, FileSystem, OpenMode, StdioError};

fn map_io_error(err: &io::Error) -> StdioError {
    match err.kind() {
        io::ErrorKind::NotFound => StdioError::NotFound,
        io::ErrorKind::PermissionDenied => StdioError::PermissionDenied,
        io::ErrorKind::InvalidInput => StdioError::InvalidInput,
        _ => StdioError::Io,
    }
}

/// Files on the host file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    type Stream = StdFile;

    fn open(&mut self, path: &str, mode: OpenMode) -> Result<StdFile, StdioError> {
        OpenOptions::new()
            .read(mode.read)
            .write(mode.write && !mode.append)
            .append(mode.append)
            .create(mode.create)
            .truncate(mode.truncate)
            .open(path)
            .map(|file| StdFile { file })
            .map_err(|err| {
                log::debug!("stdio: open {} failed: {}", path, err);
                map_io_error(&err)
            })
    }
}

pub struct StdFile {
    file: File,
}

impl ErrorType for StdFile {
    type Error = StdioError;
}

impl Read for StdFile {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StdioError> {
        self.file.read(buf).map_err(|err| map_io_error(&err))
    }
}

impl Write for StdFile {
    fn write(&mut self, buf: &[u8]) -> Result<usize, StdioError> {
        self.file.write(buf).map_err(|err| map_io_error(&err))
    }

    fn flush(&mut self) -> Result<(), StdioError> {
        self.file.flush().map_err(|err| map_io_error(&err))
    }
}

impl Seek for StdFile {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, StdioError> {
        let pos = match pos {
            SeekFrom::Start(offset) => io::SeekFrom::Start(offset),
            SeekFrom::End(offset) => io::SeekFrom::End(offset),
            SeekFrom::Current(offset) => io::SeekFrom::Current(offset),
        };
        self.file.seek(pos).map_err(|err| map_io_error(&err))
    }
}

impl ByteStream for StdFile {
    fn close(mut self) -> Result<(), StdioError> {
        Write::flush(&mut self)?;
        self.file.sync_all().map_err(|err| map_io_error(&err))
    }
}

/// Process standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn write_str(&mut self, s: &str) -> Result<(), StdioError> {
        io::stdout()
            .lock()
            .write_all(s.as_bytes())
            .map_err(|err| map_io_error(&err))
    }

    fn flush(&mut self) -> Result<(), StdioError> {
        io::stdout().flush().map_err(|err| map_io_error(&err))
    }
}
