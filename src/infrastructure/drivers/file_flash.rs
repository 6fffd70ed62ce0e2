//! Flash image kept in a regular file, for the Linux build.

use std::{
    fs::{File, OpenOptions},
    io::{self, Read, Seek, SeekFrom, Write},
    path::Path,
};

use embedded_storage::nor_flash::{
    ErrorType,
    NorFlash,
    NorFlashError,
    NorFlashErrorKind,
    ReadNorFlash,
};

use crate::config::{ERASED_BYTE, SECTOR_SIZE, WORD_SIZE};

#[derive(Debug)]
pub enum FileFlashError {
    OutOfBounds,
    NotAligned,
    Io(io::Error),
}

impl From<io::Error> for FileFlashError {
    fn from(err: io::Error) -> Self {
        FileFlashError::Io(err)
    }
}

impl NorFlashError for FileFlashError {
    fn kind(&self) -> NorFlashErrorKind {
        match self {
            FileFlashError::OutOfBounds => NorFlashErrorKind::OutOfBounds,
            FileFlashError::NotAligned => NorFlashErrorKind::NotAligned,
            FileFlashError::Io(_) => NorFlashErrorKind::Other,
        }
    }
}

pub struct FileFlash {
    file: File,
    capacity: u32,
}

impl FileFlash {
    /// Create (or truncate) an erased image of `sectors` sectors.
    pub fn create(path: impl AsRef<Path>, sectors: u32) -> io::Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let erased = [ERASED_BYTE; SECTOR_SIZE as usize];
        for _ in 0..sectors {
            file.write_all(&erased)?;
        }
        file.flush()?;

        Ok(Self {
            file,
            capacity: sectors * SECTOR_SIZE,
        })
    }

    /// Open an existing image. Its size must be a whole number of sectors.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let len = file.metadata()?.len();
        let capacity = u32::try_from(len)
            .ok()
            .filter(|len| len.is_multiple_of(SECTOR_SIZE))
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "image is not sector sized")
            })?;
        Ok(Self { file, capacity })
    }

    fn check_range(&self, offset: u32, length: usize) -> Result<(), FileFlashError> {
        let end = u64::from(offset) + length as u64;
        if end > u64::from(self.capacity) {
            return Err(FileFlashError::OutOfBounds);
        }
        Ok(())
    }

    fn read_at(&mut self, offset: u32, bytes: &mut [u8]) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(u64::from(offset)))?;
        self.file.read_exact(bytes)
    }

    fn write_at(&mut self, offset: u32, bytes: &[u8]) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(u64::from(offset)))?;
        self.file.write_all(bytes)
    }
}

impl ErrorType for FileFlash {
    type Error = FileFlashError;
}

impl ReadNorFlash for FileFlash {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.check_range(offset, bytes.len())?;
        Ok(self.read_at(offset, bytes)?)
    }

    fn capacity(&self) -> usize {
        self.capacity as usize
    }
}

impl NorFlash for FileFlash {
    const WRITE_SIZE: usize = WORD_SIZE;
    const ERASE_SIZE: usize = SECTOR_SIZE as usize;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        if from > to || to > self.capacity {
            return Err(FileFlashError::OutOfBounds);
        }
        if !from.is_multiple_of(SECTOR_SIZE) || !to.is_multiple_of(SECTOR_SIZE) {
            return Err(FileFlashError::NotAligned);
        }
        let erased = [ERASED_BYTE; SECTOR_SIZE as usize];
        for sector_start in (from..to).step_by(SECTOR_SIZE as usize) {
            self.write_at(sector_start, &erased)?;
        }
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        self.check_range(offset, bytes.len())?;
        if !(offset as usize).is_multiple_of(WORD_SIZE) || !bytes.len().is_multiple_of(WORD_SIZE) {
            return Err(FileFlashError::NotAligned);
        }
        let mut current = alloc::vec![0u8; bytes.len()];
        self.read_at(offset, &mut current)?;
        for (cell, byte) in current.iter_mut().zip(bytes) {
            *cell &= *byte;
        }
        Ok(self.write_at(offset, &current)?)
    }
}
