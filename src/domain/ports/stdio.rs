use core::{ffi::CStr, fmt};

use embedded_io::{ErrorKind, ErrorType, Read, Seek, Write};

/// Error type for the stdio operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioError {
    /// The `fopen` mode string is not recognized
    InvalidMode,
    NotFound,
    PermissionDenied,
    InvalidInput,
    /// The platform returned an error it did not describe further
    Io,
}

impl fmt::Display for StdioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StdioError::InvalidMode => f.write_str("invalid open mode"),
            StdioError::NotFound => f.write_str("file not found"),
            StdioError::PermissionDenied => f.write_str("permission denied"),
            StdioError::InvalidInput => f.write_str("invalid input"),
            StdioError::Io => f.write_str("i/o error"),
        }
    }
}

impl embedded_io::Error for StdioError {
    fn kind(&self) -> ErrorKind {
        match self {
            StdioError::InvalidMode | StdioError::InvalidInput => ErrorKind::InvalidInput,
            StdioError::NotFound => ErrorKind::NotFound,
            StdioError::PermissionDenied => ErrorKind::PermissionDenied,
            StdioError::Io => ErrorKind::Other,
        }
    }
}

/// Access mode of an opened stream, decoded from a C `fopen` mode string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenMode {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub create: bool,
    pub truncate: bool,
}

impl OpenMode {
    /// Parse `r`, `w`, `a` with an optional `+`. The binary flag `b` is
    /// accepted anywhere after the first character and ignored.
    pub fn parse(mode: &str) -> Result<Self, StdioError> {
        let mut chars = mode.chars();
        let mut parsed = match chars.next() {
            Some('r') => OpenMode {
                read: true,
                ..OpenMode::default()
            },
            Some('w') => OpenMode {
                write: true,
                create: true,
                truncate: true,
                ..OpenMode::default()
            },
            Some('a') => OpenMode {
                write: true,
                append: true,
                create: true,
                ..OpenMode::default()
            },
            _ => return Err(StdioError::InvalidMode),
        };

        let mut plus = false;
        for c in chars {
            match c {
                'b' => {}
                '+' if !plus => plus = true,
                _ => return Err(StdioError::InvalidMode),
            }
        }
        if plus {
            parsed.read = true;
            parsed.write = true;
        }
        Ok(parsed)
    }

    /// The C mode string opening a stream with exactly these flags.
    ///
    /// Flag combinations no `fopen` mode produces, such as write access
    /// without truncate or append, are rejected.
    pub fn fopen_mode(&self) -> Result<&'static CStr, StdioError> {
        let OpenMode {
            read,
            write,
            append,
            create,
            truncate,
        } = *self;
        match (read, write, append, create, truncate) {
            (true, false, false, false, false) => Ok(c"r"),
            (true, true, false, false, false) => Ok(c"r+"),
            (false, true, false, true, true) => Ok(c"w"),
            (true, true, false, true, true) => Ok(c"w+"),
            (false, true, true, true, false) => Ok(c"a"),
            (true, true, true, true, false) => Ok(c"a+"),
            _ => Err(StdioError::InvalidMode),
        }
    }
}

/// Buffered file stream, the `FILE *` of the platform.
pub trait ByteStream: ErrorType<Error = StdioError> + Read + Write + Seek {
    /// Flush pending data and release the stream.
    fn close(self) -> Result<(), StdioError>
    where
        Self: Sized;

    /// `fread` semantics: read up to `count` elements of `size` bytes and
    /// return the number of whole elements read.
    fn read_elements(
        &mut self,
        buf: &mut [u8],
        size: usize,
        count: usize,
    ) -> Result<usize, StdioError> {
        if size == 0 || count == 0 {
            return Ok(0);
        }
        let wanted = size.saturating_mul(count).min(buf.len());
        let mut filled = 0;
        while filled < wanted {
            match self.read(&mut buf[filled..wanted]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if filled == 0 => return Err(err),
                Err(_) => break,
            }
        }
        Ok(filled / size)
    }

    /// `fwrite` semantics: write `count` elements of `size` bytes and return
    /// the number of whole elements written.
    fn write_elements(
        &mut self,
        buf: &[u8],
        size: usize,
        count: usize,
    ) -> Result<usize, StdioError> {
        if size == 0 || count == 0 {
            return Ok(0);
        }
        let wanted = size.saturating_mul(count).min(buf.len());
        let mut written = 0;
        while written < wanted {
            match self.write(&buf[written..wanted]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(err) if written == 0 => return Err(err),
                Err(_) => break,
            }
        }
        Ok(written / size)
    }
}

/// Opens streams by path.
pub trait FileSystem {
    type Stream: ByteStream;

    fn open(&mut self, path: &str, mode: OpenMode) -> Result<Self::Stream, StdioError>;

    /// `fopen` with a C mode string.
    fn fopen(&mut self, path: &str, mode: &str) -> Result<Self::Stream, StdioError> {
        let mode = OpenMode::parse(mode)?;
        self.open(path, mode)
    }
}

/// Character output used by `printf`.
pub trait Console {
    fn write_str(&mut self, s: &str) -> Result<(), StdioError>;

    fn flush(&mut self) -> Result<(), StdioError> {
        Ok(())
    }
}
