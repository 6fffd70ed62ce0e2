use core::{cell::RefCell, fmt};

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};

use super::format::printf;
use crate::domain::ports::{Console, StdioError};

/// Console shared between tasks.
///
/// A single [`printf`](Self::printf) is never interleaved with output from
/// another task; [`locked`](Self::locked) extends that to a whole sequence of
/// writes, which is what `printf_lock` / `printf_unlock` pairs were for.
pub struct SharedConsole<C> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<C>>,
}

impl<C: Console> SharedConsole<C> {
    pub const fn new(console: C) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(console)),
        }
    }

    /// Run `f` with exclusive access to the console.
    ///
    /// Calling back into the same `SharedConsole` from `f` panics.
    pub fn locked<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        self.inner.lock(|cell| f(&mut *cell.borrow_mut()))
    }

    pub fn printf(&self, args: fmt::Arguments<'_>) -> Result<usize, StdioError> {
        self.locked(|console| printf(console, args))
    }

    pub fn into_inner(self) -> C {
        self.inner.into_inner().into_inner()
    }
}
