use core::fmt;

use super::flash::FlashError;

/// Error type for the firmware upgrade operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeError {
    /// The upgrade cursor has not been initialized
    NotInitialized,
    /// The write would reach past the end of the target slot
    InvalidRange { address: u32, end: u32 },
    /// The scratch buffer could not be allocated
    AllocationFailure,
    /// A literal write larger than one sector was requested
    ChunkTooLarge { len: usize },
    /// The flash driver refused the operation
    Driver(FlashError),
}

impl fmt::Display for UpgradeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpgradeError::NotInitialized => f.write_str("upgrade cursor is not initialized"),
            UpgradeError::InvalidRange { address, end } => {
                write!(f, "write to {address:#x} exceeds slot end {end:#x}")
            }
            UpgradeError::AllocationFailure => f.write_str("scratch buffer allocation failed"),
            UpgradeError::ChunkTooLarge { len } => {
                write!(f, "chunk of {len} bytes is larger than a sector")
            }
            UpgradeError::Driver(err) => write!(f, "flash driver error: {err}"),
        }
    }
}

impl From<FlashError> for UpgradeError {
    fn from(err: FlashError) -> Self {
        UpgradeError::Driver(err)
    }
}
