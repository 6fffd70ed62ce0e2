mod carry;
mod firmware;
mod geometry;

pub use carry::{AlignedSplit, CarryBuffer};
pub use firmware::{ChunkOutcome, OtaUpgrader, UpgradeCursor};
pub use geometry::resolve;
