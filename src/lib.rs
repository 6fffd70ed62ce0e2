#![cfg_attr(not(feature = "std"), no_std)]

//! Platform abstraction layer and ESP8266 OTA flash writer.
//!
//! The crate is split the same way the firmware is:
//! - [`domain`] holds entities and the ports platforms implement
//! - [`app`] holds the upgrade use cases (geometry resolution, write cursor)
//! - [`pal`] holds the stdio-like helpers built on top of the ports
//! - [`infrastructure`] holds the per-platform port implementations

extern crate alloc;

pub mod app;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod pal;

pub use app::usecases::{
    AlignedSplit,
    CarryBuffer,
    ChunkOutcome,
    OtaUpgrader,
    UpgradeCursor,
    resolve,
};
pub use domain::entity::{FlashSizeMap, SlotLayout, UserBin};
pub use domain::ports::{FlashDriver, FlashError, FlashGeometry, UpgradeError};
