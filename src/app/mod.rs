//! Application layer - firmware upgrade use cases

pub mod usecases;
