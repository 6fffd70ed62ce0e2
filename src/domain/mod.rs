//! Domain layer - entities and ports
//!
//! Ports are the capabilities a platform has to provide: raw flash access,
//! flash geometry queries, file streams and a console.

pub mod entity;
pub mod ports;
