//! Infrastructure layer - Port implementations
//!
//! Every platform gets its own implementation of the domain ports. The host
//! (`std`) flavour backs flash with memory or a plain file, the `esp8266`
//! flavour calls into the vendor SDK.

pub mod drivers;
pub mod services;
