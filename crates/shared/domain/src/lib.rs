//! # Domain Models
//!
//! Pure data shared by every crate: configuration snapshot, host environment,
//! feature module descriptors and well-known names. Depends on `serde` only;
//! no I/O, networking, or heavy logic here.

pub mod config;
pub mod constants;
pub mod environment;
pub mod registry;
