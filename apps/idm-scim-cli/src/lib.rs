//! idm-scim CLI library
//!
//! Exposes the command modules so integration tests can drive them without
//! spawning the binary.

pub mod commands;
pub mod error;
pub mod logging;
