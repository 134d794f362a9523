//! # devicepair-core
//!
//! Shared error definitions for the devicepair crates.
//!
//! The pairing core is synchronous and performs no I/O; every failure is
//! reported to the caller at the operation's return site through the types
//! in [`error`].

pub mod error;

pub use error::{Error, OpackError, Result, SrpError, TlvError};
