//! # devicepair-crypto
//!
//! Cryptographic core of the Apple device pairing protocol.
//!
//! This crate provides:
//! - SRP-6a client (3072-bit group, SHA-512) for Pair-Setup
//! - TLV8 framing with automatic fragmentation
//! - SHA-512 and HKDF-SHA512 primitives
//! - Fixed-width big-endian integer conversion
//!
//! Everything here is synchronous and free of I/O; secret material is
//! zeroized on dispose and on drop.

pub mod bigint;
pub mod hash;
pub mod srp;
pub mod tlv;

pub use srp::{SrpClient, SrpParams, DEFAULT_USERNAME, KEY_BYTES};
pub use tlv::{Tlv8, TlvType};
