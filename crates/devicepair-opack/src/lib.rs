//! # devicepair-opack
//!
//! OPACK2, the compact type-tagged binary object encoding carried inside
//! XPC frames during device pairing.
//!
//! This crate encodes only; the pairing core never needs to read OPACK2
//! back. Build payloads with [`Value`] and [`Dictionary`], then call
//! [`encode`].
//!
//! ```
//! use devicepair_opack::{encode, Dictionary, Value};
//!
//! let mut payload = Dictionary::new();
//! payload.insert("request", "handshake");
//! payload.insert("attempt", 1i64);
//! let bytes = encode(&Value::Dictionary(payload)).unwrap();
//! assert_eq!(bytes[0], 0xE2);
//! ```

pub mod encode;
pub mod value;

pub use encode::encode;
pub use value::{Dictionary, Value};
