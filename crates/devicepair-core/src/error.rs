//! Error types for the pairing protocol core.

use thiserror::Error;

/// Primary error type for all pairing core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("SRP error: {0}")]
    Srp(#[from] SrpError),

    #[error("OPACK error: {0}")]
    Opack(#[from] OpackError),

    #[error("TLV error: {0}")]
    Tlv(#[from] TlvError),
}

/// Errors from the SRP-6a client.
#[derive(Error, Debug)]
pub enum SrpError {
    #[error("Identity must not be empty")]
    EmptyIdentity,

    #[error("Salt must not be empty")]
    EmptySalt,

    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Invalid server public key: {0}")]
    InvalidServerPublicKey(String),

    #[error("Client public key outside safe range")]
    InvalidClientPublicKey,

    #[error("Key generation failed after {attempts} attempts")]
    KeyGenerationExhausted { attempts: u32 },

    #[error("Missing prerequisite: {0}")]
    MissingPrerequisite(&'static str),

    #[error("Cannot expand {requested} bytes of key material")]
    KeyDerivation { requested: usize },

    #[error("Client has been disposed")]
    Disposed,

    #[error("Integer does not fit in {width} bytes")]
    IntegerTooWide { width: usize },
}

/// Errors from the OPACK2 encoder.
#[derive(Error, Debug)]
pub enum OpackError {
    #[error("Integer {0} exceeds the maximum encodable value (2^53 - 1)")]
    IntegerTooLarge(u64),

    #[error("Cannot encode a non-finite number")]
    NonFiniteNumber,

    #[error("Length {0} exceeds the maximum encodable length (2^32 - 1)")]
    LengthOverflow(usize),
}

/// Errors from the TLV8 codec.
#[derive(Error, Debug)]
pub enum TlvError {
    #[error("Truncated TLV header")]
    TruncatedHeader,

    #[error("Truncated TLV value: expected {expected} bytes, got {actual}")]
    TruncatedValue { expected: usize, actual: usize },
}

/// Convenience Result type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats() {
        let srp_err = Error::Srp(SrpError::EmptyIdentity);
        assert!(srp_err.to_string().contains("SRP error"));
        assert!(srp_err.to_string().contains("must not be empty"));

        let opack_err = Error::Opack(OpackError::IntegerTooLarge(u64::MAX));
        assert!(opack_err.to_string().contains("OPACK error"));
        assert!(opack_err.to_string().contains("2^53"));

        let tlv_err = Error::Tlv(TlvError::TruncatedHeader);
        assert!(tlv_err.to_string().contains("TLV error"));
        assert!(tlv_err.to_string().contains("Truncated"));

        let key_err = SrpError::InvalidKeyLength {
            expected: 384,
            actual: 12,
        };
        assert!(key_err.to_string().contains("384"));
        assert!(key_err.to_string().contains("12"));

        let exhausted = SrpError::KeyGenerationExhausted { attempts: 100 };
        assert!(exhausted.to_string().contains("100"));
    }

    #[test]
    fn error_source_chain() {
        use std::error::Error as StdError;

        let err = Error::Srp(SrpError::Disposed);
        assert!(err.source().is_some());

        let err = Error::Opack(OpackError::NonFiniteNumber);
        assert!(err.source().is_some());
    }

    #[test]
    fn error_conversions() {
        let srp_err = SrpError::Disposed;
        let err: Error = srp_err.into();
        assert!(matches!(err, Error::Srp(_)));

        let opack_err = OpackError::LengthOverflow(usize::MAX);
        let err: Error = opack_err.into();
        assert!(matches!(err, Error::Opack(_)));

        let tlv_err = TlvError::TruncatedValue {
            expected: 5,
            actual: 2,
        };
        let err: Error = tlv_err.into();
        assert!(matches!(err, Error::Tlv(_)));
    }
}
