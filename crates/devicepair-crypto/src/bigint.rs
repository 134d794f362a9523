//! Fixed-width big-endian integer conversion and modular exponentiation.
//!
//! All SRP wire values are big-endian and sized exactly to the group width,
//! so padding is explicit and over-wide values are rejected rather than
//! truncated.

use devicepair_core::SrpError;
use num_bigint::BigUint;

/// Encode `n` as exactly `width` big-endian bytes, left-zero-padded.
///
/// Fails with [`SrpError::IntegerTooWide`] if `n` does not fit.
pub fn bigint_to_buffer(n: &BigUint, width: usize) -> Result<Vec<u8>, SrpError> {
    let bytes = n.to_bytes_be();
    if bytes.len() > width {
        return Err(SrpError::IntegerTooWide { width });
    }
    let mut padded = vec![0u8; width - bytes.len()];
    padded.extend_from_slice(&bytes);
    Ok(padded)
}

/// Interpret `buf` as a non-negative big-endian integer.
pub fn buffer_to_bigint(buf: &[u8]) -> BigUint {
    BigUint::from_bytes_be(buf)
}

/// Compute `base^exp mod modulus`.
pub fn mod_pow(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    base.modpow(exp, modulus)
}
