//! SHA-512 and HKDF-SHA512 primitives.
//!
//! SRP and the pair-setup message proofs hash with SHA-512 throughout;
//! the outer pairing layer derives its channel keys with HKDF-SHA512.

use devicepair_core::SrpError;
use hkdf::Hkdf;
use sha2::{Digest, Sha512};

/// Compute SHA-512 of `data`.
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    hasher.update(data);
    let mut out = [0u8; 64];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Compute SHA-512 over the concatenation of `parts`.
pub fn sha512_concat(parts: &[&[u8]]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 64];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Expand `ikm` into `length` bytes of keying material with HKDF-SHA512.
///
/// Salt and info follow RFC 5869 semantics; either may be empty. The only
/// failure is a `length` beyond what one expand step can produce
/// (255 hash blocks).
pub fn derive_key(
    ikm: &[u8],
    salt: &[u8],
    info: &[u8],
    length: usize,
) -> Result<Vec<u8>, SrpError> {
    let mut okm = vec![0u8; length];
    Hkdf::<Sha512>::new(Some(salt), ikm)
        .expand(info, &mut okm)
        .map_err(|_| SrpError::KeyDerivation { requested: length })?;
    Ok(okm)
}

/// Expand `ikm` into the 64-byte width the outer pairing layer consumes.
pub fn derive_key_64(ikm: &[u8], salt: &[u8], info: &[u8]) -> Result<[u8; 64], SrpError> {
    let okm = derive_key(ikm, salt, info, 64)?;
    let mut out = [0u8; 64];
    out.copy_from_slice(&okm);
    Ok(out)
}

/// Well-known salt and info strings for pair-setup key derivation.
pub mod constants {
    pub const PAIR_SETUP_ENCRYPT_SALT: &[u8] = b"Pair-Setup-Encrypt-Salt";
    pub const PAIR_SETUP_ENCRYPT_INFO: &[u8] = b"Pair-Setup-Encrypt-Info";

    pub const PAIR_VERIFY_ENCRYPT_SALT: &[u8] = b"Pair-Verify-Encrypt-Salt";
    pub const PAIR_VERIFY_ENCRYPT_INFO: &[u8] = b"Pair-Verify-Encrypt-Info";
}
