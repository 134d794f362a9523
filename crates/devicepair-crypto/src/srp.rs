//! SRP-6a client for Apple Pair-Setup.
//!
//! Uses the 3072-bit prime (RFC 5054), generator g=5, SHA-512. The client
//! proof follows Apple's variant: M1 hashes the session key K, not the raw
//! shared secret S.

use crate::bigint::{bigint_to_buffer, buffer_to_bigint, mod_pow};
use crate::hash::{sha512, sha512_concat};
use devicepair_core::SrpError;
use num_bigint::BigUint;
use rand::rngs::OsRng;
use rand::RngCore;
use subtle::ConstantTimeEq;
use tracing::{debug, trace};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// N size in bytes (3072 bits = 384 bytes).
pub const KEY_BYTES: usize = 384;

/// Client private exponent size in bytes (256 bits).
pub const PRIVATE_KEY_BYTES: usize = 32;

/// Identity used by Pair-Setup unless overridden.
pub const DEFAULT_USERNAME: &str = "Pair-Setup";

/// Candidate limit for the private-key rejection loop.
const MAX_KEYGEN_ATTEMPTS: u32 = 100;

/// RFC 5054 3072-bit prime N as hex string.
const RFC5054_N_3072: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E08",
    "8A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B",
    "302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9",
    "A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE6",
    "49286651ECE45B3DC2007CB8A163BF0598DA48361C55D39A69163FA8",
    "FD24CF5F83655D23DCA3AD961C62F356208552BB9ED529077096966D",
    "670C354E4ABC9804F1746C08CA18217C32905E462E36CE3BE39E772C",
    "180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718",
    "3995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D",
    "04507A33A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7D",
    "B3970F85A6E1E4C7ABF5AE8CDB0933D71E8C94E04A25619DCEE3D226",
    "1AD2EE6BF12FFA06D98A0864D87602733EC86A64521F2B18177B200C",
    "BBE117577A615D6C770988C0BAD946E208E24FA074E5AB3143DB5BFC",
    "E0FD108E4B82D120A93AD2CAFFFFFFFFFFFFFFFF"
);

/// SRP-6a group parameters (3072-bit, RFC 5054).
pub struct SrpParams {
    /// Prime modulus N.
    pub n: BigUint,
    /// Generator g (always 5).
    pub g: BigUint,
}

impl Default for SrpParams {
    fn default() -> Self {
        let n = BigUint::parse_bytes(RFC5054_N_3072.as_bytes(), 16)
            .expect("Invalid RFC 5054 prime constant");
        let g = BigUint::from(5u32);
        Self { n, g }
    }
}

/// Pad a group element to the group width (384 bytes).
fn pad(value: &BigUint) -> Result<Vec<u8>, SrpError> {
    bigint_to_buffer(value, KEY_BYTES)
}

/// Compute k = SHA-512(PAD(N) || PAD(g)).
fn compute_k(params: &SrpParams) -> BigUint {
    let n_bytes = pad(&params.n).expect("N fits the group width");
    let g_bytes = pad(&params.g).expect("g fits the group width");
    buffer_to_bigint(&sha512_concat(&[&n_bytes, &g_bytes]))
}

/// Compute u = SHA-512(PAD(A) || PAD(B)).
fn compute_u(a: &BigUint, b: &BigUint) -> Result<BigUint, SrpError> {
    Ok(buffer_to_bigint(&sha512_concat(&[&pad(a)?, &pad(b)?])))
}

/// Compute x = SHA-512(salt || SHA-512(username || ":" || password)).
fn compute_x(salt: &[u8], username: &str, password: &[u8]) -> BigUint {
    let inner = sha512_concat(&[username.as_bytes(), b":", password]);
    buffer_to_bigint(&sha512_concat(&[salt, &inner]))
}

/// Compute M1 = SHA-512(SHA-512(PAD(N)) XOR SHA-512(PAD(g)) || SHA-512(I)
/// || salt || PAD(A) || PAD(B) || K).
///
/// Both N and g are padded to the group width inside the XOR term, and the
/// final component is the session key K rather than the textbook S.
fn compute_m1(
    params: &SrpParams,
    username: &str,
    salt: &[u8],
    a: &BigUint,
    b: &BigUint,
    session_key: &[u8],
) -> Result<[u8; 64], SrpError> {
    let h_n = sha512(&pad(&params.n)?);
    let h_g = sha512(&pad(&params.g)?);

    let mut group_hash = [0u8; 64];
    for (out, (n_byte, g_byte)) in group_hash.iter_mut().zip(h_n.iter().zip(h_g.iter())) {
        *out = n_byte ^ g_byte;
    }

    let h_username = sha512(username.as_bytes());

    Ok(sha512_concat(&[
        &group_hash,
        &h_username,
        salt,
        &pad(a)?,
        &pad(b)?,
        session_key,
    ]))
}

/// Compute the expected server proof M2 = SHA-512(PAD(A) || M1 || K).
fn compute_m2(a: &BigUint, m1: &[u8], session_key: &[u8]) -> Result<[u8; 64], SrpError> {
    Ok(sha512_concat(&[&pad(a)?, m1, session_key]))
}

/// Client half of the Pair-Setup SRP exchange.
///
/// One instance per pairing attempt. The salt and server public key may be
/// provided in either order; the client ephemeral key pair is generated as
/// soon as both are present. The shared secret and session key are computed
/// lazily on the first call that needs them.
///
/// Not thread-safe: all methods take `&mut self` and external code must
/// serialize calls on a single instance.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SrpClient {
    #[zeroize(skip)]
    params: SrpParams,
    #[zeroize(skip)]
    k: BigUint,
    username: String,
    password: Vec<u8>,
    salt: Option<Vec<u8>>,
    #[zeroize(skip)]
    server_public_key: Option<BigUint>,
    private_key: Vec<u8>,
    #[zeroize(skip)]
    public_key: Option<BigUint>,
    session_key: Option<Vec<u8>>,
    #[zeroize(skip)]
    keys_generated: bool,
    #[zeroize(skip)]
    disposed: bool,
}

impl SrpClient {
    /// Create a new client with the 3072-bit group and the default
    /// "Pair-Setup" identity.
    pub fn new() -> Self {
        let params = SrpParams::default();
        let k = compute_k(&params);
        Self {
            params,
            k,
            username: DEFAULT_USERNAME.to_string(),
            password: Vec::new(),
            salt: None,
            server_public_key: None,
            private_key: Vec::new(),
            public_key: None,
            session_key: None,
            keys_generated: false,
            disposed: false,
        }
    }

    /// Set the pairing identity.
    ///
    /// The username is trimmed; the password is taken as-is. Both must be
    /// non-empty.
    pub fn set_identity(&mut self, username: &str, password: &str) -> Result<(), SrpError> {
        self.ensure_not_disposed()?;
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(SrpError::EmptyIdentity);
        }
        self.username = username.to_string();
        self.password.zeroize();
        self.password = password.as_bytes().to_vec();
        Ok(())
    }

    /// Provide the server's salt.
    ///
    /// Generates the client ephemeral key pair if the server public key has
    /// already arrived.
    pub fn provide_salt(&mut self, salt: &[u8]) -> Result<(), SrpError> {
        self.ensure_not_disposed()?;
        if salt.is_empty() {
            return Err(SrpError::EmptySalt);
        }
        self.salt = Some(salt.to_vec());
        self.maybe_generate_keys()
    }

    /// Provide the server's public key B as a 384-byte big-endian buffer.
    ///
    /// Generates the client ephemeral key pair if the salt has already
    /// arrived.
    pub fn provide_server_public_key(&mut self, key: &[u8]) -> Result<(), SrpError> {
        self.ensure_not_disposed()?;
        if key.len() != KEY_BYTES {
            return Err(SrpError::InvalidKeyLength {
                expected: KEY_BYTES,
                actual: key.len(),
            });
        }

        let b = buffer_to_bigint(key);
        if &b % &self.params.n == BigUint::ZERO {
            return Err(SrpError::InvalidServerPublicKey(
                "B mod N = 0".to_string(),
            ));
        }
        let n_minus_one = &self.params.n - 1u32;
        if b <= BigUint::from(1u32) || b >= n_minus_one {
            return Err(SrpError::InvalidServerPublicKey(
                "B outside (1, N-1)".to_string(),
            ));
        }

        self.server_public_key = Some(b);
        self.maybe_generate_keys()
    }

    /// Get the client public key A as a 384-byte big-endian buffer.
    pub fn public_key(&self) -> Result<Vec<u8>, SrpError> {
        self.ensure_not_disposed()?;
        let a = self
            .public_key
            .as_ref()
            .ok_or(SrpError::MissingPrerequisite("client key pair"))?;
        pad(a)
    }

    /// Compute the client proof M1 (64 bytes).
    ///
    /// Derives the shared secret and session key on first use.
    pub fn compute_proof(&mut self) -> Result<[u8; 64], SrpError> {
        self.ensure_session_key()?;
        let salt = self
            .salt
            .as_ref()
            .ok_or(SrpError::MissingPrerequisite("salt"))?;
        let b = self
            .server_public_key
            .as_ref()
            .ok_or(SrpError::MissingPrerequisite("server public key"))?;
        let a = self
            .public_key
            .as_ref()
            .ok_or(SrpError::MissingPrerequisite("client key pair"))?;
        let session_key = self
            .session_key
            .as_ref()
            .ok_or(SrpError::MissingPrerequisite("session key"))?;
        compute_m1(&self.params, &self.username, salt, a, b, session_key)
    }

    /// Get the session key K = SHA-512(PAD(S)) (64 bytes).
    ///
    /// Derives the shared secret and session key on first use.
    pub fn session_key(&mut self) -> Result<Vec<u8>, SrpError> {
        self.ensure_session_key()?;
        self.session_key
            .clone()
            .ok_or(SrpError::MissingPrerequisite("session key"))
    }

    /// Verify the server proof M2 in constant time.
    pub fn verify_server_proof(&mut self, proof: &[u8]) -> Result<bool, SrpError> {
        let m1 = self.compute_proof()?;
        let a = self
            .public_key
            .as_ref()
            .ok_or(SrpError::MissingPrerequisite("client key pair"))?;
        let session_key = self
            .session_key
            .as_ref()
            .ok_or(SrpError::MissingPrerequisite("session key"))?;
        let expected = compute_m2(a, &m1, session_key)?;
        Ok(proof.ct_eq(&expected).into())
    }

    /// True once salt, server public key, and the client key pair are all
    /// present on a live client.
    pub fn is_ready(&self) -> bool {
        !self.disposed
            && self.keys_generated
            && self.salt.is_some()
            && self.server_public_key.is_some()
    }

    /// True once the session key has been derived on a live client.
    pub fn has_session_key(&self) -> bool {
        !self.disposed && self.session_key.is_some()
    }

    /// Zeroize secret material and mark the client unusable. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.password.zeroize();
        self.private_key.zeroize();
        self.salt.zeroize();
        self.session_key.zeroize();
        self.server_public_key = None;
        self.public_key = None;
        self.disposed = true;
        debug!("SRP client disposed");
    }

    fn ensure_not_disposed(&self) -> Result<(), SrpError> {
        if self.disposed {
            return Err(SrpError::Disposed);
        }
        Ok(())
    }

    fn maybe_generate_keys(&mut self) -> Result<(), SrpError> {
        if self.keys_generated || self.salt.is_none() || self.server_public_key.is_none() {
            return Ok(());
        }
        self.generate_key_pair()
    }

    /// Generate the ephemeral key pair `(a, A)`.
    ///
    /// Samples 32 raw bytes per candidate and rejects out-of-range results
    /// instead of folding them back with a modulus, so the distribution
    /// stays uniform.
    fn generate_key_pair(&mut self) -> Result<(), SrpError> {
        let one = BigUint::from(1u32);
        let n_minus_one = &self.params.n - &one;

        for attempt in 1..=MAX_KEYGEN_ATTEMPTS {
            let mut candidate = [0u8; PRIVATE_KEY_BYTES];
            OsRng.fill_bytes(&mut candidate);
            let a = buffer_to_bigint(&candidate);
            if a == BigUint::ZERO || a >= self.params.n {
                candidate.zeroize();
                continue;
            }

            let public = mod_pow(&self.params.g, &a, &self.params.n);
            if public <= one || public >= n_minus_one {
                candidate.zeroize();
                continue;
            }

            trace!(attempt, "SRP ephemeral key pair generated");
            self.private_key = candidate.to_vec();
            candidate.zeroize();
            self.public_key = Some(public);
            self.keys_generated = true;
            return Ok(());
        }

        Err(SrpError::KeyGenerationExhausted {
            attempts: MAX_KEYGEN_ATTEMPTS,
        })
    }

    /// Derive S and K if not already present.
    fn ensure_session_key(&mut self) -> Result<(), SrpError> {
        self.ensure_not_disposed()?;
        if self.password.is_empty() {
            return Err(SrpError::MissingPrerequisite("identity"));
        }
        if self.session_key.is_some() {
            return Ok(());
        }

        let salt = self
            .salt
            .as_ref()
            .ok_or(SrpError::MissingPrerequisite("salt"))?;
        let b = self
            .server_public_key
            .as_ref()
            .ok_or(SrpError::MissingPrerequisite("server public key"))?;
        let a_pub = self
            .public_key
            .as_ref()
            .ok_or(SrpError::MissingPrerequisite("client key pair"))?;

        let a = buffer_to_bigint(&self.private_key);
        let u = compute_u(a_pub, b)?;
        let x = compute_x(salt, &self.username, &self.password);

        // base = (B - k * g^x) mod N, corrected to stay non-negative.
        let g_x = mod_pow(&self.params.g, &x, &self.params.n);
        let k_gx = (&self.k * &g_x) % &self.params.n;
        let base = if *b >= k_gx {
            b - &k_gx
        } else {
            b + &self.params.n - &k_gx
        };

        // The exponent is the full-width integer a + u*x. It must not be
        // reduced before exponentiation.
        let exponent = &a + &u * &x;
        let s = mod_pow(&base, &exponent, &self.params.n);

        self.session_key = Some(sha512(&pad(&s)?).to_vec());
        debug!("SRP session key derived");
        Ok(())
    }

    /// Install a fixed private key for deterministic tests.
    #[cfg(test)]
    fn install_key_pair(&mut self, private_key: &[u8]) {
        let a = buffer_to_bigint(private_key);
        self.public_key = Some(mod_pow(&self.params.g, &a, &self.params.n));
        self.private_key = private_key.to_vec();
        self.keys_generated = true;
    }
}

impl Default for SrpClient {
    fn default() -> Self {
        Self::new()
    }
}
