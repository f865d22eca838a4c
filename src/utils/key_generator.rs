//! Short key derivation.
//!
//! A key is the HMAC-SHA256 of `url ++ issued_at ++ expiry`, truncated to its
//! first 40 bits and written as 8 base-62 digits. The output is not random: the
//! same inputs in the same second always give the same key, so callers must handle
//! collisions themselves (see [`KeyGenerator::generate_salted`]).

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Digits, then uppercase, then lowercase. Index = digit value.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Length of every generated short key.
pub const KEY_LENGTH: usize = 8;

/// Number of leading digest bytes folded into the key (40 bits < 62^8).
const DIGEST_PREFIX_BYTES: usize = 5;

/// Derives short keys from a URL, a timestamp and a process-wide secret.
#[derive(Clone)]
pub struct KeyGenerator {
    secret: Vec<u8>,
}

impl std::fmt::Debug for KeyGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyGenerator")
            .field("secret", &"***")
            .finish()
    }
}

impl KeyGenerator {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Generates the candidate key for a shorten request.
    ///
    /// `issued_at` is the Unix timestamp (seconds) the request is processed at;
    /// `expiry` is the requested lifetime in seconds, omitted from the input when `None`.
    pub fn generate(&self, url: &str, expiry: Option<u64>, issued_at: i64) -> String {
        self.derive(url, expiry, issued_at, None)
    }

    /// Same as [`generate`](Self::generate), with `#<salt>` appended to the HMAC input.
    ///
    /// Used for collision retries. The salt must vary between calls (the service
    /// draws it at random) or identical requests in one second keep landing on
    /// the same candidates.
    pub fn generate_salted(
        &self,
        url: &str,
        expiry: Option<u64>,
        issued_at: i64,
        salt: u64,
    ) -> String {
        self.derive(url, expiry, issued_at, Some(salt))
    }

    fn derive(&self, url: &str, expiry: Option<u64>, issued_at: i64, salt: Option<u64>) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts any key length");

        mac.update(url.as_bytes());
        mac.update(issued_at.to_string().as_bytes());
        if let Some(expiry) = expiry {
            mac.update(expiry.to_string().as_bytes());
        }
        if let Some(salt) = salt {
            mac.update(format!("#{salt}").as_bytes());
        }

        let digest = mac.finalize().into_bytes();
        let value = digest[..DIGEST_PREFIX_BYTES]
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));

        encode_base62(value, KEY_LENGTH)
    }
}

/// Encodes `value` in base 62, left-padded with `'0'` to at least `width` characters.
pub fn encode_base62(mut value: u64, width: usize) -> String {
    let mut digits = Vec::with_capacity(width.max(11));

    while value > 0 {
        digits.push(ALPHABET[(value % 62) as usize]);
        value /= 62;
    }
    while digits.len() < width {
        digits.push(ALPHABET[0]);
    }

    digits.reverse();
    digits.into_iter().map(char::from).collect()
}

/// Returns `true` if `key` could have been produced by [`KeyGenerator`].
pub fn is_well_formed(key: &str) -> bool {
    key.len() == KEY_LENGTH && key.bytes().all(|b| b.is_ascii_alphanumeric())
}
