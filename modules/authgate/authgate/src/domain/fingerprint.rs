//! Request fingerprints used as decision cache keys.
//!
//! A fingerprint is a 32-bit `xxh32` digest of the security-relevant fields
//! of a request, in a fixed order:
//!
//! - authenticate: username, password
//! - authorize: username, topic, `"true"` / `"false"` for the write flag
//!
//! The client id is not part of either fingerprint, so two clients presenting
//! the same credentials share one cache entry.
//!
//! Fingerprints are not reversible and may collide. The cache treats equal
//! fingerprints as equal requests.

use std::fmt;

use authgate_sdk::{AuthenticateRequest, AuthorizeRequest};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh32::Xxh32;

const SEED: u32 = 0;

/// Cache key derived from a decision request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u32);

impl Fingerprint {
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// How fields are combined before hashing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintScheme {
    /// Raw concatenation without separators.
    ///
    /// Different splits of the same bytes collide, e.g. `("ab", "c")` and
    /// `("a", "bc")`. The default, as it keeps the reference field encoding.
    #[default]
    Concatenated,

    /// Each field is preceded by its length as a little-endian `u64`,
    /// which makes the encoding unambiguous.
    LengthPrefixed,
}

impl FingerprintScheme {
    /// Hash an ordered sequence of fields.
    #[must_use]
    pub fn fingerprint(self, fields: &[&[u8]]) -> Fingerprint {
        let mut hasher = Xxh32::new(SEED);
        for field in fields {
            if self == Self::LengthPrefixed {
                let len = u64::try_from(field.len()).unwrap_or(u64::MAX);
                hasher.update(&len.to_le_bytes());
            }
            hasher.update(field);
        }
        Fingerprint(hasher.digest())
    }

    #[must_use]
    pub fn authenticate(self, request: &AuthenticateRequest) -> Fingerprint {
        self.fingerprint(&[request.username().as_bytes(), request.password()])
    }

    #[must_use]
    pub fn authorize(self, request: &AuthorizeRequest) -> Fingerprint {
        let write: &[u8] = if request.is_write() { b"true" } else { b"false" };
        self.fingerprint(&[
            request.username().as_bytes(),
            request.topic().as_bytes(),
            write,
        ])
    }
}
