//! # Password Hashing
//!
//! The pure half of the credential store: hashing and verification.
//! Lookup, last-login updates and the login audit entry live in
//! `atlas-db`'s user repository.
//!
//! ## Hash Schemes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Strong  bcrypt, salted, fixed cost      "$2b$12$..."           │
//! │  Legacy  unsalted SHA-256 hex digest     64 hex chars           │
//! │                                                                 │
//! │  New hashes are ALWAYS Strong. Legacy exists only to verify    │
//! │  pre-migration rows; a successful legacy login is transparently │
//! │  rehashed to Strong by the user repository.                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Scheme detection is a tagged enum ([`StoredHash`]) rather than ad hoc
//! prefix checks scattered through callers.

use sha2::{Digest, Sha256};
use std::fmt::Write as _;

use crate::error::CoreError;

/// Fixed bcrypt cost factor for all newly produced hashes.
///
/// Not configurable: a uniform cost keeps verification time predictable
/// at the login prompt and avoids weak-cost rows sneaking in.
pub const BCRYPT_COST: u32 = 12;

// =============================================================================
// Stored Hash
// =============================================================================

/// A stored credential hash, tagged by scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredHash {
    /// bcrypt (salted, adaptive). The only scheme ever written for new
    /// or upgraded credentials.
    Strong(String),
    /// Unsalted SHA-256 hex digest from the pre-migration data set.
    /// Verification-only.
    Legacy(String),
}

impl StoredHash {
    /// Tags a raw stored hash by its format marker.
    ///
    /// bcrypt hashes carry a `$2…$` prefix; anything else is treated as a
    /// legacy digest, matching the pre-migration data.
    pub fn parse(stored: &str) -> Self {
        if stored.starts_with("$2") {
            StoredHash::Strong(stored.to_string())
        } else {
            StoredHash::Legacy(stored.to_string())
        }
    }

    /// Verifies a plaintext password against this hash.
    ///
    /// Malformed stored hashes verify as false rather than erroring:
    /// a corrupt row must read as "invalid credentials", not a crash.
    pub fn verify(&self, plaintext: &str) -> bool {
        match self {
            StoredHash::Strong(hash) => bcrypt::verify(plaintext, hash).unwrap_or(false),
            StoredHash::Legacy(hash) => {
                // Constant-shape comparison of hex digests.
                legacy_sha256_hex(plaintext) == *hash
            }
        }
    }

    /// True when a successful verification should trigger a rehash to
    /// the strong scheme.
    #[inline]
    pub fn needs_upgrade(&self) -> bool {
        matches!(self, StoredHash::Legacy(_))
    }
}

// =============================================================================
// Hashing
// =============================================================================

/// Hashes a plaintext password with the strong scheme.
///
/// The output always carries the bcrypt format marker and can never be
/// mistaken for a legacy digest.
pub fn hash_password(plaintext: &str) -> Result<String, CoreError> {
    bcrypt::hash(plaintext, BCRYPT_COST).map_err(|e| CoreError::PasswordHash(e.to_string()))
}

/// Verifies a plaintext password against a raw stored hash, detecting
/// the scheme from its format marker.
pub fn verify_password(plaintext: &str, stored: &str) -> bool {
    StoredHash::parse(stored).verify(plaintext)
}

/// Computes the legacy unsalted SHA-256 hex digest.
///
/// Never used for new credentials; exists for verifying pre-migration
/// rows and for constructing legacy fixtures in tests.
pub fn legacy_sha256_hex(plaintext: &str) -> String {
    let digest = Sha256::digest(plaintext.as_bytes());
    let mut out = String::with_capacity(64);
    for byte in digest {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
