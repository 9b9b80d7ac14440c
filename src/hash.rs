//! Deterministic hashing of named text artifacts.
//!
//! A config's storage key is derived from a SHA-256 digest over its
//! flattened (name, content) strings. Each string is length-prefixed so
//! that `("ab", "c")` and `("a", "bc")` cannot collide by concatenation.

use sha2::{Digest, Sha256};

/// Number of leading hex characters used as the on-disk directory name.
///
/// Truncating to 12 characters keeps paths readable. The residual
/// collision risk at this length is accepted; there is no retry or
/// probing logic behind it.
pub const SHORT_HASH_LENGTH: usize = 12;

/// Hash an ordered sequence of strings into a hex SHA-256 digest.
///
/// Each string contributes its byte length as a 4-byte big-endian prefix
/// followed by its UTF-8 bytes. Pure function of the input sequence.
pub fn hash_strings<'a, I>(strings: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = Sha256::new();
    for s in strings {
        hasher.update((s.len() as u32).to_be_bytes());
        hasher.update(s.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Truncate a full digest to its short form.
pub fn short_hash(full: &str) -> &str {
    &full[..SHORT_HASH_LENGTH]
}
