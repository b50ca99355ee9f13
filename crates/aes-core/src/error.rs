//! Error type for engine construction.

use thiserror::Error;

use crate::key::KeySize;

/// Failures raised while building an [`Engine`](crate::Engine).
///
/// Per-block operations never fail; every error surfaces at construction.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The cipher key is not 16, 24 or 32 bytes long.
    #[error("invalid AES key length {actual}: expected 16, 24 or 32 bytes")]
    InvalidKeyLength {
        /// Length of the rejected key in bytes.
        actual: usize,
    },
    /// The key is a valid AES key, but not of the size that was asked for.
    #[error("{expected} requires a {} byte key, got {actual} bytes", .expected.key_len())]
    KeySizeMismatch {
        /// Key size the caller requested.
        expected: KeySize,
        /// Length of the supplied key in bytes.
        actual: usize,
    },
    /// The key schedule word model assumes a little-endian target.
    #[error("unsupported byte order: the key schedule requires a little-endian target")]
    UnsupportedByteOrder,
}

/// Result alias used across the crate.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_mismatch_names_both_sizes() {
        let err = Error::KeySizeMismatch {
            expected: KeySize::Aes256,
            actual: 16,
        };
        assert_eq!(
            err.to_string(),
            "AES-256 requires a 32 byte key, got 16 bytes"
        );
    }

    #[test]
    fn invalid_length_lists_accepted_sizes() {
        let err = Error::InvalidKeyLength { actual: 20 };
        assert_eq!(
            err.to_string(),
            "invalid AES key length 20: expected 16, 24 or 32 bytes"
        );
    }
}
