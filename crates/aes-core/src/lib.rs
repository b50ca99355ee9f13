//! AES (FIPS-197) block cipher built from first principles.
//!
//! This crate mirrors the FIPS-197 specification and provides:
//! - GF(2^8) byte arithmetic and the four round transformations.
//! - Key expansion for 128, 192 and 256-bit keys, plus the transformed
//!   schedule used by the equivalent inverse cipher.
//! - An [`Engine`] exposing the cipher, the inverse cipher and the equivalent
//!   inverse cipher for single 16-byte blocks.
//! - Optional round-by-round tracing in the vocabulary of Appendix C.
//!
//! Engine construction and the untraced block operations are `const fn`:
//!
//! ```
//! use aes_core::{Block, Engine};
//!
//! const KEY: [u8; 16] = [0; 16];
//! const ENGINE: Engine = match Engine::new(&KEY) {
//!     Ok(engine) => engine,
//!     Err(_) => panic!("invalid key"),
//! };
//! const CIPHERTEXT: Block = ENGINE.cipher(&[0; 16]);
//! assert_eq!(ENGINE.invcipher(&CIPHERTEXT), [0; 16]);
//! ```
//!
//! Key schedule words follow a least-significant-byte-first model; building an
//! engine on a big-endian target fails with [`Error::UnsupportedByteOrder`].
//!
//! The implementation aims for clarity and testability rather than constant-time
//! guarantees; it should not be treated as side-channel hardened.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod block;
mod cipher;
mod error;
pub mod field;
mod key;
pub mod round;
mod sbox;
pub mod trace;

pub use crate::block::{block_from_slice, to_hex, xor_in_place, Block, BLOCK_SIZE};
pub use crate::cipher::Engine;
pub use crate::error::{Error, Result};
pub use crate::key::{
    ensure_supported_byte_order, equivalent_inverse_keys, expand_key, CipherKey, KeySize,
    ParseKeySizeError, RoundKeys, MAX_KEY_LEN, MAX_ROUND_KEYS,
};
pub use crate::sbox::{inv_sbox, sbox, INV_SBOX, SBOX};
pub use crate::trace::{LogTracer, NoopTracer, RecordingTracer, RoundTracer, StepLabel, TraceStep};
