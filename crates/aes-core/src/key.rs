//! Key sizes, cipher keys and the key schedule.
//!
//! Everything needed to build a schedule is `const fn`, and schedules live in
//! fixed arrays sized for the largest key.

use core::fmt;
use core::str::FromStr;

use crate::block::{Block, BLOCK_SIZE};
use crate::error::{Error, Result};
use crate::round::{inv_mix_columns, NB};
use crate::sbox::sbox;

/// Longest supported cipher key in bytes (AES-256).
pub const MAX_KEY_LEN: usize = 32;

/// Round keys in the longest schedule (`Nr + 1` for AES-256).
pub const MAX_ROUND_KEYS: usize = 15;

/// Round constants, indexed by `i / Nk`. Entry 0 is never used.
const RCON: [u32; 11] = [
    0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1b, 0x36,
];

/// The three supported key sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeySize {
    /// 128-bit key, `Nk = 4`, `Nr = 10`.
    Aes128,
    /// 192-bit key, `Nk = 6`, `Nr = 12`.
    Aes192,
    /// 256-bit key, `Nk = 8`, `Nr = 14`.
    Aes256,
}

impl KeySize {
    /// All supported sizes, smallest first.
    pub const ALL: [KeySize; 3] = [KeySize::Aes128, KeySize::Aes192, KeySize::Aes256];

    /// Key length in 32-bit words (`Nk`).
    pub const fn nk(self) -> usize {
        match self {
            KeySize::Aes128 => 4,
            KeySize::Aes192 => 6,
            KeySize::Aes256 => 8,
        }
    }

    /// Number of rounds (`Nr = max(Nb, Nk) + 6`).
    pub const fn nr(self) -> usize {
        let nk = self.nk();
        (if nk > NB { nk } else { NB }) + 6
    }

    /// Key length in bytes.
    pub const fn key_len(self) -> usize {
        4 * self.nk()
    }

    /// Number of words in the expanded schedule (`Nb * (Nr + 1)`).
    pub const fn schedule_words(self) -> usize {
        NB * (self.nr() + 1)
    }

    /// Maps a key length in bytes to its key size.
    pub const fn from_key_len(len: usize) -> Result<Self> {
        match len {
            16 => Ok(KeySize::Aes128),
            24 => Ok(KeySize::Aes192),
            32 => Ok(KeySize::Aes256),
            actual => Err(Error::InvalidKeyLength { actual }),
        }
    }
}

impl fmt::Display for KeySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySize::Aes128 => f.write_str("AES-128"),
            KeySize::Aes192 => f.write_str("AES-192"),
            KeySize::Aes256 => f.write_str("AES-256"),
        }
    }
}

/// Error returned when a key size name cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown key size `{0}` (expected 128, 192 or 256)")]
pub struct ParseKeySizeError(String);

impl FromStr for KeySize {
    type Err = ParseKeySizeError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        let bits = s
            .trim()
            .trim_start_matches("AES-")
            .trim_start_matches("aes-")
            .trim_start_matches("aes");
        match bits {
            "128" => Ok(KeySize::Aes128),
            "192" => Ok(KeySize::Aes192),
            "256" => Ok(KeySize::Aes256),
            _ => Err(ParseKeySizeError(s.to_owned())),
        }
    }
}

/// A validated AES cipher key of 16, 24 or 32 bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CipherKey {
    size: KeySize,
    // Zero past `size.key_len()`.
    bytes: [u8; MAX_KEY_LEN],
}

impl CipherKey {
    /// Validates the key length and copies the key.
    pub const fn new(key: &[u8]) -> Result<Self> {
        let size = match KeySize::from_key_len(key.len()) {
            Ok(size) => size,
            Err(err) => return Err(err),
        };
        let mut bytes = [0u8; MAX_KEY_LEN];
        let mut i = 0;
        while i < key.len() {
            bytes[i] = key[i];
            i += 1;
        }
        Ok(Self { size, bytes })
    }

    /// Key size derived from the key length.
    #[inline]
    pub const fn size(&self) -> KeySize {
        self.size
    }

    /// Raw key bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8] {
        self.bytes.split_at(self.size.key_len()).0
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherKey")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl TryFrom<&[u8]> for CipherKey {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self> {
        Self::new(value)
    }
}

macro_rules! cipher_key_from_array {
    ($($len:literal => $size:expr),* $(,)?) => {
        $(
            impl From<[u8; $len]> for CipherKey {
                fn from(value: [u8; $len]) -> Self {
                    let mut bytes = [0u8; MAX_KEY_LEN];
                    bytes[..$len].copy_from_slice(&value);
                    Self { size: $size, bytes }
                }
            }
        )*
    };
}

cipher_key_from_array!(16 => KeySize::Aes128, 24 => KeySize::Aes192, 32 => KeySize::Aes256);

/// Ordered round keys, one 16-byte block per round (`Nr + 1` in use).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundKeys {
    // Zero past `count`.
    keys: [Block; MAX_ROUND_KEYS],
    count: usize,
}

impl RoundKeys {
    /// Returns the round key at the requested index.
    ///
    /// # Panics
    ///
    /// Panics if `round` is greater than the final round (`Nr`).
    #[inline]
    pub const fn get(&self, round: usize) -> &Block {
        assert!(round < self.count, "round index past the final round");
        &self.keys[round]
    }

    /// The round keys in use, round 0 first.
    #[inline]
    pub const fn as_slice(&self) -> &[Block] {
        self.keys.split_at(self.count).0
    }

    /// Number of round keys.
    #[inline]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// True when the schedule holds no round keys.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Index of the final round (`Nr`).
    #[inline]
    pub const fn last_round(&self) -> usize {
        self.count.saturating_sub(1)
    }
}

/// Fails unless the target uses the little-endian word model the schedule
/// arithmetic is written for.
pub const fn ensure_supported_byte_order() -> Result<()> {
    if cfg!(target_endian = "little") {
        Ok(())
    } else {
        Err(Error::UnsupportedByteOrder)
    }
}

// Words are native-order views of four schedule bytes; on the supported
// little-endian model byte 0 is the least significant.
#[inline]
const fn get_word(bytes: &[u8], offset: usize) -> u32 {
    u32::from_ne_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[inline]
const fn set_word(bytes: &mut [u8], offset: usize, word: u32) {
    let le = word.to_ne_bytes();
    bytes[offset] = le[0];
    bytes[offset + 1] = le[1];
    bytes[offset + 2] = le[2];
    bytes[offset + 3] = le[3];
}

/// Cyclic byte rotation `[a0, a1, a2, a3] -> [a1, a2, a3, a0]`.
#[inline]
const fn rot_word(word: u32) -> u32 {
    word.rotate_right(8)
}

const fn sub_word(word: u32) -> u32 {
    let [b0, b1, b2, b3] = word.to_ne_bytes();
    u32::from_ne_bytes([sbox(b0), sbox(b1), sbox(b2), sbox(b3)])
}

/// Expands a cipher key into `Nr + 1` round keys (FIPS-197 KeyExpansion).
pub const fn expand_key(key: &CipherKey) -> Result<RoundKeys> {
    if let Err(err) = ensure_supported_byte_order() {
        return Err(err);
    }

    let size = key.size();
    let nk = size.nk();
    let total_words = size.schedule_words();

    let mut schedule = [0u8; 4 * NB * MAX_ROUND_KEYS];
    let mut i = 0;
    while i < size.key_len() {
        schedule[i] = key.bytes[i];
        i += 1;
    }

    let mut i = nk;
    while i < total_words {
        let mut temp = get_word(&schedule, 4 * (i - 1));
        if i % nk == 0 {
            temp = sub_word(rot_word(temp)) ^ RCON[i / nk];
        } else if nk > 6 && i % nk == 4 {
            temp = sub_word(temp);
        }
        let word = get_word(&schedule, 4 * (i - nk)) ^ temp;
        set_word(&mut schedule, 4 * i, word);
        i += 1;
    }

    let count = size.nr() + 1;
    let mut keys = [[0u8; BLOCK_SIZE]; MAX_ROUND_KEYS];
    let mut round = 0;
    while round < count {
        let mut b = 0;
        while b < BLOCK_SIZE {
            keys[round][b] = schedule[round * BLOCK_SIZE + b];
            b += 1;
        }
        round += 1;
    }

    Ok(RoundKeys { keys, count })
}

/// Derives the equivalent inverse cipher schedule: InvMixColumns applied to
/// every round key except the first and last.
pub const fn equivalent_inverse_keys(round_keys: &RoundKeys) -> RoundKeys {
    let mut keys = *round_keys;
    let last = keys.last_round();
    let mut round = 1;
    while round < last {
        inv_mix_columns(&mut keys.keys[round]);
        round += 1;
    }
    keys
}
