//! The AES engine: forward cipher, inverse cipher and equivalent inverse
//! cipher over a single 16-byte block.

use core::fmt;

use crate::block::Block;
use crate::error::{Error, Result};
use crate::key::{equivalent_inverse_keys, expand_key, CipherKey, KeySize, RoundKeys};
use crate::round::{
    add_round_key, inv_mix_columns, inv_shift_rows, inv_sub_bytes, mix_columns, shift_rows,
    sub_bytes,
};
use crate::trace::{RoundTracer, StepLabel, TraceStep};

/// An AES instance bound to one cipher key.
///
/// Both schedules are built once at construction and never change until
/// [`Engine::set_cipher_key`] replaces the key. All block operations take
/// `&self`, so an engine can be shared across threads. Construction and the
/// untraced block operations are `const fn` and can run at compile time.
#[derive(Clone, PartialEq, Eq)]
pub struct Engine {
    key: CipherKey,
    round_keys: RoundKeys,
    eqinv_round_keys: RoundKeys,
}

impl Engine {
    /// Builds an engine from a 16, 24 or 32 byte key.
    pub const fn new(key: &[u8]) -> Result<Self> {
        match CipherKey::new(key) {
            Ok(key) => Self::from_cipher_key(key),
            Err(err) => Err(err),
        }
    }

    /// Builds an engine, requiring the key to have exactly `size`'s length.
    pub const fn with_key_size(size: KeySize, key: &[u8]) -> Result<Self> {
        let key = match CipherKey::new(key) {
            Ok(key) => key,
            Err(err) => return Err(err),
        };
        if key.size().nk() != size.nk() {
            return Err(Error::KeySizeMismatch {
                expected: size,
                actual: key.size().key_len(),
            });
        }
        Self::from_cipher_key(key)
    }

    /// Builds an engine from an already validated key.
    pub const fn from_cipher_key(key: CipherKey) -> Result<Self> {
        let round_keys = match expand_key(&key) {
            Ok(round_keys) => round_keys,
            Err(err) => return Err(err),
        };
        let eqinv_round_keys = equivalent_inverse_keys(&round_keys);
        Ok(Self {
            key,
            round_keys,
            eqinv_round_keys,
        })
    }

    /// Replaces the cipher key and rebuilds both schedules. The key size may
    /// change; on error the engine keeps its previous key.
    pub fn set_cipher_key(&mut self, key: &[u8]) -> Result<()> {
        *self = Self::new(key)?;
        tracing::debug!(
            key_size = %self.key_size(),
            rounds = self.rounds(),
            "replaced AES cipher key"
        );
        Ok(())
    }

    /// The cipher key this engine was built from.
    #[inline]
    pub const fn cipher_key(&self) -> &[u8] {
        self.key.as_bytes()
    }

    /// Key size of the current key.
    #[inline]
    pub const fn key_size(&self) -> KeySize {
        self.key.size()
    }

    /// Number of rounds (`Nr`).
    #[inline]
    pub const fn rounds(&self) -> usize {
        self.key.size().nr()
    }

    /// Round key `round` of the forward schedule.
    ///
    /// # Panics
    ///
    /// Panics if `round > Nr`.
    #[inline]
    pub const fn round_key(&self, round: usize) -> &Block {
        self.round_keys.get(round)
    }

    /// Round key `round` of the equivalent inverse schedule.
    ///
    /// # Panics
    ///
    /// Panics if `round > Nr`.
    #[inline]
    pub const fn eqinv_round_key(&self, round: usize) -> &Block {
        self.eqinv_round_keys.get(round)
    }

    /// The forward schedule.
    pub const fn round_keys(&self) -> &RoundKeys {
        &self.round_keys
    }

    /// The equivalent inverse schedule.
    pub const fn eqinv_round_keys(&self) -> &RoundKeys {
        &self.eqinv_round_keys
    }

    /// Encrypts one block.
    pub const fn cipher(&self, plaintext: &Block) -> Block {
        let nr = self.rounds();
        let mut state = *plaintext;

        add_round_key(&mut state, self.round_key(0));
        let mut round = 1;
        while round < nr {
            sub_bytes(&mut state);
            shift_rows(&mut state);
            mix_columns(&mut state);
            add_round_key(&mut state, self.round_key(round));
            round += 1;
        }
        sub_bytes(&mut state);
        shift_rows(&mut state);
        add_round_key(&mut state, self.round_key(nr));

        state
    }

    /// Decrypts one block with the straightforward inverse cipher.
    pub const fn invcipher(&self, ciphertext: &Block) -> Block {
        let nr = self.rounds();
        let mut state = *ciphertext;

        add_round_key(&mut state, self.round_key(nr));
        let mut round = nr - 1;
        while round > 0 {
            inv_shift_rows(&mut state);
            inv_sub_bytes(&mut state);
            add_round_key(&mut state, self.round_key(round));
            inv_mix_columns(&mut state);
            round -= 1;
        }
        inv_shift_rows(&mut state);
        inv_sub_bytes(&mut state);
        add_round_key(&mut state, self.round_key(0));

        state
    }

    /// Decrypts one block with the equivalent inverse cipher.
    pub const fn eqinvcipher(&self, ciphertext: &Block) -> Block {
        let nr = self.rounds();
        let mut state = *ciphertext;

        add_round_key(&mut state, self.eqinv_round_key(nr));
        let mut round = nr - 1;
        while round > 0 {
            inv_sub_bytes(&mut state);
            inv_shift_rows(&mut state);
            inv_mix_columns(&mut state);
            add_round_key(&mut state, self.eqinv_round_key(round));
            round -= 1;
        }
        inv_sub_bytes(&mut state);
        inv_shift_rows(&mut state);
        add_round_key(&mut state, self.eqinv_round_key(0));

        state
    }

    /// [`Engine::cipher`], reporting every intermediate state to `tracer`.
    pub fn cipher_traced<T: RoundTracer + ?Sized>(
        &self,
        plaintext: &Block,
        tracer: &mut T,
    ) -> Block {
        let nr = self.rounds();
        let mut state = *plaintext;
        let mut emit = |round: usize, label: StepLabel, bytes: &Block| {
            tracer.record(&TraceStep {
                round,
                label,
                bytes: *bytes,
            })
        };

        emit(0, StepLabel::Input, &state);
        add_round_key(&mut state, self.round_key(0));
        emit(0, StepLabel::KSch, self.round_key(0));

        for round in 1..nr {
            emit(round, StepLabel::Start, &state);
            sub_bytes(&mut state);
            emit(round, StepLabel::SBox, &state);
            shift_rows(&mut state);
            emit(round, StepLabel::SRow, &state);
            mix_columns(&mut state);
            emit(round, StepLabel::MCol, &state);
            add_round_key(&mut state, self.round_key(round));
            emit(round, StepLabel::KSch, self.round_key(round));
        }

        emit(nr, StepLabel::Start, &state);
        sub_bytes(&mut state);
        emit(nr, StepLabel::SBox, &state);
        shift_rows(&mut state);
        emit(nr, StepLabel::SRow, &state);
        add_round_key(&mut state, self.round_key(nr));
        emit(nr, StepLabel::KSch, self.round_key(nr));
        emit(nr, StepLabel::Output, &state);

        state
    }

    /// [`Engine::invcipher`], reporting every intermediate state to `tracer`.
    pub fn invcipher_traced<T: RoundTracer + ?Sized>(
        &self,
        ciphertext: &Block,
        tracer: &mut T,
    ) -> Block {
        let nr = self.rounds();
        let mut state = *ciphertext;
        // Appendix C numbers inverse rounds upward from 0.
        let mut emit = |round: usize, label: StepLabel, bytes: &Block| {
            tracer.record(&TraceStep {
                round: nr - round,
                label,
                bytes: *bytes,
            })
        };

        emit(nr, StepLabel::IInput, &state);
        add_round_key(&mut state, self.round_key(nr));
        emit(nr, StepLabel::IKSch, self.round_key(nr));

        for round in (1..nr).rev() {
            emit(round, StepLabel::IStart, &state);
            inv_shift_rows(&mut state);
            emit(round, StepLabel::ISRow, &state);
            inv_sub_bytes(&mut state);
            emit(round, StepLabel::ISBox, &state);
            add_round_key(&mut state, self.round_key(round));
            emit(round, StepLabel::IKSch, self.round_key(round));
            emit(round, StepLabel::IKAdd, &state);
            inv_mix_columns(&mut state);
        }

        emit(0, StepLabel::IStart, &state);
        inv_shift_rows(&mut state);
        emit(0, StepLabel::ISRow, &state);
        inv_sub_bytes(&mut state);
        emit(0, StepLabel::ISBox, &state);
        add_round_key(&mut state, self.round_key(0));
        emit(0, StepLabel::IKSch, self.round_key(0));
        emit(0, StepLabel::IOutput, &state);

        state
    }

    /// [`Engine::eqinvcipher`], reporting every intermediate state to `tracer`.
    pub fn eqinvcipher_traced<T: RoundTracer + ?Sized>(
        &self,
        ciphertext: &Block,
        tracer: &mut T,
    ) -> Block {
        let nr = self.rounds();
        let mut state = *ciphertext;
        let mut emit = |round: usize, label: StepLabel, bytes: &Block| {
            tracer.record(&TraceStep {
                round: nr - round,
                label,
                bytes: *bytes,
            })
        };

        emit(nr, StepLabel::IInput, &state);
        add_round_key(&mut state, self.eqinv_round_key(nr));
        emit(nr, StepLabel::IKSch, self.eqinv_round_key(nr));

        for round in (1..nr).rev() {
            emit(round, StepLabel::IStart, &state);
            inv_sub_bytes(&mut state);
            emit(round, StepLabel::ISBox, &state);
            inv_shift_rows(&mut state);
            emit(round, StepLabel::ISRow, &state);
            inv_mix_columns(&mut state);
            emit(round, StepLabel::IMCol, &state);
            add_round_key(&mut state, self.eqinv_round_key(round));
            emit(round, StepLabel::IKSch, self.eqinv_round_key(round));
        }

        emit(0, StepLabel::IStart, &state);
        inv_sub_bytes(&mut state);
        emit(0, StepLabel::ISBox, &state);
        inv_shift_rows(&mut state);
        emit(0, StepLabel::ISRow, &state);
        add_round_key(&mut state, self.eqinv_round_key(0));
        emit(0, StepLabel::IKSch, self.eqinv_round_key(0));
        emit(0, StepLabel::IOutput, &state);

        state
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("key_size", &self.key_size())
            .field("rounds", &self.rounds())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::NoopTracer;
    use rand::RngCore;

    const NIST_KEY: [u8; 16] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
        0x0f,
    ];
    const NIST_PLAIN: [u8; 16] = [
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee,
        0xff,
    ];
    const NIST_CIPHER: [u8; 16] = [
        0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30, 0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4, 0xc5,
        0x5a,
    ];

    #[test]
    fn cipher_matches_nist_vector() {
        let engine = Engine::new(&NIST_KEY).unwrap();
        assert_eq!(engine.cipher(&NIST_PLAIN), NIST_CIPHER);
    }

    #[test]
    fn both_inverses_match_nist_vector() {
        let engine = Engine::new(&NIST_KEY).unwrap();
        assert_eq!(engine.invcipher(&NIST_CIPHER), NIST_PLAIN);
        assert_eq!(engine.eqinvcipher(&NIST_CIPHER), NIST_PLAIN);
    }

    #[test]
    fn construction_rejects_bad_key_lengths() {
        assert_eq!(
            Engine::new(&[0u8; 20]).unwrap_err(),
            Error::InvalidKeyLength { actual: 20 }
        );
        let mismatch = Engine::with_key_size(KeySize::Aes256, &NIST_KEY).unwrap_err();
        assert_eq!(
            mismatch,
            Error::KeySizeMismatch {
                expected: KeySize::Aes256,
                actual: 16
            }
        );
        assert_eq!(
            mismatch.to_string(),
            "AES-256 requires a 32 byte key, got 16 bytes"
        );
    }

    #[test]
    fn appendix_c1_evaluates_at_compile_time() {
        const ENGINE: Engine = match Engine::new(&NIST_KEY) {
            Ok(engine) => engine,
            Err(_) => panic!("invalid key"),
        };
        const CIPHERTEXT: Block = ENGINE.cipher(&NIST_PLAIN);
        const DECRYPTED: Block = ENGINE.invcipher(&CIPHERTEXT);
        const EQ_DECRYPTED: Block = ENGINE.eqinvcipher(&CIPHERTEXT);
        assert_eq!(CIPHERTEXT, NIST_CIPHER);
        assert_eq!(DECRYPTED, NIST_PLAIN);
        assert_eq!(EQ_DECRYPTED, NIST_PLAIN);
    }

    #[test]
    fn const_engine_matches_runtime_engine() {
        const KEY: [u8; 32] = [0x3c; 32];
        const AES256: Engine = match Engine::with_key_size(KeySize::Aes256, &KEY) {
            Ok(engine) => engine,
            Err(_) => panic!("invalid key"),
        };
        const CT: Block = AES256.cipher(&NIST_PLAIN);
        let runtime = Engine::new(&KEY).unwrap();
        assert_eq!(runtime.cipher(&NIST_PLAIN), CT);
        assert_eq!(runtime, AES256);
    }

    #[test]
    #[should_panic(expected = "round index past the final round")]
    fn round_key_past_final_round_panics() {
        let engine = Engine::new(&NIST_KEY).unwrap();
        let _ = engine.eqinv_round_key(engine.rounds() + 1);
    }

    #[test]
    fn set_cipher_key_rebuilds_schedules() {
        let mut engine = Engine::new(&NIST_KEY).unwrap();
        let key256: Vec<u8> = (0u8..32).collect();
        engine.set_cipher_key(&key256).unwrap();
        assert_eq!(engine.key_size(), KeySize::Aes256);
        assert_eq!(engine.rounds(), 14);
        assert_eq!(engine.cipher_key(), key256.as_slice());
        assert_eq!(engine, Engine::new(&key256).unwrap());
    }

    #[test]
    fn failed_rekey_keeps_previous_key() {
        let mut engine = Engine::new(&NIST_KEY).unwrap();
        assert!(engine.set_cipher_key(&[1, 2, 3]).is_err());
        assert_eq!(engine.cipher_key(), &NIST_KEY);
        assert_eq!(engine.cipher(&NIST_PLAIN), NIST_CIPHER);
    }

    #[test]
    fn debug_output_omits_key() {
        let engine = Engine::new(&[0x42; 16]).unwrap();
        let rendered = format!("{engine:?}");
        assert!(rendered.contains("Aes128"));
        assert!(!rendered.contains("66"));
    }

    #[test]
    fn traced_and_untraced_agree() {
        let engine = Engine::new(&[7u8; 24]).unwrap();
        let mut steps = 0usize;
        let mut count = |_: &TraceStep| steps += 1;
        let ct = engine.cipher_traced(&NIST_PLAIN, &mut count);
        assert_eq!(ct, engine.cipher(&NIST_PLAIN));
        // input + k_sch, 5 per middle round, 4 + output in the last round.
        assert_eq!(steps, 2 + 5 * 11 + 5);
    }

    #[test]
    fn traced_inverse_paths_match_untraced() {
        let mut rng = rand::thread_rng();
        for size in KeySize::ALL {
            let mut key = vec![0u8; size.key_len()];
            let mut block = [0u8; 16];
            rng.fill_bytes(&mut key);
            rng.fill_bytes(&mut block);
            let engine = Engine::new(&key).unwrap();
            assert_eq!(
                engine.invcipher_traced(&block, &mut NoopTracer),
                engine.invcipher(&block)
            );
            assert_eq!(
                engine.eqinvcipher_traced(&block, &mut NoopTracer),
                engine.eqinvcipher(&block)
            );
        }
    }

    #[test]
    fn round_trip_random_all_sizes() {
        let mut rng = rand::thread_rng();
        for size in KeySize::ALL {
            for _ in 0..50 {
                let mut key = vec![0u8; size.key_len()];
                let mut block = [0u8; 16];
                rng.fill_bytes(&mut key);
                rng.fill_bytes(&mut block);
                let engine = Engine::new(&key).unwrap();
                let ct = engine.cipher(&block);
                assert_eq!(engine.invcipher(&ct), block);
                assert_eq!(engine.eqinvcipher(&ct), block);
            }
        }
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        let engine = std::sync::Arc::new(Engine::new(&NIST_KEY).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = std::sync::Arc::clone(&engine);
                std::thread::spawn(move || engine.cipher(&NIST_PLAIN))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), NIST_CIPHER);
        }
    }
}
