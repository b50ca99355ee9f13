//! Command-line interface for the FIPS-197 AES engine.

#![forbid(unsafe_code)]

use std::hint::black_box;
use std::time::{Duration, Instant};

use aes_core::{
    block_from_slice, to_hex, Block, Engine, KeySize, LogTracer, RoundTracer, TraceStep,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::Level;

/// FIPS-197 AES CLI.
#[derive(Parser)]
#[command(
    name = "aes197",
    version,
    author,
    about = "FIPS-197 AES: cipher, inverse cipher and equivalent inverse cipher"
)]
struct Cli {
    /// Emit debug logs (including per-round state when tracing).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Appendix C examples for all three key sizes and print the traces.
    AppendixC,
    /// Encrypt a single 16-byte block.
    Encrypt {
        /// Cipher key as 32, 48 or 64 hex characters.
        #[arg(long, value_name = "HEX")]
        key_hex: String,
        /// Plaintext block as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        block_hex: String,
        /// Print every intermediate state.
        #[arg(long, default_value_t = false)]
        trace: bool,
    },
    /// Decrypt a single 16-byte block.
    Decrypt {
        /// Cipher key as 32, 48 or 64 hex characters.
        #[arg(long, value_name = "HEX")]
        key_hex: String,
        /// Ciphertext block as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        block_hex: String,
        /// Use the equivalent inverse cipher instead of the inverse cipher.
        #[arg(long, default_value_t = false)]
        equivalent: bool,
        /// Print every intermediate state.
        #[arg(long, default_value_t = false)]
        trace: bool,
    },
    /// Encrypt random blocks under a random key and report the elapsed time.
    Bench {
        /// Key size in bits (128, 192 or 256).
        #[arg(long, default_value = "128")]
        key_size: KeySize,
        /// Number of blocks to encrypt.
        #[arg(long, default_value_t = 10_000)]
        blocks: usize,
        /// Optional RNG seed for reproducibility.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::AppendixC => cmd_appendix_c(),
        Commands::Encrypt {
            key_hex,
            block_hex,
            trace,
        } => cmd_encrypt(&key_hex, &block_hex, trace),
        Commands::Decrypt {
            key_hex,
            block_hex,
            equivalent,
            trace,
        } => cmd_decrypt(&key_hex, &block_hex, equivalent, trace),
        Commands::Bench {
            key_size,
            blocks,
            seed,
        } => cmd_bench(key_size, blocks, seed),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

/// Prints each step to stdout and mirrors it into the log.
struct PrintTracer;

impl RoundTracer for PrintTracer {
    fn record(&mut self, step: &TraceStep) {
        println!("{step}");
        LogTracer.record(step);
    }
}

fn cmd_appendix_c() -> Result<()> {
    const PLAINTEXT: &str = "00112233445566778899aabbccddeeff";
    let examples = [
        ("C.1", KeySize::Aes128, "69c4e0d86a7b0430d8cdb78070b4c55a"),
        ("C.2", KeySize::Aes192, "dda97ca4864cdfe06eaf70a0ec0d7191"),
        ("C.3", KeySize::Aes256, "8ea2b7ca516745bfeafc49904b496089"),
    ];
    let plaintext = parse_block_hex(PLAINTEXT)?;

    for (section, size, expected) in examples {
        let key: Vec<u8> = (0..size.key_len() as u8).collect();
        let engine = Engine::with_key_size(size, &key).context("build engine")?;

        println!("{section}   {size} (Nk={}, Nr={})\n", size.nk(), size.nr());
        println!("{:<20}{}", "PLAINTEXT:", PLAINTEXT);
        println!("{:<20}{}\n", "KEY:", to_hex(&key));

        println!("CIPHER (ENCRYPT):");
        let ciphertext = engine.cipher_traced(&plaintext, &mut PrintTracer);
        if to_hex(&ciphertext) != expected {
            bail!("{section}: ciphertext {} != {expected}", to_hex(&ciphertext));
        }

        println!("\nINVERSE CIPHER (DECRYPT):");
        let decrypted = engine.invcipher_traced(&ciphertext, &mut PrintTracer);
        if decrypted != plaintext {
            bail!("{section}: inverse cipher did not restore the plaintext");
        }

        println!("\nEQUIVALENT INVERSE CIPHER (DECRYPT):");
        let decrypted = engine.eqinvcipher_traced(&ciphertext, &mut PrintTracer);
        if decrypted != plaintext {
            bail!("{section}: equivalent inverse cipher did not restore the plaintext");
        }
        println!();
    }
    Ok(())
}

fn cmd_encrypt(key_hex: &str, block_hex: &str, trace: bool) -> Result<()> {
    let engine = parse_engine(key_hex)?;
    let block = parse_block_hex(block_hex)?;
    let ciphertext = if trace {
        engine.cipher_traced(&block, &mut PrintTracer)
    } else {
        engine.cipher(&block)
    };
    println!("{}", to_hex(&ciphertext));
    Ok(())
}

fn cmd_decrypt(key_hex: &str, block_hex: &str, equivalent: bool, trace: bool) -> Result<()> {
    let engine = parse_engine(key_hex)?;
    let block = parse_block_hex(block_hex)?;
    let plaintext = match (equivalent, trace) {
        (false, false) => engine.invcipher(&block),
        (false, true) => engine.invcipher_traced(&block, &mut PrintTracer),
        (true, false) => engine.eqinvcipher(&block),
        (true, true) => engine.eqinvcipher_traced(&block, &mut PrintTracer),
    };
    println!("{}", to_hex(&plaintext));
    Ok(())
}

fn cmd_bench(key_size: KeySize, blocks: usize, seed: Option<u64>) -> Result<()> {
    let mut rng = seeded_rng(seed);
    let mut key = vec![0u8; key_size.key_len()];
    rng.fill_bytes(&mut key);
    let engine = Engine::new(&key).context("build engine")?;

    let mut elapsed = Duration::ZERO;
    let mut block = [0u8; 16];
    for _ in 0..blocks {
        rng.fill_bytes(&mut block);
        let start = Instant::now();
        let ciphertext = engine.cipher(&block);
        elapsed += start.elapsed();
        black_box(ciphertext);
    }

    println!(
        "{key_size}: encrypted {} bytes in {:.6} seconds",
        blocks * 16,
        elapsed.as_secs_f64()
    );
    Ok(())
}

fn parse_engine(key_hex: &str) -> Result<Engine> {
    let key = hex::decode(key_hex.trim()).context("decode key hex")?;
    let engine = Engine::new(&key).context("build engine")?;
    tracing::debug!(
        key_size = %engine.key_size(),
        rounds = engine.rounds(),
        "expanded AES key schedule"
    );
    Ok(engine)
}

fn parse_block_hex(hex_str: &str) -> Result<Block> {
    let bytes = hex::decode(hex_str.trim()).context("decode block hex")?;
    match block_from_slice(&bytes) {
        Some(block) => Ok(block),
        None => bail!("AES block must be 16 bytes (32 hex characters)"),
    }
}

fn seeded_rng(seed: Option<u64>) -> impl RngCore + CryptoRng {
    match seed {
        Some(value) => {
            let mut seed_bytes = [0u8; 32];
            seed_bytes[..8].copy_from_slice(&value.to_le_bytes());
            ChaCha20Rng::from_seed(seed_bytes)
        }
        None => {
            let mut seed_bytes = [0u8; 32];
            rand::rngs::OsRng.fill_bytes(&mut seed_bytes);
            ChaCha20Rng::from_seed(seed_bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_blocks_and_rejects_wrong_lengths() {
        let block = parse_block_hex("00112233445566778899aabbccddeeff").unwrap();
        assert_eq!(block[15], 0xff);
        assert!(parse_block_hex("0011").is_err());
        assert!(parse_block_hex("zz112233445566778899aabbccddeeff").is_err());
    }

    #[test]
    fn engine_errors_carry_context() {
        let err = parse_engine("0011").unwrap_err();
        assert!(format!("{err:#}").contains("invalid AES key length 2"));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = seeded_rng(Some(7));
        let mut b = seeded_rng(Some(7));
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn cli_parses_bench_key_size() {
        let cli = Cli::try_parse_from(["aes197", "bench", "--key-size", "256", "--blocks", "3"])
            .unwrap();
        match cli.command {
            Commands::Bench {
                key_size, blocks, ..
            } => {
                assert_eq!(key_size, KeySize::Aes256);
                assert_eq!(blocks, 3);
            }
            _ => panic!("expected bench"),
        }
    }
}
