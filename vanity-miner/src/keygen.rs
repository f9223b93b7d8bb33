//! Keypair generation hot loop
//!
//! Secrets are carved out of a bulk ChaCha20 entropy buffer to amortize RNG
//! calls; public keys are base58-encoded into a reusable buffer and only
//! turned into `String`s on a match.

use crate::error::{MinerError, MinerResult};
use crate::suffix::Suffix;
use ed25519_dalek::SigningKey;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::time::{Duration, Instant};

// Ed25519 key length in bytes
const SECRET_LEN: usize = 32;
// Solana keypair bytes: secret followed by public key
pub const KEYPAIR_LEN: usize = 64;
// Number of secrets to generate per RNG fill (reduces overhead)
const ENTROPY_CHUNKS: usize = 256;
// Total entropy buffer size (32 bytes × 256 = 8KB)
const ENTROPY_BUFFER_LEN: usize = SECRET_LEN * ENTROPY_CHUNKS;
// Maximum encoded base58 public key length
const BASE58_BUFFER_LEN: usize = 64;
// Attempts between wall-clock checks inside a batch
const DEADLINE_CHECK_INTERVAL: u32 = 32;

/// A keypair whose address matched the suffix
#[derive(Clone)]
pub struct MatchedKeypair {
    /// Zero-based position inside its batch
    pub index: u32,
    pub public_key: String,
    pub keypair_bytes: [u8; KEYPAIR_LEN],
}

impl std::fmt::Debug for MatchedKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchedKeypair")
            .field("index", &self.index)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Result of one batch
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub attempts: u32,
    pub matches: Vec<MatchedKeypair>,
}

pub struct KeyGenerator {
    rng: ChaCha20Rng,
    entropy_buffer: Box<[u8; ENTROPY_BUFFER_LEN]>,
    entropy_offset: usize,
    secret_buffer: [u8; SECRET_LEN],
    encoding_buffer: [u8; BASE58_BUFFER_LEN],
}

impl KeyGenerator {
    /// Seed a generator from the OS entropy source
    pub fn new() -> MinerResult<Self> {
        let mut seed = [0u8; SECRET_LEN];
        getrandom::getrandom(&mut seed).map_err(|e| MinerError::Entropy(e.to_string()))?;
        Ok(Self::from_seed(seed))
    }

    /// Deterministic generator, for reproducible runs
    pub fn from_seed(seed: [u8; SECRET_LEN]) -> Self {
        Self {
            rng: ChaCha20Rng::from_seed(seed),
            entropy_buffer: Box::new([0u8; ENTROPY_BUFFER_LEN]),
            entropy_offset: ENTROPY_BUFFER_LEN, // Force initial fill
            secret_buffer: [0u8; SECRET_LEN],
            encoding_buffer: [0u8; BASE58_BUFFER_LEN],
        }
    }

    /// Generate up to `batch_size` keypairs, collecting every suffix match.
    /// Stops early once `deadline` passes.
    pub fn run_batch(&mut self, suffix: &Suffix, batch_size: u32, deadline: Instant) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for attempt_index in 0..batch_size {
            if attempt_index % DEADLINE_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
                break;
            }

            self.next_secret();
            let signing_key = SigningKey::from_bytes(&self.secret_buffer);
            let public_key = signing_key.verifying_key().to_bytes();
            outcome.attempts += 1;

            let Ok(encoded_len) = bs58::encode(public_key).onto(&mut self.encoding_buffer[..]) else {
                continue;
            };
            if !suffix.matches(&self.encoding_buffer[..encoded_len]) {
                continue;
            }

            outcome.matches.push(MatchedKeypair {
                index: attempt_index,
                public_key: bs58::encode(public_key).into_string(),
                keypair_bytes: signing_key.to_keypair_bytes(),
            });
        }

        outcome
    }

    /// One random keypair, no matching
    pub fn generate(&mut self) -> (String, [u8; KEYPAIR_LEN]) {
        self.next_secret();
        let signing_key = SigningKey::from_bytes(&self.secret_buffer);
        let public_key = bs58::encode(signing_key.verifying_key().to_bytes()).into_string();
        (public_key, signing_key.to_keypair_bytes())
    }

    // Fill secret_buffer with next 32 bytes from entropy buffer
    // Refills entropy buffer when exhausted (amortizes RNG cost)
    fn next_secret(&mut self) {
        if self.entropy_offset >= ENTROPY_BUFFER_LEN {
            self.rng.fill_bytes(self.entropy_buffer.as_mut());
            self.entropy_offset = 0;
        }

        let end = self.entropy_offset + SECRET_LEN;
        self.secret_buffer
            .copy_from_slice(&self.entropy_buffer[self.entropy_offset..end]);
        self.entropy_offset = end;
    }
}

/// True when `keypair` is a 64-byte Solana keypair whose secret half derives
/// the public key `public_key`
pub fn keypair_matches(public_key: &str, keypair: &[u8]) -> bool {
    let Ok(keypair) = <&[u8; KEYPAIR_LEN]>::try_from(keypair) else {
        return false;
    };
    let mut secret = [0u8; SECRET_LEN];
    secret.copy_from_slice(&keypair[..SECRET_LEN]);
    let derived = SigningKey::from_bytes(&secret).verifying_key().to_bytes();

    derived[..] == keypair[SECRET_LEN..] && bs58::encode(derived).into_string() == public_key
}

/// Measure single-thread keypair generation + encoding rate (attempts per second)
pub fn benchmark(duration: Duration) -> MinerResult<u64> {
    let mut generator = KeyGenerator::new()?;
    let start = Instant::now();
    let mut attempts = 0u64;

    while start.elapsed() < duration {
        generator.next_secret();
        let signing_key = SigningKey::from_bytes(&generator.secret_buffer);
        let public_key = signing_key.verifying_key().to_bytes();
        let _ = bs58::encode(public_key).onto(&mut generator.encoding_buffer[..]);
        attempts += 1;
    }

    let elapsed_secs = start.elapsed().as_secs_f64();
    if elapsed_secs <= 0.0 {
        return Ok(0);
    }
    Ok((attempts as f64 / elapsed_secs) as u64)
}
