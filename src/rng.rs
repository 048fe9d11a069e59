//! RNG seeder: draws entropy from the operating system once, mixes it into
//! a CSPRNG, and exposes that CSPRNG both as a plain value
//! ([`SystemRng::new`]) and as a process-wide singleton ([`global`]) shared
//! by every operation that doesn't take an explicit RNG.

use std::sync::Mutex;

use once_cell::sync::OnceCell;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

use crate::{Error, Reason};

/// Bytes of OS entropy drawn to seed the process-wide RNG: 1024 bits.
const ENTROPY_BYTES: usize = 128;

/// A cryptographically secure RNG seeded from system entropy.
///
/// Construction draws 1024 bits from the platform's non-blocking entropy
/// source and folds them through SHA-256 into the 256-bit seed a
/// `ChaCha20Rng` needs. No fallback to a weaker RNG is ever taken: if the
/// entropy source is unavailable, construction fails with
/// [`crate::ErrorKind::Os`].
pub struct SystemRng(ChaCha20Rng);

impl SystemRng {
    /// Seeds a fresh RNG from system entropy.
    pub fn new() -> Result<Self, Error> {
        let mut entropy = [0u8; ENTROPY_BYTES];
        getrandom::getrandom(&mut entropy).map_err(|_| Reason::Entropy)?;
        tracing::debug!(bytes = ENTROPY_BYTES, "drew os entropy to seed rng");

        let seed: [u8; 32] = Sha256::digest(entropy).into();
        Ok(Self(ChaCha20Rng::from_seed(seed)))
    }
}

impl RngCore for SystemRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl CryptoRng for SystemRng {}

static GLOBAL_RNG: OnceCell<Mutex<SystemRng>> = OnceCell::new();

/// Eagerly seeds the process-wide RNG. Calling this is optional, since
/// every operation that needs the global RNG seeds it lazily on first
/// use, but callers that want to fail fast on a missing entropy source
/// at startup can call it explicitly.
pub fn init() -> Result<(), Error> {
    global_cell()?;
    Ok(())
}

fn global_cell() -> Result<&'static Mutex<SystemRng>, Error> {
    GLOBAL_RNG.get_or_try_init(SystemRng::new)
}

/// Runs `f` with exclusive access to the process-wide seeded RNG, seeding
/// it on first use.
pub(crate) fn with_global<R>(f: impl FnOnce(&mut SystemRng) -> R) -> Result<R, Error> {
    let cell = global_cell()?;
    let mut guard = cell.lock().map_err(|_| Reason::RngNotReady)?;
    Ok(f(&mut guard))
}
