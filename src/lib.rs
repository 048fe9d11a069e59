//! Encrypted integer counters on top of a CRT-accelerated Paillier
//! cryptosystem.
//!
//! A [`Counter`] is a ciphertext that can be incremented, decremented,
//! multiplied by a scalar, combined with another counter, re-randomized,
//! duplicated, and compared to another counter, all without ever exposing
//! the plaintext integer it encrypts. Only the holder of a matching
//! [`PrivateKey`] can [`Counter::decrypt`] it.
//!
//! The cryptographic kernel lives in [`utils`] and in the [`PublicKey`] /
//! [`PrivateKey`] pair; [`Counter`] is the caller-facing lifecycle wrapper
//! around it.

mod config;
mod counter;
mod private_key;
mod public_key;
mod rng;
#[cfg(feature = "serde")]
mod serde_impl;
pub mod utils;

use rug::Integer;

/// A Paillier ciphertext, an element of `Z*_{n^2}`.
pub type Ciphertext = Integer;
/// A Paillier plaintext, an element of `Z_n`.
pub type Plaintext = Integer;
/// A randomizer / nonce used while encrypting or re-randomizing, an element
/// of `Z*_n`.
pub type Nonce = Integer;

pub use config::{validate_keysize, PAILLIER_RANDOMIZER_SECLEVEL};
pub use counter::{Counter, Version};
pub use private_key::{PrivateKey, PrivateKeyHex};
pub use public_key::{PublicKey, PublicKeyHex};
pub use rng::SystemRng;

/// Coarse status-code taxonomy every fallible operation in this crate maps
/// onto: `PARAM`, `MEM`, `CRYPTO`, `OS`, `DATA`, `OVERFLOW`. There is no
/// `OK` variant; the absence of an `Error` (i.e. `Result::Ok`) plays that
/// role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A null, malformed, or out-of-range argument was supplied.
    Param,
    /// Allocation failure.
    Mem,
    /// RNG or big-integer arithmetic failure.
    Crypto,
    /// The system entropy source is unavailable.
    Os,
    /// Malformed serialized input.
    Data,
    /// A decrypted value does not fit in a `u64`.
    Overflow,
}

/// The error type returned by every fallible operation in this crate.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error(#[from] Reason);

impl Error {
    /// The coarse status code this error corresponds to.
    pub fn kind(&self) -> ErrorKind {
        match &self.0 {
            Reason::InvalidPq
            | Reason::InvalidKeySize
            | Reason::NullArgument
            | Reason::Ops
            | Reason::Compare => ErrorKind::Param,
            Reason::Entropy => ErrorKind::Os,
            Reason::RngNotReady | Reason::Encrypt | Reason::Decrypt | Reason::Bug(_) => {
                ErrorKind::Crypto
            }
            Reason::Serialize => ErrorKind::Data,
            Reason::Overflow => ErrorKind::Overflow,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum Reason {
    #[error("p, q do not form a valid paillier modulus")]
    InvalidPq,
    #[error("key size is outside the supported range")]
    InvalidKeySize,
    #[error("a required argument was null or invalid")]
    NullArgument,
    #[error("system entropy source is unavailable")]
    Entropy,
    #[error("rng failed to reach a ready state")]
    RngNotReady,
    #[error("encryption error")]
    Encrypt,
    #[error("decryption error")]
    Decrypt,
    #[error("homomorphic operation failed: invalid inputs")]
    Ops,
    #[error("comparison requires at least one private key")]
    Compare,
    #[error("decrypted value overflows u64")]
    Overflow,
    #[error("malformed serialized input")]
    Serialize,
    #[error("bug occurred")]
    Bug(#[source] Bug),
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum Bug {
    #[error("pow mod undefined")]
    PowModUndef,
    #[error("modular inverse undefined")]
    InvertUndef,
}

impl From<Bug> for Error {
    fn from(err: Bug) -> Self {
        Error(Reason::Bug(err))
    }
}

impl From<Reason> for Error {
    fn from(reason: Reason) -> Self {
        Error(reason)
    }
}
