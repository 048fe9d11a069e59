//! The encrypted counter: a ciphertext with a lifecycle (creation,
//! mutation, duplication, comparison, serialization) layered on top of the
//! pure Paillier primitives in [`crate::PublicKey`]/[`crate::PrivateKey`].

use std::cmp::Ordering;
use std::time::{SystemTime, UNIX_EPOCH};

use rand_core::{CryptoRng, RngCore};
use rug::Integer;

use crate::config::PAILLIER_RANDOMIZER_SECLEVEL;
use crate::{rng, utils, Ciphertext, Error, PrivateKey, PublicKey, Reason};

/// Wire-format version tag. Only one version exists today.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Version {
    /// `PAILLIER_V1`
    V1,
}

impl Version {
    fn tag(self) -> &'static str {
        match self {
            Version::V1 => "PAILLIER_V1",
        }
    }
}

/// An encrypted integer counter.
///
/// Borrows the [`PublicKey`] it was encrypted under: the key must outlive
/// every counter created from it, which the compiler enforces directly
/// through this lifetime rather than through reference counting or a
/// runtime check.
pub struct Counter<'k> {
    version: Version,
    c: Ciphertext,
    last_updated: u64,
    pk: &'k PublicKey,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl<'k> Counter<'k> {
    /// Creates a counter encrypting the initial plaintext `m = 0`, drawing
    /// randomness from the process-wide seeded RNG.
    pub fn new_counter(pk: &'k PublicKey) -> Result<Self, Error> {
        rng::with_global(|r| Self::new_counter_with_rng(r, pk))?
    }

    /// The explicit-RNG form of [`Counter::new_counter`].
    pub fn new_counter_with_rng(
        rng: &mut (impl RngCore + CryptoRng),
        pk: &'k PublicKey,
    ) -> Result<Self, Error> {
        let (c, _nonce) = pk.encrypt_with_random(rng, &Integer::from(0))?;
        Ok(Self {
            version: Version::V1,
            c,
            last_updated: now_secs(),
            pk,
        })
    }

    /// The public key this counter is encrypted under.
    pub fn public_key(&self) -> &'k PublicKey {
        self.pk
    }

    /// The wire-format version of this counter.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Seconds-since-epoch timestamp of the last mutation.
    pub fn last_updated(&self) -> u64 {
        self.last_updated
    }

    /// The raw ciphertext.
    pub fn ciphertext(&self) -> &Ciphertext {
        &self.c
    }

    fn same_key(&self, other: &Counter<'_>) -> bool {
        self.pk == other.pk
    }

    /// Allocates a new counter encrypting the same plaintext as `self`,
    /// re-randomized so the two ciphertexts are byte-distinct. Mandatory:
    /// two identical ciphertexts would leak that they encrypt the same
    /// plaintext.
    pub fn dup(&self) -> Result<Counter<'k>, Error> {
        rng::with_global(|r| self.dup_with_rng(r))?
    }

    /// The explicit-RNG form of [`Counter::dup`].
    pub fn dup_with_rng(&self, rng: &mut (impl RngCore + CryptoRng)) -> Result<Counter<'k>, Error> {
        let c = self.pk.otouch(&self.c, rng)?;
        Ok(Counter {
            version: self.version,
            c,
            last_updated: now_secs(),
            pk: self.pk,
        })
    }

    /// The destination-provided variant of [`Counter::dup`]: copies `src`'s
    /// version and ciphertext into `self`, then re-randomizes.
    ///
    /// `self` and `src` must share the same public key, otherwise `PARAM`.
    pub fn copy_from(&mut self, src: &Counter<'k>) -> Result<(), Error> {
        rng::with_global(|r| self.copy_from_with_rng(r, src))?
    }

    /// The explicit-RNG form of [`Counter::copy_from`].
    pub fn copy_from_with_rng(
        &mut self,
        rng: &mut (impl RngCore + CryptoRng),
        src: &Counter<'k>,
    ) -> Result<(), Error> {
        if !self.same_key(src) {
            return Err(Reason::NullArgument.into());
        }
        self.version = src.version;
        self.c = src.c.clone();
        self.touch_with_rng(rng)
    }

    /// Re-randomizes this counter in place: `c <- c * r^n mod n^2` for a
    /// freshly sampled `r`. Preserves the encrypted plaintext while
    /// refreshing the randomizer coset, which every other mutator below
    /// also performs as its final step.
    pub fn touch(&mut self) -> Result<(), Error> {
        rng::with_global(|r| self.touch_with_rng(r))?
    }

    /// The explicit-RNG form of [`Counter::touch`].
    pub fn touch_with_rng(&mut self, rng: &mut (impl RngCore + CryptoRng)) -> Result<(), Error> {
        self.c = self.pk.otouch(&self.c, rng)?;
        self.last_updated = now_secs();
        Ok(())
    }

    /// `m -> m + a`.
    pub fn inc(&mut self, a: u64) -> Result<(), Error> {
        rng::with_global(|r| self.inc_with_rng(r, a))?
    }

    /// The explicit-RNG form of [`Counter::inc`].
    pub fn inc_with_rng(&mut self, rng: &mut (impl RngCore + CryptoRng), a: u64) -> Result<(), Error> {
        self.c = self.pk.oinc(&self.c, &Integer::from(a))?;
        self.touch_with_rng(rng)
    }

    /// `m -> m - a`.
    pub fn dec(&mut self, a: u64) -> Result<(), Error> {
        rng::with_global(|r| self.dec_with_rng(r, a))?
    }

    /// The explicit-RNG form of [`Counter::dec`].
    pub fn dec_with_rng(&mut self, rng: &mut (impl RngCore + CryptoRng), a: u64) -> Result<(), Error> {
        self.c = self.pk.odec(&self.c, &Integer::from(a))?;
        self.touch_with_rng(rng)
    }

    /// `mA -> mA + mB`. `self` and `other` must share a public key.
    pub fn add(&mut self, other: &Counter<'k>) -> Result<(), Error> {
        rng::with_global(|r| self.add_with_rng(r, other))?
    }

    /// The explicit-RNG form of [`Counter::add`].
    pub fn add_with_rng(
        &mut self,
        rng: &mut (impl RngCore + CryptoRng),
        other: &Counter<'k>,
    ) -> Result<(), Error> {
        if !self.same_key(other) {
            return Err(Reason::NullArgument.into());
        }
        self.c = self.pk.oadd(&self.c, &other.c)?;
        self.touch_with_rng(rng)
    }

    /// `mA -> mA - mB`. `self` and `other` must share a public key.
    ///
    /// There is no cryptographic prevention of underflow below zero: if
    /// `mA < mB` the decrypted plaintext wraps modulo `n`, which is a
    /// caller-visible concern, not an error this operation raises.
    pub fn sub(&mut self, other: &Counter<'k>) -> Result<(), Error> {
        rng::with_global(|r| self.sub_with_rng(r, other))?
    }

    /// The explicit-RNG form of [`Counter::sub`].
    pub fn sub_with_rng(
        &mut self,
        rng: &mut (impl RngCore + CryptoRng),
        other: &Counter<'k>,
    ) -> Result<(), Error> {
        if !self.same_key(other) {
            return Err(Reason::NullArgument.into());
        }
        self.c = self.pk.osub(&self.c, &other.c)?;
        self.touch_with_rng(rng)
    }

    /// `m -> a * m`.
    pub fn mul(&mut self, a: u64) -> Result<(), Error> {
        rng::with_global(|r| self.mul_with_rng(r, a))?
    }

    /// The explicit-RNG form of [`Counter::mul`].
    pub fn mul_with_rng(&mut self, rng: &mut (impl RngCore + CryptoRng), a: u64) -> Result<(), Error> {
        self.c = self.pk.omul(&self.c, &Integer::from(a))?;
        self.touch_with_rng(rng)
    }

    /// `m -> k * m` for a freshly sampled secret `k` of
    /// `PAILLIER_RANDOMIZER_SECLEVEL + 2` bits.
    pub fn mul_rand(&mut self) -> Result<(), Error> {
        rng::with_global(|r| self.mul_rand_with_rng(r))?
    }

    /// The explicit-RNG form of [`Counter::mul_rand`].
    pub fn mul_rand_with_rng(&mut self, rng: &mut (impl RngCore + CryptoRng)) -> Result<(), Error> {
        self.c = self
            .pk
            .omul_rand(&self.c, rng, PAILLIER_RANDOMIZER_SECLEVEL + 2)?;
        self.touch_with_rng(rng)
    }

    /// Decrypts this counter with `sk`.
    pub fn decrypt(&self, sk: &PrivateKey) -> Result<u64, Error> {
        sk.decrypt(&self.c)
    }

    /// Blinded private comparison against `other`. Neither plaintext is
    /// revealed, only the sign of their difference. `self`, `other`, and
    /// `sk` must all correspond to the same keypair.
    pub fn private_cmp2(&self, other: &Counter<'k>, sk: &PrivateKey) -> Result<Ordering, Error> {
        if !self.same_key(other) {
            return Err(Reason::Compare.into());
        }
        sk.private_cmp2(self.pk, &self.c, &other.c)
    }

    /// Simpler comparison: decrypts both counters independently (falling
    /// back to the sole supplied key for whichever side is missing) and
    /// compares the plaintexts directly. Requires at least one key.
    pub fn cmp(
        &self,
        other: &Counter<'k>,
        sk_a: Option<&PrivateKey>,
        sk_b: Option<&PrivateKey>,
    ) -> Result<Ordering, Error> {
        PrivateKey::cmp(&self.c, &other.c, sk_a, sk_b)
    }

    /// Serializes the ciphertext to an uppercase hex string. The version
    /// tag itself (`PAILLIER_V1`) is not embedded in the string; it
    /// identifies the wire format this method and [`Counter::from_hex`]
    /// agree on.
    pub fn to_hex(&self) -> String {
        self.c.to_string_radix(16).to_uppercase()
    }

    /// Deserializes a counter previously produced by [`Counter::to_hex`].
    /// `last_updated` is set to the current time; the version is restored
    /// to [`Version::V1`].
    pub fn from_hex(pk: &'k PublicKey, hex: &str) -> Result<Self, Error> {
        let c = Integer::from_str_radix(hex, 16).map_err(|_| Reason::Serialize)?;
        if !utils::is_in_zn_squared_star(&c, pk.nsquared()) {
            return Err(Reason::Serialize.into());
        }
        Ok(Self {
            version: Version::V1,
            c,
            last_updated: now_secs(),
            pk,
        })
    }

    /// Explicit, eager disposal: scrubs the ciphertext before dropping the
    /// counter. `Drop` already performs the same scrub, so calling this is
    /// optional; it exists for callers that want disposal to happen at a
    /// precise point rather than whenever the borrow checker would drop
    /// the value anyway.
    pub fn zeroize(mut self) {
        utils::scrub(&mut self.c);
    }
}

impl Drop for Counter<'_> {
    fn drop(&mut self) {
        utils::scrub(&mut self.c);
    }
}

impl std::fmt::Debug for Counter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Counter")
            .field("version", &self.version.tag())
            .field("last_updated", &self.last_updated)
            .finish_non_exhaustive()
    }
}
