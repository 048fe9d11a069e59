//! The Paillier private key, in CRT form, and CRT-accelerated decryption
//! and blinded private comparison.

use rand_core::{CryptoRng, RngCore};
use rug::{Complete, Integer};
use zeroize::Zeroize;

use crate::config::{self, PAILLIER_RANDOMIZER_SECLEVEL};
use crate::public_key::PublicKey;
use crate::utils::{self, IntegerExt};
use crate::{rng, Bug, Ciphertext, Error, Plaintext, Reason};

/// Paillier private key in CRT form: the two primes, their squares, the
/// `2^w`-modular inverses, and the two `h` constants that let decryption
/// combine a per-prime partial result with a single multiplication instead
/// of a full modular exponentiation mod `n^2`.
pub struct PrivateKey {
    ek: PublicKey,

    p: Integer,
    q: Integer,
    psquared: Integer,
    qsquared: Integer,
    /// `p^-1 mod 2^|p|`
    pinvmod2tow: Integer,
    /// `q^-1 mod 2^|q|`
    qinvmod2tow: Integer,
    /// `(L_p(g^(p-1) mod p^2))^-1 mod p`
    hsubp: Integer,
    /// `(L_q(g^(q-1) mod q^2))^-1 mod q`
    hsubq: Integer,
    /// `(q mod p)^-1 mod p`
    q_inv: Integer,
}

impl Zeroize for PrivateKey {
    fn zeroize(&mut self) {
        utils::scrub(&mut self.p);
        utils::scrub(&mut self.q);
        utils::scrub(&mut self.psquared);
        utils::scrub(&mut self.qsquared);
        utils::scrub(&mut self.pinvmod2tow);
        utils::scrub(&mut self.qinvmod2tow);
        utils::scrub(&mut self.hsubp);
        utils::scrub(&mut self.hsubq);
        utils::scrub(&mut self.q_inv);
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl PrivateKey {
    /// Generates a Paillier keypair with primes of `keysize` bits each,
    /// drawing randomness from the process-wide seeded RNG (see
    /// [`crate::SystemRng`]).
    ///
    /// Fails with `PARAM` if `keysize` is outside the supported range.
    pub fn generate(keysize: u32) -> Result<Self, Error> {
        config::validate_keysize(keysize)?;
        rng::with_global(|r| Self::generate_with_rng(r, keysize))?
    }

    /// Generates a Paillier keypair with primes of `keysize` bits each,
    /// drawing randomness from the supplied `rng`. The explicit-RNG form
    /// used for deterministic tests and benchmarks.
    pub fn generate_with_rng(
        rng: &mut (impl RngCore + CryptoRng),
        keysize: u32,
    ) -> Result<Self, Error> {
        config::validate_keysize(keysize)?;
        tracing::debug!(keysize, "generating paillier keypair");
        let p = utils::generate_safe_prime(rng, keysize);
        let q = utils::generate_safe_prime(rng, keysize);
        Self::from_primes_with_rng(rng, p, q)
    }

    /// Constructs a keypair from caller-supplied primes `p`, `q`, sampling
    /// a fresh generator `g` from the process-wide seeded RNG.
    ///
    /// `p` and `q` must be distinct safe primes of equal bit-length.
    /// Returns `PARAM` otherwise.
    pub fn from_primes(p: Integer, q: Integer) -> Result<Self, Error> {
        rng::with_global(|r| Self::from_primes_with_rng(r, p, q))?
    }

    /// The explicit-RNG form of [`PrivateKey::from_primes`].
    pub fn from_primes_with_rng(
        rng: &mut (impl RngCore + CryptoRng),
        p: Integer,
        q: Integer,
    ) -> Result<Self, Error> {
        if p == q || p.cmp0().is_le() || q.cmp0().is_le() {
            return Err(Reason::InvalidPq.into());
        }

        let n = (&p * &q).complete();
        let psquared = (&p * &p).complete();
        let qsquared = (&q * &q).complete();
        let nsquared = (&n * &n).complete();

        let g = utils::select_generator(rng, &p, &psquared, &q, &qsquared)?;

        let pinvmod2tow = utils::inv_mod_2_to_w(&p)?;
        let qinvmod2tow = utils::inv_mod_2_to_w(&q)?;
        let hsubp = utils::h_constant(&g, &p, &psquared, &pinvmod2tow)?;
        let hsubq = utils::h_constant(&g, &q, &qsquared, &qinvmod2tow)?;
        let q_inv = utils::q_inv_precompute(&q, &p)?;

        Ok(Self {
            ek: PublicKey::from_parts(n, g, nsquared),
            p,
            q,
            psquared,
            qsquared,
            pinvmod2tow,
            qinvmod2tow,
            hsubp,
            hsubq,
            q_inv,
        })
    }

    /// Builds a private key directly from its serialized CRT components,
    /// without recomputing them. Used by hex/serde deserialization so that
    /// a round-tripped key is identical to the original, including its
    /// generator `g`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_raw_parts(
        ek: PublicKey,
        p: Integer,
        q: Integer,
        psquared: Integer,
        qsquared: Integer,
        pinvmod2tow: Integer,
        qinvmod2tow: Integer,
        hsubp: Integer,
        hsubq: Integer,
        q_inv: Integer,
    ) -> Self {
        Self {
            ek,
            p,
            q,
            psquared,
            qsquared,
            pinvmod2tow,
            qinvmod2tow,
            hsubp,
            hsubq,
            q_inv,
        }
    }

    /// Returns the public key matching this private key.
    pub fn public_key(&self) -> PublicKey {
        self.ek.clone()
    }

    pub(crate) fn ek(&self) -> &PublicKey {
        &self.ek
    }
    pub(crate) fn p(&self) -> &Integer {
        &self.p
    }
    pub(crate) fn q(&self) -> &Integer {
        &self.q
    }
    pub(crate) fn psquared(&self) -> &Integer {
        &self.psquared
    }
    pub(crate) fn qsquared(&self) -> &Integer {
        &self.qsquared
    }
    pub(crate) fn pinvmod2tow(&self) -> &Integer {
        &self.pinvmod2tow
    }
    pub(crate) fn qinvmod2tow(&self) -> &Integer {
        &self.qinvmod2tow
    }
    pub(crate) fn hsubp(&self) -> &Integer {
        &self.hsubp
    }
    pub(crate) fn hsubq(&self) -> &Integer {
        &self.hsubq
    }
    pub(crate) fn q_inv(&self) -> &Integer {
        &self.q_inv
    }

    /// Decrypts ciphertext `c` via CRT, recombining a partial decryption
    /// mod `p^2` with one mod `q^2` instead of exponentiating mod `n^2`.
    ///
    /// Returns `OVERFLOW` if the recovered plaintext does not fit a `u64`.
    pub fn decrypt(&self, c: &Ciphertext) -> Result<u64, Error> {
        let mut m = self.decrypt_to_integer(c)?;
        let result = m.to_string().parse::<u64>();
        utils::scrub(&mut m);

        result.map_err(|_| {
            tracing::debug!("decryption overflowed u64");
            Reason::Overflow.into()
        })
    }

    /// The CRT decryption path, returning the recombined plaintext as a
    /// full-width [`Integer`] in `[0, n)` rather than truncating it to a
    /// `u64`. Used internally by [`PrivateKey::decrypt`] and by the
    /// blinded private comparison, whose masked intermediate can exceed 64
    /// bits even when both compared counters fit in one.
    pub(crate) fn decrypt_to_integer(&self, c: &Ciphertext) -> Result<Integer, Error> {
        if !utils::is_in_zn_squared_star(c, self.ek.nsquared()) {
            return Err(Reason::Decrypt.into());
        }

        let mut t_p = c.clone().modulo(&self.psquared);
        t_p = t_p
            .pow_mod(&(&self.p - Integer::ONE).complete(), &self.psquared)
            .map_err(|_| Bug::PowModUndef)?;
        let mut m_p = (utils::fast_l(&t_p, &self.p, &self.pinvmod2tow) * &self.hsubp)
            .complete()
            .modulo(&self.p);

        let mut t_q = c.clone().modulo(&self.qsquared);
        t_q = t_q
            .pow_mod(&(&self.q - Integer::ONE).complete(), &self.qsquared)
            .map_err(|_| Bug::PowModUndef)?;
        let mut m_q = (utils::fast_l(&t_q, &self.q, &self.qinvmod2tow) * &self.hsubq)
            .complete()
            .modulo(&self.q);

        let m = utils::fast_crt(&m_p, &self.p, &m_q, &self.q, &self.q_inv);

        utils::scrub(&mut t_p);
        utils::scrub(&mut t_q);
        utils::scrub(&mut m_p);
        utils::scrub(&mut m_q);

        Ok(m)
    }

    /// Encrypts `x` with known factorization of `n`, faster than
    /// [`PublicKey::encrypt_with`] since it avoids a full exponentiation
    /// mod `n^2` in favor of two smaller ones mod `p^2` and `q^2`.
    pub fn encrypt_with_random(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
        x: &Plaintext,
    ) -> Result<(Ciphertext, Integer), Error> {
        self.ek.encrypt_with_random(rng, x)
    }

    /// Blinded private comparison: compares `a` and `b`, two ciphertexts
    /// encrypted under `pk` (which must match this private key), via a
    /// masked difference. Neither plaintext is revealed to the caller,
    /// only the sign of their difference.
    ///
    /// Returns `Less`/`Equal`/`Greater` for `a < b`/`a = b`/`a > b`.
    pub fn private_cmp2(
        &self,
        pk: &PublicKey,
        a: &Ciphertext,
        b: &Ciphertext,
    ) -> Result<std::cmp::Ordering, Error> {
        rng::with_global(|r| self.private_cmp2_with_rng(r, pk, a, b))?
    }

    /// The explicit-RNG form of [`PrivateKey::private_cmp2`].
    pub fn private_cmp2_with_rng(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
        pk: &PublicKey,
        a: &Ciphertext,
        b: &Ciphertext,
    ) -> Result<std::cmp::Ordering, Error> {
        if !utils::is_in_zn_squared_star(a, pk.nsquared())
            || !utils::is_in_zn_squared_star(b, pk.nsquared())
        {
            return Err(Reason::Compare.into());
        }

        // diff <- touch(a)
        let mut diff = pk.otouch(a, rng)?;

        // diff <- diff * g^k mod n^2, k secret
        let mut k = utils::sample_blind(rng, PAILLIER_RANDOMIZER_SECLEVEL + 2);
        diff = pk.oinc(&diff, &k)?;

        // re-randomize again before subtracting b
        diff = pk.otouch(&diff, rng)?;

        // diff <- diff * b^-1 mod n^2
        diff = pk.osub(&diff, b)?;

        let mut m = self.decrypt_to_integer(&diff)?;

        // sign(m - k)
        let ordering = m.cmp(&k);

        utils::scrub(&mut diff);
        utils::scrub(&mut k);
        utils::scrub(&mut m);

        Ok(ordering)
    }

    /// Simpler comparison variant: decrypts `a` and `b` independently with
    /// their respective private keys, falling back to the sole supplied
    /// key for whichever side is missing, and compares the plaintexts
    /// directly.
    ///
    /// At least one of `sk_a`, `sk_b` must be supplied; returns `PARAM`
    /// otherwise.
    pub fn cmp(
        a: &Ciphertext,
        b: &Ciphertext,
        sk_a: Option<&PrivateKey>,
        sk_b: Option<&PrivateKey>,
    ) -> Result<std::cmp::Ordering, Error> {
        let key_a = sk_a.or(sk_b).ok_or(Reason::Compare)?;
        let key_b = sk_b.or(sk_a).ok_or(Reason::Compare)?;
        let ma = key_a.decrypt(a)?;
        let mb = key_b.decrypt(b)?;
        Ok(ma.cmp(&mb))
    }

    /// Bit-length of the smaller prime factor.
    pub fn bits_length(&self) -> u32 {
        self.p.significant_bits().min(self.q.significant_bits())
    }
}

/// Hex-serialized mirror of a [`PrivateKey`], one uppercase hex string per
/// big-integer field.
///
/// Includes the public half (`n`, `g`, `nsquared`) verbatim alongside the
/// CRT material: without `g` persisted exactly, deserializing `(p, q)`
/// alone would have to regenerate a new generator (and therefore new
/// `hsubp`/`hsubq`), invalidating any ciphertext already encrypted under
/// the original key and breaking the `deserialize(serialize(k)) == k`
/// round trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivateKeyHex {
    pub n: String,
    pub g: String,
    pub nsquared: String,
    pub p: String,
    pub q: String,
    pub psquared: String,
    pub qsquared: String,
    pub pinvmod2tow: String,
    pub qinvmod2tow: String,
    pub hsubp: String,
    pub hsubq: String,
    pub q_inv: String,
}

fn to_hex(x: &Integer) -> String {
    x.to_string_radix(16).to_uppercase()
}

fn from_hex(s: &str) -> Result<Integer, Error> {
    Integer::from_str_radix(s, 16).map_err(|_| Reason::Serialize.into())
}

impl PrivateKey {
    /// Serializes this key to its hex mirror, including the public half so
    /// that [`PrivateKey::from_hex`] never has to regenerate `g`.
    pub fn to_hex(&self) -> PrivateKeyHex {
        PrivateKeyHex {
            n: to_hex(self.ek.n()),
            g: to_hex(self.ek.g()),
            nsquared: to_hex(self.ek.nsquared()),
            p: to_hex(&self.p),
            q: to_hex(&self.q),
            psquared: to_hex(&self.psquared),
            qsquared: to_hex(&self.qsquared),
            pinvmod2tow: to_hex(&self.pinvmod2tow),
            qinvmod2tow: to_hex(&self.qinvmod2tow),
            hsubp: to_hex(&self.hsubp),
            hsubq: to_hex(&self.hsubq),
            q_inv: to_hex(&self.q_inv),
        }
    }

    /// Deserializes a key from its hex mirror. Format-preserving but not
    /// validating: every field is parsed as-is, and the CRT invariants
    /// are re-checked implicitly the first time the key is used.
    pub fn from_hex(hex: &PrivateKeyHex) -> Result<Self, Error> {
        let ek = PublicKey::from_parts(from_hex(&hex.n)?, from_hex(&hex.g)?, from_hex(&hex.nsquared)?);
        Ok(Self::from_raw_parts(
            ek,
            from_hex(&hex.p)?,
            from_hex(&hex.q)?,
            from_hex(&hex.psquared)?,
            from_hex(&hex.qsquared)?,
            from_hex(&hex.pinvmod2tow)?,
            from_hex(&hex.qinvmod2tow)?,
            from_hex(&hex.hsubp)?,
            from_hex(&hex.hsubq)?,
            from_hex(&hex.q_inv)?,
        ))
    }
}
