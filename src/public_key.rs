//! The Paillier public key and the pure (non-mutating) homomorphic
//! primitives defined over it. [`crate::Counter`] is the stateful wrapper
//! that calls into these and enforces the mandatory re-randomization
//! epilogue after every mutation.

use rand_core::{CryptoRng, RngCore};
use rug::{Complete, Integer};

use crate::utils::{self, IntegerExt};
use crate::{Bug, Ciphertext, Error, Nonce, Plaintext, Reason};

/// Paillier public key: `n`, the selected generator `g`, and `n^2`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    n: Integer,
    g: Integer,
    nsquared: Integer,
}

impl PublicKey {
    /// Builds a public key from its three components, without validating
    /// that `g` is a suitable Paillier generator for `n`. Used internally
    /// by [`crate::PrivateKey::generate`] and by hex deserialization.
    pub(crate) fn from_parts(n: Integer, g: Integer, nsquared: Integer) -> Self {
        Self { n, g, nsquared }
    }

    /// The modulus `n = p * q`.
    pub fn n(&self) -> &Integer {
        &self.n
    }

    /// The selected generator `g`.
    pub fn g(&self) -> &Integer {
        &self.g
    }

    /// `n^2`.
    pub fn nsquared(&self) -> &Integer {
        &self.nsquared
    }

    /// Checks whether `m` is a valid plaintext, i.e. `m` in `[0, n)`.
    pub fn in_plaintext_range(&self, m: &Integer) -> bool {
        m.cmp0().is_ge() && *m < self.n
    }

    /// Encrypts `x` in `[0, n)` with the given `nonce` in `Z*_n`.
    ///
    /// `c = g^x * nonce^n mod n^2`.
    pub fn encrypt_with(&self, x: &Plaintext, nonce: &Nonce) -> Result<Ciphertext, Error> {
        if !self.in_plaintext_range(x) || !utils::is_in_zn_star(nonce, &self.n) {
            return Err(Reason::Encrypt.into());
        }

        let t1 = self
            .g
            .clone()
            .pow_mod(x, &self.nsquared)
            .map_err(|_| Bug::PowModUndef)?;
        let t2 = nonce
            .clone()
            .pow_mod(&self.n, &self.nsquared)
            .map_err(|_| Bug::PowModUndef)?;

        Ok((t1 * t2).complete().modulo(&self.nsquared))
    }

    /// Encrypts `x` in `[0, n)`, sampling a fresh nonce from `Z*_n`.
    pub fn encrypt_with_random(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
        x: &Plaintext,
    ) -> Result<(Ciphertext, Nonce), Error> {
        let nonce = utils::sample_in_mult_group(rng, &self.n);
        let ciphertext = self.encrypt_with(x, &nonce)?;
        Ok((ciphertext, nonce))
    }

    /// Re-randomizes `c`: samples `r` in `Z*_n` and returns
    /// `c * r^n mod n^2`, which preserves the encrypted plaintext.
    pub fn otouch(&self, c: &Ciphertext, rng: &mut (impl RngCore + CryptoRng)) -> Result<Ciphertext, Error> {
        if !utils::is_in_zn_squared_star(c, &self.nsquared) {
            return Err(Reason::Ops.into());
        }
        let r = utils::sample_in_mult_group(rng, &self.n);
        let rn = r
            .pow_mod(&self.n, &self.nsquared)
            .map_err(|_| Bug::PowModUndef)?;
        Ok((c * rn).complete().modulo(&self.nsquared))
    }

    /// `oinc(c, a) = c * g^a mod n^2`, the ciphertext form of `m -> m + a`.
    pub fn oinc(&self, c: &Ciphertext, a: &Integer) -> Result<Ciphertext, Error> {
        if !utils::is_in_zn_squared_star(c, &self.nsquared) {
            return Err(Reason::Ops.into());
        }
        let ga = if *a == *Integer::ONE {
            self.g.clone()
        } else {
            self.g
                .clone()
                .pow_mod(a, &self.nsquared)
                .map_err(|_| Bug::PowModUndef)?
        };
        Ok((c * ga).complete().modulo(&self.nsquared))
    }

    /// `odec(c, a) = c * (g^a)^-1 mod n^2`, the ciphertext form of
    /// `m -> m - a`.
    pub fn odec(&self, c: &Ciphertext, a: &Integer) -> Result<Ciphertext, Error> {
        if !utils::is_in_zn_squared_star(c, &self.nsquared) {
            return Err(Reason::Ops.into());
        }
        let ga = self
            .g
            .clone()
            .pow_mod(a, &self.nsquared)
            .map_err(|_| Bug::PowModUndef)?;
        let ga_inv: Integer = ga.invert_ref(&self.nsquared).ok_or(Bug::InvertUndef)?.into();
        Ok((c * ga_inv).complete().modulo(&self.nsquared))
    }

    /// `oadd(c1, c2) = c1 * c2 mod n^2`, the ciphertext form of
    /// `(m1, m2) -> m1 + m2`.
    pub fn oadd(&self, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext, Error> {
        if !utils::is_in_zn_squared_star(c1, &self.nsquared)
            || !utils::is_in_zn_squared_star(c2, &self.nsquared)
        {
            return Err(Reason::Ops.into());
        }
        Ok((c1 * c2).complete().modulo(&self.nsquared))
    }

    /// `osub(c1, c2) = c1 * c2^-1 mod n^2`, the ciphertext form of
    /// `(m1, m2) -> m1 - m2`.
    pub fn osub(&self, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext, Error> {
        if !utils::is_in_zn_squared_star(c1, &self.nsquared)
            || !utils::is_in_zn_squared_star(c2, &self.nsquared)
        {
            return Err(Reason::Ops.into());
        }
        let c2_inv: Integer = c2.invert_ref(&self.nsquared).ok_or(Bug::InvertUndef)?.into();
        Ok((c1 * c2_inv).complete().modulo(&self.nsquared))
    }

    /// `omul(c, a) = c^a mod n^2`, the ciphertext form of `m -> a * m`.
    pub fn omul(&self, c: &Ciphertext, a: &Integer) -> Result<Ciphertext, Error> {
        if !utils::is_in_zn_squared_star(c, &self.nsquared) {
            return Err(Reason::Ops.into());
        }
        Ok(c.pow_mod_ref(a, &self.nsquared).ok_or(Reason::Ops)?.into())
    }

    /// `omul_rand(c, rng) = c^k mod n^2` for a freshly sampled secret `k`
    /// of `bits` bits, the ciphertext form of `m -> k * m`.
    pub fn omul_rand(
        &self,
        c: &Ciphertext,
        rng: &mut (impl RngCore + CryptoRng),
        bits: u32,
    ) -> Result<Ciphertext, Error> {
        if !utils::is_in_zn_squared_star(c, &self.nsquared) {
            return Err(Reason::Ops.into());
        }
        let k = utils::sample_blind(rng, bits);
        self.omul(c, &k)
    }
}

/// Hex-serialized mirror of a [`PublicKey`], one uppercase hex string per
/// big-integer field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKeyHex {
    pub n: String,
    pub g: String,
    pub nsquared: String,
}

impl PublicKey {
    /// Serializes this key to its hex mirror.
    pub fn to_hex(&self) -> PublicKeyHex {
        PublicKeyHex {
            n: self.n.to_string_radix(16).to_uppercase(),
            g: self.g.to_string_radix(16).to_uppercase(),
            nsquared: self.nsquared.to_string_radix(16).to_uppercase(),
        }
    }

    /// Deserializes a key from its hex mirror. Format-preserving but not
    /// validating: callers that need `g` to be a valid Paillier generator
    /// for `n` must check that themselves, or trust the source the hex
    /// came from.
    pub fn from_hex(hex: &PublicKeyHex) -> Result<Self, Error> {
        let n = Integer::from_str_radix(&hex.n, 16).map_err(|_| Reason::Serialize)?;
        let g = Integer::from_str_radix(&hex.g, 16).map_err(|_| Reason::Serialize)?;
        let nsquared = Integer::from_str_radix(&hex.nsquared, 16).map_err(|_| Reason::Serialize)?;
        Ok(Self::from_parts(n, g, nsquared))
    }
}
