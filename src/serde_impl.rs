//! Optional `serde` support for keys and counters, gated behind the
//! `serde` feature. The private key's full CRT material is included so a
//! round trip reproduces an identical key rather than a freshly
//! regenerated one.

use rug::Integer;

use crate::{Counter, PrivateKey, PublicKey};

impl serde::Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        (self.n(), self.g(), self.nsquared()).serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (n, g, nsquared) = <(Integer, Integer, Integer)>::deserialize(deserializer)?;
        Ok(PublicKey::from_parts(n, g, nsquared))
    }
}

impl serde::Serialize for PrivateKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let parts = (
            self.ek().n(),
            self.ek().g(),
            self.ek().nsquared(),
            self.p(),
            self.q(),
            self.psquared(),
            self.qsquared(),
            self.pinvmod2tow(),
            self.qinvmod2tow(),
            self.hsubp(),
            self.hsubq(),
            self.q_inv(),
        );
        parts.serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for PrivateKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[allow(clippy::type_complexity)]
        let (n, g, nsquared, p, q, psquared, qsquared, pinvmod2tow, qinvmod2tow, hsubp, hsubq, q_inv): (
            Integer,
            Integer,
            Integer,
            Integer,
            Integer,
            Integer,
            Integer,
            Integer,
            Integer,
            Integer,
            Integer,
            Integer,
        ) = serde::Deserialize::deserialize(deserializer)?;

        let ek = PublicKey::from_parts(n, g, nsquared);
        Ok(PrivateKey::from_raw_parts(
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
        ))
    }
}

/// Only `Serialize` is provided for [`Counter`]: deserializing one needs a
/// [`PublicKey`] for context that the `serde::Deserialize` trait has no
/// room to thread through, so callers restoring a counter from untrusted
/// storage should use [`Counter::from_hex`] instead, which takes the key
/// explicitly.
impl serde::Serialize for Counter<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.ciphertext().serialize(serializer)
    }
}
