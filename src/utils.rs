//! The Paillier mathematical kernel: the `L` function, CRT recombination,
//! `2^w`-modular inversion, group membership tests, and generator
//! selection. Everything above this module is built in terms of these
//! primitives.

use rand_core::RngCore;
use rug::{Complete, Integer};

use crate::{Bug, Error};

/// Wraps any randomness source that implements [`rand_core::RngCore`] and
/// makes it compatible with [`rug::rand`].
pub fn external_rand(rng: &mut impl RngCore) -> rug::rand::ThreadRandState {
    use bytemuck::TransparentWrapper;

    #[derive(TransparentWrapper)]
    #[repr(transparent)]
    pub struct ExternalRand<R>(R);

    impl<R: RngCore> rug::rand::ThreadRandGen for ExternalRand<R> {
        fn gen(&mut self) -> u32 {
            self.0.next_u32()
        }
    }

    rug::rand::ThreadRandState::new_custom(ExternalRand::wrap_mut(rng))
}

/// `IsInZnStar`: true iff `0 <= a < n` and `gcd(a, n) = 1`.
#[inline]
pub fn is_in_zn_star(a: &Integer, n: &Integer) -> bool {
    a.cmp0().is_ge() && a < n && a.gcd_ref(n).complete() == *Integer::ONE
}

/// `IsInZnSquaredStar`: true iff `0 <= a < n^2` and `gcd(a, n^2) = 1`.
#[inline]
pub fn is_in_zn_squared_star(a: &Integer, nsquared: &Integer) -> bool {
    is_in_zn_star(a, nsquared)
}

/// Samples `x` uniformly from `Z*_n`.
pub fn sample_in_mult_group(rng: &mut impl RngCore, n: &Integer) -> Integer {
    let mut rng_state = external_rand(rng);
    loop {
        let x: Integer = n.random_below_ref(&mut rng_state).into();
        if is_in_zn_star(&x, n) {
            return x;
        }
    }
}

/// Samples a blinding value of `bits` bits, used by [`crate::Counter::mul_rand`]
/// and the blinded private comparison.
pub fn sample_blind(rng: &mut impl RngCore, bits: u32) -> Integer {
    let mut rng_state = external_rand(rng);
    Integer::random_bits(bits, &mut rng_state).into()
}

/// Generates a random safe prime (`x = 2x' + 1`, both `x` and `x'` prime)
/// of `bits` bits.
pub fn generate_safe_prime(rng: &mut impl RngCore, bits: u32) -> Integer {
    use rug::integer::IsPrime;
    let mut rng_state = external_rand(rng);
    loop {
        let mut x: Integer = Integer::random_bits(bits - 1, &mut rng_state).into();
        x.set_bit(bits - 2, true);
        x <<= 1;
        x += 1;

        if let IsPrime::Yes | IsPrime::Probably = x.is_probably_prime(25) {
            return x;
        }
    }
}

/// `invMod2toW(n)`: returns `n^-1 mod 2^|n|`, where `|n|` is the bit-length
/// of `n`. Used so that division by `n` inside [`fast_l`] reduces to a
/// masked multiplication by this precomputed inverse.
pub fn inv_mod_2_to_w(n: &Integer) -> Result<Integer, Error> {
    let w = n.significant_bits();
    let modulus = Integer::from(1) << w;
    Ok(n.invert_ref(&modulus).ok_or(Bug::InvertUndef)?.into())
}

/// `fastL(u, n, ninvmod2tow) = (u - 1) / n` for `u === 1 (mod n)`.
///
/// Computed as `((u - 1) mod 2^w) * ninvmod2tow mod 2^w`, which is correct
/// because `(u-1)/n === (u-1) * n^-1 (mod 2^w)` and the true quotient fits
/// in `w` bits.
pub fn fast_l(u: &Integer, n: &Integer, ninvmod2tow: &Integer) -> Integer {
    let w = n.significant_bits();
    let mask = (Integer::from(1) << w) - 1;
    let um1 = (u - Integer::ONE).complete() & &mask;
    (um1 * ninvmod2tow) & mask
}

/// `hConstant(g, p, psquared, pinvmod2tow) = (L_p(g^(p-1) mod p^2))^-1 mod p`.
///
/// Enables one-step CRT decryption per modulus.
pub fn h_constant(
    g: &Integer,
    p: &Integer,
    psquared: &Integer,
    pinvmod2tow: &Integer,
) -> Result<Integer, Error> {
    let pm1 = (p - Integer::ONE).complete();
    let t = g
        .clone()
        .pow_mod(&pm1, psquared)
        .map_err(|_| Bug::PowModUndef)?;
    let l = fast_l(&t, p, pinvmod2tow);
    Ok(l.invert_ref(p).ok_or(Bug::InvertUndef)?.into())
}

/// `fastCRT(g1, p, g2, q, qInv)`: returns the unique `g` in `[0, p*q)` with
/// `g === g1 (mod p)` and `g === g2 (mod q)`.
pub fn fast_crt(g1: &Integer, p: &Integer, g2: &Integer, q: &Integer, q_inv: &Integer) -> Integer {
    let mut t = (g1 - g2).complete();
    if t.cmp0().is_lt() {
        t += p;
    }
    let h = (t * q_inv).complete().modulo(p);
    (q * h).complete() + g2
}

/// `qInvPrecompute(q, p) = (q mod p)^-1 mod p`.
pub fn q_inv_precompute(q: &Integer, p: &Integer) -> Result<Integer, Error> {
    let q_mod_p = q.clone().modulo(p);
    Ok(q_mod_p.invert_ref(p).ok_or(Bug::InvertUndef)?.into())
}

/// Selects the Paillier generator `g` via the CRT-accelerated procedure:
/// samples a factor-wise generator `g_p` over `Z*_{p^2}` and `g_q` over
/// `Z*_{q^2}`, each retried until it has order a nonzero multiple of its
/// factor, then recombines them with [`fast_crt`].
///
/// Constructing `g` this way is markedly faster than rejection-sampling
/// directly in `Z*_{n^2}`, and yields an element whose order is guaranteed
/// to be a nonzero multiple of `n`.
pub fn select_generator(
    rng: &mut impl RngCore,
    p: &Integer,
    psquared: &Integer,
    q: &Integer,
    qsquared: &Integer,
) -> Result<Integer, Error> {
    let pm1 = (p - Integer::ONE).complete();
    let qm1 = (q - Integer::ONE).complete();

    let g_p = sample_generator_factor(rng, psquared, &pm1)?;
    let g_q = sample_generator_factor(rng, qsquared, &qm1)?;

    let qq_mod_pp = qsquared.clone().modulo(psquared);
    let inv: Integer = qq_mod_pp
        .invert_ref(psquared)
        .ok_or(Bug::InvertUndef)?
        .into();

    Ok(fast_crt(&g_p, psquared, &g_q, qsquared, &inv))
}

fn sample_generator_factor(
    rng: &mut impl RngCore,
    modsquared: &Integer,
    modm1: &Integer,
) -> Result<Integer, Error> {
    let mut rng_state = external_rand(rng);
    loop {
        let candidate: Integer = modsquared.random_below_ref(&mut rng_state).into();
        if !is_in_zn_squared_star(&candidate, modsquared) {
            continue;
        }
        let order_probe = candidate
            .clone()
            .pow_mod(modm1, modsquared)
            .map_err(|_| Bug::PowModUndef)?;
        if order_probe != *Integer::ONE {
            return Ok(candidate);
        }
    }
}

/// Best-effort scrub of a big integer's value before its storage is
/// released. `rug::Integer`'s backing GMP allocation is not guaranteed to
/// be wiped by this, but it removes the plaintext value from the live
/// object, which is the hygiene this crate aims for (see DESIGN.md).
pub(crate) fn scrub(x: &mut Integer) {
    x.assign(0);
}

/// Provides functionality that's yet missing in [`rug::Integer`].
pub trait IntegerExt {
    /// Returns `self mod module`, always non-negative.
    fn modulo(&self, module: &Self) -> Self;
}

impl IntegerExt for Integer {
    fn modulo(&self, module: &Self) -> Self {
        let c = (self % module).complete();
        if c.cmp0().is_lt() {
            module + c
        } else {
            c
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn test_rng() -> rand_chacha::ChaCha20Rng {
        rand_chacha::ChaCha20Rng::seed_from_u64(42)
    }

    #[test]
    fn fast_l_matches_definition() {
        let mut rng = test_rng();
        let n = generate_safe_prime(&mut rng, 256);
        let ninv = inv_mod_2_to_w(&n).unwrap();

        for k in 0..20 {
            let u = Integer::from(1) + &n * Integer::from(k);
            let expected = Integer::from(k);
            assert_eq!(fast_l(&u, &n, &ninv), expected);
        }
    }

    #[test]
    fn fast_crt_round_trips() {
        let mut rng = test_rng();
        let p = generate_safe_prime(&mut rng, 128);
        let q = generate_safe_prime(&mut rng, 128);
        let q_inv = q_inv_precompute(&q, &p).unwrap();

        let g1 = Integer::from(17) % &p;
        let g2 = Integer::from(31) % &q;
        let g = fast_crt(&g1, &p, &g2, &q, &q_inv);

        assert_eq!(Integer::from(&g % &p), g1);
        assert_eq!(Integer::from(&g % &q), g2);
    }

    #[test]
    fn membership_checks_bounds() {
        let n = Integer::from(35); // 5 * 7
        assert!(is_in_zn_star(&Integer::from(3), &n));
        assert!(!is_in_zn_star(&Integer::from(35), &n)); // out of range
        assert!(!is_in_zn_star(&Integer::from(14), &n)); // gcd(14,35) = 7
        assert!(!is_in_zn_star(&Integer::from(-1), &n)); // negative
    }
}
