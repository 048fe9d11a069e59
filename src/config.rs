//! Configuration constants shared across the crate.

use crate::{Error, Reason};

/// Bit-width of the blinding value used by [`crate::Counter::mul_rand`] and
/// by the blinded private comparison in [`crate::Counter::private_cmp2`].
///
/// Must satisfy `2 * PAILLIER_RANDOMIZER_SECLEVEL + 2 << |n|` for the
/// blind to statistically hide the masked value.
pub const PAILLIER_RANDOMIZER_SECLEVEL: u32 = 128;

/// Smallest prime bit-length this crate will generate a keypair for.
pub const MIN_KEYSIZE_BITS: u32 = 512;

/// Largest prime bit-length this crate will generate a keypair for.
pub const MAX_KEYSIZE_BITS: u32 = 4096;

/// Validates that `keysize` (the bit-length of each prime factor) lies
/// within the sane range this crate supports, before key generation
/// spends any time on it.
pub fn validate_keysize(keysize: u32) -> Result<(), Error> {
    if (MIN_KEYSIZE_BITS..=MAX_KEYSIZE_BITS).contains(&keysize) {
        Ok(())
    } else {
        Err(Reason::InvalidKeySize.into())
    }
}
