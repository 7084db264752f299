// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::{CryptoRng, RngCore};

use crate::arithmetic::gcd;
use crate::{Error, Result};

/// Draws a blinding factor `r` with `2 <= r < n` and `gcd(r, n) = 1`.
///
/// Candidates are sampled at the full bit-length of `n` so the draw covers
/// the whole range, then rejected when they fall outside `[2, n)` or share
/// a factor with `n`. For a biprime `n` almost every residue is coprime,
/// so the loop finishes after a couple of draws.
pub fn random_coprime<R>(n: &BigUint, rng: &mut R) -> Result<BigUint>
where
    R: CryptoRng + RngCore,
{
    if n < &BigUint::from(3u8) {
        return Err(Error::Precondition("modulus admits no blinding factor"));
    }

    let two = BigUint::from(2u8);
    loop {
        let candidate = rng.gen_biguint(n.bits());
        if candidate < two || &candidate >= n {
            continue;
        }
        if gcd(&candidate, n).is_one() {
            return Ok(candidate);
        }
    }
}
