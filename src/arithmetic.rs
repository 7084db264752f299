use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::{Error, Result};

/// Binary (square-and-multiply) modular exponentiation.
///
/// Walks the exponent bits from least to most significant; every
/// multiplication is followed by a reduction so operands never grow past
/// `modulus²`. `exponent = 0` yields `1 % modulus`.
pub fn mod_pow(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    if modulus <= &BigUint::one() {
        return Err(Error::Precondition("modulus must be greater than one"));
    }

    let mut result = BigUint::one();
    let mut square = base % modulus;
    for i in 0..exponent.bits() {
        if exponent.bit(i) {
            result = (&result * &square) % modulus;
        }
        square = (&square * &square) % modulus;
    }

    Ok(result)
}

/// Euclidean greatest common divisor.
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    let mut a = a.clone();
    let mut b = b.clone();
    while !b.is_zero() {
        let remainder = &a % &b;
        a = std::mem::replace(&mut b, remainder);
    }
    a
}
