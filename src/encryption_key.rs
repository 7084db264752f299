use core::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};

use crate::arithmetic::mod_pow;
use crate::error::KeyFormatError;
use crate::sampling::random_coprime;
use crate::{Error, Result};

/// Paillier public key as served by the collection authority.
///
/// `n` is the biprime modulus and `g` is conventionally `n + 1`. The key
/// is immutable once parsed; encryption borrows it per call and never
/// mutates it. The matching private key lives with the authority, so
/// nothing in this crate can open a ciphertext.
#[derive(Clone, Debug)]
pub struct EncryptionKey {
    key_id: String,
    n: BigUint,
    g: BigUint,
    n_squared: BigUint,
}

impl EncryptionKey {
    /// Parses the decimal-string key material handed out by the key
    /// provider.
    pub fn from_decimal(key_id: impl Into<String>, n: &str, g: &str) -> Result<Self> {
        let n = parse_decimal("n", n)?;
        let g = parse_decimal("g", g)?;
        if n <= BigUint::one() {
            return Err(KeyFormatError::ModulusOutOfRange.into());
        }
        let n_squared = &n * &n;

        Ok(EncryptionKey {
            key_id: key_id.into(),
            n,
            g,
            n_squared,
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    /// Encrypts `m` under this key with a fresh blinding factor:
    /// $ c = g^m \cdot r^n \mod n^2 $
    ///
    /// The scheme accepts any `m` in `[0, n)`; the vote domain restricts
    /// callers to a single bit, which [`EncryptionKey::encrypt_bit`]
    /// enforces. Repeated calls with the same `m` produce different
    /// ciphertexts because `r` is resampled every time.
    pub fn encrypt<R>(&self, m: &BigUint, rng: &mut R) -> Result<Ciphertext>
    where
        R: CryptoRng + RngCore,
    {
        if m >= &self.n {
            return Err(Error::Precondition(
                "plaintext must be smaller than the modulus",
            ));
        }
        let r = random_coprime(&self.n, rng)?;
        self.encrypt_with(m, &r)
    }

    /// Encrypts one yes/no choice.
    pub fn encrypt_bit<R>(&self, choice: bool, rng: &mut R) -> Result<Ciphertext>
    where
        R: CryptoRng + RngCore,
    {
        let m = if choice {
            BigUint::one()
        } else {
            BigUint::zero()
        };
        self.encrypt(&m, rng)
    }

    pub(crate) fn encrypt_with(&self, m: &BigUint, r: &BigUint) -> Result<Ciphertext> {
        let g_m = mod_pow(&self.g, m, &self.n_squared)?;
        let r_n = mod_pow(r, &self.n, &self.n_squared)?;

        Ok(Ciphertext((g_m * r_n) % &self.n_squared))
    }

    /// Homomorphic combination: the product of two ciphertexts decrypts
    /// to the sum of their plaintexts mod `n`.
    ///
    /// Both operands must have been produced under this key. A value at
    /// or above `n²` cannot be one of ours and is rejected; a foreign
    /// ciphertext that happens to fit the range is undetectable here and
    /// stays a caller error.
    pub fn add(&self, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext> {
        if c1.0 >= self.n_squared || c2.0 >= self.n_squared {
            return Err(Error::Precondition(
                "ciphertext does not fit this key's modulus",
            ));
        }

        Ok(Ciphertext((&c1.0 * &c2.0) % &self.n_squared))
    }
}

/// A Paillier ciphertext, an integer in `[0, n²)` rendered as a decimal
/// string for transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ciphertext(pub(crate) BigUint);

impl Ciphertext {
    pub fn from_decimal(value: &str) -> Result<Self> {
        Ok(Ciphertext(parse_decimal("ciphertext", value)?))
    }

    pub fn to_decimal(&self) -> String {
        self.0.to_str_radix(10)
    }
}

impl fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

fn parse_decimal(field: &'static str, value: &str) -> Result<BigUint> {
    BigUint::from_str(value).map_err(|_| Error::KeyFormat(KeyFormatError::NotAnInteger { field }))
}
