// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

//! Client-side vote sealing for field ballots.
//!
//! Seals a yes/no choice under the collection authority's Paillier public
//! key and guarantees the ciphertext eventually reaches the server despite
//! unreliable connectivity: a failed send lands in a durable local queue
//! that is drained when the device comes back online. Multiplying two
//! ciphertexts mod `n²` yields an encryption of the sum of the choices,
//! so the authority can tally without ever opening an individual vote.
//! The private key, decryption and tallying stay on the authority's side;
//! this crate holds none of them.

mod arithmetic;
mod controller;
mod encryption_key;
mod error;
mod queue;
mod sampling;
mod submission;
mod transport;

pub use arithmetic::{gcd, mod_pow};
pub use controller::{
    DrainReport, SubmissionController, SubmissionOutcome, DEFAULT_SEND_TIMEOUT,
};
pub use encryption_key::{Ciphertext, EncryptionKey};
pub use error::{Error, KeyFormatError, Result, TransportError};
pub use queue::{JsonFileQueueStore, MemoryQueueStore, QueueEntry, QueueStore};
pub use sampling::random_coprime;
pub use submission::{GeoPoint, VoteReceipt, VoteSubmission};
pub use transport::VoteTransport;

#[cfg(test)]
pub(crate) mod tests {
    use std::str::FromStr;

    use num_bigint::BigUint;
    use num_integer::Integer;
    use num_traits::One;

    use crate::arithmetic::mod_pow;
    use crate::{Ciphertext, EncryptionKey, VoteSubmission};

    pub(crate) const KEY_ID: &str = "key-v1";

    // A fixed 255-bit keypair, small enough to keep the randomized tests
    // fast. N and G belong to the public half; LAMBDA and MU to the
    // authority's private half, used only by the reference decryptor.
    pub(crate) const N: &str =
        "35047012683602116851707879904405616659737798124893467344402132846736994607503";
    pub(crate) const G: &str =
        "35047012683602116851707879904405616659737798124893467344402132846736994607504";
    const LAMBDA: &str =
        "17523506341801058425853939952202808329681657405850644786540835718456107375280";
    const MU: &str =
        "5325045409967083355933280008961216134246406510866028757776299980310734718011";

    // Known-answer vector: encrypting 1 under (N, G) with the blinding
    // factor below must produce exactly this ciphertext.
    pub(crate) const KAT_RANDOMNESS: &str = "295990755076957556442107327915091545583";
    pub(crate) const KAT_CIPHERTEXT: &str =
        "1194408325376494992489490042552551005125204007901713351891407458663511589481764489969054511339568794489786206871131515670724958373463142216210026818068196";

    pub(crate) fn test_key() -> EncryptionKey {
        EncryptionKey::from_decimal(KEY_ID, N, G).unwrap()
    }

    pub(crate) fn sample_submission(question_id: &str) -> VoteSubmission {
        VoteSubmission {
            question_id: question_id.into(),
            participant_id: "participant-1".into(),
            agent_id: "agent-7".into(),
            ciphertext: "123456789".into(),
            key_id: KEY_ID.into(),
            timestamp_ms: 1_700_000_000_000,
            geo: None,
        }
    }

    /// Reference Paillier decryption, the capability the crate itself
    /// deliberately lacks: $ m = L(c^\lambda \mod n^2) \cdot \mu \mod n $
    /// with $ L(x) = (x - 1) / n $. Mirrors the authority's decryptor so
    /// the round-trip and homomorphism properties can be checked here.
    pub(crate) struct ReferenceDecryptor {
        n: BigUint,
        lambda: BigUint,
        mu: BigUint,
    }

    impl ReferenceDecryptor {
        pub(crate) fn fixed() -> Self {
            ReferenceDecryptor {
                n: BigUint::from_str(N).unwrap(),
                lambda: BigUint::from_str(LAMBDA).unwrap(),
                mu: BigUint::from_str(MU).unwrap(),
            }
        }

        pub(crate) fn decrypt(&self, ciphertext: &Ciphertext) -> BigUint {
            let n_squared = &self.n * &self.n;
            let c = BigUint::from_str(&ciphertext.to_decimal()).unwrap();
            let x = mod_pow(&c, &self.lambda, &n_squared).unwrap();
            let l = (x - BigUint::one()) / &self.n;
            (l * &self.mu) % &self.n
        }
    }

    /// Fresh keypair for randomized properties, generated the way the
    /// authority does it: two primes, `n = p * q`, `g = n + 1`,
    /// `lambda = lcm(p - 1, q - 1)`.
    pub(crate) fn generate_keypair(prime_bits: usize) -> (EncryptionKey, ReferenceDecryptor) {
        let p = glass_pumpkin::prime::new(prime_bits).unwrap();
        let q = glass_pumpkin::prime::new(prime_bits).unwrap();
        let n = &p * &q;
        let g = &n + BigUint::one();
        let lambda = (&p - BigUint::one()).lcm(&(&q - BigUint::one()));
        let n_squared = &n * &n;
        let x = mod_pow(&g, &lambda, &n_squared).unwrap();
        let l = (x - BigUint::one()) / &n;
        let mu = l.modinv(&n).unwrap();

        let key =
            EncryptionKey::from_decimal("key-test", &n.to_str_radix(10), &g.to_str_radix(10))
                .unwrap();
        let decryptor = ReferenceDecryptor { n, lambda, mu };
        (key, decryptor)
    }
}
