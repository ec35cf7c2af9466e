//! Fixtures shared by the unit tests and the demo.
//!
//! Nothing in here is fit for production: the key pair is built from public
//! Mersenne primes and the verifier is a keyed stand-in for a real proof system.

use merlin::Transcript;
use num::{BigUint, One};
use rand_core::{CryptoRng, RngCore};

use crate::account::{AccountId, Address};
use crate::config::TokenMetadata;
use crate::homomorphic;
use crate::ledger::ConfidentialLedger;
use crate::paillier::{PrivateKey, PublicKey, Randomizer};
use crate::verifier::{
    withdrawal_public_inputs, G1Point, G2Point, ProofVerifier, Word, WithdrawalProof,
};

static MERLIN_WITHDRAWAL_LABEL: &[u8] = b"discrete_bridge_withdrawal_transcript";

fn mersenne(exponent: usize) -> BigUint {
    (BigUint::one() << exponent) - BigUint::one()
}

lazy_static! {
    /// Key pair over `n = (2^107 - 1)(2^127 - 1)`.
    pub static ref TEST_KEYS: (PublicKey, PrivateKey) =
        PrivateKey::from_primes(&mersenne(107), &mersenne(127))
            .expect("Mersenne primes 107 and 127 form a valid key");
}

pub fn test_metadata() -> TokenMetadata {
    TokenMetadata {
        name: "DiscreteERC20".to_owned(),
        symbol: "D20".to_owned(),
        decimals: 18,
    }
}

/// An empty ledger under `TEST_KEYS` with a fixed encryption of zero as the
/// initial balance.
pub fn test_ledger(minter: Address) -> ConfidentialLedger<Address> {
    let (pk, _) = &*TEST_KEYS;
    let initial = homomorphic::encrypt_zero(&Randomizer::from(2), pk)
        .expect("2 is a valid randomizer");
    ConfidentialLedger::new(test_metadata(), pk.clone(), minter, initial)
        .expect("initial balance is a valid ciphertext")
}

/// Accepts exactly the proofs produced by `prove` with the same key.
///
/// The `a` point carries a transcript challenge over the key, the public inputs
/// and the random filler in `b` and `c`.
#[derive(Clone)]
pub struct KeyedVerifier {
    key: [u8; 32],
}

impl KeyedVerifier {
    pub fn new(key: [u8; 32]) -> Self {
        KeyedVerifier { key }
    }

    fn challenge(&self, b: &G2Point, c: &G1Point, public_inputs: &[Word]) -> G1Point {
        let mut transcript = Transcript::new(MERLIN_WITHDRAWAL_LABEL);
        transcript.append_message(b"key", &self.key);
        for row in b.iter() {
            for word in row.iter() {
                transcript.append_message(b"b", word);
            }
        }
        for word in c.iter() {
            transcript.append_message(b"c", word);
        }
        transcript.append_u64(b"inputs", public_inputs.len() as u64);
        for word in public_inputs {
            transcript.append_message(b"input", word);
        }
        let mut a = [[0u8; 32]; 2];
        transcript.challenge_bytes(b"a0", &mut a[0]);
        transcript.challenge_bytes(b"a1", &mut a[1]);
        a
    }

    /// A fresh proof that `account` may withdraw `amount`, followed by `extra`
    /// public inputs.
    pub fn prove_with_inputs<A: AccountId, T: RngCore + CryptoRng>(
        &self,
        account: &A,
        amount: u128,
        extra: &[Word],
        rng: &mut T,
    ) -> WithdrawalProof {
        let mut public_inputs = withdrawal_public_inputs(account, amount)
            .expect("test accounts fit a word")
            .to_vec();
        public_inputs.extend_from_slice(extra);
        let mut b = [[[0u8; 32]; 2]; 2];
        let mut c = [[0u8; 32]; 2];
        for word in b.iter_mut().flat_map(|row| row.iter_mut()).chain(c.iter_mut()) {
            rng.fill_bytes(word);
        }
        let a = self.challenge(&b, &c, &public_inputs);
        WithdrawalProof::new(a, b, c, public_inputs)
    }

    pub fn prove<A: AccountId, T: RngCore + CryptoRng>(
        &self,
        account: &A,
        amount: u128,
        rng: &mut T,
    ) -> WithdrawalProof {
        self.prove_with_inputs(account, amount, &[], rng)
    }
}

impl ProofVerifier for KeyedVerifier {
    fn verify_proof(&self, a: &G1Point, b: &G2Point, c: &G1Point, public_inputs: &[Word]) -> bool {
        *a != [[0u8; 32]; 2] && self.challenge(b, c, public_inputs) == *a
    }
}
