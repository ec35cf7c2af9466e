//! Boundary to the external succinct proof verifier.
//!
//! Proofs are Groth16 shaped: two G1 points, one G2 point and a list of public
//! inputs, all as 32-byte big-endian words. The circuit and its setup live
//! elsewhere; this crate only binds the public inputs and asks for a verdict.

use num::BigUint;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::account::AccountId;
use crate::amount::Amount;
use crate::constants::{BOUND_PUBLIC_INPUTS, PROOF_DIGEST_LABEL, WIRE_VERSION, WORD_SIZE};
use crate::{BridgeError, WireError};

pub type Word = [u8; WORD_SIZE];
pub type G1Point = [Word; 2];
pub type G2Point = [[Word; 2]; 2];
pub type ProofDigest = [u8; 32];

/// Encode an integer as a big-endian word, `None` if it needs more than 256 bits.
pub fn word_from_biguint(x: &BigUint) -> Option<Word> {
    let bytes = x.to_bytes_be();
    if bytes.len() > WORD_SIZE {
        return None;
    }
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - bytes.len()..].copy_from_slice(&bytes);
    Some(word)
}

pub fn word_from_u128(x: u128) -> Word {
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - 16..].copy_from_slice(&x.to_be_bytes());
    word
}

/// Deterministic accept/reject predicate over a proof and its public inputs.
pub trait ProofVerifier {
    fn verify_proof(&self, a: &G1Point, b: &G2Point, c: &G1Point, public_inputs: &[Word]) -> bool;
}

impl<F> ProofVerifier for F
where
    F: Fn(&G1Point, &G2Point, &G1Point, &[Word]) -> bool,
{
    fn verify_proof(&self, a: &G1Point, b: &G2Point, c: &G1Point, public_inputs: &[Word]) -> bool {
        self(a, b, c, public_inputs)
    }
}

/// The public inputs every withdrawal proof has to lead with.
pub fn withdrawal_public_inputs<A: AccountId>(account: &A, amount: u128) -> Option<[Word; 2]> {
    Some([
        word_from_biguint(&account.to_public_input())?,
        word_from_biguint(&amount.to_plaintext())?,
    ])
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalProof {
    pub a: G1Point,
    pub b: G2Point,
    pub c: G1Point,
    pub public_inputs: Vec<Word>,
}

impl WithdrawalProof {
    pub fn new(a: G1Point, b: G2Point, c: G1Point, public_inputs: Vec<Word>) -> Self {
        WithdrawalProof {
            a,
            b,
            c,
            public_inputs,
        }
    }

    /// Checks that the proof is well formed and speaks about `account` withdrawing
    /// exactly `amount`.
    pub fn check_binding<A: AccountId>(
        &self,
        account: &A,
        amount: u128,
        max_public_inputs: usize,
    ) -> Result<(), BridgeError> {
        if self.public_inputs.len() < BOUND_PUBLIC_INPUTS
            || self.public_inputs.len() > max_public_inputs
        {
            return Err(BridgeError::MalformedProof);
        }
        let expected =
            withdrawal_public_inputs(account, amount).ok_or(BridgeError::MalformedProof)?;
        if self.public_inputs[..BOUND_PUBLIC_INPUTS] != expected[..] {
            return Err(BridgeError::ProofRejected);
        }
        Ok(())
    }

    /// Identifies the proof for single use.
    pub fn digest(&self) -> ProofDigest {
        let mut hasher = Sha256::new();
        hasher.input(PROOF_DIGEST_LABEL);
        for word in self.a.iter().chain(self.c.iter()) {
            hasher.input(word);
        }
        for row in self.b.iter() {
            for word in row.iter() {
                hasher.input(word);
            }
        }
        hasher.input(&(self.public_inputs.len() as u64).to_be_bytes());
        for word in self.public_inputs.iter() {
            hasher.input(word);
        }
        let mut digest = [0u8; 32];
        digest.copy_from_slice(hasher.result().as_slice());
        digest
    }

    /// Get a compact binary representation of the proof.
    pub fn to_bytes(&self) -> Result<Vec<u8>, WireError> {
        let encoded = bincode::serialize(self)?;
        let mut buf = Vec::with_capacity(encoded.len() + 1);
        buf.push(WIRE_VERSION);
        buf.extend_from_slice(&encoded);
        Ok(buf)
    }

    /// Convert binary representations into proofs.
    pub fn from_bytes(slice: &[u8]) -> Result<Self, WireError> {
        let (version, body) = slice.split_first().ok_or(WireError::Format)?;
        if *version != WIRE_VERSION {
            return Err(WireError::Version(*version));
        }
        Ok(bincode::deserialize(body)?)
    }
}
