//! The off-chain side of the balance disclosure handshake.
//!
//! The ledger never holds the Paillier private key. An authority that does hold it
//! watches for balance requests, decrypts the requester's balance and seals the
//! plaintext to a conventional key owned by the requester: an ephemeral Ristretto
//! Diffie-Hellman, a SHA-256 key derivation and ChaCha20-Poly1305 with the account
//! bound as associated data.

use std::collections::HashMap;

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use log::{debug, warn};
use num::BigUint;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::account::AccountId;
use crate::amount::Amount;
use crate::constants::{DISCLOSURE_KDF_LABEL, LOG_TARGET};
use crate::homomorphic;
use crate::ledger::ConfidentialLedger;
use crate::paillier::{Ciphertext, PrivateKey, PublicKey};
use crate::{DisclosureError, PaillierError};

const NONCE_SIZE: usize = 12;

/// Balance encrypted under a requester's conventional key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedBalance {
    pub ephemeral: [u8; 32],
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequesterPublicKey(pub [u8; 32]);

impl RequesterPublicKey {
    fn to_point(&self) -> Result<RistrettoPoint, DisclosureError> {
        CompressedRistretto(self.0)
            .decompress()
            .ok_or(DisclosureError::MalformedKey)
    }
}

#[derive(Clone)]
pub struct RequesterSecretKey(Scalar);

impl RequesterSecretKey {
    pub fn generate_with<T: RngCore + CryptoRng>(rng: &mut T) -> Self {
        RequesterSecretKey(Scalar::random(rng))
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Option<Self> {
        Scalar::from_canonical_bytes(bytes).map(RequesterSecretKey)
    }

    pub fn to_public(&self) -> RequesterPublicKey {
        RequesterPublicKey((self.0 * RISTRETTO_BASEPOINT_POINT).compress().to_bytes())
    }

    /// Recover the plaintext balance sealed for `account`.
    pub fn open<A: AccountId>(
        &self,
        sealed: &SealedBalance,
        account: &A,
    ) -> Result<BigUint, DisclosureError> {
        let ephemeral = CompressedRistretto(sealed.ephemeral)
            .decompress()
            .ok_or(DisclosureError::MalformedKey)?;
        let cipher = symmetric_cipher(&(self.0 * ephemeral), &sealed.ephemeral)?;
        let aad = account.to_public_input().to_bytes_be();
        let plaintext = cipher
            .decrypt(
                Nonce::from_slice(&sealed.nonce),
                Payload {
                    msg: &sealed.ciphertext,
                    aad: &aad,
                },
            )
            .map_err(|_| DisclosureError::Open)?;
        Ok(BigUint::from_bytes_be(&plaintext))
    }

    /// Like `open`, converting into an amount type.
    pub fn open_amount<A: AccountId, T: Amount>(
        &self,
        sealed: &SealedBalance,
        account: &A,
    ) -> Result<T, DisclosureError> {
        let m = self.open(sealed, account)?;
        T::try_from_plaintext(&m).ok_or(DisclosureError::NotRepresentable)
    }
}

fn symmetric_cipher(
    shared: &RistrettoPoint,
    ephemeral: &[u8; 32],
) -> Result<ChaCha20Poly1305, DisclosureError> {
    let mut hasher = Sha256::new();
    hasher.input(DISCLOSURE_KDF_LABEL);
    hasher.input(shared.compress().as_bytes());
    hasher.input(ephemeral);
    let key = hasher.result();
    ChaCha20Poly1305::new_from_slice(key.as_slice()).map_err(|_| DisclosureError::Seal)
}

/// Seal `plaintext` to `recipient`, binding it to `account`.
pub fn seal<A: AccountId, T: RngCore + CryptoRng>(
    recipient: &RequesterPublicKey,
    account: &A,
    plaintext: &BigUint,
    rng: &mut T,
) -> Result<SealedBalance, DisclosureError> {
    let recipient = recipient.to_point()?;
    let r = Scalar::random(rng);
    let ephemeral = (r * RISTRETTO_BASEPOINT_POINT).compress().to_bytes();
    let cipher = symmetric_cipher(&(r * recipient), &ephemeral)?;
    let mut nonce = [0u8; NONCE_SIZE];
    rng.fill_bytes(&mut nonce);
    let aad = account.to_public_input().to_bytes_be();
    let msg = plaintext.to_bytes_be();
    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: &msg,
                aad: &aad,
            },
        )
        .map_err(|_| DisclosureError::Seal)?;
    Ok(SealedBalance {
        ephemeral,
        nonce,
        ciphertext,
    })
}

/// The holder of the decryption capability, as seen by the ledger's callers.
pub trait DisclosureAuthority<A: AccountId> {
    /// Produce the sealed plaintext of `balance` for the requester `account`.
    fn disclose_with_rng<T: RngCore + CryptoRng>(
        &self,
        account: &A,
        balance: &Ciphertext,
        rng: &mut T,
    ) -> Result<SealedBalance, DisclosureError>;

    /// Answer every pending request of `ledger` that can be answered. Requests
    /// that fail stay pending.
    fn answer_pending<T: RngCore + CryptoRng>(
        &self,
        ledger: &ConfidentialLedger<A>,
        rng: &mut T,
    ) -> Vec<(A, SealedBalance)> {
        let mut answers = Vec::new();
        for account in ledger.pending_accounts() {
            match self.disclose_with_rng(&account, &ledger.balance_of(&account), rng) {
                Ok(sealed) => answers.push((account, sealed)),
                Err(e) => warn!(target: LOG_TARGET, "cannot answer {:?}: {}", account, e),
            }
        }
        answers
    }
}

/// Reference authority that keeps the Paillier private key and a directory of
/// requester keys. How requesters get registered is up to the operator.
pub struct KeyHolder<A: AccountId> {
    public_key: PublicKey,
    private_key: PrivateKey,
    requesters: HashMap<A, RequesterPublicKey>,
}

impl<A: AccountId> KeyHolder<A> {
    pub fn new(public_key: PublicKey, private_key: PrivateKey) -> Self {
        KeyHolder {
            public_key,
            private_key,
            requesters: HashMap::new(),
        }
    }

    pub fn register(&mut self, account: A, key: RequesterPublicKey) {
        self.requesters.insert(account, key);
    }

    pub fn decrypt(&self, balance: &Ciphertext) -> Result<BigUint, PaillierError> {
        let sigma = self
            .private_key
            .sigma(balance, &self.public_key)
            .ok_or(PaillierError::InvalidCiphertext)?;
        homomorphic::decrypt(balance, &self.public_key, &self.private_key, &sigma)
    }
}

impl<A: AccountId> DisclosureAuthority<A> for KeyHolder<A> {
    fn disclose_with_rng<T: RngCore + CryptoRng>(
        &self,
        account: &A,
        balance: &Ciphertext,
        rng: &mut T,
    ) -> Result<SealedBalance, DisclosureError> {
        let recipient = self
            .requesters
            .get(account)
            .ok_or(DisclosureError::UnknownRequester)?;
        let plaintext = self.decrypt(balance)?;
        debug!(target: LOG_TARGET, "sealing balance for {:?}", account);
        seal(recipient, account, &plaintext, rng)
    }
}
