//! Custody of the public token and the gate between it and the confidential ledger.
//!
//! Every operation validates and stages the ledger change first, then performs the
//! single external token call, then commits. An error at any step returns before
//! the ledger, the reserve or the event journal has been touched.

use std::collections::HashSet;

use log::{debug, warn};
#[cfg(feature = "std")]
use rand::thread_rng;
use rand_core::{CryptoRng, RngCore};

use crate::account::AccountId;
use crate::amount::Amount;
use crate::config::BridgeConfig;
use crate::constants::{DEFAULT_MAX_PUBLIC_INPUTS, LOG_TARGET};
use crate::disclosure::SealedBalance;
use crate::homomorphic;
use crate::ledger::ConfidentialLedger;
use crate::paillier::{Ciphertext, Randomizer};
use crate::token::PublicToken;
use crate::verifier::{ProofDigest, ProofVerifier, WithdrawalProof};
use crate::BridgeError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeEvent<A> {
    Deposit { account: A, amount: u128 },
    TransferEncrypted { from: A, to: A },
    Withdraw { account: A, amount: u128 },
}

/// What the bridge can tell about an account without decrypting anything.
///
/// The state follows the ledger entry, not the custody reserve: an account stays
/// `Funded` after withdrawing everything, and a transfer recipient becomes
/// `Funded` without ever depositing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountState {
    /// The ledger holds no balance entry for the account.
    Unfunded,
    /// The account has a balance entry. It may still encrypt zero.
    Funded,
}

pub struct Bridge<A: AccountId, T: PublicToken<A>, V: ProofVerifier> {
    custody: A,
    ledger: ConfidentialLedger<A>,
    token: T,
    verifier: V,
    reserve: u128,
    consumed: HashSet<ProofDigest>,
    max_public_inputs: usize,
    events: Vec<BridgeEvent<A>>,
}

impl<A: AccountId, T: PublicToken<A>, V: ProofVerifier> Bridge<A, T, V> {
    /// `custody` is the bridge's own account on the public token and must hold
    /// the ledger's mint capability.
    pub fn new(
        custody: A,
        ledger: ConfidentialLedger<A>,
        token: T,
        verifier: V,
    ) -> Result<Self, BridgeError> {
        if *ledger.minter() != custody {
            return Err(BridgeError::NotMinter);
        }
        Ok(Bridge {
            custody,
            ledger,
            token,
            verifier,
            reserve: 0,
            consumed: HashSet::new(),
            max_public_inputs: DEFAULT_MAX_PUBLIC_INPUTS,
            events: Vec::new(),
        })
    }

    /// Set up a fresh ledger from `config`, with a random encryption of zero as
    /// the initial balance.
    pub fn from_config<R: RngCore + CryptoRng>(
        custody: A,
        config: &BridgeConfig,
        token: T,
        verifier: V,
        rng: &mut R,
    ) -> Result<Self, BridgeError> {
        let pk = &config.public_key;
        let initial = homomorphic::encrypt_zero(&Randomizer::random(pk, rng), pk)?;
        let ledger = ConfidentialLedger::new(
            config.metadata.clone(),
            pk.clone(),
            custody.clone(),
            initial,
        )?;
        let mut bridge = Bridge::new(custody, ledger, token, verifier)?;
        bridge.max_public_inputs = config.max_public_inputs;
        Ok(bridge)
    }

    pub fn custody(&self) -> &A {
        &self.custody
    }

    pub fn ledger(&self) -> &ConfidentialLedger<A> {
        &self.ledger
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    /// Direct access to the public token, e.g. to approve the bridge. The bridge's
    /// own custody balance must not be moved through here.
    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    /// Public tokens currently backing the confidential ledger.
    pub fn reserve(&self) -> u128 {
        self.reserve
    }

    pub fn account_state(&self, account: &A) -> AccountState {
        if self.ledger.is_materialized(account) {
            AccountState::Funded
        } else {
            AccountState::Unfunded
        }
    }

    pub fn is_consumed(&self, proof: &WithdrawalProof) -> bool {
        self.consumed.contains(&proof.digest())
    }

    /// Pull `amount` public tokens from `caller` into custody and mint their
    /// encryption to `caller`.
    pub fn deposit_with_rng<R: RngCore + CryptoRng>(
        &mut self,
        caller: &A,
        amount: u128,
        rng: &mut R,
    ) -> Result<(), BridgeError> {
        let reserve = self
            .reserve
            .checked_add(amount)
            .ok_or(BridgeError::ReserveOverflow)?;
        let delta = amount.encode_with_rng(self.ledger.public_key(), rng)?;
        my_debug!(&delta);
        let staged = self.ledger.stage_mint(&self.custody, caller, &delta)?;

        if let Err(e) = self
            .token
            .transfer_from(&self.custody, caller, &self.custody, amount)
        {
            warn!(target: LOG_TARGET, "deposit pull from {:?} failed: {}", caller, e);
            return Err(e.into());
        }

        self.ledger.commit(staged)?;
        self.reserve = reserve;
        debug!(target: LOG_TARGET, "deposit of {} by {:?}", amount, caller);
        self.events.push(BridgeEvent::Deposit {
            account: caller.clone(),
            amount,
        });
        Ok(())
    }

    #[cfg(feature = "std")]
    pub fn deposit(&mut self, caller: &A, amount: u128) -> Result<(), BridgeError> {
        self.deposit_with_rng(caller, amount, &mut thread_rng())
    }

    /// Move an encrypted amount between ledger accounts.
    ///
    /// Nothing checks that `delta` encrypts an amount `caller` actually owns, an
    /// overdraft wraps `caller`'s balance around `n`.
    pub fn transfer_encrypted(
        &mut self,
        caller: &A,
        to: &A,
        delta: &Ciphertext,
    ) -> Result<(), BridgeError> {
        self.ledger.transfer(caller, to, delta)?;
        debug!(target: LOG_TARGET, "encrypted transfer {:?} -> {:?}", caller, to);
        self.events.push(BridgeEvent::TransferEncrypted {
            from: caller.clone(),
            to: to.clone(),
        });
        Ok(())
    }

    /// Release `amount` public tokens to `caller` against a proof that its
    /// encrypted balance covers them. Each proof is accepted at most once.
    pub fn withdraw_with_rng<R: RngCore + CryptoRng>(
        &mut self,
        caller: &A,
        amount: u128,
        proof: &WithdrawalProof,
        rng: &mut R,
    ) -> Result<(), BridgeError> {
        if let Err(e) = proof.check_binding(caller, amount, self.max_public_inputs) {
            warn!(
                target: LOG_TARGET,
                "withdrawal proof of {:?} not bound to request: {}", caller, e
            );
            return Err(e);
        }
        let digest = proof.digest();
        if self.consumed.contains(&digest) {
            warn!(target: LOG_TARGET, "replayed withdrawal proof from {:?}", caller);
            return Err(BridgeError::ProofReplayed);
        }
        if !self
            .verifier
            .verify_proof(&proof.a, &proof.b, &proof.c, &proof.public_inputs)
        {
            warn!(target: LOG_TARGET, "withdrawal proof of {:?} rejected", caller);
            return Err(BridgeError::ProofRejected);
        }
        let reserve = self
            .reserve
            .checked_sub(amount)
            .ok_or(BridgeError::ReserveExhausted)?;
        let delta = amount.encode_with_rng(self.ledger.public_key(), rng)?;
        my_debug!(&delta);
        let staged = self.ledger.stage_burn(&self.custody, caller, &delta)?;

        if let Err(e) = self.token.transfer(&self.custody, caller, amount) {
            warn!(target: LOG_TARGET, "release to {:?} failed: {}", caller, e);
            return Err(e.into());
        }

        self.ledger.commit(staged)?;
        self.reserve = reserve;
        self.consumed.insert(digest);
        debug!(target: LOG_TARGET, "withdrawal of {} by {:?}", amount, caller);
        self.events.push(BridgeEvent::Withdraw {
            account: caller.clone(),
            amount,
        });
        Ok(())
    }

    #[cfg(feature = "std")]
    pub fn withdraw(
        &mut self,
        caller: &A,
        amount: u128,
        proof: &WithdrawalProof,
    ) -> Result<(), BridgeError> {
        self.withdraw_with_rng(caller, amount, proof, &mut thread_rng())
    }

    pub fn request_balance(&mut self, caller: &A) {
        self.ledger.request_balance(caller);
    }

    pub fn response_balance(&mut self, account: &A, sealed: SealedBalance) {
        self.ledger.response_balance(account, sealed);
    }

    pub fn events(&self) -> &[BridgeEvent<A>] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<BridgeEvent<A>> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests;
