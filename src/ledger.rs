//! The confidential ledger: one Paillier ciphertext per account.
//!
//! Balances change only through `mint`, `burn` and `transfer`. Each of them is split
//! into a pure `stage_*` step that does all validation and a `commit` that only
//! refuses updates staged against another ledger or an older state, so a caller
//! can put external calls between the two without ever leaving the ledger
//! half-updated.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;

use crate::account::AccountId;
use crate::config::TokenMetadata;
use crate::constants::LOG_TARGET;
use crate::disclosure::SealedBalance;
use crate::homomorphic;
use crate::paillier::{Ciphertext, PublicKey};
use crate::LedgerError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerEvent<A> {
    Mint { to: A },
    Burn { from: A },
    Transfer { from: A, to: A },
    BalanceChanged { account: A, balance: Ciphertext },
    RequestBalance { account: A },
    ResponseBalance { account: A, sealed: SealedBalance },
}

static NEXT_LEDGER_ID: AtomicU64 = AtomicU64::new(0);

/// Balance updates computed but not yet applied.
///
/// The update holds final values, so it is only valid for the ledger and
/// generation it was staged against.
#[derive(Debug)]
#[must_use = "a staged update does nothing until it is committed"]
pub struct StagedUpdate<A> {
    ledger_id: u64,
    generation: u64,
    balances: Vec<(A, Ciphertext)>,
    total_supply: Option<Ciphertext>,
    event: LedgerEvent<A>,
}

#[derive(Debug)]
pub struct ConfidentialLedger<A: AccountId> {
    id: u64,
    generation: u64,
    metadata: TokenMetadata,
    public_key: PublicKey,
    minter: A,
    initial_balance: Ciphertext,
    balances: HashMap<A, Ciphertext>,
    total_supply: Ciphertext,
    pending_requests: HashMap<A, usize>,
    responses: HashMap<A, SealedBalance>,
    events: Vec<LedgerEvent<A>>,
}

fn next_ledger_id() -> u64 {
    NEXT_LEDGER_ID.fetch_add(1, Ordering::Relaxed)
}

// A clone is a separate ledger; updates staged on one never apply to the other.
impl<A: AccountId> Clone for ConfidentialLedger<A> {
    fn clone(&self) -> Self {
        ConfidentialLedger {
            id: next_ledger_id(),
            generation: self.generation,
            metadata: self.metadata.clone(),
            public_key: self.public_key.clone(),
            minter: self.minter.clone(),
            initial_balance: self.initial_balance.clone(),
            balances: self.balances.clone(),
            total_supply: self.total_supply.clone(),
            pending_requests: self.pending_requests.clone(),
            responses: self.responses.clone(),
            events: self.events.clone(),
        }
    }
}

impl<A: AccountId> ConfidentialLedger<A> {
    /// `initial_balance` must be an encryption of zero; it is what untouched
    /// accounts report and what the total supply starts from.
    pub fn new(
        metadata: TokenMetadata,
        public_key: PublicKey,
        minter: A,
        initial_balance: Ciphertext,
    ) -> Result<Self, LedgerError> {
        public_key.check_ciphertext(&initial_balance)?;
        Ok(ConfidentialLedger {
            id: next_ledger_id(),
            generation: 0,
            metadata,
            public_key,
            minter,
            total_supply: initial_balance.clone(),
            initial_balance,
            balances: HashMap::new(),
            pending_requests: HashMap::new(),
            responses: HashMap::new(),
            events: Vec::new(),
        })
    }

    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn minter(&self) -> &A {
        &self.minter
    }

    pub fn balance_of(&self, account: &A) -> Ciphertext {
        self.balances
            .get(account)
            .unwrap_or(&self.initial_balance)
            .clone()
    }

    /// Whether the account has been touched by a mint or a transfer.
    pub fn is_materialized(&self, account: &A) -> bool {
        self.balances.contains_key(account)
    }

    /// Encryption of everything minted minus everything burnt.
    pub fn total_supply(&self) -> &Ciphertext {
        &self.total_supply
    }

    fn require_minter(&self, caller: &A) -> Result<(), LedgerError> {
        if *caller == self.minter {
            Ok(())
        } else {
            Err(LedgerError::NotMinter)
        }
    }

    pub fn stage_mint(
        &self,
        caller: &A,
        to: &A,
        delta: &Ciphertext,
    ) -> Result<StagedUpdate<A>, LedgerError> {
        self.require_minter(caller)?;
        let pk = &self.public_key;
        let balance = homomorphic::add(&self.balance_of(to), delta, pk)?;
        let total_supply = homomorphic::add(&self.total_supply, delta, pk)?;
        Ok(StagedUpdate {
            ledger_id: self.id,
            generation: self.generation,
            balances: vec![(to.clone(), balance)],
            total_supply: Some(total_supply),
            event: LedgerEvent::Mint { to: to.clone() },
        })
    }

    pub fn stage_burn(
        &self,
        caller: &A,
        from: &A,
        delta: &Ciphertext,
    ) -> Result<StagedUpdate<A>, LedgerError> {
        self.require_minter(caller)?;
        let pk = &self.public_key;
        let balance = homomorphic::sub(&self.balance_of(from), delta, pk)?;
        let total_supply = homomorphic::sub(&self.total_supply, delta, pk)?;
        Ok(StagedUpdate {
            ledger_id: self.id,
            generation: self.generation,
            balances: vec![(from.clone(), balance)],
            total_supply: Some(total_supply),
            event: LedgerEvent::Burn { from: from.clone() },
        })
    }

    // The ledger cannot see whether `from` owns what `delta` encrypts; the
    // ciphertext is taken as given.
    pub fn stage_transfer(
        &self,
        from: &A,
        to: &A,
        delta: &Ciphertext,
    ) -> Result<StagedUpdate<A>, LedgerError> {
        let pk = &self.public_key;
        let from_balance = homomorphic::sub(&self.balance_of(from), delta, pk)?;
        let balances = if from == to {
            vec![(from.clone(), homomorphic::add(&from_balance, delta, pk)?)]
        } else {
            let to_balance = homomorphic::add(&self.balance_of(to), delta, pk)?;
            vec![(from.clone(), from_balance), (to.clone(), to_balance)]
        };
        Ok(StagedUpdate {
            ledger_id: self.id,
            generation: self.generation,
            balances,
            total_supply: None,
            event: LedgerEvent::Transfer {
                from: from.clone(),
                to: to.clone(),
            },
        })
    }

    /// Apply a staged update. Fails with `StaleUpdate`, leaving the ledger as is,
    /// if the update was staged on another ledger or before a later commit.
    pub fn commit(&mut self, staged: StagedUpdate<A>) -> Result<(), LedgerError> {
        let StagedUpdate {
            ledger_id,
            generation,
            balances,
            total_supply,
            event,
        } = staged;
        if ledger_id != self.id || generation != self.generation {
            return Err(LedgerError::StaleUpdate);
        }
        self.generation += 1;
        debug!(target: LOG_TARGET, "ledger commit: {:?}", event);
        self.events.push(event);
        for (account, balance) in balances {
            self.balances.insert(account.clone(), balance.clone());
            self.events.push(LedgerEvent::BalanceChanged { account, balance });
        }
        if let Some(total_supply) = total_supply {
            self.total_supply = total_supply;
        }
        Ok(())
    }

    pub fn mint(&mut self, caller: &A, to: &A, delta: &Ciphertext) -> Result<(), LedgerError> {
        let staged = self.stage_mint(caller, to, delta)?;
        self.commit(staged)
    }

    pub fn burn(&mut self, caller: &A, from: &A, delta: &Ciphertext) -> Result<(), LedgerError> {
        let staged = self.stage_burn(caller, from, delta)?;
        self.commit(staged)
    }

    pub fn transfer(&mut self, from: &A, to: &A, delta: &Ciphertext) -> Result<(), LedgerError> {
        let staged = self.stage_transfer(from, to, delta)?;
        self.commit(staged)
    }

    /// Publish that `caller` wants its balance revealed. Returns immediately; an
    /// answer may arrive later through `response_balance`, or never.
    pub fn request_balance(&mut self, caller: &A) {
        *self.pending_requests.entry(caller.clone()).or_insert(0) += 1;
        debug!(target: LOG_TARGET, "balance requested by {:?}", caller);
        self.events.push(LedgerEvent::RequestBalance {
            account: caller.clone(),
        });
    }

    /// Record and re-emit a disclosure. The payload is forwarded as is, nothing
    /// here can tell whether it encrypts the true balance.
    pub fn response_balance(&mut self, account: &A, sealed: SealedBalance) {
        if let Some(pending) = self.pending_requests.get_mut(account) {
            *pending -= 1;
            if *pending == 0 {
                self.pending_requests.remove(account);
            }
        }
        debug!(target: LOG_TARGET, "balance response for {:?}", account);
        self.responses.insert(account.clone(), sealed.clone());
        self.events.push(LedgerEvent::ResponseBalance {
            account: account.clone(),
            sealed,
        });
    }

    pub fn pending_requests(&self, account: &A) -> usize {
        self.pending_requests.get(account).copied().unwrap_or(0)
    }

    /// Accounts with at least one unanswered request.
    pub fn pending_accounts(&self) -> Vec<A> {
        self.pending_requests.keys().cloned().collect()
    }

    pub fn latest_response(&self, account: &A) -> Option<&SealedBalance> {
        self.responses.get(account)
    }

    pub fn events(&self) -> &[LedgerEvent<A>] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<LedgerEvent<A>> {
        std::mem::take(&mut self.events)
    }
}
