//! The public, plaintext token the bridge takes custody of.

use std::collections::HashMap;
use std::hash::Hash;

use crate::config::TokenMetadata;
use crate::TokenError;

/// A standard fungible token ledger, as far as the bridge needs one.
pub trait PublicToken<A> {
    fn balance_of(&self, account: &A) -> u128;

    /// Move `amount` from `from` to `to` on `from`'s own authority.
    fn transfer(&mut self, from: &A, to: &A, amount: u128) -> Result<(), TokenError>;

    /// Move `amount` from `from` to `to` on `spender`'s allowance.
    fn transfer_from(&mut self, spender: &A, from: &A, to: &A, amount: u128)
        -> Result<(), TokenError>;
}

/// In-memory token with allowances.
#[derive(Clone, Debug)]
pub struct MemoryToken<A: Eq + Hash> {
    metadata: TokenMetadata,
    balances: HashMap<A, u128>,
    allowances: HashMap<(A, A), u128>,
    total_supply: u128,
}

impl<A: Clone + Eq + Hash> MemoryToken<A> {
    pub fn new(metadata: TokenMetadata) -> Self {
        MemoryToken {
            metadata,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: 0,
        }
    }

    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn mint(&mut self, to: &A, amount: u128) -> Result<(), TokenError> {
        let total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.total_supply = total_supply;
        self.balances.insert(to.clone(), balance);
        Ok(())
    }

    pub fn approve(&mut self, owner: &A, spender: &A, amount: u128) {
        self.allowances
            .insert((owner.clone(), spender.clone()), amount);
    }

    pub fn allowance(&self, owner: &A, spender: &A) -> u128 {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn move_balance(&mut self, from: &A, to: &A, amount: u128) -> Result<(), TokenError> {
        let from_balance = self
            .balance_of(from)
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance)?;
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.balances.insert(from.clone(), from_balance);
        self.balances.insert(to.clone(), to_balance);
        Ok(())
    }
}

impl<A: Clone + Eq + Hash> PublicToken<A> for MemoryToken<A> {
    fn balance_of(&self, account: &A) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn transfer(&mut self, from: &A, to: &A, amount: u128) -> Result<(), TokenError> {
        self.move_balance(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &A,
        from: &A,
        to: &A,
        amount: u128,
    ) -> Result<(), TokenError> {
        let allowance = self
            .allowance(from, spender)
            .checked_sub(amount)
            .ok_or(TokenError::AllowanceExceeded)?;
        if self.balance_of(from) < amount {
            return Err(TokenError::InsufficientBalance);
        }
        self.move_balance(from, to, amount)?;
        self.allowances
            .insert((from.clone(), spender.clone()), allowance);
        Ok(())
    }
}
