//! Thread-safe in-memory account store
//!
//! This module provides the `InMemoryAccountStore` struct, which manages account
//! balances using concurrent data structures to enable safe multi-threaded access.
//!
//! # Design
//!
//! The store uses `DashMap` (a concurrent HashMap) with fine-grained locking.
//! Withdrawals at different machines against different accounts never block
//! each other, while operations on the same account are serialized.
//!
//! # Thread Safety
//!
//! Every debit and credit runs while holding the account's entry lock, so the
//! sufficiency check and the balance update form one atomic step. Two
//! concurrent debits that together exceed the balance cannot both succeed.

use crate::core::traits::AccountStore;
use crate::types::{Account, AccountId, AtmError};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe account store backed by `DashMap`
#[derive(Debug)]
pub struct InMemoryAccountStore {
    /// Concurrent HashMap storing accounts by id
    accounts: DashMap<AccountId, Account>,

    /// Next id handed out by `create`
    next_id: AtomicU64,
}

impl InMemoryAccountStore {
    /// Create a new empty store
    ///
    /// Account ids start at 1.
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Apply a closure to an account while holding its entry lock
    ///
    /// The closure either returns an error, leaving the account untouched, or
    /// mutates it and returns a value.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no account has this id, or whatever error the
    /// closure returns.
    pub fn update<F, T>(&self, id: AccountId, f: F) -> Result<T, AtmError>
    where
        F: FnOnce(&mut Account) -> Result<T, AtmError>,
    {
        let mut entry = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| AtmError::account_not_found(id))?;
        f(entry.value_mut())
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn get_account(&self, id: AccountId) -> Result<Account, AtmError> {
        self.accounts
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AtmError::account_not_found(id))
    }

    fn create(&self, amount: Decimal) -> Result<Account, AtmError> {
        if amount.is_sign_negative() {
            return Err(AtmError::invalid_amount(amount));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let account = Account::new(id, amount);
        self.accounts.insert(id, account.clone());
        Ok(account)
    }

    fn debit(&self, id: AccountId, amount: Decimal) -> Result<Decimal, AtmError> {
        if amount.is_sign_negative() {
            return Err(AtmError::invalid_amount(amount));
        }
        self.update(id, |account| {
            if account.balance < amount {
                return Err(AtmError::insufficient_funds(id, account.balance, amount));
            }
            account.balance = account
                .balance
                .checked_sub(amount)
                .ok_or_else(|| AtmError::arithmetic_overflow("debit"))?;
            Ok(account.balance)
        })
    }

    fn credit(&self, id: AccountId, amount: Decimal) -> Result<Decimal, AtmError> {
        if amount.is_sign_negative() {
            return Err(AtmError::invalid_amount(amount));
        }
        self.update(id, |account| {
            account.balance = account
                .balance
                .checked_add(amount)
                .ok_or_else(|| AtmError::arithmetic_overflow("credit"))?;
            Ok(account.balance)
        })
    }
}
