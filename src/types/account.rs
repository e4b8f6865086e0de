//! Account-related types for the cash machine
//!
//! This module defines the Account structure held by the account store.

use rust_decimal::Decimal;

/// Account identifier
pub type AccountId = u64;

/// Bank account linked to one or more cards
///
/// The balance never drops below zero after a committed operation; all
/// mutation goes through the account store's validated debit/credit.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The account id
    pub id: AccountId,

    /// Current balance in minor currency units
    pub balance: Decimal,
}

impl Account {
    /// Create an account with the given opening balance
    pub fn new(id: AccountId, balance: Decimal) -> Self {
        Account { id, balance }
    }
}
