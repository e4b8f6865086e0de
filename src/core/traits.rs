//! Collaborator traits consumed by the cash machine
//!
//! The coordinator only talks to accounts, cards and PIN hashing through these
//! traits, so tests and front-ends can plug in their own implementations.

use rust_decimal::Decimal;

use crate::types::{Account, AccountId, AtmError, Card, CardId, PinHash};

/// Trait for account persistence and balance mutation
///
/// `debit` and `credit` must each be a single atomic check-and-update per
/// account: `debit` re-validates the balance under the same lock that applies
/// the change.
pub trait AccountStore: Send + Sync {
    /// Get a snapshot of an account
    fn get_account(&self, id: AccountId) -> Result<Account, AtmError>;

    /// Open a new account with the given opening balance
    fn create(&self, amount: Decimal) -> Result<Account, AtmError>;

    /// Subtract `amount` and return the new balance
    fn debit(&self, id: AccountId, amount: Decimal) -> Result<Decimal, AtmError>;

    /// Add `amount` and return the new balance
    fn credit(&self, id: AccountId, amount: Decimal) -> Result<Decimal, AtmError>;

    /// Current balance
    fn balance(&self, id: AccountId) -> Result<Decimal, AtmError> {
        self.get_account(id).map(|account| account.balance)
    }
}

/// Trait for card lookup and persistence
///
/// Both writes are single atomic operations per card number, so two callers
/// racing on the same number can never both win.
pub trait CardStore: Send + Sync {
    /// Find a card by its printed number
    fn get_by_number(&self, number: &str) -> Result<Card, AtmError>;

    /// Store a card under a number nobody holds yet
    ///
    /// Fails with `DuplicateCard` and leaves the existing card alone if the
    /// number is taken.
    fn insert_new(&self, card: Card) -> Result<(), AtmError>;

    /// Swap the card's PIN hash for `new_hash` if it still equals `current`
    ///
    /// Returns `Ok(false)` without changing anything on a mismatch, and
    /// `CardNotFound` if no card has this number.
    fn replace_pin_hash(
        &self,
        number: &str,
        current: &PinHash,
        new_hash: PinHash,
    ) -> Result<bool, AtmError>;

    /// Allocate an id for a new card
    fn next_id(&self) -> CardId;
}

/// Trait for PIN hashing
///
/// Implementations must be pure: the same PIN always yields the same hash.
pub trait PinHasher: Send + Sync {
    /// Hash a cleartext PIN
    fn hash(&self, pin: &str) -> PinHash;
}
