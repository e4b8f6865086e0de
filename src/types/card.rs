//! Card-related types for the cash machine
//!
//! A card binds a card number and a PIN credential to exactly one account.

use std::fmt;

use constant_time_eq::constant_time_eq;

use super::account::AccountId;

/// Card identifier
pub type CardId = u64;

/// Opaque PIN credential produced by a [`PinHasher`](crate::core::traits::PinHasher)
///
/// The `Debug` implementation never prints the hash so that cards can be
/// logged freely.
#[derive(Clone, PartialEq, Eq)]
pub struct PinHash(String);

impl PinHash {
    /// Wrap an already computed hash
    pub fn new(hash: impl Into<String>) -> Self {
        PinHash(hash.into())
    }

    /// Raw hash bytes, used for comparison
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Compare two hashes in constant time
    pub fn matches(&self, other: &PinHash) -> bool {
        constant_time_eq(self.as_bytes(), other.as_bytes())
    }
}

impl fmt::Debug for PinHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PinHash(<redacted>)")
    }
}

/// Payment card as stored in the card store
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    /// Internal card id
    pub id: CardId,

    /// Printed card number, unique across the card store
    pub number: String,

    /// The account this card draws on
    pub account_id: AccountId,

    /// Salted hash of the card's PIN
    pub pin_hash: PinHash,
}

impl Card {
    /// Create a card bound to an account
    pub fn new(id: CardId, number: impl Into<String>, account_id: AccountId, pin_hash: PinHash) -> Self {
        Card {
            id,
            number: number.into(),
            account_id,
            pin_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_hash_matches_equal_hashes() {
        let a = PinHash::new("abcdef");
        let b = PinHash::new("abcdef");
        assert!(a.matches(&b));
    }

    #[test]
    fn test_pin_hash_rejects_different_hashes() {
        let a = PinHash::new("abcdef");
        assert!(!a.matches(&PinHash::new("abcdeg")));
        assert!(!a.matches(&PinHash::new("abc")));
        assert!(!a.matches(&PinHash::new("abcdefabcdef")));
        assert!(!a.matches(&PinHash::new("")));
    }

    #[test]
    fn test_pin_hash_debug_is_redacted() {
        let card = Card::new(1, "1111", 1, PinHash::new("secret-hash"));
        let printed = format!("{:?}", card);
        assert!(!printed.contains("secret-hash"));
        assert!(printed.contains("<redacted>"));
    }
}
