//! Thread-safe in-memory card store
//!
//! Cards are keyed by their printed number in a `DashMap`, so lookups for
//! different cards proceed in parallel and a PIN change on one card never
//! blocks another.

use crate::core::traits::CardStore;
use crate::types::{AtmError, Card, CardId, PinHash};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe card store backed by `DashMap`
#[derive(Debug)]
pub struct InMemoryCardStore {
    cards: DashMap<String, Card>,
    next_id: AtomicU64,
}

impl InMemoryCardStore {
    /// Create an empty store. Card ids start at 1.
    pub fn new() -> Self {
        Self {
            cards: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Whether a card with this number exists
    pub fn contains(&self, number: &str) -> bool {
        self.cards.contains_key(number)
    }

    /// Number of registered cards
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether no cards are registered
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for InMemoryCardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CardStore for InMemoryCardStore {
    fn get_by_number(&self, number: &str) -> Result<Card, AtmError> {
        self.cards
            .get(number)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AtmError::card_not_found(number))
    }

    fn insert_new(&self, card: Card) -> Result<(), AtmError> {
        match self.cards.entry(card.number.clone()) {
            Entry::Occupied(_) => Err(AtmError::duplicate_card(&card.number)),
            Entry::Vacant(slot) => {
                slot.insert(card);
                Ok(())
            }
        }
    }

    fn replace_pin_hash(
        &self,
        number: &str,
        current: &PinHash,
        new_hash: PinHash,
    ) -> Result<bool, AtmError> {
        let mut card = self
            .cards
            .get_mut(number)
            .ok_or_else(|| AtmError::card_not_found(number))?;
        if !card.pin_hash.matches(current) {
            return Ok(false);
        }
        card.pin_hash = new_hash;
        Ok(true)
    }

    fn next_id(&self) -> CardId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_insert_new_then_get_by_number() {
        let store = InMemoryCardStore::new();
        let card = Card::new(store.next_id(), "1111", 1, PinHash::new("h"));

        store.insert_new(card.clone()).unwrap();

        assert_eq!(store.get_by_number("1111").unwrap(), card);
        assert!(store.contains("1111"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_by_number_missing() {
        let store = InMemoryCardStore::new();
        assert_eq!(
            store.get_by_number("0000"),
            Err(AtmError::card_not_found("0000"))
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_new_keeps_existing_card() {
        let store = InMemoryCardStore::new();
        store.insert_new(Card::new(1, "1111", 1, PinHash::new("old"))).unwrap();

        let result = store.insert_new(Card::new(2, "1111", 2, PinHash::new("new")));

        assert_eq!(result, Err(AtmError::duplicate_card("1111")));
        let card = store.get_by_number("1111").unwrap();
        assert_eq!(card.account_id, 1);
        assert_eq!(card.pin_hash, PinHash::new("old"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_replace_pin_hash_requires_current_hash() {
        let store = InMemoryCardStore::new();
        store.insert_new(Card::new(1, "1111", 1, PinHash::new("old"))).unwrap();

        assert_eq!(
            store.replace_pin_hash("1111", &PinHash::new("wrong"), PinHash::new("new")),
            Ok(false)
        );
        assert_eq!(store.get_by_number("1111").unwrap().pin_hash, PinHash::new("old"));

        assert_eq!(
            store.replace_pin_hash("1111", &PinHash::new("old"), PinHash::new("new")),
            Ok(true)
        );
        assert_eq!(store.get_by_number("1111").unwrap().pin_hash, PinHash::new("new"));
    }

    #[test]
    fn test_replace_pin_hash_unknown_card() {
        let store = InMemoryCardStore::new();
        assert_eq!(
            store.replace_pin_hash("0000", &PinHash::new("a"), PinHash::new("b")),
            Err(AtmError::card_not_found("0000"))
        );
    }

    #[test]
    fn test_concurrent_insert_new_admits_one_card_per_number() {
        for _ in 0..200 {
            let store = Arc::new(InMemoryCardStore::new());
            let barrier = Arc::new(Barrier::new(2));

            let handles: Vec<_> = (1..=2)
                .map(|account_id| {
                    let store = Arc::clone(&store);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        let card = Card::new(account_id, "1111", account_id, PinHash::new("h"));
                        barrier.wait();
                        store.insert_new(card).is_ok()
                    })
                })
                .collect();

            let inserted = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|ok| *ok)
                .count();
            assert_eq!(inserted, 1);
            assert_eq!(store.len(), 1);
        }
    }

    #[test]
    fn test_next_id_is_unique() {
        let store = InMemoryCardStore::new();
        let a = store.next_id();
        let b = store.next_id();
        assert_ne!(a, b);
    }
}
