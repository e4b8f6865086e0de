//! Card and PIN authentication
//!
//! The gate resolves a card number and PIN to the linked account, and owns
//! the only path that may change a card's stored credential.

use crate::core::traits::{CardStore, PinHasher};
use crate::types::{AccountId, AtmError, Card};
use log::{debug, info};
use std::sync::Arc;

/// Verifies card/PIN pairs against the card store
#[derive(Clone)]
pub struct AuthenticationGate {
    cards: Arc<dyn CardStore>,
    hasher: Arc<dyn PinHasher>,
}

impl AuthenticationGate {
    /// Create a gate over a card store and PIN hasher
    pub fn new(cards: Arc<dyn CardStore>, hasher: Arc<dyn PinHasher>) -> Self {
        Self { cards, hasher }
    }

    /// Register a new card for an existing account
    ///
    /// # Errors
    ///
    /// `DuplicateCard` if the number is already taken, including by a
    /// concurrent call for the same number.
    pub fn issue_card(
        &self,
        number: &str,
        account_id: AccountId,
        pin: &str,
    ) -> Result<Card, AtmError> {
        let card = Card::new(self.cards.next_id(), number, account_id, self.hasher.hash(pin));
        self.cards.insert_new(card.clone())?;
        info!("Issued card {} for account {}", number, account_id);
        Ok(card)
    }

    /// Resolve a card number and PIN to the linked account
    ///
    /// # Errors
    ///
    /// - `CardNotFound` if no card has this number
    /// - `InvalidCredentials` if the PIN does not match
    pub fn authenticate(&self, card_number: &str, pin: &str) -> Result<AccountId, AtmError> {
        self.verify(card_number, pin).map(|card| card.account_id)
    }

    /// Replace a card's PIN
    ///
    /// # Returns
    ///
    /// * `Ok(true)` if `old_pin` matched and the new PIN was stored
    /// * `Ok(false)` if `old_pin` did not match; nothing is changed
    ///
    /// The check and the swap happen in one store call, so of two changes
    /// racing from the same old PIN at most one succeeds.
    ///
    /// # Errors
    ///
    /// `CardNotFound` if no card has this number, or a store failure.
    pub fn change_pin(
        &self,
        card_number: &str,
        old_pin: &str,
        new_pin: &str,
    ) -> Result<bool, AtmError> {
        let changed = self.cards.replace_pin_hash(
            card_number,
            &self.hasher.hash(old_pin),
            self.hasher.hash(new_pin),
        )?;
        if changed {
            info!("PIN changed for card {}", card_number);
        } else {
            debug!("PIN change rejected for card {}", card_number);
        }
        Ok(changed)
    }

    fn verify(&self, card_number: &str, pin: &str) -> Result<Card, AtmError> {
        let card = self.cards.get_by_number(card_number)?;
        if card.pin_hash.matches(&self.hasher.hash(pin)) {
            Ok(card)
        } else {
            Err(AtmError::invalid_credentials(card_number))
        }
    }
}

impl std::fmt::Debug for AuthenticationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationGate").finish_non_exhaustive()
    }
}
