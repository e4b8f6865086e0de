//! Cash machine request orchestration
//!
//! This module provides the `CashMachine`, which coordinates authentication,
//! account balance changes and the physical note reservoir for a single
//! request at a time.
//!
//! The machine enforces the ordering rules that keep money and notes in step:
//! - A withdrawal checks funds and computes a breakdown before touching any
//!   shared state. The commit then reserves the notes and debits the account;
//!   a failed debit puts the reserved notes back before the error is returned.
//! - A deposit credits the account before restocking, and reverses the credit
//!   if the notes cannot be restocked.
//!
//! The machine holds no state of its own beyond handles to its collaborators,
//! so any number of machines may share the same stores and reservoir.

use crate::core::allocator::allocate;
use crate::core::auth::AuthenticationGate;
use crate::core::reservoir::CashReservoir;
use crate::core::traits::AccountStore;
use crate::types::{
    AccountId, AtmError, Denomination, NoteBundle, Operation, OutcomeDetail, SessionOutcome,
    SessionRequest,
};
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

/// Stages a request moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Resolving the card to an account
    Authenticating,
    /// Checking the amount against the balance
    Computing,
    /// Computing the note breakdown from a reservoir snapshot
    Reserving,
    /// Taking the notes and applying the balance change
    Committing,
    /// Finished successfully
    Done,
    /// Stopped with an error; reachable from any other stage
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Authenticating => "authenticating",
            Stage::Computing => "computing",
            Stage::Reserving => "reserving",
            Stage::Committing => "committing",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The cash machine service
///
/// Consumes an account store, an authentication gate and a reservoir. All
/// three are shared handles, so the machine is cheap to clone and `Send + Sync`.
#[derive(Clone)]
pub struct CashMachine {
    gate: AuthenticationGate,
    accounts: Arc<dyn AccountStore>,
    reservoir: Arc<CashReservoir>,
}

impl CashMachine {
    /// Create a machine over its collaborators
    pub fn new(
        gate: AuthenticationGate,
        accounts: Arc<dyn AccountStore>,
        reservoir: Arc<CashReservoir>,
    ) -> Self {
        Self {
            gate,
            accounts,
            reservoir,
        }
    }

    /// The reservoir this machine dispenses from
    pub fn reservoir(&self) -> &Arc<CashReservoir> {
        &self.reservoir
    }

    /// The authentication gate, for card administration
    pub fn gate(&self) -> &AuthenticationGate {
        &self.gate
    }

    /// Dispense `amount` and debit the card's account
    ///
    /// # Returns
    ///
    /// The dispensed notes, largest first.
    ///
    /// # Errors
    ///
    /// - `CardNotFound` / `InvalidCredentials` from authentication
    /// - `InvalidAmount` for a negative amount
    /// - `InsufficientFunds` if the balance is too low, checked before the
    ///   reservoir is touched and again atomically at debit time
    /// - `NoExactChange` if the reservoir cannot make the amount
    /// - `InsufficientStock` if the notes were taken concurrently
    ///
    /// On every error the balance and the reservoir are as they were.
    pub fn withdraw(
        &self,
        card_number: &str,
        pin: &str,
        amount: Decimal,
    ) -> Result<Vec<Denomination>, AtmError> {
        self.run_withdrawal(card_number, pin, amount)
            .inspect_err(|e| self.fail(card_number, e))
    }

    fn run_withdrawal(
        &self,
        card_number: &str,
        pin: &str,
        amount: Decimal,
    ) -> Result<Vec<Denomination>, AtmError> {
        self.enter(Stage::Authenticating, card_number);
        let account = self.gate.authenticate(card_number, pin)?;

        self.enter(Stage::Computing, card_number);
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(AtmError::invalid_amount(amount));
        }
        let balance = self.accounts.balance(account)?;
        if balance < amount {
            return Err(AtmError::insufficient_funds(account, balance, amount));
        }

        self.enter(Stage::Reserving, card_number);
        let notes = allocate(&self.reservoir.snapshot(), amount)?;

        self.enter(Stage::Committing, card_number);
        self.commit_withdrawal(account, amount, &notes)?;

        self.enter(Stage::Done, card_number);
        info!(
            "Dispensed {} in {} notes from account {}",
            amount,
            notes.len(),
            account
        );
        Ok(notes)
    }

    /// Take `notes` from the reservoir, then debit `amount`
    ///
    /// The notes may have been taken since the breakdown was computed, in
    /// which case this fails with `InsufficientStock` and changes nothing.
    fn commit_withdrawal(
        &self,
        account: AccountId,
        amount: Decimal,
        notes: &[Denomination],
    ) -> Result<(), AtmError> {
        self.reservoir.reserve(notes)?;

        if let Err(e) = self.accounts.debit(account, amount) {
            warn!(
                "Debit of {} from account {} failed after reserving notes, returning them: {}",
                amount, account, e
            );
            if let Err(restock_error) = self.reservoir.restock(notes) {
                error!(
                    "Could not return {} reserved notes to the reservoir: {}",
                    notes.len(),
                    restock_error
                );
            }
            return Err(e);
        }
        Ok(())
    }

    /// Accept notes and credit the card's account
    ///
    /// # Returns
    ///
    /// The new balance.
    ///
    /// # Errors
    ///
    /// - `CardNotFound` / `InvalidCredentials` from authentication
    /// - `UnsupportedDenomination` if the machine does not take a note
    /// - `ArithmeticOverflow` if the credit or restock would overflow
    pub fn deposit(
        &self,
        card_number: &str,
        pin: &str,
        notes: &NoteBundle,
    ) -> Result<Decimal, AtmError> {
        self.run_deposit(card_number, pin, notes)
            .inspect_err(|e| self.fail(card_number, e))
    }

    fn run_deposit(
        &self,
        card_number: &str,
        pin: &str,
        notes: &NoteBundle,
    ) -> Result<Decimal, AtmError> {
        self.enter(Stage::Authenticating, card_number);
        let account = self.gate.authenticate(card_number, pin)?;

        self.enter(Stage::Computing, card_number);
        let unsupported = notes
            .denominations()
            .find(|note| !self.reservoir.accepts(*note));
        if let Some(note) = unsupported {
            return Err(AtmError::unsupported_denomination(note.value()));
        }
        let amount = notes.total();

        self.enter(Stage::Committing, card_number);
        let balance = self.accounts.credit(account, amount)?;

        if let Err(e) = self.reservoir.restock_counts(notes.counts()) {
            warn!(
                "Restock of {} deposited notes failed, reversing credit on account {}: {}",
                notes.note_count(),
                account,
                e
            );
            if let Err(debit_error) = self.accounts.debit(account, amount) {
                error!(
                    "Could not reverse credit of {} on account {}: {}",
                    amount, account, debit_error
                );
            }
            return Err(e);
        }

        self.enter(Stage::Done, card_number);
        info!("Deposited {} to account {}", amount, account);
        Ok(balance)
    }

    /// Current balance of the card's account
    pub fn check_balance(&self, card_number: &str, pin: &str) -> Result<Decimal, AtmError> {
        self.enter(Stage::Authenticating, card_number);
        self.gate
            .authenticate(card_number, pin)
            .and_then(|account| self.accounts.balance(account))
            .inspect_err(|e| self.fail(card_number, e))
    }

    /// Change the card's PIN
    ///
    /// Returns `Ok(false)` without changing anything when `old_pin` is wrong.
    pub fn change_pin(
        &self,
        card_number: &str,
        old_pin: &str,
        new_pin: &str,
    ) -> Result<bool, AtmError> {
        self.gate.change_pin(card_number, old_pin, new_pin)
    }

    /// Serve one request from a session script
    ///
    /// Errors are captured in the outcome rather than returned, so a failed
    /// request never stops a session.
    pub fn serve(&self, request: &SessionRequest) -> SessionOutcome {
        let card = request.card.as_str();
        let pin = request.pin.as_str();

        let result = match &request.operation {
            Operation::Withdraw { amount } => self
                .withdraw(card, pin, *amount)
                .map(OutcomeDetail::Dispensed),
            Operation::Deposit { notes } => {
                self.deposit(card, pin, notes).map(OutcomeDetail::Balance)
            }
            Operation::Balance => self.check_balance(card, pin).map(OutcomeDetail::Balance),
            Operation::ChangePin { new_pin } => self
                .change_pin(card, pin, new_pin)
                .map(OutcomeDetail::PinChanged),
        };

        SessionOutcome {
            row: request.row,
            op: request.operation.op_type(),
            card: request.card.clone(),
            result,
        }
    }

    fn enter(&self, stage: Stage, card_number: &str) {
        debug!("Card {}: {}", card_number, stage);
    }

    fn fail(&self, card_number: &str, error: &AtmError) {
        debug!("Card {}: {} ({})", card_number, Stage::Failed, error);
    }
}

impl fmt::Debug for CashMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CashMachine")
            .field("reservoir", &self.reservoir)
            .finish_non_exhaustive()
    }
}
