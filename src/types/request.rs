//! Request types for the session front-end
//!
//! Each row of a session script becomes one [`SessionRequest`], which maps onto
//! exactly one of the four cash machine operations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::denomination::{Denomination, NoteBundle};
use super::error::AtmError;

/// Operations a customer can perform at the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    /// Dispense cash and debit the account
    Withdraw,

    /// Accept notes and credit the account
    Deposit,

    /// Report the current balance
    Balance,

    /// Replace the card's PIN
    ChangePin,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationType::Withdraw => "withdraw",
            OperationType::Deposit => "deposit",
            OperationType::Balance => "balance",
            OperationType::ChangePin => "change_pin",
        };
        f.write_str(name)
    }
}

/// Operation-specific payload
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Withdraw an amount
    Withdraw { amount: Decimal },

    /// Deposit a bundle of notes
    Deposit { notes: NoteBundle },

    /// Check the balance
    Balance,

    /// Change the PIN to `new_pin`
    ChangePin { new_pin: String },
}

impl Operation {
    /// The kind of operation
    pub fn op_type(&self) -> OperationType {
        match self {
            Operation::Withdraw { .. } => OperationType::Withdraw,
            Operation::Deposit { .. } => OperationType::Deposit,
            Operation::Balance => OperationType::Balance,
            Operation::ChangePin { .. } => OperationType::ChangePin,
        }
    }
}

/// One request read from a session script
#[derive(Clone, PartialEq)]
pub struct SessionRequest {
    /// 1-based position in the script, used to order the outcome report
    pub row: u64,

    /// Card number presented at the machine
    pub card: String,

    /// PIN typed by the customer
    pub pin: String,

    /// What the customer asked for
    pub operation: Operation,
}

// PINs must not end up in logs, so Debug is written by hand.
impl fmt::Debug for SessionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operation = match &self.operation {
            Operation::ChangePin { .. } => "ChangePin { .. }".to_string(),
            other => format!("{:?}", other),
        };
        f.debug_struct("SessionRequest")
            .field("row", &self.row)
            .field("card", &self.card)
            .field("operation", &operation)
            .finish_non_exhaustive()
    }
}

/// Successful result of a request
#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeDetail {
    /// Notes handed out by a withdrawal, largest first
    Dispensed(Vec<Denomination>),

    /// Balance after a deposit or balance check
    Balance(Decimal),

    /// Whether a PIN change was accepted
    PinChanged(bool),
}

impl fmt::Display for OutcomeDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeDetail::Dispensed(notes) => {
                let notes: Vec<String> = notes.iter().map(|n| n.to_string()).collect();
                f.write_str(&notes.join(" "))
            }
            OutcomeDetail::Balance(balance) => write!(f, "{}", balance),
            OutcomeDetail::PinChanged(true) => f.write_str("changed"),
            OutcomeDetail::PinChanged(false) => f.write_str("rejected"),
        }
    }
}

/// Result of serving one session request
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    /// Row of the request in the session script
    pub row: u64,

    /// Operation that was requested
    pub op: OperationType,

    /// Card the request was made with
    pub card: String,

    /// What happened
    pub result: Result<OutcomeDetail, AtmError>,
}
