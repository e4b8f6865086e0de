//! Error types for the cash machine
//!
//! This module defines all error types that can occur while serving a request.
//! Errors are designed to be descriptive and user-friendly for console output.
//!
//! # Error Categories
//!
//! - **Authentication Errors**: Unknown card, wrong PIN
//! - **Account Errors**: Unknown account, insufficient funds, overflow
//! - **Cash Errors**: No exact change, insufficient stock, unsupported notes
//! - **Front-end Errors**: File not found, I/O failures, malformed CSV

use rust_decimal::Decimal;
use thiserror::Error;

use super::account::AccountId;
use super::denomination::Denomination;

/// Main error type for the cash machine
///
/// Every variant is reported synchronously to the caller. None of them is
/// retried automatically; retry policy belongs to the front-end.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AtmError {
    /// No card is registered under the given number
    #[error("Card {number} not found")]
    CardNotFound {
        /// The card number that was looked up
        number: String,
    },

    /// The PIN does not match the stored credential
    #[error("Invalid credentials for card {number}")]
    InvalidCredentials {
        /// The card number that failed authentication
        number: String,
    },

    /// A card with this number is already registered
    #[error("Card {number} already exists")]
    DuplicateCard {
        /// The duplicated card number
        number: String,
    },

    /// No account exists with the given id
    #[error("Account {account} not found")]
    AccountNotFound {
        /// The account id that was looked up
        account: AccountId,
    },

    /// The account balance cannot cover the requested amount
    ///
    /// The balance is left unchanged.
    #[error("Not enough money on account {account}: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Account id
        account: AccountId,
        /// Balance at the time of the check
        available: Decimal,
        /// Requested amount
        requested: Decimal,
    },

    /// No combination of the available notes sums to the requested amount
    #[error("No exact change for {amount}")]
    NoExactChange {
        /// Requested amount
        amount: Decimal,
    },

    /// The reservoir holds fewer notes of a denomination than requested
    ///
    /// Distinct from `NoExactChange`: the breakdown exists, but the notes
    /// were taken by someone else before they could be reserved.
    #[error("Insufficient stock of {denomination} notes: available {available}, requested {requested}")]
    InsufficientStock {
        /// Denomination that ran short
        denomination: Denomination,
        /// Notes available
        available: u32,
        /// Notes requested
        requested: u32,
    },

    /// The machine does not handle notes of this face value
    #[error("Unsupported denomination {value}")]
    UnsupportedDenomination {
        /// The rejected face value
        value: u32,
    },

    /// Negative or otherwise malformed amount
    #[error("Invalid amount '{amount}'")]
    InvalidAmount {
        /// The invalid amount as text
        amount: String,
    },

    /// Arithmetic overflow would occur
    ///
    /// The operation is rejected to maintain integrity.
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
    },

    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl From<std::io::Error> for AtmError {
    fn from(error: std::io::Error) -> Self {
        AtmError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for AtmError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        AtmError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl AtmError {
    /// Create a CardNotFound error
    pub fn card_not_found(number: &str) -> Self {
        AtmError::CardNotFound {
            number: number.to_string(),
        }
    }

    /// Create an InvalidCredentials error
    pub fn invalid_credentials(number: &str) -> Self {
        AtmError::InvalidCredentials {
            number: number.to_string(),
        }
    }

    /// Create a DuplicateCard error
    pub fn duplicate_card(number: &str) -> Self {
        AtmError::DuplicateCard {
            number: number.to_string(),
        }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(account: AccountId) -> Self {
        AtmError::AccountNotFound { account }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: AccountId, available: Decimal, requested: Decimal) -> Self {
        AtmError::InsufficientFunds {
            account,
            available,
            requested,
        }
    }

    /// Create a NoExactChange error
    pub fn no_exact_change(amount: Decimal) -> Self {
        AtmError::NoExactChange { amount }
    }

    /// Create an InsufficientStock error
    pub fn insufficient_stock(denomination: Denomination, available: u32, requested: u32) -> Self {
        AtmError::InsufficientStock {
            denomination,
            available,
            requested,
        }
    }

    /// Create an UnsupportedDenomination error
    pub fn unsupported_denomination(value: u32) -> Self {
        AtmError::UnsupportedDenomination { value }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: impl ToString) -> Self {
        AtmError::InvalidAmount {
            amount: amount.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str) -> Self {
        AtmError::ArithmeticOverflow {
            operation: operation.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::card_not_found(AtmError::card_not_found("1111"), "Card 1111 not found")]
    #[case::invalid_credentials(
        AtmError::invalid_credentials("1111"),
        "Invalid credentials for card 1111"
    )]
    #[case::insufficient_funds(
        AtmError::insufficient_funds(1, Decimal::ONE, Decimal::TWO),
        "Not enough money on account 1: available 1, requested 2"
    )]
    #[case::no_exact_change(AtmError::no_exact_change(Decimal::new(150, 0)), "No exact change for 150")]
    #[case::insufficient_stock(
        AtmError::insufficient_stock(Denomination::new(500), 1, 3),
        "Insufficient stock of 500 notes: available 1, requested 3"
    )]
    #[case::unsupported_denomination(
        AtmError::unsupported_denomination(200),
        "Unsupported denomination 200"
    )]
    #[case::parse_error_with_line(
        AtmError::ParseError { line: Some(42), message: "Invalid field".to_string() },
        "CSV parse error at line 42: Invalid field"
    )]
    #[case::parse_error_without_line(
        AtmError::ParseError { line: None, message: "Invalid field".to_string() },
        "CSV parse error: Invalid field"
    )]
    fn test_error_display(#[case] error: AtmError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_insufficient_funds_mentions_not_enough_money() {
        let error = AtmError::insufficient_funds(7, Decimal::ONE, Decimal::TWO);
        assert!(error.to_string().starts_with("Not enough money"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: AtmError = io_error.into();
        assert!(matches!(error, AtmError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
