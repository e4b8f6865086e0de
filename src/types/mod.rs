//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account-related types
//! - `card`: Cards and PIN credentials
//! - `denomination`: Banknote face values and deposited note bundles
//! - `request`: Session requests read by the front-end
//! - `error`: Error types for the cash machine

pub mod account;
pub mod card;
pub mod denomination;
pub mod error;
pub mod request;

pub use account::{Account, AccountId};
pub use card::{Card, CardId, PinHash};
pub use denomination::{count_notes, Denomination, NoteBundle};
pub use error::AtmError;
pub use request::{Operation, OperationType, OutcomeDetail, SessionOutcome, SessionRequest};
