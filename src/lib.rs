//! Cash Machine Library
//! # Overview
//!
//! This library implements a cash machine: card and PIN authentication,
//! withdrawals dispensed from a finite banknote reservoir, deposits of notes,
//! balance checks and PIN changes. Any number of machines may share the same
//! account store, card store and reservoir.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, Card, Denomination, AtmError, etc.)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::reservoir`] - Banknote counts per denomination
//!   - [`core::allocator`] - Note breakdown for a requested amount
//!   - [`core::auth`] - Card and PIN verification
//!   - [`core::machine`] - Request orchestration with compensation on failure
//! - [`io`] - CSV session scripts, card setup and outcome reports
//! - [`strategy`] - Sequential and concurrent session processing
//!
//! # Money and notes
//!
//! A withdrawal either dispenses notes summing exactly to the amount and
//! debits the account by that amount, or changes nothing. A deposit credits
//! the account by the face value of the inserted notes and adds them to the
//! reservoir, or changes nothing.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{
    allocate, AccountStore, AuthenticationGate, CardStore, CashMachine, CashReservoir,
    InMemoryAccountStore, InMemoryCardStore, PinHasher, Sha256PinHasher,
};
pub use io::write_outcomes_csv;
pub use types::{
    Account, AccountId, AtmError, Card, Denomination, NoteBundle, Operation, SessionOutcome,
    SessionRequest,
};
