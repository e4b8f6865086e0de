//! Core business logic module
//!
//! This module contains the cash machine components:
//! - `traits` - Collaborator abstractions (accounts, cards, PIN hashing)
//! - `account_store` - Concurrent in-memory account store
//! - `card_store` - Concurrent in-memory card store
//! - `pin` - Salted SHA-256 PIN hashing
//! - `reservoir` - The machine's banknote reservoir
//! - `allocator` - Note breakdown for a requested amount
//! - `auth` - Card and PIN authentication
//! - `machine` - Request orchestration with compensation on failure
//! - `batch_processor` - Concurrent serving of request batches, partitioned by card

pub mod account_store;
pub mod allocator;
pub mod auth;
pub mod batch_processor;
pub mod card_store;
pub mod machine;
pub mod pin;
pub mod reservoir;
pub mod traits;

pub use account_store::InMemoryAccountStore;
pub use allocator::allocate;
pub use auth::AuthenticationGate;
pub use batch_processor::BatchProcessor;
pub use card_store::InMemoryCardStore;
pub use machine::{CashMachine, Stage};
pub use pin::Sha256PinHasher;
pub use reservoir::CashReservoir;
pub use traits::{AccountStore, CardStore, PinHasher};
