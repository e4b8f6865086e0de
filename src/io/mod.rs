//! I/O module
//!
//! Handles CSV parsing and output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, outcome serialization)
//! - `card_loader` - Loading accounts and cards from the setup file
//! - `sync_reader` - Synchronous session reader with iterator interface
//! - `async_reader` - Asynchronous session reader with batch reading interface

pub mod async_reader;
pub mod card_loader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use card_loader::{load_cards, load_cards_from_reader};
pub use csv_format::{convert_session_record, write_outcomes_csv, SessionCsvRecord};
pub use sync_reader::SyncReader;
