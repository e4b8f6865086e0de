//! Card setup file loading
//!
//! Reads `card,pin,balance` rows, opening one account per row and issuing the
//! card for it. Unlike session scripts, a bad setup row stops the load.

use crate::core::auth::AuthenticationGate;
use crate::core::traits::AccountStore;
use crate::io::csv_format::{convert_card_record, CardCsvRecord};
use crate::types::AtmError;
use csv::{ReaderBuilder, Trim};
use log::info;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Load cards from a CSV file
///
/// # Returns
///
/// The number of cards issued.
///
/// # Errors
///
/// - `FileNotFound` / `IoError` if the file cannot be opened
/// - `ParseError` for an unreadable row or invalid balance, with its line
/// - `DuplicateCard` if a card number appears twice
pub fn load_cards(
    path: &Path,
    accounts: &dyn AccountStore,
    gate: &AuthenticationGate,
) -> Result<usize, AtmError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AtmError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => AtmError::from(e),
    })?;
    let issued = load_cards_from_reader(file, accounts, gate)?;
    info!("Loaded {} cards from {}", issued, path.display());
    Ok(issued)
}

/// Load cards from any reader producing the setup CSV
pub fn load_cards_from_reader<R: Read>(
    reader: R,
    accounts: &dyn AccountStore,
    gate: &AuthenticationGate,
) -> Result<usize, AtmError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut issued = 0;

    for (index, record) in reader.deserialize::<CardCsvRecord>().enumerate() {
        let record = record?;
        let (number, pin, balance) =
            convert_card_record(record).map_err(|message| AtmError::ParseError {
                // Header is line 1
                line: Some(index as u64 + 2),
                message,
            })?;

        let account = accounts.create(balance)?;
        gate.issue_card(&number, account.id, &pin)?;
        issued += 1;
    }

    Ok(issued)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::account_store::InMemoryAccountStore;
    use crate::core::card_store::InMemoryCardStore;
    use crate::core::pin::Sha256PinHasher;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn setup() -> (InMemoryAccountStore, AuthenticationGate) {
        let gate = AuthenticationGate::new(
            Arc::new(InMemoryCardStore::new()),
            Arc::new(Sha256PinHasher::new("loader")),
        );
        (InMemoryAccountStore::new(), gate)
    }

    #[test]
    fn test_load_cards_issues_one_card_per_row() {
        let (accounts, gate) = setup();
        let csv = "card,pin,balance\n1111,1234,42\n2222,0000,84.50\n";

        let issued = load_cards_from_reader(csv.as_bytes(), &accounts, &gate).unwrap();

        assert_eq!(issued, 2);
        let first = gate.authenticate("1111", "1234").unwrap();
        let second = gate.authenticate("2222", "0000").unwrap();
        assert_ne!(first, second);
        assert_eq!(accounts.balance(first).unwrap(), Decimal::from(42));
        assert_eq!(accounts.balance(second).unwrap(), Decimal::new(8450, 2));
    }

    #[test]
    fn test_load_cards_rejects_duplicate_number() {
        let (accounts, gate) = setup();
        let csv = "card,pin,balance\n1111,1234,42\n1111,9999,10\n";

        let err = load_cards_from_reader(csv.as_bytes(), &accounts, &gate).unwrap_err();

        assert_eq!(err, AtmError::duplicate_card("1111"));
    }

    #[test]
    fn test_load_cards_rejects_bad_balance() {
        let (accounts, gate) = setup();
        let csv = "card,pin,balance\n1111,1234,lots\n";

        let err = load_cards_from_reader(csv.as_bytes(), &accounts, &gate).unwrap_err();

        match err {
            AtmError::ParseError { line, message } => {
                assert_eq!(line, Some(2));
                assert!(message.contains("Invalid amount"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_load_cards_missing_column() {
        let (accounts, gate) = setup();
        let csv = "card,pin,balance\n1111,1234\n";

        let err = load_cards_from_reader(csv.as_bytes(), &accounts, &gate).unwrap_err();

        assert!(matches!(err, AtmError::ParseError { .. }), "unexpected error: {}", err);
    }

    #[test]
    fn test_load_cards_missing_file() {
        let (accounts, gate) = setup();
        let err = load_cards(Path::new("no_such_cards.csv"), &accounts, &gate).unwrap_err();
        assert_eq!(
            err,
            AtmError::FileNotFound {
                path: "no_such_cards.csv".to_string()
            }
        );
    }
}
