//! CSV format handling for session scripts, card setup and outcome reports
//!
//! This module centralizes all CSV format concerns, providing:
//! - SessionCsvRecord / CardCsvRecord structures for deserialization
//! - Conversion from CSV records to domain types
//! - Outcome report serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{AtmError, Denomination, NoteBundle, Operation, SessionOutcome, SessionRequest};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for session scripts
///
/// Columns: op, card, pin, amount, notes, new_pin. Only the columns an
/// operation needs have to be filled in.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SessionCsvRecord {
    pub op: String,
    pub card: String,
    pub pin: String,
    pub amount: Option<String>,
    pub notes: Option<String>,
    pub new_pin: Option<String>,
}

/// CSV record structure for the card setup file
///
/// Columns: card, pin, balance. Each row opens one account and issues one card.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CardCsvRecord {
    pub card: String,
    pub pin: String,
    pub balance: String,
}

fn non_empty(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse a decimal amount field
pub fn parse_amount(value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|_| format!("Invalid amount '{}'", value))
}

/// Most notes a single deposit row may carry
pub const MAX_NOTES_PER_DEPOSIT: u64 = 10_000;

/// Parse a list of notes
///
/// Notes are separated by whitespace. Each token is a face value, optionally
/// followed by `x<count>`: `"5000 1000x2 100"` is one 5000, two 1000 and one
/// 100 note. A row holding more than [`MAX_NOTES_PER_DEPOSIT`] notes is rejected.
pub fn parse_notes(value: &str) -> Result<NoteBundle, String> {
    let mut bundle = NoteBundle::default();

    for token in value.split_whitespace() {
        let (face, count) = match token.split_once(['x', 'X']) {
            Some((face, count)) => (face, count),
            None => (token, "1"),
        };
        let face: u32 = face
            .parse()
            .map_err(|_| format!("Invalid note '{}'", token))?;
        let count: u32 = count
            .parse()
            .map_err(|_| format!("Invalid note count '{}'", token))?;
        let denomination = Denomination::try_new(face).map_err(|e| e.to_string())?;
        bundle
            .add(denomination, count)
            .map_err(|e| e.to_string())?;
        if bundle.note_count() > MAX_NOTES_PER_DEPOSIT {
            return Err(format!(
                "Too many notes in '{}' (at most {})",
                value, MAX_NOTES_PER_DEPOSIT
            ));
        }
    }

    Ok(bundle)
}

/// Convert a SessionCsvRecord to a SessionRequest
///
/// This function:
/// - Parses the operation name (case insensitive)
/// - Parses the operation's payload column
/// - Validates that the payload needed by the operation is present
///
/// # Arguments
///
/// * `csv_record` - The deserialized CSV record
/// * `row` - 1-based row number of the record
///
/// # Returns
///
/// Result containing either:
/// - Ok(SessionRequest) - Successfully converted record
/// - Err(String) - Error message describing the conversion failure
pub fn convert_session_record(
    csv_record: SessionCsvRecord,
    row: u64,
) -> Result<SessionRequest, String> {
    let operation = match csv_record.op.to_lowercase().as_str() {
        "withdraw" => {
            let amount = non_empty(csv_record.amount)
                .ok_or_else(|| format!("withdraw on row {} requires an amount", row))?;
            Operation::Withdraw {
                amount: parse_amount(&amount)?,
            }
        }
        "deposit" => {
            let notes = non_empty(csv_record.notes)
                .ok_or_else(|| format!("deposit on row {} requires notes", row))?;
            Operation::Deposit {
                notes: parse_notes(&notes)?,
            }
        }
        "balance" => Operation::Balance,
        "change_pin" => {
            let new_pin = non_empty(csv_record.new_pin)
                .ok_or_else(|| format!("change_pin on row {} requires a new_pin", row))?;
            Operation::ChangePin { new_pin }
        }
        _ => {
            return Err(format!(
                "Invalid operation: '{}' on row {}",
                csv_record.op, row
            ))
        }
    };

    Ok(SessionRequest {
        row,
        card: csv_record.card,
        pin: csv_record.pin,
        operation,
    })
}

/// Convert a CardCsvRecord into `(card number, pin, opening balance)`
pub fn convert_card_record(csv_record: CardCsvRecord) -> Result<(String, String, Decimal), String> {
    let balance = parse_amount(&csv_record.balance)?;
    if balance.is_sign_negative() && !balance.is_zero() {
        return Err(AtmError::invalid_amount(balance).to_string());
    }
    Ok((csv_record.card, csv_record.pin, balance))
}

/// Write session outcomes in CSV format
///
/// Writes outcomes with columns: row, op, card, status, detail.
/// Outcomes are sorted by row for deterministic output.
///
/// # Arguments
///
/// * `outcomes` - Slice of outcomes to write
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_outcomes_csv(outcomes: &[SessionOutcome], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["row", "op", "card", "status", "detail"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted: Vec<&SessionOutcome> = outcomes.iter().collect();
    sorted.sort_by_key(|outcome| outcome.row);

    for outcome in sorted {
        let (status, detail) = match &outcome.result {
            Ok(detail) => ("ok", detail.to_string()),
            Err(e) => ("error", e.to_string()),
        };
        writer
            .write_record(&[
                outcome.row.to_string(),
                outcome.op.to_string(),
                outcome.card.clone(),
                status.to_string(),
                detail,
            ])
            .map_err(|e| format!("Failed to write outcome record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
