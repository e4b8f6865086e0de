//! Synchronous processing strategy
//!
//! Serves a session script one request at a time, in file order. Delegates:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Request handling to `CashMachine::serve`
//! - CSV output to `csv_format::write_outcomes_csv`

use crate::core::CashMachine;
use crate::io::csv_format::write_outcomes_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::ProcessingStrategy;
use log::warn;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use cash_machine::core::{
///     AuthenticationGate, CashMachine, CashReservoir, InMemoryAccountStore, InMemoryCardStore,
///     Sha256PinHasher,
/// };
/// use cash_machine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let gate = AuthenticationGate::new(
///     Arc::new(InMemoryCardStore::new()),
///     Arc::new(Sha256PinHasher::with_random_salt()),
/// );
/// let machine = CashMachine::new(
///     gate,
///     Arc::new(InMemoryAccountStore::new()),
///     Arc::new(CashReservoir::standard()),
/// );
///
/// SyncProcessingStrategy
///     .process(Arc::new(machine), Path::new("session.csv"), &mut std::io::stdout())
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(
        &self,
        machine: Arc<CashMachine>,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<(), String> {
        let reader = SyncReader::new(input_path)?;
        let mut outcomes = Vec::new();

        for result in reader {
            match result {
                Ok(request) => outcomes.push(machine.serve(&request)),
                Err(e) => warn!("Skipping session row: {}", e),
            }
        }

        write_outcomes_csv(&outcomes, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        AccountStore, AuthenticationGate, CashReservoir, InMemoryAccountStore, InMemoryCardStore,
        Sha256PinHasher,
    };
    use crate::types::Denomination;
    use rust_decimal::Decimal;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn machine(balance: i64) -> (Arc<CashMachine>, Arc<InMemoryAccountStore>) {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let gate = AuthenticationGate::new(
            Arc::new(InMemoryCardStore::new()),
            Arc::new(Sha256PinHasher::new("sync")),
        );
        let account = accounts.create(Decimal::from(balance)).unwrap();
        gate.issue_card("1111", account.id, "1234").unwrap();
        let reservoir = CashReservoir::with_notes(Denomination::STANDARD.iter().map(|d| (*d, 10)));
        let machine = CashMachine::new(gate, accounts.clone(), Arc::new(reservoir));
        (Arc::new(machine), accounts)
    }

    #[test]
    fn test_sync_strategy_serves_session() {
        let (machine, _) = machine(10_000);
        let file = create_temp_csv(
            "op,card,pin,amount,notes,new_pin\n\
             withdraw,1111,1234,6600,,\n\
             balance,1111,1234,,,\n",
        );
        let mut output = Vec::new();

        SyncProcessingStrategy
            .process(machine, file.path(), &mut output)
            .unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "row,op,card,status,detail\n\
             1,withdraw,1111,ok,5000 1000 500 100\n\
             2,balance,1111,ok,3400\n"
        );
    }

    #[test]
    fn test_sync_strategy_skips_bad_rows_and_reports_failures() {
        let (machine, accounts) = machine(100);
        let file = create_temp_csv(
            "op,card,pin,amount,notes,new_pin\n\
             withdraw,1111,1234,not-a-number,,\n\
             withdraw,1111,0000,100,,\n\
             withdraw,1111,1234,100,,\n",
        );
        let mut output = Vec::new();

        SyncProcessingStrategy
            .process(machine, file.path(), &mut output)
            .unwrap();

        let output = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "2,withdraw,1111,error,Invalid credentials for card 1111");
        assert_eq!(lines[2], "3,withdraw,1111,ok,100");
        assert!(accounts.balance(1).unwrap().is_zero());
    }

    #[test]
    fn test_sync_strategy_handles_missing_file() {
        let (machine, _) = machine(0);
        let mut output = Vec::new();

        let result = SyncProcessingStrategy.process(machine, Path::new("nonexistent.csv"), &mut output);

        assert!(result.unwrap_err().contains("Failed to open file"));
    }
}
