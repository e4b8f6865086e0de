//! End-to-end integration tests
//!
//! These tests validate the complete session pipeline using predefined CSV
//! fixtures. Each test:
//! 1. Loads cards.csv into fresh account and card stores
//! 2. Loads the reservoir from stock.txt, or the default stock when absent
//! 3. Serves input.csv through the selected strategy
//! 4. Compares the outcome report with expected.csv
//!
//! Test fixtures are located in tests/fixtures/ and cover:
//! - Happy path scenarios
//! - Authentication failures and PIN changes
//! - Insufficient funds and missing exact change
//! - Deposits, including unsupported notes
//! - Malformed rows
//! - Several cards interleaved in one session
//!
//! Each test is run twice: once with the synchronous strategy and once with the async one.

#[cfg(test)]
mod tests {
    use cash_machine::cli::{parse_stock, StrategyType, DEFAULT_STOCK};
    use cash_machine::core::{
        AuthenticationGate, CashMachine, CashReservoir, InMemoryAccountStore, InMemoryCardStore,
        Sha256PinHasher,
    };
    use cash_machine::io::load_cards;
    use cash_machine::strategy::{create_strategy, BatchConfig};
    use rstest::rstest;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    /// Build a machine from a fixture's card setup and stock
    fn machine_for(fixture_dir: &str) -> Arc<CashMachine> {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let gate = AuthenticationGate::new(
            Arc::new(InMemoryCardStore::new()),
            Arc::new(Sha256PinHasher::new("e2e")),
        );
        let cards_path = format!("{}/cards.csv", fixture_dir);
        load_cards(Path::new(&cards_path), accounts.as_ref(), &gate)
            .unwrap_or_else(|e| panic!("Failed to load {}: {}", cards_path, e));

        let stock_path = format!("{}/stock.txt", fixture_dir);
        let stock = fs::read_to_string(&stock_path).unwrap_or_else(|_| DEFAULT_STOCK.to_string());
        let stock = parse_stock(stock.trim())
            .unwrap_or_else(|e| panic!("Invalid stock in {}: {}", stock_path, e));
        let reservoir = Arc::new(CashReservoir::with_notes(stock.0));

        Arc::new(CashMachine::new(gate, accounts, reservoir))
    }

    /// Run a fixture and compare the outcome report with expected.csv
    ///
    /// # Panics
    ///
    /// Panics if a fixture file cannot be read or the output does not match.
    fn run_test_fixture(fixture_name: &str, strategy_type: StrategyType) {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let input_path = format!("{}/input.csv", fixture_dir);
        let expected_path = format!("{}/expected.csv", fixture_dir);

        assert!(
            Path::new(&input_path).exists(),
            "Input file not found: {}",
            input_path
        );
        assert!(
            Path::new(&expected_path).exists(),
            "Expected file not found: {}",
            expected_path
        );

        // Small batches so multi-row fixtures span several of them
        let config = matches!(strategy_type, StrategyType::Async).then(|| BatchConfig::new(3, 4));
        let strategy = create_strategy(strategy_type.clone(), config);

        let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");

        strategy
            .process(machine_for(&fixture_dir), Path::new(&input_path), &mut temp_output)
            .unwrap_or_else(|e| panic!("Failed to process session: {}", e));

        temp_output.flush().expect("Failed to flush temp file");

        let actual_output = fs::read_to_string(temp_output.path())
            .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e));
        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (strategy: {:?})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, strategy_type, actual_output, expected_output
        );
    }

    /// End-to-end test for all fixtures with both strategies
    #[rstest]
    #[case("happy_path")]
    #[case("authentication")]
    #[case("insufficient_funds")]
    #[case("no_exact_change")]
    #[case("deposits")]
    #[case("malformed_data")]
    #[case("multiple_cards")]
    fn test_fixtures(
        #[case] fixture: &str,
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        run_test_fixture(fixture, strategy);
    }
}
