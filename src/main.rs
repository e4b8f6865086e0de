//! Cash Machine CLI
//!
//! Serves a scripted cash machine session from a CSV file.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --cards cards.csv session.csv > outcomes.csv
//! cargo run -- --cards cards.csv --strategy sync session.csv > outcomes.csv
//! cargo run -- --cards cards.csv --stock 5000=10,1000=20,500=20,100=50 session.csv
//! cargo run -- --cards cards.csv --strategy async --batch-size 2000 --max-concurrent 8 session.csv
//! ```
//!
//! The cards file opens one account per row and issues its card. The session
//! is then served against a reservoir loaded from `--stock`, and one outcome
//! row per request is written to stdout. Set `RUST_LOG` to see the machine's
//! log output on stderr.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, unreadable files, invalid card setup, etc.)

use cash_machine::cli;
use cash_machine::core::{
    AuthenticationGate, CashMachine, CashReservoir, InMemoryAccountStore, InMemoryCardStore,
    Sha256PinHasher,
};
use cash_machine::io::load_cards;
use cash_machine::strategy;
use std::process;
use std::sync::Arc;

fn main() {
    env_logger::init();

    let args = cli::parse_args();

    let hasher = match &args.salt {
        Some(salt) => Sha256PinHasher::new(salt),
        None => Sha256PinHasher::with_random_salt(),
    };
    let accounts = Arc::new(InMemoryAccountStore::new());
    let gate = AuthenticationGate::new(Arc::new(InMemoryCardStore::new()), Arc::new(hasher));

    if let Err(e) = load_cards(&args.cards_file, accounts.as_ref(), &gate) {
        eprintln!("Error: card setup failed: {}", e);
        process::exit(1);
    }

    let reservoir = Arc::new(CashReservoir::with_notes(args.stock.0.iter().copied()));
    let machine = Arc::new(CashMachine::new(gate, accounts, reservoir));

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(machine, &args.input_file, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
