//! Batch processing with card-based partitioning
//!
//! This module provides the `BatchProcessor` struct, which serves a batch of
//! session requests concurrently while keeping each card's requests in order.
//!
//! # Design
//!
//! Requests are partitioned by card number. Different cards are served by
//! separate tokio tasks; requests for one card are served one after another
//! in script order. Cards linked to the same account still race for its
//! balance, which the account store resolves atomically.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     └── Arc<CashMachine>  (shared, thread-safe request coordinator)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use log::error;

use crate::core::machine::CashMachine;
use crate::types::{SessionOutcome, SessionRequest};

/// Batch processor with card-based partitioning
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    machine: Arc<CashMachine>,
}

impl BatchProcessor {
    /// Create a new BatchProcessor over a shared machine
    pub fn new(machine: Arc<CashMachine>) -> Self {
        Self { machine }
    }

    /// Partition a batch of requests by card number
    ///
    /// # Guarantees
    ///
    /// - Each request appears in exactly one sub-batch
    /// - Requests for each card keep their original order
    pub fn partition_by_card(
        &self,
        batch: Vec<SessionRequest>,
    ) -> HashMap<String, Vec<SessionRequest>> {
        let mut card_batches: HashMap<String, Vec<SessionRequest>> = HashMap::new();

        for request in batch {
            card_batches
                .entry(request.card.clone())
                .or_default()
                .push(request);
        }

        card_batches
    }

    /// Serve all requests for a single card sequentially
    ///
    /// Outcomes are returned in the same order as the requests.
    pub async fn process_card_requests(&self, requests: Vec<SessionRequest>) -> Vec<SessionOutcome> {
        requests
            .iter()
            .map(|request| self.machine.serve(request))
            .collect()
    }

    /// Serve a batch of requests with card-based partitioning
    ///
    /// 1. Partitions the batch by card number
    /// 2. Spawns a tokio task per card
    /// 3. Waits for all tasks and collects their outcomes
    ///
    /// Outcomes from different cards may come back in any order; each carries
    /// its row number for reordering.
    pub async fn process_batch(&self, batch: Vec<SessionRequest>) -> Vec<SessionOutcome> {
        let card_batches = self.partition_by_card(batch);

        let mut tasks = Vec::with_capacity(card_batches.len());
        for (_card, requests) in card_batches {
            let processor = self.clone();
            tasks.push(tokio::spawn(async move {
                processor.process_card_requests(requests).await
            }));
        }

        let mut outcomes = Vec::new();
        for task in tasks {
            match task.await {
                Ok(card_outcomes) => outcomes.extend(card_outcomes),
                Err(e) => error!("Session task panicked: {:?}", e),
            }
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::account_store::InMemoryAccountStore;
    use crate::core::auth::AuthenticationGate;
    use crate::core::card_store::InMemoryCardStore;
    use crate::core::pin::Sha256PinHasher;
    use crate::core::reservoir::CashReservoir;
    use crate::core::traits::AccountStore;
    use crate::types::{Denomination, Operation, OutcomeDetail};
    use rust_decimal::Decimal;

    fn processor(cards: &[(&str, i64)]) -> (BatchProcessor, Arc<InMemoryAccountStore>) {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let gate = AuthenticationGate::new(
            Arc::new(InMemoryCardStore::new()),
            Arc::new(Sha256PinHasher::new("batch")),
        );
        for (number, balance) in cards {
            let account = accounts.create(Decimal::from(*balance)).unwrap();
            gate.issue_card(number, account.id, "1234").unwrap();
        }
        let reservoir = CashReservoir::with_notes(Denomination::STANDARD.iter().map(|d| (*d, 100)));
        let machine = CashMachine::new(gate, accounts.clone(), Arc::new(reservoir));
        (BatchProcessor::new(Arc::new(machine)), accounts)
    }

    fn request(row: u64, card: &str, operation: Operation) -> SessionRequest {
        SessionRequest {
            row,
            card: card.to_string(),
            pin: "1234".to_string(),
            operation,
        }
    }

    fn withdraw(row: u64, card: &str, amount: i64) -> SessionRequest {
        request(
            row,
            card,
            Operation::Withdraw {
                amount: Decimal::from(amount),
            },
        )
    }

    #[test]
    fn test_partition_by_card_empty_batch() {
        let (processor, _) = processor(&[]);
        assert!(processor.partition_by_card(vec![]).is_empty());
    }

    #[test]
    fn test_partition_by_card_keeps_order() {
        let (processor, _) = processor(&[]);
        let batch = vec![
            withdraw(1, "1111", 100),
            withdraw(2, "2222", 100),
            withdraw(3, "1111", 500),
            request(4, "3333", Operation::Balance),
            withdraw(5, "2222", 1000),
        ];

        let partitioned = processor.partition_by_card(batch);

        assert_eq!(partitioned.len(), 3);
        let rows = |card: &str| -> Vec<u64> { partitioned[card].iter().map(|r| r.row).collect() };
        assert_eq!(rows("1111"), vec![1, 3]);
        assert_eq!(rows("2222"), vec![2, 5]);
        assert_eq!(rows("3333"), vec![4]);
    }

    #[tokio::test]
    async fn test_process_card_requests_in_order() {
        let (processor, _) = processor(&[("1111", 1000)]);
        let requests = vec![
            withdraw(1, "1111", 600),
            withdraw(2, "1111", 500),
            request(3, "1111", Operation::Balance),
        ];

        let outcomes = processor.process_card_requests(requests).await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].result.is_ok());
        // Only 400 left after the first withdrawal
        assert!(outcomes[1].result.is_err());
        assert_eq!(
            outcomes[2].result,
            Ok(OutcomeDetail::Balance(Decimal::from(400)))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_process_batch_serves_every_request() {
        let (processor, accounts) = processor(&[("1111", 10_000), ("2222", 10_000), ("3333", 10_000)]);
        let mut batch = Vec::new();
        for row in 1..=30u64 {
            let card = ["1111", "2222", "3333"][(row % 3) as usize];
            batch.push(withdraw(row, card, 100));
        }

        let mut outcomes = processor.process_batch(batch).await;
        outcomes.sort_by_key(|outcome| outcome.row);

        assert_eq!(outcomes.len(), 30);
        assert!(outcomes.iter().all(|outcome| outcome.result.is_ok()));
        assert_eq!(
            outcomes.iter().map(|o| o.row).collect::<Vec<_>>(),
            (1..=30).collect::<Vec<_>>()
        );
        // Accounts are numbered from 1 in card order
        for id in 1..=3 {
            assert_eq!(accounts.balance(id).unwrap(), Decimal::from(9_000));
        }
    }
}
