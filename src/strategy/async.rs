//! Asynchronous batch processing strategy
//!
//! Serves a session script in batches. Batches run one after another; within
//! a batch, requests are partitioned by card and different cards are served
//! concurrently on a tokio multi-threaded runtime.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     └── BatchProcessor (card partitioning + tasks)
//!         └── CashMachine (shared stores and reservoir)
//! ```
//!
//! Per-card order is kept both within and across batches. Requests from
//! different cards may interleave in any order, so the outcome report is
//! sorted by row before it is written.

use crate::core::{BatchProcessor, CashMachine};
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_outcomes_csv;
use crate::strategy::ProcessingStrategy;
use log::{debug, warn};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Configuration for batch processing
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of requests per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig, replacing zero values with the defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                "Invalid batch_size ({}), using default ({})",
                batch_size, default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                "Invalid max_concurrent_batches ({}), using default ({})",
                max_concurrent_batches, default.max_concurrent_batches
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy with the specified configuration
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Serve the session in batches
    ///
    /// 1. Creates a tokio multi-threaded runtime
    /// 2. Reads requests in batches using AsyncReader
    /// 3. Serves each batch to completion before reading the next
    /// 4. Writes all outcomes, sorted by row
    fn process(
        &self,
        machine: Arc<CashMachine>,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        let outcomes = runtime.block_on(async {
            let processor = BatchProcessor::new(machine);

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let mut outcomes = Vec::new();
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                // A card's requests may span batches, so each batch finishes
                // before the next one starts
                debug!("Serving batch of {} requests", batch.len());
                outcomes.extend(processor.process_batch(batch).await);
            }

            Ok::<_, String>(outcomes)
        })?;

        write_outcomes_csv(&outcomes, output)
    }
}
