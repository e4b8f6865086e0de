//! Processing strategy module for session scripts
//!
//! This module defines the Strategy pattern for complete session pipelines,
//! encompassing both CSV parsing and request serving. This allows different
//! processing implementations (synchronous, asynchronous batch) to be selected at runtime.

use crate::cli::StrategyType;
use crate::core::CashMachine;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete session pipelines
///
/// Each strategy reads session requests from a CSV file, serves them through
/// the given machine, and writes one outcome row per request to output.
pub trait ProcessingStrategy: Send + Sync {
    /// Serve the session script at `input_path` and write the outcome report
    ///
    /// # Arguments
    ///
    /// * `machine` - The machine serving the requests; its stores and reservoir
    ///   keep the state the session leaves behind
    /// * `input_path` - Path to the session CSV file
    /// * `output` - Writer for the outcome report
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened
    /// - Output cannot be written
    ///
    /// Unparseable rows are logged and skipped. Failed requests are reported
    /// in the output, not returned as errors.
    fn process(
        &self,
        machine: Arc<CashMachine>,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<(), String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `config` - Optional configuration for async batch processing (ignored for sync)
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}
