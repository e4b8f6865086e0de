use crate::strategy::BatchConfig;
use crate::types::Denomination;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Initial reservoir when `--stock` is not given
pub const DEFAULT_STOCK: &str = "5000=100,1000=100,500=100,100=100";

/// Run a cash machine session script
#[derive(Parser, Debug)]
#[command(name = "cash-machine")]
#[command(about = "Serve cash machine sessions from a CSV script", long_about = None)]
pub struct CliArgs {
    /// Session CSV file path
    #[arg(value_name = "INPUT", help = "Path to the session CSV file")]
    pub input_file: PathBuf,

    /// Card setup CSV file path
    #[arg(
        long = "cards",
        value_name = "PATH",
        help = "CSV with card,pin,balance rows; each row opens an account and issues its card"
    )]
    pub cards_file: PathBuf,

    /// Initial reservoir contents
    #[arg(
        long = "stock",
        value_name = "LIST",
        default_value = DEFAULT_STOCK,
        value_parser = parse_stock,
        help = "Notes loaded into the machine, as denomination=count pairs"
    )]
    pub stock: Stock,

    /// Salt for PIN hashing
    #[arg(
        long = "salt",
        value_name = "SALT",
        help = "Salt for PIN hashing (default: random per run)"
    )]
    pub salt: Option<String>,

    /// Processing strategy to use for the session
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for sequential or 'async' for concurrent batches"
    )]
    pub strategy: StrategyType,

    /// Number of requests per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of requests per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of worker threads (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Number of worker threads serving cards concurrently (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,
}

/// Available processing strategies
#[derive(Clone, Debug, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

/// Reservoir contents parsed from `--stock`
#[derive(Clone, Debug, PartialEq)]
pub struct Stock(pub Vec<(Denomination, u32)>);

/// Parse `denomination=count` pairs separated by commas
///
/// An empty list gives an empty reservoir that accepts nothing.
pub fn parse_stock(value: &str) -> Result<Stock, String> {
    let mut entries: Vec<(Denomination, u32)> = Vec::new();

    for pair in value.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
        let (face, count) = pair
            .split_once('=')
            .ok_or_else(|| format!("Expected denomination=count, got '{}'", pair))?;
        let face: u32 = face
            .trim()
            .parse()
            .map_err(|_| format!("Invalid denomination '{}'", face.trim()))?;
        let denomination = Denomination::try_new(face).map_err(|e| e.to_string())?;
        let count: u32 = count
            .trim()
            .parse()
            .map_err(|_| format!("Invalid note count '{}'", count.trim()))?;

        if entries.iter().any(|(existing, _)| *existing == denomination) {
            return Err(format!("Denomination {} listed twice", denomination));
        }
        entries.push((denomination, count));
    }

    Ok(Stock(entries))
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values fall back to the defaults; zero values are replaced
    /// with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }
}
