//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over session requests from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding Result<SessionRequest, String>
//! for each CSV row:
//!
//! ```no_run
//! use cash_machine::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("session.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(request) => println!("Serving request: {:?}", request),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual record parsing errors are yielded as Err variants in the iterator
//! - Line numbers are included in error messages for debugging

use crate::io::csv_format::{convert_session_record, SessionCsvRecord};
use crate::types::SessionRequest;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous CSV reader over a session script
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    row: u64,
}

impl SyncReader {
    /// Create a new SyncReader from a file path
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (trailing optional columns may be omitted)
    /// - Use an 8KB buffer for efficient I/O
    ///
    /// # Errors
    ///
    /// Returns an error message if the file could not be opened.
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self { reader, row: 0 })
    }
}

impl Iterator for SyncReader {
    type Item = Result<SessionRequest, String>;

    /// Get the next session request from the CSV file
    ///
    /// Every data row, valid or not, advances the row counter, so request rows
    /// always match their position in the script.
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<SessionCsvRecord>();
        let next = deserializer.next()?;
        self.row += 1;
        // Header is line 1
        let line = self.row + 1;

        Some(match next {
            Ok(csv_record) => convert_session_record(csv_record, self.row)
                .map_err(|e| format!("Line {}: {}", line, e)),
            Err(e) => Err(format!("Line {}: CSV parse error: {}", line, e)),
        })
    }
}
