//! Asynchronous CSV reader with batch interface
//!
//! Provides a streaming interface over session requests from a CSV file.
//! Supports batch reading for concurrent processing.
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of SessionRequests
//!                  ↓
//!           csv_format module
//!     (SessionCsvRecord, convert_session_record)
//! ```

use crate::io::csv_format::{convert_session_record, SessionCsvRecord};
use crate::types::SessionRequest;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use log::warn;

/// Asynchronous CSV reader
///
/// Maintains streaming behavior with constant memory usage. Row numbers count
/// every data row, including the ones that fail to parse, so they line up
/// with the synchronous reader.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    row: u64,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader, row: 0 }
    }

    /// Read a batch of session requests
    ///
    /// Reads up to `batch_size` valid requests. Invalid records are logged
    /// and skipped.
    ///
    /// # Returns
    ///
    /// The converted requests; an empty vector once the input is exhausted.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<SessionRequest> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<SessionCsvRecord>();

        while batch.len() < batch_size {
            let Some(next) = records.next().await else {
                break;
            };
            self.row += 1;
            let line = self.row + 1;

            match next {
                Ok(csv_record) => match convert_session_record(csv_record, self.row) {
                    Ok(request) => batch.push(request),
                    Err(e) => warn!("Line {}: {}", line, e),
                },
                Err(e) => warn!("Line {}: CSV parse error: {}", line, e),
            }
        }

        batch
    }
}
