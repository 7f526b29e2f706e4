//! Batch transcoding.

use crate::config::TranscoderConfig;
use crate::record::Record;
use crate::router::ConversionPath;
use crate::TranscodeResult;

/// Applies one configured conversion to batches of pipeline records.
///
/// Stateless beyond the resolved conversion path: every record is converted
/// independently with fresh intermediates, so a transcoder is safe to share
/// across threads working on independent batches.
#[derive(Clone, Copy, Debug)]
pub struct BatchTranscoder {
    path: ConversionPath,
}

impl BatchTranscoder {
    pub fn new(config: TranscoderConfig) -> Self {
        Self {
            path: config.path(),
        }
    }

    /// Transcode a batch of records.
    ///
    /// Returns exactly one result per input record, in input order. A
    /// failed record becomes the `Err` at its index and never aborts its
    /// siblings; the successful records keep their original position and
    /// metadata around the new payload.
    pub fn process(&self, records: Vec<Record>) -> Vec<TranscodeResult<Record>> {
        records
            .into_iter()
            .map(|record| self.process_record(record))
            .collect()
    }

    fn process_record(&self, record: Record) -> TranscodeResult<Record> {
        let payload = self.path.convert(&record.payload)?;
        Ok(Record { payload, ..record })
    }
}
