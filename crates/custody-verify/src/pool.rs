//! # Record Hashing Pool
//!
//! Canonicalization and hashing of one record does not depend on any other
//! record, so the work splits into contiguous chunks hashed on scoped
//! threads. Every worker writes only into the slot range that mirrors its
//! input chunk, so results land at their record's index and the aggregator
//! sees them in manifest order regardless of which thread finished first.

use std::thread;

use custody_core::ManifestRecord;
use custody_crypto::{RecordDigests, RecordHasher};

/// Hash every record, returning results in record order.
///
/// `workers <= 1`, or fewer records than workers would make useful, runs
/// on the calling thread.
pub fn hash_records(
    hasher: &RecordHasher,
    records: &[ManifestRecord],
    workers: usize,
) -> Vec<RecordDigests> {
    let workers = workers.min(records.len());
    if workers <= 1 {
        return records.iter().map(|r| hasher.hash_record(r)).collect();
    }

    let chunk_size = records.len().div_ceil(workers);
    let mut slots: Vec<Option<RecordDigests>> = vec![None; records.len()];

    thread::scope(|scope| {
        for (input, output) in records.chunks(chunk_size).zip(slots.chunks_mut(chunk_size)) {
            scope.spawn(move || {
                for (record, slot) in input.iter().zip(output.iter_mut()) {
                    *slot = Some(hasher.hash_record(record));
                }
            });
        }
    });

    tracing::debug!(workers, chunk_size, records = records.len(), "hashed records in parallel");
    slots.into_iter().flatten().collect()
}
