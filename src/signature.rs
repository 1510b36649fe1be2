//! Content signatures from decoded histograms.
//!
//! Stage 2 of the pipeline. Every inventoried image is decoded and its
//! histogram hashed:
//!
//! ```text
//! signature = SHA-256( "histogram\0" ‖ channels ‖ count₀ ‖ count₁ ‖ … )   (u64 LE counts)
//! ```
//!
//! Equal signatures mean equal histograms. That is the whole duplicate policy.
//!
//! ## Per-file failures
//!
//! A file that cannot be opened or decoded does not stop the run. Each file
//! yields a `Result`, and the results are split into signed records and
//! [`DecodeSkipped`] entries. Skipped files take no part in later stages.
//!
//! ## Parallel Processing
//!
//! Files are decoded in parallel with [rayon](https://docs.rs/rayon). Results
//! are collected in inventory order, so the output never depends on which
//! worker finished first. Progress is counted under a mutex and sent while the
//! lock is held, so listeners see `completed` go 1, 2, 3, … with no reordering.

use crate::events::{PipelineEvent, emit};
use crate::imaging::{DecodeError, Histogram, HistogramDecoder};
use crate::types::{ImageRecord, Signature};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Systemic failures. Per-file decode errors are never reported here.
#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("Inventory lists {0} more than once")]
    DuplicatePath(PathBuf),
    #[error("{0} already has a signature")]
    AlreadySigned(PathBuf),
}

/// A file left out because it could not be decoded.
#[derive(Debug)]
pub struct DecodeSkipped {
    pub path: PathBuf,
    pub error: DecodeError,
}

/// Output of the signature stage.
#[derive(Debug)]
pub struct SignatureReport {
    /// Records that now carry a signature, in inventory order.
    pub signed: Vec<ImageRecord>,
    pub skipped: Vec<DecodeSkipped>,
}

/// SHA-256 of the histogram's canonical serialization.
pub fn signature_of(histogram: &Histogram) -> Signature {
    let digest = Sha256::digest(histogram.to_canonical_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    Signature::from_bytes(bytes)
}

/// Decode and sign every record.
pub fn compute_signatures(
    decoder: &impl HistogramDecoder,
    records: Vec<ImageRecord>,
    events: Option<&Sender<PipelineEvent>>,
) -> Result<SignatureReport, SignatureError> {
    check_inventory(&records)?;

    let progress = Progress {
        completed: Mutex::new(0),
        total: records.len(),
        events,
    };

    let outcomes: Vec<Result<ImageRecord, DecodeSkipped>> = records
        .into_par_iter()
        .map(|record| {
            let outcome = sign(decoder, record);
            progress.record(&outcome);
            outcome
        })
        .collect();

    let mut signed = Vec::with_capacity(outcomes.len());
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(record) => signed.push(record),
            Err(skip) => skipped.push(skip),
        }
    }

    Ok(SignatureReport { signed, skipped })
}

fn sign(decoder: &impl HistogramDecoder, record: ImageRecord) -> Result<ImageRecord, DecodeSkipped> {
    match decoder.histogram(&record.path) {
        Ok(histogram) => Ok(record.with_signature(signature_of(&histogram))),
        Err(error) => Err(DecodeSkipped {
            path: record.path,
            error,
        }),
    }
}

/// Reject inventories that break the record invariants before any decoding.
fn check_inventory(records: &[ImageRecord]) -> Result<(), SignatureError> {
    let mut seen: HashSet<&Path> = HashSet::with_capacity(records.len());
    for record in records {
        if record.signature.is_some() {
            return Err(SignatureError::AlreadySigned(record.path.clone()));
        }
        if !seen.insert(record.path.as_path()) {
            return Err(SignatureError::DuplicatePath(record.path.clone()));
        }
    }
    Ok(())
}

struct Progress<'a> {
    completed: Mutex<usize>,
    total: usize,
    events: Option<&'a Sender<PipelineEvent>>,
}

impl Progress<'_> {
    fn record(&self, outcome: &Result<ImageRecord, DecodeSkipped>) {
        let mut completed = self
            .completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *completed += 1;

        let event = match outcome {
            Ok(record) => PipelineEvent::SignatureComputed {
                completed: *completed,
                total: self.total,
                path: record.path.clone(),
            },
            Err(skip) => PipelineEvent::DecodeSkipped {
                completed: *completed,
                total: self.total,
                path: skip.path.clone(),
                reason: skip.error.to_string(),
            },
        };
        emit(self.events, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockDecoder, shade_histogram};
    use crate::test_helpers::record;
    use std::collections::HashMap;

    // =========================================================================
    // signature_of
    // =========================================================================

    #[test]
    fn signature_is_deterministic() {
        let hist = shade_histogram(12);
        assert_eq!(signature_of(&hist), signature_of(&hist.clone()));
    }

    #[test]
    fn different_histograms_differ() {
        assert_ne!(
            signature_of(&shade_histogram(1)),
            signature_of(&shade_histogram(2))
        );
    }

    // =========================================================================
    // compute_signatures
    // =========================================================================

    #[test]
    fn signs_every_decodable_record() {
        let decoder = MockDecoder::new()
            .with_shade("/p/a.jpg", 1)
            .with_shade("/p/b.jpg", 1)
            .with_shade("/p/c.png", 2);
        let records = vec![record("/p/a.jpg"), record("/p/b.jpg"), record("/p/c.png")];

        let report = compute_signatures(&decoder, records, None).unwrap();

        assert_eq!(report.signed.len(), 3);
        assert!(report.skipped.is_empty());
        assert_eq!(report.signed[0].signature, report.signed[1].signature);
        assert_ne!(report.signed[0].signature, report.signed[2].signature);
        assert_eq!(decoder.get_calls().len(), 3);
    }

    #[test]
    fn decode_failures_are_skipped_not_fatal() {
        let decoder = MockDecoder::new().with_shade("/p/good.jpg", 5);
        let records = vec![record("/p/bad.jpg"), record("/p/good.jpg")];

        let report = compute_signatures(&decoder, records, None).unwrap();

        assert_eq!(report.signed.len(), 1);
        assert_eq!(report.signed[0].path, PathBuf::from("/p/good.jpg"));
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, PathBuf::from("/p/bad.jpg"));
    }

    #[test]
    fn signed_records_keep_inventory_order() {
        let mut decoder = MockDecoder::new();
        let mut records = Vec::new();
        for i in 0..64u8 {
            let path = format!("/p/{i:03}.png");
            decoder = decoder.with_shade(path.as_str(), i % 7);
            records.push(record(&path));
        }
        let expected: Vec<_> = records.iter().map(|r| r.path.clone()).collect();

        let report = compute_signatures(&decoder, records, None).unwrap();
        let actual: Vec<_> = report.signed.iter().map(|r| r.path.clone()).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn signatures_do_not_depend_on_input_order() {
        let mut decoder = MockDecoder::new();
        let mut records = Vec::new();
        for i in 0..40u8 {
            let path = format!("/p/{i}.jpg");
            decoder = decoder.with_shade(path.as_str(), i % 5);
            records.push(record(&path));
        }
        let mut reversed = records.clone();
        reversed.reverse();

        let forward = compute_signatures(&decoder, records, None).unwrap();
        let backward = compute_signatures(&decoder, reversed, None).unwrap();

        let as_map = |report: &SignatureReport| -> HashMap<PathBuf, Option<Signature>> {
            report
                .signed
                .iter()
                .map(|r| (r.path.clone(), r.signature))
                .collect()
        };
        assert_eq!(as_map(&forward), as_map(&backward));
    }

    #[test]
    fn progress_is_strictly_increasing() {
        let mut decoder = MockDecoder::new();
        let mut records = Vec::new();
        for i in 0..100u32 {
            let path = format!("/p/{i}.jpg");
            // every tenth file fails to decode
            if i % 10 != 0 {
                decoder = decoder.with_shade(path.as_str(), (i % 200) as u8);
            }
            records.push(record(&path));
        }
        let (tx, rx) = std::sync::mpsc::channel();

        compute_signatures(&decoder, records, Some(&tx)).unwrap();
        drop(tx);

        let completed: Vec<usize> = rx
            .into_iter()
            .map(|event| match event {
                PipelineEvent::SignatureComputed {
                    completed, total, ..
                }
                | PipelineEvent::DecodeSkipped {
                    completed, total, ..
                } => {
                    assert_eq!(total, 100);
                    completed
                }
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(completed, (1..=100).collect::<Vec<_>>());
    }

    #[test]
    fn duplicate_path_is_systemic_failure() {
        let decoder = MockDecoder::new().with_shade("/p/a.jpg", 1);
        let records = vec![record("/p/a.jpg"), record("/p/a.jpg")];

        let result = compute_signatures(&decoder, records, None);
        assert!(matches!(result, Err(SignatureError::DuplicatePath(_))));
        assert!(decoder.get_calls().is_empty());
    }

    #[test]
    fn presigned_record_is_systemic_failure() {
        let decoder = MockDecoder::new().with_shade("/p/a.jpg", 1);
        let signed = record("/p/a.jpg").with_signature(signature_of(&shade_histogram(1)));

        let result = compute_signatures(&decoder, vec![signed], None);
        assert!(matches!(result, Err(SignatureError::AlreadySigned(_))));
    }

    #[test]
    fn empty_inventory_is_empty_report() {
        let report = compute_signatures(&MockDecoder::new(), Vec::new(), None).unwrap();
        assert!(report.signed.is_empty());
        assert!(report.skipped.is_empty());
    }
}
