//! Decode service trait and shared error type.
//!
//! The [`HistogramDecoder`] trait is the narrow seam between the signature
//! stage and whatever actually reads image files. The production
//! implementation is [`RustDecoder`](super::rust_backend::RustDecoder).

use super::histogram::Histogram;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Turns an image file into its pixel histogram.
///
/// `Sync` because the signature stage calls it from rayon workers.
pub trait HistogramDecoder: Sync {
    fn histogram(&self, path: &Path) -> Result<Histogram, DecodeError>;
}
