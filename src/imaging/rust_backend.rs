//! Pure Rust decode backend, statically linked.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Format detection | `ImageReader::with_guessed_format` (magic bytes, then extension) |
//! | Decode (JPEG, PNG) | `image` crate (pure Rust decoders) |
//! | Histogram | [`Histogram::from_image`] |

use super::backend::{DecodeError, HistogramDecoder};
use super::histogram::Histogram;
use image::ImageReader;
use std::path::Path;

/// Pure Rust decoder using the `image` crate.
pub struct RustDecoder;

impl RustDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl HistogramDecoder for RustDecoder {
    fn histogram(&self, path: &Path) -> Result<Histogram, DecodeError> {
        // Sniff content so a PNG saved as `.jpg` still decodes.
        let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        Ok(Histogram::from_image(&img))
    }
}
