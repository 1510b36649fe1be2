//! Image decoding in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** (JPEG, PNG) | `image::ImageReader` with content sniffing |
//! | **Histogram** | per-channel 256-bin counts over the decoded pixels |
//!
//! The module is split into:
//! - **Histogram**: the decoded-content summary and its canonical byte form
//! - **Backend**: [`HistogramDecoder`] trait + [`DecodeError`]
//! - **Rust backend**: [`RustDecoder`], the production implementation

pub mod backend;
mod histogram;
pub mod rust_backend;

pub use backend::{DecodeError, HistogramDecoder};
pub use histogram::{BINS, Histogram};
pub use rust_backend::RustDecoder;
