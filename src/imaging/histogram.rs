//! Per-channel pixel-intensity histograms.

use image::DynamicImage;

/// Bins per channel (one per 8-bit intensity).
pub const BINS: usize = 256;

/// Frequency of every intensity value, channel after channel.
///
/// The channel layout follows the decoded image: 1 (luma), 2 (luma + alpha),
/// 3 (RGB) or 4 (RGBA). Deeper samples are reduced to 8 bits first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    channels: u8,
    counts: Vec<u64>,
}

impl Histogram {
    /// Build from raw counts. `counts.len()` must be `channels * BINS`.
    pub fn from_counts(channels: u8, counts: Vec<u64>) -> Option<Self> {
        if channels == 0 || counts.len() != channels as usize * BINS {
            return None;
        }
        Some(Self { channels, counts })
    }

    pub fn from_image(img: &DynamicImage) -> Self {
        let (channels, samples) = match img.color().channel_count() {
            1 => (1, img.to_luma8().into_raw()),
            2 => (2, img.to_luma_alpha8().into_raw()),
            3 => (3, img.to_rgb8().into_raw()),
            _ => (4, img.to_rgba8().into_raw()),
        };

        let mut counts = vec![0u64; channels * BINS];
        for pixel in samples.chunks_exact(channels) {
            for (channel, &value) in pixel.iter().enumerate() {
                counts[channel * BINS + value as usize] += 1;
            }
        }

        Self {
            channels: channels as u8,
            counts,
        }
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Counts for one channel, `None` past the last channel.
    pub fn channel(&self, index: usize) -> Option<&[u64]> {
        self.counts.get(index * BINS..(index + 1) * BINS)
    }

    /// Canonical serialization: tag, channel count, then little-endian counts.
    ///
    /// Two histograms are equal exactly when these bytes are equal.
    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(11 + self.counts.len() * 8);
        bytes.extend_from_slice(b"histogram\0");
        bytes.push(self.channels);
        for count in &self.counts {
            bytes.extend_from_slice(&count.to_le_bytes());
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn rgb_histogram_counts_each_channel() {
        let img = RgbImage::from_pixel(4, 2, Rgb([10, 20, 30]));
        let hist = Histogram::from_image(&DynamicImage::ImageRgb8(img));

        assert_eq!(hist.channels(), 3);
        assert_eq!(hist.counts().len(), 3 * BINS);
        assert_eq!(hist.channel(0).unwrap()[10], 8);
        assert_eq!(hist.channel(1).unwrap()[20], 8);
        assert_eq!(hist.channel(2).unwrap()[30], 8);
        assert!(hist.channel(3).is_none());
    }

    #[test]
    fn gray_histogram_has_one_channel() {
        let img = GrayImage::from_fn(3, 3, |x, _| Luma([x as u8]));
        let hist = Histogram::from_image(&DynamicImage::ImageLuma8(img));

        assert_eq!(hist.channels(), 1);
        assert_eq!(&hist.counts()[..4], &[3, 3, 3, 0]);
    }

    #[test]
    fn rgba_histogram_includes_alpha() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 128]));
        let hist = Histogram::from_image(&DynamicImage::ImageRgba8(img));

        assert_eq!(hist.channels(), 4);
        assert_eq!(hist.channel(3).unwrap()[128], 4);
    }

    #[test]
    fn pixel_order_does_not_matter() {
        let a = RgbImage::from_fn(2, 1, |x, _| if x == 0 { Rgb([1, 1, 1]) } else { Rgb([9, 9, 9]) });
        let b = RgbImage::from_fn(2, 1, |x, _| if x == 0 { Rgb([9, 9, 9]) } else { Rgb([1, 1, 1]) });
        assert_eq!(
            Histogram::from_image(&DynamicImage::ImageRgb8(a)),
            Histogram::from_image(&DynamicImage::ImageRgb8(b))
        );
    }

    #[test]
    fn from_counts_rejects_wrong_length() {
        assert!(Histogram::from_counts(3, vec![0; BINS]).is_none());
        assert!(Histogram::from_counts(0, vec![]).is_none());
        assert!(Histogram::from_counts(1, vec![0; BINS]).is_some());
    }

    #[test]
    fn canonical_bytes_follow_counts() {
        let zeros = Histogram::from_counts(1, vec![0; BINS]).unwrap();
        let ones = Histogram::from_counts(1, vec![1; BINS]).unwrap();

        assert_ne!(zeros.to_canonical_bytes(), ones.to_canonical_bytes());
        assert_eq!(zeros.to_canonical_bytes().len(), 11 + BINS * 8);
        // channel count sits right after the tag
        assert_eq!(zeros.to_canonical_bytes()[10], 1);
    }

    #[test]
    fn canonical_bytes_distinguish_layouts() {
        let gray = Histogram::from_counts(1, vec![0; BINS]).unwrap();
        let gray_alpha = Histogram::from_counts(2, vec![0; 2 * BINS]).unwrap();
        assert_ne!(gray.to_canonical_bytes(), gray_alpha.to_canonical_bytes());
    }
}
