//! Image enhancement pipeline: segmentation, orientation, frequency, Gabor
//! filtering, skeletonisation and mask cleanup, in that order. Every stage
//! consumes the previous stage's output, so the sequence is fixed.

use ndarray::Array2;
use tracing::debug;

mod frequency;
mod gabor;
mod morphology;
mod orientation;
mod segment;
mod thin;

pub use frequency::{ridge_freq, RidgeFrequency};
pub use morphology::open_close;
pub use orientation::ridge_orient;
pub use segment::{ridge_segment, Segmented};
pub use thin::{prune_spurs, skeletonize};

use gabor::GaborBank;

/// Tuning knobs of the enhancement pipeline.
#[derive(Debug, Clone, Copy)]
pub struct EnhanceOptions {
    /// Segmentation block size in pixels.
    pub block_size: usize,
    /// Standard-deviation threshold marking a block as ridge foreground.
    pub segment_threshold: f32,
    /// Sigma of the Gaussian whose derivative produces the image gradients.
    pub gradient_sigma: f32,
    /// Sigma smoothing the squared gradient moments.
    pub block_sigma: f32,
    /// Sigma smoothing the double-angle field before recombination.
    pub orient_smooth_sigma: f32,
    /// Frequency estimation block size in pixels.
    pub freq_block_size: usize,
    /// Grey-dilation window for projection peak picking.
    pub freq_window: usize,
    /// Accepted ridge wavelength bounds in pixels.
    pub min_wave_length: f32,
    pub max_wave_length: f32,
    /// Gabor envelope constants relative to the ridge wavelength.
    pub kx: f32,
    pub ky: f32,
    /// Angular step between Gabor kernels in degrees.
    pub angle_inc: usize,
    /// Binarisation threshold on the filter response.
    pub ridge_filter_threshold: f32,
}

impl Default for EnhanceOptions {
    fn default() -> Self {
        EnhanceOptions {
            block_size: 16,
            segment_threshold: 0.1,
            gradient_sigma: 1.0,
            block_sigma: 7.0,
            orient_smooth_sigma: 7.0,
            freq_block_size: 38,
            freq_window: 5,
            min_wave_length: 5.0,
            max_wave_length: 15.0,
            kx: 0.65,
            ky: 0.65,
            angle_inc: 3,
            ridge_filter_threshold: -3.0,
        }
    }
}

/// Everything the enhancement pipeline derives from one raw image.
pub struct EnhancedImage {
    /// Zero-mean unit-variance intensities over the ROI.
    pub normalized: Array2<f32>,
    /// Raw segmentation mask (block deviation above threshold).
    pub segmentation_mask: Array2<bool>,
    /// Segmentation mask after elliptical open/close.
    pub mask: Array2<bool>,
    /// Per-pixel block standard deviation.
    pub stddev: Array2<f32>,
    /// Ridge direction in radians modulo pi.
    pub orientation: Array2<f32>,
    /// Scalar ridge frequency over the ROI.
    pub frequency: f32,
    /// Binarised Gabor response.
    pub binary: Array2<bool>,
    /// One-pixel-wide ridge skeleton, clipped to the mask.
    pub skeleton: Array2<bool>,
    /// Mean of the deviation field; a cheap flatness indicator.
    pub mean_stddev: f32,
}

pub fn enhance(gray: &Array2<f32>, opts: &EnhanceOptions) -> EnhancedImage {
    let (h, w) = gray.dim();

    let Segmented {
        normalized,
        mask: segmentation_mask,
        stddev,
    } = ridge_segment(gray, opts.block_size, opts.segment_threshold);
    let roi = segmentation_mask.iter().filter(|&&m| m).count();
    debug!(roi_pixels = roi, "segmentation done");

    let orientation = ridge_orient(
        &normalized,
        opts.gradient_sigma,
        opts.block_sigma,
        opts.orient_smooth_sigma,
    );

    let freq = ridge_freq(
        &normalized,
        &segmentation_mask,
        &orientation,
        opts.freq_block_size,
        opts.freq_window,
        opts.min_wave_length,
        opts.max_wave_length,
    );
    debug!(frequency = freq.scalar, "frequency estimated");

    let binary = if freq.scalar > 0.0 {
        let bank = GaborBank::build(freq.scalar, opts.kx, opts.ky, opts.angle_inc);
        bank.filter(
            &normalized,
            &orientation,
            &freq.field,
            opts.ridge_filter_threshold,
        )
    } else {
        // no measurable ridge structure anywhere; degrade to an empty map
        Array2::from_elem((h, w), false)
    };

    let skeleton = prune_spurs(&skeletonize(&binary));

    let mask = open_close(&segmentation_mask, 2 * opts.block_size);

    // clip so no skeleton pixel survives outside the cleaned mask
    let skeleton =
        Array2::from_shape_fn((h, w), |(y, x)| skeleton[[y, x]] && mask[[y, x]]);

    let mean_stddev = stddev.iter().sum::<f32>() / (h * w).max(1) as f32;
    debug!(
        skeleton_pixels = skeleton.iter().filter(|&&v| v).count(),
        mean_stddev,
        "enhancement done"
    );

    EnhancedImage {
        normalized,
        segmentation_mask,
        mask,
        stddev,
        orientation,
        frequency: freq.scalar,
        binary,
        skeleton,
        mean_stddev,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    /// Grating confined to a central square over a flat background.
    fn synthetic_print(h: usize, w: usize) -> Array2<f32> {
        Array2::from_shape_fn((h, w), |(y, x)| {
            let inside = y >= 64 && y < 224 && x >= 48 && x < 208;
            if inside {
                128.0 + 100.0 * (2.0 * PI * y as f32 / 10.0).cos()
            } else {
                128.0
            }
        })
    }

    #[test]
    fn skeleton_stays_inside_the_mask() {
        let gray = synthetic_print(288, 256);
        let out = enhance(&gray, &EnhanceOptions::default());

        assert!(out.frequency > 0.0);
        assert!(out.skeleton.iter().any(|&v| v));
        for ((y, x), &v) in out.skeleton.indexed_iter() {
            if v {
                assert!(out.mask[[y, x]], "skeleton outside mask at ({}, {})", y, x);
            }
        }
    }

    #[test]
    fn flat_input_degrades_without_panicking() {
        let gray = Array2::from_elem((96, 96), 40.0f32);
        let out = enhance(&gray, &EnhanceOptions::default());
        assert_eq!(out.frequency, 0.0);
        assert!(out.skeleton.iter().all(|&v| !v));
        assert!(out.mask.iter().all(|&m| !m));
    }
}
