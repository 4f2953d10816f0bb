//! Ridge segmentation: global normalisation, block-wise standard deviation,
//! and renormalisation against the region of interest.

use ndarray::Array2;

pub struct Segmented {
    /// Intensities with zero mean and unit variance over the ROI.
    pub normalized: Array2<f32>,
    /// ROI: blocks whose local deviation clears the threshold.
    pub mask: Array2<bool>,
    /// Block-local standard deviation broadcast over each block.
    pub stddev: Array2<f32>,
}

fn mean_std(values: impl Iterator<Item = f32> + Clone) -> (f32, f32) {
    let mut n = 0usize;
    let mut sum = 0.0f64;
    for v in values.clone() {
        sum += v as f64;
        n += 1;
    }
    if n == 0 {
        return (0.0, 1.0);
    }
    let mean = sum / n as f64;
    let mut var = 0.0f64;
    for v in values {
        let d = v as f64 - mean;
        var += d * d;
    }
    let std = (var / n as f64).sqrt();
    (mean as f32, if std > 0.0 { std as f32 } else { 1.0 })
}

pub fn ridge_segment(gray: &Array2<f32>, block: usize, threshold: f32) -> Segmented {
    let (h, w) = gray.dim();

    let (mean, std) = mean_std(gray.iter().copied());
    let normalized = gray.mapv(|v| (v - mean) / std);

    // Block deviations are computed over the image padded out to whole
    // blocks; only the in-image part of each block is written back.
    let mut stddev = Array2::zeros((h, w));
    let mut by = 0;
    while by < h {
        let mut bx = 0;
        let y_end = (by + block).min(h);
        while bx < w {
            let x_end = (bx + block).min(w);
            let mut vals = Vec::with_capacity(block * block);
            for y in by..y_end {
                for x in bx..x_end {
                    vals.push(normalized[[y, x]]);
                }
            }
            let (_, block_std) = mean_std(vals.iter().copied());
            let block_std = if vals.len() > 1 { block_std } else { 0.0 };
            for y in by..y_end {
                for x in bx..x_end {
                    stddev[[y, x]] = block_std;
                }
            }
            bx += block;
        }
        by += block;
    }

    let mask = stddev.mapv(|v| v > threshold);

    // Renormalise so the foreground alone has zero mean and unit variance.
    let roi = normalized
        .iter()
        .zip(mask.iter())
        .filter(|(_, &m)| m)
        .map(|(&v, _)| v)
        .collect::<Vec<_>>();
    let (roi_mean, roi_std) = mean_std(roi.iter().copied());
    let normalized = normalized.mapv(|v| (v - roi_mean) / roi_std);

    Segmented {
        normalized,
        mask,
        stddev,
    }
}
