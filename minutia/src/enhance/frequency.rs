//! Ridge frequency estimation. Each block is rotated so its ridges stand
//! vertical, projected onto the column axis, and read for peak spacing.

use ndarray::{s, Array2};
use tracing::warn;

use crate::image::rotate_plane;
use crate::math::rad_to_deg;

pub struct RidgeFrequency {
    /// Scalar frequency broadcast over the ROI, zero elsewhere.
    pub field: Array2<f32>,
    /// Mean of the non-zero block frequencies.
    pub scalar: f32,
}

/// Spacing of projection peaks inside one block, as a frequency in cycles per
/// pixel. Zero when the block shows no usable peak pair.
fn block_frequency(
    block: &Array2<f32>,
    orient_block: &Array2<f32>,
    window: usize,
    min_wave_length: f32,
    max_wave_length: f32,
) -> f32 {
    let rows = block.dim().0;

    // average the doubled angles so opposite directions reinforce
    let mut sin_sum = 0.0;
    let mut cos_sum = 0.0;
    for &o in orient_block.iter() {
        sin_sum += (2.0 * o).sin();
        cos_sum += (2.0 * o).cos();
    }
    let mean_orient = sin_sum.atan2(cos_sum) / 2.0;

    let rotated = rotate_plane(block, 90.0 - rad_to_deg(mean_orient), None);

    // inscribed square, valid for any rotation angle
    let crop = (rows as f32 / std::f32::consts::SQRT_2).floor() as usize;
    if crop < 2 {
        return 0.0;
    }
    let offset = (rows - crop) / 2;
    let cropped = rotated.slice(s![offset..offset + crop, offset..offset + crop]);

    let projection: Vec<f32> = (0..crop).map(|x| cropped.column(x).sum()).collect();
    let mean = projection.iter().sum::<f32>() / crop as f32;

    // peaks: where grey dilation leaves the sample unchanged and the sample
    // clears the projection mean
    let half = window / 2;
    let mut peaks = Vec::new();
    for i in 0..crop {
        let lo = i.saturating_sub(half);
        let hi = (i + half + 1).min(crop);
        let dilated = projection[lo..hi].iter().cloned().fold(f32::MIN, f32::max);
        if (dilated - projection[i]).abs() < 2.0 && projection[i] > mean {
            peaks.push(i);
        }
    }

    if peaks.len() < 2 {
        return 0.0;
    }
    let span = (peaks[peaks.len() - 1] - peaks[0]) as f32;
    let wave_length = span / (peaks.len() - 1) as f32;
    if wave_length >= min_wave_length && wave_length <= max_wave_length {
        1.0 / wave_length
    } else {
        0.0
    }
}

pub fn ridge_freq(
    normalized: &Array2<f32>,
    mask: &Array2<bool>,
    orientation: &Array2<f32>,
    block: usize,
    window: usize,
    min_wave_length: f32,
    max_wave_length: f32,
) -> RidgeFrequency {
    let (h, w) = normalized.dim();
    let mut raw = Array2::zeros((h, w));

    let mut by = 0;
    while by + block <= h {
        let mut bx = 0;
        while bx + block <= w {
            let img_block = normalized
                .slice(s![by..by + block, bx..bx + block])
                .to_owned();
            let orient_block = orientation
                .slice(s![by..by + block, bx..bx + block])
                .to_owned();
            let f = block_frequency(
                &img_block,
                &orient_block,
                window,
                min_wave_length,
                max_wave_length,
            );
            if f > 0.0 {
                raw.slice_mut(s![by..by + block, bx..bx + block]).fill(f);
            }
            bx += block;
        }
        by += block;
    }

    // collapse to one scalar over the ROI
    let mut sum = 0.0;
    let mut n = 0usize;
    for (&f, &m) in raw.iter().zip(mask.iter()) {
        if m && f > 0.0 {
            sum += f;
            n += 1;
        }
    }
    let scalar = if n > 0 { sum / n as f32 } else { 0.0 };
    if scalar == 0.0 {
        warn!("no ridge frequency peaks found; filtering will be skipped");
    }

    let field = Array2::from_shape_fn((h, w), |(y, x)| if mask[[y, x]] { scalar } else { 0.0 });
    RidgeFrequency { field, scalar }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn grating_period_ten_gives_point_one() {
        let plane = Array2::from_shape_fn((114, 114), |(y, _)| (2.0 * PI * y as f32 / 10.0).cos());
        let mask = Array2::from_elem((114, 114), true);
        // ridges along x: orientation 0 everywhere
        let orient = Array2::zeros((114, 114));
        let freq = ridge_freq(&plane, &mask, &orient, 38, 5, 5.0, 15.0);
        assert!(
            (freq.scalar - 0.1).abs() < 0.015,
            "scalar frequency {}",
            freq.scalar
        );
        assert!(freq.field[[57, 57]] > 0.0);
    }

    #[test]
    fn flat_block_has_zero_frequency() {
        let plane = Array2::from_elem((76, 76), 0.0f32);
        let mask = Array2::from_elem((76, 76), true);
        let orient = Array2::zeros((76, 76));
        let freq = ridge_freq(&plane, &mask, &orient, 38, 5, 5.0, 15.0);
        assert_eq!(freq.scalar, 0.0);
        assert!(freq.field.iter().all(|&f| f == 0.0));
    }

    #[test]
    fn wavelength_outside_bounds_is_rejected()
    {
        // period 30 exceeds max_wave_length 15
        let plane = Array2::from_shape_fn((76, 76), |(y, _)| (2.0 * PI * y as f32 / 30.0).cos());
        let mask = Array2::from_elem((76, 76), true);
        let orient = Array2::zeros((76, 76));
        let freq = ridge_freq(&plane, &mask, &orient, 38, 5, 5.0, 15.0);
        assert_eq!(freq.scalar, 0.0);
    }
}
