//! Oriented Gabor filter bank. One even-symmetric reference kernel is built
//! for the scalar ridge frequency and rotated over half a turn; every ROI
//! pixel picks the rotation closest to its local orientation.

use ndarray::Array2;
use rayon::prelude::*;

use crate::image::rotate_plane;
use crate::math::rad_to_deg;

pub(crate) struct GaborBank {
    kernels: Vec<Array2<f32>>,
    half: usize,
    angle_inc: usize,
}

impl GaborBank {
    pub(crate) fn build(frequency: f32, kx: f32, ky: f32, angle_inc: usize) -> GaborBank {
        let sigma_x = kx / frequency;
        let sigma_y = ky / frequency;
        let half = (3.0 * sigma_x.max(sigma_y)).ceil() as i32;
        let size = (2 * half + 1) as usize;

        let mut reference = Array2::zeros((size, size));
        for y in -half..=half {
            for x in -half..=half {
                let fx = x as f32;
                let fy = y as f32;
                let envelope =
                    (-((fx * fx) / (sigma_x * sigma_x) + (fy * fy) / (sigma_y * sigma_y)) / 2.0)
                        .exp();
                reference[[(y + half) as usize, (x + half) as usize]] =
                    envelope * (2.0 * std::f32::consts::PI * frequency * fx).cos();
            }
        }

        // the reference stripes stand at 90 degrees; kernel o covers
        // orientation o * angle_inc
        let count = 180 / angle_inc;
        let kernels = (0..count)
            .map(|o| {
                rotate_plane(
                    &reference,
                    (o * angle_inc) as f32 - 90.0,
                    Some(0.0),
                )
            })
            .collect();

        GaborBank {
            kernels,
            half: half as usize,
            angle_inc,
        }
    }

    pub(crate) fn kernel_count(&self) -> usize {
        self.kernels.len()
    }

    fn index_for(&self, orientation: f32) -> usize {
        let deg = rad_to_deg(orientation);
        let idx = (deg / self.angle_inc as f32).round() as isize;
        idx.rem_euclid(self.kernels.len() as isize) as usize
    }

    /// Filters every ROI pixel inside the safety inset and binarises the
    /// response against `threshold`.
    pub(crate) fn filter(
        &self,
        normalized: &Array2<f32>,
        orientation: &Array2<f32>,
        frequency: &Array2<f32>,
        threshold: f32,
    ) -> Array2<bool> {
        let (h, w) = normalized.dim();
        let half = self.half;
        if h < 2 * half + 1 || w < 2 * half + 1 {
            return Array2::from_elem((h, w), false);
        }

        let rows: Vec<Vec<bool>> = (0..h)
            .into_par_iter()
            .map(|y| {
                let mut row = vec![false; w];
                if y < half || y + half >= h {
                    return row;
                }
                for x in half..w - half {
                    if frequency[[y, x]] <= 0.0 {
                        continue;
                    }
                    let kernel = &self.kernels[self.index_for(orientation[[y, x]])];
                    let mut acc = 0.0;
                    for ky in 0..2 * half + 1 {
                        for kx in 0..2 * half + 1 {
                            acc += kernel[[ky, kx]] * normalized[[y + ky - half, x + kx - half]];
                        }
                    }
                    row[x] = acc < threshold;
                }
                row
            })
            .collect();

        let flat: Vec<bool> = rows.into_iter().flatten().collect();
        Array2::from_shape_vec((h, w), flat).expect("row-major rebuild")
    }
}
