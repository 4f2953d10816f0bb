//! Ridge orientation from smoothed gradient moments. The double angle is
//! smoothed componentwise so the field never wraps through the pi boundary.

use ndarray::Array2;

use crate::image::{convolve2d, gaussian_smooth};

/// Derivative-of-Gaussian kernels for the x and y image gradients.
fn gradient_kernels(sigma: f32) -> (Array2<f32>, Array2<f32>) {
    let half = (3.0 * sigma).round().max(1.0) as i32;
    let size = (2 * half + 1) as usize;
    let mut gauss = Array2::zeros((size, size));
    for y in -half..=half {
        for x in -half..=half {
            let r2 = (x * x + y * y) as f32;
            gauss[[(y + half) as usize, (x + half) as usize]] =
                (-r2 / (2.0 * sigma * sigma)).exp();
        }
    }

    // central differences of the Gaussian itself
    let mut fx = Array2::zeros((size, size));
    let mut fy = Array2::zeros((size, size));
    for y in 0..size {
        for x in 0..size {
            let xm = if x > 0 { gauss[[y, x - 1]] } else { 0.0 };
            let xp = if x + 1 < size { gauss[[y, x + 1]] } else { 0.0 };
            fx[[y, x]] = (xp - xm) / 2.0;
            let ym = if y > 0 { gauss[[y - 1, x]] } else { 0.0 };
            let yp = if y + 1 < size { gauss[[y + 1, x]] } else { 0.0 };
            fy[[y, x]] = (yp - ym) / 2.0;
        }
    }
    (fx, fy)
}

pub fn ridge_orient(
    normalized: &Array2<f32>,
    gradient_sigma: f32,
    block_sigma: f32,
    smooth_sigma: f32,
) -> Array2<f32> {
    let (fx, fy) = gradient_kernels(gradient_sigma);
    let gx = convolve2d(normalized, &fx);
    let gy = convolve2d(normalized, &fy);

    let gxx = gaussian_smooth(&(&gx * &gx), block_sigma);
    let gyy = gaussian_smooth(&(&gy * &gy), block_sigma);
    let gxy = gaussian_smooth(&(&gx * &gy), block_sigma).mapv(|v| 2.0 * v);

    let (h, w) = normalized.dim();
    let mut sin2 = Array2::zeros((h, w));
    let mut cos2 = Array2::zeros((h, w));
    for y in 0..h {
        for x in 0..w {
            let xy = gxy[[y, x]];
            let diff = gxx[[y, x]] - gyy[[y, x]];
            let denom = (xy * xy + diff * diff).sqrt() + f32::EPSILON;
            sin2[[y, x]] = xy / denom;
            cos2[[y, x]] = diff / denom;
        }
    }

    let sin2 = gaussian_smooth(&sin2, smooth_sigma);
    let cos2 = gaussian_smooth(&cos2, smooth_sigma);

    Array2::from_shape_fn((h, w), |(y, x)| {
        std::f32::consts::FRAC_PI_2 + sin2[[y, x]].atan2(cos2[[y, x]]) / 2.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn fold(angle: f32) -> f32 {
        angle.rem_euclid(PI)
    }

    #[test]
    fn horizontal_grating_orients_along_rows() {
        let plane = Array2::from_shape_fn((96, 96), |(y, _)| (2.0 * PI * y as f32 / 10.0).sin());
        let orient = ridge_orient(&plane, 1.0, 7.0, 7.0);
        // ridges run along x; the direction modulo pi is near 0 (or pi)
        let v = fold(orient[[48, 48]]);
        assert!(v < 0.15 || v > PI - 0.15, "orientation {}", v);
    }

    #[test]
    fn vertical_grating_orients_along_columns() {
        let plane = Array2::from_shape_fn((96, 96), |(_, x)| (2.0 * PI * x as f32 / 10.0).sin());
        let orient = ridge_orient(&plane, 1.0, 7.0, 7.0);
        let v = fold(orient[[48, 48]]);
        assert!((v - PI / 2.0).abs() < 0.15, "orientation {}", v);
    }
}
