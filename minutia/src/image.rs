//! Conversions between 8-bit grayscale images and floating-point planes, and
//! the small convolution toolbox the enhancement stages are built from.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use ndarray::Array2;

/// Converts any decoded image to a grayscale plane. Non-grayscale inputs are
/// reduced by luminance first.
pub fn plane_from_dynamic(img: &DynamicImage) -> Array2<f32> {
    plane_from_gray(&img.to_luma8())
}

pub fn plane_from_gray(gray: &GrayImage) -> Array2<f32> {
    let (w, h) = gray.dimensions();
    Array2::from_shape_fn((h as usize, w as usize), |(y, x)| {
        gray.get_pixel(x as u32, y as u32)[0] as f32
    })
}

pub fn plane_from_raw(raw: &Array2<u8>) -> Array2<f32> {
    raw.mapv(|v| v as f32)
}

/// Renders a plane back to 8 bits, mapping its value range onto 0..=255.
pub fn gray_from_plane(plane: &Array2<f32>) -> GrayImage {
    let (h, w) = plane.dim();
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for &v in plane.iter() {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    let span = if hi > lo { hi - lo } else { 1.0 };

    GrayImage::from_fn(w as u32, h as u32, |x, y| {
        let v = (plane[[y as usize, x as usize]] - lo) / span;
        image::Luma([(v * 255.0).round() as u8])
    })
}

pub fn gray_from_mask(mask: &Array2<bool>) -> GrayImage {
    let (h, w) = mask.dim();
    GrayImage::from_fn(w as u32, h as u32, |x, y| {
        image::Luma([if mask[[y as usize, x as usize]] { 255 } else { 0 }])
    })
}

/// Rescales to `rows` image rows preserving aspect ratio.
pub fn resize_to_rows(gray: &GrayImage, rows: u32) -> GrayImage {
    let (w, h) = gray.dimensions();
    if h == rows || h == 0 {
        return gray.clone();
    }
    let cols = ((w as f32) * (rows as f32) / (h as f32)).round().max(1.0) as u32;
    image::imageops::resize(gray, cols, rows, FilterType::Triangle)
}

/// One-dimensional Gaussian taps, unit sum, half width ceil(3 sigma).
pub(crate) fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let half = (3.0 * sigma).ceil().max(1.0) as i32;
    let mut taps = Vec::with_capacity((2 * half + 1) as usize);
    let mut sum = 0.0;
    for i in -half..=half {
        let v = (-((i * i) as f32) / (2.0 * sigma * sigma)).exp();
        taps.push(v);
        sum += v;
    }
    for t in taps.iter_mut() {
        *t /= sum;
    }
    taps
}

fn clamp_index(i: isize, len: usize) -> usize {
    if i < 0 {
        0
    } else if i as usize >= len {
        len - 1
    } else {
        i as usize
    }
}

pub(crate) fn convolve_rows(plane: &Array2<f32>, taps: &[f32]) -> Array2<f32> {
    let (h, w) = plane.dim();
    let half = (taps.len() / 2) as isize;
    let mut out = Array2::zeros((h, w));
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0;
            for (k, &t) in taps.iter().enumerate() {
                let xx = clamp_index(x as isize + k as isize - half, w);
                acc += t * plane[[y, xx]];
            }
            out[[y, x]] = acc;
        }
    }
    out
}

pub(crate) fn convolve_cols(plane: &Array2<f32>, taps: &[f32]) -> Array2<f32> {
    let (h, w) = plane.dim();
    let half = (taps.len() / 2) as isize;
    let mut out = Array2::zeros((h, w));
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0;
            for (k, &t) in taps.iter().enumerate() {
                let yy = clamp_index(y as isize + k as isize - half, h);
                acc += t * plane[[yy, x]];
            }
            out[[y, x]] = acc;
        }
    }
    out
}

pub(crate) fn gaussian_smooth(plane: &Array2<f32>, sigma: f32) -> Array2<f32> {
    let taps = gaussian_kernel(sigma);
    convolve_cols(&convolve_rows(plane, &taps), &taps)
}

/// Full 2-D correlation with clamped borders, same output shape.
pub(crate) fn convolve2d(plane: &Array2<f32>, kernel: &Array2<f32>) -> Array2<f32> {
    let (h, w) = plane.dim();
    let (kh, kw) = kernel.dim();
    let hy = (kh / 2) as isize;
    let hx = (kw / 2) as isize;
    let mut out = Array2::zeros((h, w));
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0;
            for ky in 0..kh {
                let yy = clamp_index(y as isize + ky as isize - hy, h);
                for kx in 0..kw {
                    let xx = clamp_index(x as isize + kx as isize - hx, w);
                    acc += kernel[[ky, kx]] * plane[[yy, xx]];
                }
            }
            out[[y, x]] = acc;
        }
    }
    out
}

/// Rotates about the centre with bilinear sampling, same output shape.
/// Samples outside the source are taken from `fill`, or clamped to the border
/// when `fill` is `None`.
pub(crate) fn rotate_plane(plane: &Array2<f32>, degrees: f32, fill: Option<f32>) -> Array2<f32> {
    let (h, w) = plane.dim();
    let rad = degrees.to_radians();
    let (sin, cos) = rad.sin_cos();
    let cy = (h as f32 - 1.0) / 2.0;
    let cx = (w as f32 - 1.0) / 2.0;

    let sample = |y: f32, x: f32| -> f32 {
        if let Some(v) = fill {
            if y < 0.0 || x < 0.0 || y > (h - 1) as f32 || x > (w - 1) as f32 {
                return v;
            }
        }
        let yc = y.max(0.0).min((h - 1) as f32);
        let xc = x.max(0.0).min((w - 1) as f32);
        let y0 = yc.floor() as usize;
        let x0 = xc.floor() as usize;
        let y1 = (y0 + 1).min(h - 1);
        let x1 = (x0 + 1).min(w - 1);
        let fy = yc - y0 as f32;
        let fx = xc - x0 as f32;
        let top = plane[[y0, x0]] * (1.0 - fx) + plane[[y0, x1]] * fx;
        let bot = plane[[y1, x0]] * (1.0 - fx) + plane[[y1, x1]] * fx;
        top * (1.0 - fy) + bot * fy
    };

    Array2::from_shape_fn((h, w), |(y, x)| {
        let dy = y as f32 - cy;
        let dx = x as f32 - cx;
        // inverse mapping back into the source
        let sy = cy + dy * cos - dx * sin;
        let sx = cx + dy * sin + dx * cos;
        sample(sy, sx)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_taps_sum_to_one() {
        for &sigma in [0.5f32, 1.0, 7.0].iter() {
            let taps = gaussian_kernel(sigma);
            let sum: f32 = taps.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
            assert_eq!(taps.len() % 2, 1);
        }
    }

    #[test]
    fn smoothing_preserves_constant_planes() {
        let plane = Array2::from_elem((16, 16), 3.5f32);
        let smoothed = gaussian_smooth(&plane, 2.0);
        for &v in smoothed.iter() {
            assert!((v - 3.5).abs() < 1e-4);
        }
    }

    #[test]
    fn quarter_turn_moves_rows_to_columns() {
        let mut plane = Array2::zeros((11, 11));
        for x in 0..11 {
            plane[[5, x]] = 1.0;
        }
        let turned = rotate_plane(&plane, 90.0, Some(0.0));
        // the centre row becomes the centre column
        for y in 1..10 {
            assert!(turned[[y, 5]] > 0.5, "column pixel {} lost", y);
        }
    }

    #[test]
    fn resize_preserves_aspect() {
        let gray = GrayImage::new(128, 144);
        let resized = resize_to_rows(&gray, 350);
        assert_eq!(resized.height(), 350);
        assert_eq!(resized.width(), (128.0f32 * 350.0 / 144.0).round() as u32);
    }
}
