//! Binary morphology over the segmentation mask with an elliptical
//! structuring element.

use ndarray::Array2;

/// Elliptical structuring element inscribed in a `size` x `size` box.
pub(crate) fn elliptical_element(size: usize) -> Array2<bool> {
    let r = (size as f32 - 1.0) / 2.0;
    let ry = r.max(0.5);
    let rx = r.max(0.5);
    Array2::from_shape_fn((size, size), |(y, x)| {
        let dy = (y as f32 - r) / ry;
        let dx = (x as f32 - r) / rx;
        dy * dy + dx * dx <= 1.0 + 1e-6
    })
}

fn dilate(mask: &Array2<bool>, element: &Array2<bool>) -> Array2<bool> {
    let (h, w) = mask.dim();
    let (eh, ew) = element.dim();
    let hy = (eh / 2) as isize;
    let hx = (ew / 2) as isize;
    let mut out = Array2::from_elem((h, w), false);
    for y in 0..h as isize {
        for x in 0..w as isize {
            'probe: for ey in 0..eh as isize {
                for ex in 0..ew as isize {
                    if !element[[ey as usize, ex as usize]] {
                        continue;
                    }
                    let yy = y + ey - hy;
                    let xx = x + ex - hx;
                    if yy >= 0
                        && xx >= 0
                        && yy < h as isize
                        && xx < w as isize
                        && mask[[yy as usize, xx as usize]]
                    {
                        out[[y as usize, x as usize]] = true;
                        break 'probe;
                    }
                }
            }
        }
    }
    out
}

fn erode(mask: &Array2<bool>, element: &Array2<bool>) -> Array2<bool> {
    let (h, w) = mask.dim();
    let (eh, ew) = element.dim();
    let hy = (eh / 2) as isize;
    let hx = (ew / 2) as isize;
    let mut out = Array2::from_elem((h, w), true);
    for y in 0..h as isize {
        for x in 0..w as isize {
            'probe: for ey in 0..eh as isize {
                for ex in 0..ew as isize {
                    if !element[[ey as usize, ex as usize]] {
                        continue;
                    }
                    let yy = y + ey - hy;
                    let xx = x + ex - hx;
                    let on = yy >= 0
                        && xx >= 0
                        && yy < h as isize
                        && xx < w as isize
                        && mask[[yy as usize, xx as usize]];
                    if !on {
                        out[[y as usize, x as usize]] = false;
                        break 'probe;
                    }
                }
            }
        }
    }
    out
}

/// Open then close with an elliptical element of the given size; clears the
/// segmentation mask of isolated specks and pinholes.
pub fn open_close(mask: &Array2<bool>, element_size: usize) -> Array2<bool> {
    let element = elliptical_element(element_size.max(1));
    let opened = dilate(&erode(mask, &element), &element);
    erode(&dilate(&opened, &element), &element)
}
