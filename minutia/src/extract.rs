//! Minutiae extraction by neighbour counting on the skeleton. A ridge pixel
//! with one 8-connected neighbour is an ending, one with three is a
//! bifurcation; everything else is plain ridge.

use ndarray::Array2;
use tracing::debug;

use crate::types::{Minutia, MinutiaKind};

/// True when the margin window around (y, x) stays fully inside the mask.
/// Minutiae failing this are boundary artifacts and are suppressed.
fn clears_margin(mask: &Array2<bool>, y: usize, x: usize, margin: usize) -> bool {
    let (h, w) = mask.dim();
    if y < margin || x < margin || y + margin >= h || x + margin >= w {
        return false;
    }
    for yy in y - margin..=y + margin {
        for xx in x - margin..=x + margin {
            if !mask[[yy, xx]] {
                return false;
            }
        }
    }
    true
}

pub fn extract_minutiae(
    skeleton: &Array2<bool>,
    mask: &Array2<bool>,
    orientation: &Array2<f32>,
    margin: usize,
) -> Vec<Minutia> {
    let (h, w) = skeleton.dim();
    let mut found = Vec::new();

    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            if !skeleton[[y, x]] || !mask[[y, x]] {
                continue;
            }
            let neighbours = [
                skeleton[[y - 1, x - 1]],
                skeleton[[y - 1, x]],
                skeleton[[y - 1, x + 1]],
                skeleton[[y, x - 1]],
                skeleton[[y, x + 1]],
                skeleton[[y + 1, x - 1]],
                skeleton[[y + 1, x]],
                skeleton[[y + 1, x + 1]],
            ];
            let count = neighbours.iter().filter(|&&v| v).count();
            let kind = match count {
                1 => MinutiaKind::Ending,
                3 => MinutiaKind::Bifurcation,
                _ => continue,
            };
            if !clears_margin(mask, y, x, margin) {
                continue;
            }
            found.push(Minutia {
                id: found.len().into(),
                y: y as i32,
                x: x as i32,
                angle: orientation[[y, x]],
                kind,
            });
        }
    }

    debug!(count = found.len(), "minutiae extracted");
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_mask(h: usize, w: usize) -> Array2<bool> {
        Array2::from_elem((h, w), true)
    }

    #[test]
    fn line_ends_are_endings() {
        let (h, w) = (40usize, 40usize);
        let mut skel = Array2::from_elem((h, w), false);
        for x in 10..30 {
            skel[[20, x]] = true;
        }
        let orientation = Array2::zeros((h, w));

        let minutiae = extract_minutiae(&skel, &full_mask(h, w), &orientation, 2);
        let endings: Vec<_> = minutiae
            .iter()
            .filter(|m| m.kind == MinutiaKind::Ending)
            .collect();
        assert_eq!(endings.len(), 2);
        let xs: Vec<i32> = endings.iter().map(|m| m.x).collect();
        assert!(xs.contains(&10) && xs.contains(&29));
        assert!(minutiae
            .iter()
            .all(|m| m.kind != MinutiaKind::Bifurcation));
    }

    #[test]
    fn t_junction_is_a_bifurcation() {
        let (h, w) = (40usize, 40usize);
        let mut skel = Array2::from_elem((h, w), false);
        for x in 10..30 {
            skel[[20, x]] = true;
        }
        for y in 21..32 {
            skel[[y, 20]] = true;
        }
        let orientation = Array2::zeros((h, w));

        let minutiae = extract_minutiae(&skel, &full_mask(h, w), &orientation, 2);
        let forks: Vec<_> = minutiae
            .iter()
            .filter(|m| m.kind == MinutiaKind::Bifurcation)
            .collect();
        // the junction pixel counts three neighbours; pixels touching the
        // junction may as well, so only the junction itself is pinned down
        assert!(!forks.is_empty());
        assert!(forks.iter().any(|m| (m.y, m.x) == (20, 20)));
    }

    #[test]
    fn margin_suppresses_boundary_artifacts() {
        let (h, w) = (40usize, 40usize);
        let mut skel = Array2::from_elem((h, w), false);
        for x in 5..35 {
            skel[[20, x]] = true;
        }
        // mask ends right at the line's left ending
        let mut mask = full_mask(h, w);
        for y in 0..h {
            for x in 0..8 {
                mask[[y, x]] = false;
            }
        }

        let minutiae = extract_minutiae(&skel, &mask, &orientation_plane(h, w), 3);
        let xs: Vec<i32> = minutiae.iter().map(|m| m.x).collect();
        assert!(!xs.contains(&5), "boundary ending must be suppressed");
        assert!(xs.contains(&34), "interior ending must survive");
    }

    fn orientation_plane(h: usize, w: usize) -> Array2<f32> {
        Array2::zeros((h, w))
    }

    #[test]
    fn ids_are_arena_positions() {
        let (h, w) = (30usize, 30usize);
        let mut skel = Array2::from_elem((h, w), false);
        for x in 5..25 {
            skel[[15, x]] = true;
        }
        let minutiae = extract_minutiae(&skel, &full_mask(h, w), &orientation_plane(h, w), 2);
        for (i, m) in minutiae.iter().enumerate() {
            assert_eq!(m.id.as_usize(), i);
        }
    }
}
