//! Skeletonisation: Zhang-Suen thinning followed by a windowed spur prune
//! that clears stray fragments left near the mask boundary.

use ndarray::{s, Array2};

fn neighbours(img: &Array2<bool>, y: usize, x: usize) -> [bool; 8] {
    // p2..p9, clockwise from north
    [
        img[[y - 1, x]],
        img[[y - 1, x + 1]],
        img[[y, x + 1]],
        img[[y + 1, x + 1]],
        img[[y + 1, x]],
        img[[y + 1, x - 1]],
        img[[y, x - 1]],
        img[[y - 1, x - 1]],
    ]
}

fn transitions(n: &[bool; 8]) -> usize {
    (0..8).filter(|&i| !n[i] && n[(i + 1) % 8]).count()
}

/// Zhang-Suen thinning to a one-pixel-wide skeleton.
pub fn skeletonize(binary: &Array2<bool>) -> Array2<bool> {
    let (h, w) = binary.dim();
    let mut img = binary.clone();
    if h < 3 || w < 3 {
        return img;
    }

    let mut to_clear: Vec<(usize, usize)> = Vec::new();
    loop {
        let mut changed = false;
        for phase in 0..2 {
            to_clear.clear();
            for y in 1..h - 1 {
                for x in 1..w - 1 {
                    if !img[[y, x]] {
                        continue;
                    }
                    let n = neighbours(&img, y, x);
                    let count = n.iter().filter(|&&v| v).count();
                    if count < 2 || count > 6 || transitions(&n) != 1 {
                        continue;
                    }
                    // n[0]=N, n[2]=E, n[4]=S, n[6]=W
                    let ok = if phase == 0 {
                        (!n[0] || !n[2] || !n[4]) && (!n[2] || !n[4] || !n[6])
                    } else {
                        (!n[0] || !n[2] || !n[6]) && (!n[0] || !n[4] || !n[6])
                    };
                    if ok {
                        to_clear.push((y, x));
                    }
                }
            }
            for &(y, x) in to_clear.iter() {
                img[[y, x]] = false;
            }
            changed |= !to_clear.is_empty();
        }
        if !changed {
            break;
        }
    }
    img
}

/// Zeroes every 6x6 window with at least three empty 1-D border edges: such a
/// window holds at most a dangling spur, not a through-going ridge.
pub fn prune_spurs(skeleton: &Array2<bool>) -> Array2<bool> {
    const WINDOW: usize = 6;
    let (h, w) = skeleton.dim();
    let mut img = skeleton.clone();

    let mut ty = 0;
    while ty + WINDOW <= h {
        let mut tx = 0;
        while tx + WINDOW <= w {
            let top = (0..WINDOW).all(|i| !img[[ty, tx + i]]);
            let bottom = (0..WINDOW).all(|i| !img[[ty + WINDOW - 1, tx + i]]);
            let left = (0..WINDOW).all(|i| !img[[ty + i, tx]]);
            let right = (0..WINDOW).all(|i| !img[[ty + i, tx + WINDOW - 1]]);

            let empty_edges =
                top as usize + bottom as usize + left as usize + right as usize;
            if empty_edges >= 3 {
                img.slice_mut(s![ty..ty + WINDOW, tx..tx + WINDOW]).fill(false);
            }
            tx += WINDOW;
        }
        ty += WINDOW;
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thick_bar_thins_to_a_line() {
        let mut binary = Array2::from_elem((20, 40), false);
        for y in 8..12 {
            for x in 2..38 {
                binary[[y, x]] = true;
            }
        }
        let skel = skeletonize(&binary);

        // one pixel per column through the middle of the bar
        for x in 5..35 {
            let count = (8..12).filter(|&y| skel[[y, x]]).count();
            assert_eq!(count, 1, "column {} not thin", x);
        }
        // nothing appears outside the original bar
        for (idx, &v) in skel.indexed_iter() {
            if v {
                assert!(idx.0 >= 8 && idx.0 < 12 && idx.1 >= 2 && idx.1 < 38);
            }
        }
    }

    #[test]
    fn single_pixel_line_is_stable() {
        let mut binary = Array2::from_elem((10, 30), false);
        for x in 1..29 {
            binary[[5, x]] = true;
        }
        let skel = skeletonize(&binary);
        for x in 2..28 {
            assert!(skel[[5, x]]);
        }
    }

    #[test]
    fn isolated_fragment_is_pruned() {
        let mut skel = Array2::from_elem((24, 24), false);
        // short spur entirely inside one window
        skel[[8, 8]] = true;
        skel[[8, 9]] = true;
        skel[[9, 9]] = true;

        let pruned = prune_spurs(&skel);
        assert!(pruned.iter().all(|&v| !v));
    }

    #[test]
    fn through_going_line_survives_pruning() {
        let mut skel = Array2::from_elem((24, 24), false);
        for x in 0..24 {
            skel[[13, x]] = true;
        }
        let pruned = prune_spurs(&skel);
        for x in 0..24 {
            assert!(pruned[[13, x]], "lost line pixel at {}", x);
        }
    }
}
