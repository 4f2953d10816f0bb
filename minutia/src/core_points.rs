//! Singular points of the orientation field. The Poincare index is summed
//! around a small ring; a half-turn marks a core, a negative half-turn a
//! delta.

use ndarray::Array2;
use std::f32::consts::PI;
use tracing::debug;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoreKind {
    Core,
    Delta,
}

#[derive(Clone, Copy, Debug)]
pub struct CorePoint {
    pub y: usize,
    pub x: usize,
    pub kind: CoreKind,
}

/// Wraps an orientation difference into (-pi/2, pi/2].
fn wrap_half(mut delta: f32) -> f32 {
    while delta > PI / 2.0 {
        delta -= PI;
    }
    while delta <= -PI / 2.0 {
        delta += PI;
    }
    delta
}

/// Scans the field on a grid of `step` pixels and reports ring sums close to
/// plus or minus pi. Detections closer than `step` to an accepted one are
/// dropped as duplicates.
pub fn find_core_points(
    orientation: &Array2<f32>,
    mask: &Array2<bool>,
    step: usize,
) -> Vec<CorePoint> {
    let (h, w) = orientation.dim();
    let r = step.max(2);
    let mut found: Vec<CorePoint> = Vec::new();

    if h <= 2 * r || w <= 2 * r {
        return found;
    }

    // ring of eight samples around the probe point
    let ring: [(isize, isize); 8] = [
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (0, 1),
        (1, 1),
        (1, 0),
        (1, -1),
        (0, -1),
    ];

    let mut y = r;
    while y < h - r {
        let mut x = r;
        while x < w - r {
            if mask[[y, x]] {
                let samples: Vec<f32> = ring
                    .iter()
                    .map(|&(dy, dx)| {
                        orientation[[
                            (y as isize + dy * r as isize) as usize,
                            (x as isize + dx * r as isize) as usize,
                        ]]
                    })
                    .collect();

                let mut index = 0.0;
                for i in 0..8 {
                    index += wrap_half(samples[(i + 1) % 8] - samples[i]);
                }

                let kind = if (index - PI).abs() < PI / 4.0 {
                    Some(CoreKind::Core)
                } else if (index + PI).abs() < PI / 4.0 {
                    Some(CoreKind::Delta)
                } else {
                    None
                };

                if let Some(kind) = kind {
                    let duplicate = found.iter().any(|p| {
                        let dy = p.y as isize - y as isize;
                        let dx = p.x as isize - x as isize;
                        ((dy * dy + dx * dx) as f32).sqrt() < (2 * r) as f32
                    });
                    if !duplicate {
                        found.push(CorePoint { y, x, kind });
                    }
                }
            }
            x += r;
        }
        y += r;
    }

    debug!(count = found.len(), "core points located");
    found
}
