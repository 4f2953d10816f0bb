//! Matching strategies over two analyzed fingerprints. All strategies share
//! the common-point prelude; state never outlives one invocation.

use std::str::FromStr;

use tracing::debug;

use crate::consts::{
    core_distance_tolerance, local_angle_tolerance, local_ratio_tolerance, min_common_points,
    min_minutiae, quality_floor,
};
use crate::fingerprint::Fingerprint;
use crate::types::{EdgeDescriptor, MinutiaId, Verdict};

mod tree;

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum MatchMode {
    /// Decide on the size of the common-point set alone.
    Original,
    /// Grow matching edge trees over the common points.
    Tree,
    /// Check core-point alignment first, then decide as Original.
    Core,
    /// Core, falling back to Tree when cores disagree.
    Combined,
}

impl FromStr for MatchMode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "original" => Ok(MatchMode::Original),
            "tree" => Ok(MatchMode::Tree),
            "core" => Ok(MatchMode::Core),
            "combined" => Ok(MatchMode::Combined),
            _ => Err("invalid match mode"),
        }
    }
}

/// Possible common points of both prints, pairwise: `base[i]` was matched
/// against `input[i]`.
pub(crate) struct CommonPoints {
    pub(crate) base: Vec<MinutiaId>,
    pub(crate) input: Vec<MinutiaId>,
}

fn descriptors_compatible(a: &EdgeDescriptor, b: &EdgeDescriptor) -> bool {
    (a.ratio - b.ratio).abs() <= local_ratio_tolerance()
        && (a.angle - b.angle).abs() <= local_angle_tolerance()
        && a.from_kind == b.from_kind
        && a.to_kind == b.to_kind
}

/// The shared prelude: pairs base minutiae with not-yet-matched input
/// minutiae of the same kind whose local structures agree on at least two
/// descriptors. Everything unmatched is spurious.
pub(crate) fn find_common_points(base: &Fingerprint, input: &Fingerprint) -> CommonPoints {
    let mut taken = vec![false; input.minutiae.len()];
    let mut common = CommonPoints {
        base: Vec::new(),
        input: Vec::new(),
    };

    for b in &base.minutiae {
        let b_structure = base.structure(b.id);
        for i in &input.minutiae {
            if taken[i.id.as_usize()] || b.kind != i.kind {
                continue;
            }
            let i_structure = input.structure(i.id);

            let mut pairs = 0;
            'product: for eb in &b_structure.edges {
                for ei in &i_structure.edges {
                    if descriptors_compatible(eb, ei) {
                        pairs += 1;
                        if pairs >= 2 {
                            break 'product;
                        }
                    }
                }
            }

            if pairs >= 2 {
                common.base.push(b.id);
                common.input.push(i.id);
                taken[i.id.as_usize()] = true;
                break;
            }
        }
    }

    debug!(
        base_common = common.base.len(),
        base_spurious = base.minutiae.len() - common.base.len(),
        input_spurious = input.minutiae.len() - common.input.len(),
        "common-point prelude done"
    );
    common
}

fn original_verdict(common: &CommonPoints) -> Verdict {
    if common.base.len() >= min_common_points() {
        Verdict::Match
    } else {
        Verdict::DontMatch
    }
}

/// Rough global alignment on the singular points: equal counts and nearby
/// centroids. Prints without any located core are vacuously aligned.
fn cores_aligned(base: &Fingerprint, input: &Fingerprint) -> bool {
    if base.core_points.len() != input.core_points.len() {
        return false;
    }
    if base.core_points.is_empty() {
        return true;
    }

    let centroid = |points: &[crate::core_points::CorePoint]| {
        let n = points.len() as f32;
        let y: f32 = points.iter().map(|p| p.y as f32).sum::<f32>() / n;
        let x: f32 = points.iter().map(|p| p.x as f32).sum::<f32>() / n;
        (y, x)
    };
    let (by, bx) = centroid(&base.core_points);
    let (iy, ix) = centroid(&input.core_points);
    ((by - iy).powi(2) + (bx - ix).powi(2)).sqrt() <= core_distance_tolerance()
}

/// Decides match / no-match between two fingerprints.
pub fn match_fingerprints(base: &Fingerprint, input: &Fingerprint, mode: MatchMode) -> Verdict {
    if base.is_void() || input.is_void() {
        return Verdict::VoidFingerprint;
    }
    if base.quality < quality_floor() || input.quality < quality_floor() {
        return Verdict::PoorQuality;
    }
    if base.minutiae.len() < min_minutiae() || input.minutiae.len() < min_minutiae() {
        return Verdict::FewMinutiae;
    }

    let common = find_common_points(base, input);
    if common.base.is_empty() || common.input.is_empty() {
        return Verdict::DontMatch;
    }

    match mode {
        MatchMode::Original => original_verdict(&common),
        MatchMode::Tree => tree::tree_match(base, &common.base, input, &common.input),
        MatchMode::Core => {
            if cores_aligned(base, input) {
                original_verdict(&common)
            } else {
                Verdict::DontMatch
            }
        }
        MatchMode::Combined => {
            let first = if cores_aligned(base, input) {
                original_verdict(&common)
            } else {
                Verdict::DontMatch
            };
            if first == Verdict::DontMatch {
                tree::tree_match(base, &common.base, input, &common.input)
            } else {
                first
            }
        }
    }
}
