//! Tree strategy: walks both possible-common lists in (y, x) descending
//! order and grows a path of mutually compatible edges. Each accepted edge
//! becomes the "previous" edge for the next step's ratio and angle.

use crate::consts::{
    matching_angle_tolerance, matching_distance_tolerance, matching_ratio_tolerance,
    min_tree_depth,
};
use crate::fingerprint::Fingerprint;
use crate::math::angle_between_edges;
use crate::types::{EdgeDescriptor, Minutia, MinutiaId, Verdict};

/// Step widths tried when extending the tree, in preference order.
const EXTENSIONS: [(usize, usize); 3] = [(1, 1), (2, 1), (1, 2)];

fn sorted_points<'a>(fp: &'a Fingerprint, ids: &[MinutiaId]) -> Vec<&'a Minutia> {
    let mut points: Vec<&Minutia> = ids.iter().map(|&id| fp.minutia(id)).collect();
    points.sort_by(|a, b| (b.y, b.x).cmp(&(a.y, a.x)));
    points
}

/// Seed test: the two edges run into the same quadrant, diverge by no more
/// than the angle tolerance, and have nearly equal lengths.
fn seeds_agree(base: &EdgeDescriptor, input: &EdgeDescriptor) -> bool {
    base.quadrant == input.quadrant
        && angle_between_edges(base.slope, input.slope) <= matching_angle_tolerance()
        && (base.length - input.length).abs() <= matching_distance_tolerance()
}

/// Extension test: quadrants agree and both the turn angle and the length
/// ratio against the previous edge stay within tolerance of each other.
fn extensions_agree(base: &EdgeDescriptor, input: &EdgeDescriptor) -> bool {
    base.quadrant == input.quadrant
        && (base.angle - input.angle).abs() <= matching_angle_tolerance()
        && (base.ratio - input.ratio).abs() <= matching_ratio_tolerance()
}

pub(crate) fn tree_match(
    base: &Fingerprint,
    base_common: &[MinutiaId],
    input: &Fingerprint,
    input_common: &[MinutiaId],
) -> Verdict {
    let base_points = sorted_points(base, base_common);
    let input_points = sorted_points(input, input_common);
    if base_points.len() < 2 || input_points.len() < 2 {
        return Verdict::DontMatch;
    }

    for bi in 0..base_points.len() - 1 {
        let seed_base = EdgeDescriptor::new(base_points[bi], base_points[bi + 1], None);

        // the first agreeing pair along the sorted input list is the nearest
        let seed = (0..input_points.len() - 1).find_map(|ii| {
            let candidate = EdgeDescriptor::new(input_points[ii], input_points[ii + 1], None);
            if seeds_agree(&seed_base, &candidate) {
                Some((ii, candidate))
            } else {
                None
            }
        });
        let (ii, seed_input) = match seed {
            Some(found) => found,
            None => continue,
        };

        let mut prev_base = seed_base;
        let mut prev_input = seed_input;
        let mut base_pos = bi + 1;
        let mut input_pos = ii + 1;
        let mut depth = 1usize;

        'grow: loop {
            for &(db, di) in EXTENSIONS.iter() {
                let next_base = base_pos + db;
                let next_input = input_pos + di;
                if next_base >= base_points.len() || next_input >= input_points.len() {
                    continue;
                }
                let cand_base = EdgeDescriptor::new(
                    base_points[base_pos],
                    base_points[next_base],
                    Some(&prev_base),
                );
                let cand_input = EdgeDescriptor::new(
                    input_points[input_pos],
                    input_points[next_input],
                    Some(&prev_input),
                );
                if extensions_agree(&cand_base, &cand_input) {
                    prev_base = cand_base;
                    prev_input = cand_input;
                    base_pos = next_base;
                    input_pos = next_input;
                    depth += 1;
                    continue 'grow;
                }
            }
            break;
        }

        if depth >= min_tree_depth() {
            return Verdict::Match;
        }
    }

    Verdict::DontMatch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MinutiaKind;

    fn print_from(points: &[(i32, i32)]) -> Fingerprint {
        let minutiae: Vec<Minutia> = points
            .iter()
            .enumerate()
            .map(|(i, &(y, x))| Minutia {
                id: i.into(),
                y,
                x,
                angle: 0.0,
                kind: MinutiaKind::Ending,
            })
            .collect();
        Fingerprint::from_minutiae(minutiae)
    }

    fn all_ids(fp: &Fingerprint) -> Vec<MinutiaId> {
        fp.minutiae.iter().map(|m| m.id).collect()
    }

    #[test]
    fn identical_point_sets_grow_a_full_tree() {
        let points = [
            (200, 180),
            (180, 120),
            (150, 160),
            (130, 80),
            (100, 140),
            (70, 60),
            (40, 110),
        ];
        let fp = print_from(&points);
        let other = print_from(&points);
        assert_eq!(
            tree_match(&fp, &all_ids(&fp), &other, &all_ids(&other)),
            Verdict::Match
        );
    }

    #[test]
    fn shifted_point_sets_still_match() {
        // a pure translation preserves every edge exactly
        let points = [
            (200, 180),
            (180, 120),
            (150, 160),
            (130, 80),
            (100, 140),
            (70, 60),
            (40, 110),
        ];
        let shifted: Vec<(i32, i32)> = points.iter().map(|&(y, x)| (y + 9, x + 17)).collect();
        let fp = print_from(&points);
        let other = print_from(&shifted);
        assert_eq!(
            tree_match(&fp, &all_ids(&fp), &other, &all_ids(&other)),
            Verdict::Match
        );
    }

    #[test]
    fn unrelated_point_sets_stay_apart() {
        let a = print_from(&[
            (200, 180),
            (180, 120),
            (150, 160),
            (130, 80),
            (100, 140),
            (70, 60),
            (40, 110),
        ]);
        // collinear with growing gaps: no quadrant/length agreement survives
        let b = print_from(&[
            (400, 10),
            (380, 10),
            (354, 10),
            (320, 10),
            (276, 10),
            (219, 10),
            (145, 10),
        ]);
        assert_eq!(
            tree_match(&a, &all_ids(&a), &b, &all_ids(&b)),
            Verdict::DontMatch
        );
    }

    #[test]
    fn two_points_cannot_reach_tree_depth() {
        let a = print_from(&[(100, 100), (50, 50)]);
        let b = print_from(&[(100, 100), (50, 50)]);
        assert_eq!(
            tree_match(&a, &all_ids(&a), &b, &all_ids(&b)),
            Verdict::DontMatch
        );
    }
}
