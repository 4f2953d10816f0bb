//! The fingerprint aggregate: one raw capture plus everything derived from
//! it. Derived fields are owned exclusively; edges refer to minutiae through
//! arena identities only.

use std::path::Path;

use ndarray::Array2;
use tracing::debug;

use crate::core_points::{find_core_points, CorePoint};
use crate::descriptors::build_local_structures;
use crate::enhance::{enhance, EnhanceOptions};
use crate::extract::extract_minutiae;
use crate::image::plane_from_raw;
use crate::quality::QualityScorer;
use crate::types::{LocalStructure, Minutia, MinutiaId};

/// Minutiae this close to the mask boundary are discarded as artifacts.
pub const BORDER_MARGIN: usize = 10;

/// Grid step of the core-point scan.
const CORE_SCAN_STEP: usize = 8;

pub struct Fingerprint {
    pub raw: Array2<u8>,
    pub normalized: Array2<f32>,
    pub stddev: Array2<f32>,
    pub orientation: Array2<f32>,
    /// Cleaned-up ROI mask.
    pub mask: Array2<bool>,
    /// Binarised Gabor response.
    pub binary: Array2<bool>,
    pub skeleton: Array2<bool>,
    /// Arena of minutiae; `MinutiaId` values index into it.
    pub minutiae: Vec<Minutia>,
    /// Local structure per arena slot, same order as `minutiae`.
    pub structures: Vec<LocalStructure>,
    pub core_points: Vec<CorePoint>,
    /// Entropy-based quality index.
    pub quality: f32,
    /// Mean block deviation from segmentation.
    pub mean_stddev: f32,
}

impl Fingerprint {
    /// Runs the full pipeline on a raw capture. `bank_dir` points at the
    /// directory keeping the persisted ring-filter bank, if any.
    pub fn analyze(raw: Array2<u8>, opts: &EnhanceOptions, bank_dir: Option<&Path>) -> Fingerprint {
        let gray = plane_from_raw(&raw);
        let (h, w) = gray.dim();

        let enhanced = enhance(&gray, opts);

        let scorer = QualityScorer::new(h, w, bank_dir);
        let quality = scorer.score(&enhanced.normalized);

        let mut minutiae = extract_minutiae(
            &enhanced.skeleton,
            &enhanced.mask,
            &enhanced.orientation,
            BORDER_MARGIN,
        );
        reindex(&mut minutiae);
        let structures = build_local_structures(&minutiae);
        let core_points = find_core_points(&enhanced.orientation, &enhanced.mask, CORE_SCAN_STEP);

        debug!(
            minutiae = minutiae.len(),
            cores = core_points.len(),
            quality,
            "fingerprint analyzed"
        );

        Fingerprint {
            raw,
            normalized: enhanced.normalized,
            stddev: enhanced.stddev,
            orientation: enhanced.orientation,
            mask: enhanced.mask,
            binary: enhanced.binary,
            skeleton: enhanced.skeleton,
            minutiae,
            structures,
            core_points,
            quality,
            mean_stddev: enhanced.mean_stddev,
        }
    }

    /// Builds a fingerprint straight from a minutiae list, as loaded from a
    /// template. No image planes are attached and the quality index is taken
    /// as acceptable.
    pub fn from_minutiae(mut minutiae: Vec<Minutia>) -> Fingerprint {
        reindex(&mut minutiae);
        let structures = build_local_structures(&minutiae);
        Fingerprint {
            raw: Array2::zeros((0, 0)),
            normalized: Array2::zeros((0, 0)),
            stddev: Array2::zeros((0, 0)),
            orientation: Array2::zeros((0, 0)),
            mask: Array2::from_elem((0, 0), false),
            binary: Array2::from_elem((0, 0), false),
            skeleton: Array2::from_elem((0, 0), false),
            minutiae,
            structures,
            core_points: Vec::new(),
            quality: 1.0,
            mean_stddev: 0.0,
        }
    }

    pub fn minutia(&self, id: MinutiaId) -> &Minutia {
        &self.minutiae[id.as_usize()]
    }

    pub fn structure(&self, id: MinutiaId) -> &LocalStructure {
        &self.structures[id.as_usize()]
    }

    /// Void capture: an all-zero raw image, or an image whose ROI came out
    /// empty. Template-built fingerprints carry no planes and are never void.
    pub fn is_void(&self) -> bool {
        if self.raw.len() > 0 && self.raw.iter().all(|&v| v == 0) {
            return true;
        }
        self.mask.len() > 0 && self.mask.iter().all(|&m| !m)
    }
}

fn reindex(minutiae: &mut [Minutia]) {
    for (index, m) in minutiae.iter_mut().enumerate() {
        m.id = index.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MinutiaKind;

    #[test]
    fn template_fingerprints_reindex_their_arena() {
        let minutiae = vec![
            Minutia {
                id: MinutiaId(7),
                y: 10,
                x: 10,
                angle: 0.0,
                kind: MinutiaKind::Ending,
            },
            Minutia {
                id: MinutiaId(3),
                y: 40,
                x: 40,
                angle: 0.5,
                kind: MinutiaKind::Bifurcation,
            },
        ];
        let fp = Fingerprint::from_minutiae(minutiae);
        assert_eq!(fp.minutiae[0].id.as_usize(), 0);
        assert_eq!(fp.minutiae[1].id.as_usize(), 1);
        assert_eq!(fp.structures.len(), 2);
        assert!(!fp.is_void());
    }

    #[test]
    fn all_zero_raw_is_void() {
        let fp = Fingerprint {
            raw: Array2::zeros((8, 8)),
            ..Fingerprint::from_minutiae(Vec::new())
        };
        assert!(fp.is_void());
    }
}
