//! End-to-end pipeline checks over a synthetic ridge grating.

use ndarray::Array2;

use minutia::{match_fingerprints, EnhanceOptions, Fingerprint, MatchMode, Verdict};

/// A clean vertical-period grating confined to a central window, on a flat
/// background. Enough structure for segmentation, orientation and frequency
/// estimation to lock on.
fn synthetic_raw() -> Array2<u8> {
    Array2::from_shape_fn((288, 256), |(y, x)| {
        let inside = y >= 64 && y < 224 && x >= 48 && x < 208;
        if inside {
            let v = 128.0 + 100.0 * (2.0 * std::f32::consts::PI * y as f32 / 10.0).cos();
            v.round().max(0.0).min(255.0) as u8
        } else {
            128
        }
    })
}

#[test]
fn analyzed_print_upholds_the_structural_invariants() {
    let fp = Fingerprint::analyze(synthetic_raw(), &EnhanceOptions::default(), None);

    // the grating must be detected at all
    assert!(fp.skeleton.iter().any(|&v| v), "empty skeleton");
    assert!(fp.mask.iter().any(|&v| v), "empty mask");

    // no skeleton pixel outside the morphology mask
    for ((y, x), &v) in fp.skeleton.indexed_iter() {
        if v {
            assert!(fp.mask[[y, x]], "skeleton escapes mask at ({}, {})", y, x);
        }
    }

    // minutiae sit on the skeleton, inside the mask
    for m in &fp.minutiae {
        let (y, x) = (m.y as usize, m.x as usize);
        assert!(fp.mask[[y, x]], "minutia outside mask");
        assert!(fp.skeleton[[y, x]], "minutia off the skeleton");
    }

    // structures reference the arena consistently
    assert_eq!(fp.structures.len(), fp.minutiae.len());
    for (slot, structure) in fp.structures.iter().enumerate() {
        assert_eq!(structure.center.as_usize(), slot);
        for edge in &structure.edges {
            assert!(edge.to.as_usize() < fp.minutiae.len());
            assert!(edge.ratio >= 1.0);
            assert!(edge.angle >= 0.0 && edge.angle <= 90.0);
        }
    }

    // quality lives on the declared scale and a clean grating is not poor
    let ceiling = (15.0f32).ln();
    assert!(fp.quality >= 0.0 && fp.quality <= ceiling);
    assert!(fp.quality > 0.2, "grating quality {} too low", fp.quality);
}

#[test]
fn void_capture_is_reported_as_void() {
    let raw = Array2::zeros((288, 256));
    let fp = Fingerprint::analyze(raw, &EnhanceOptions::default(), None);
    let other = Fingerprint::analyze(synthetic_raw(), &EnhanceOptions::default(), None);
    assert_eq!(
        match_fingerprints(&fp, &other, MatchMode::Original),
        Verdict::VoidFingerprint
    );
}

#[test]
fn self_match_verdict_is_symmetric() {
    let fp = Fingerprint::analyze(synthetic_raw(), &EnhanceOptions::default(), None);
    let again = Fingerprint::analyze(synthetic_raw(), &EnhanceOptions::default(), None);
    assert_eq!(
        match_fingerprints(&fp, &again, MatchMode::Original),
        match_fingerprints(&again, &fp, MatchMode::Original)
    );
}
