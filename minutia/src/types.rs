use std::fmt;

use crate::math::{angle_between_edges, edge_slope, euclidean, round2, Slope};

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MinutiaKind {
    /// Ridge ending: a skeleton pixel with exactly one 8-connected neighbour.
    Ending,
    /// Ridge bifurcation: a skeleton pixel with exactly three 8-connected neighbours.
    Bifurcation,
}

/// Represents a type-safe index of a minutia in the fingerprint's minutiae arena.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct MinutiaId(pub(crate) u32);

impl fmt::Debug for MinutiaId {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl MinutiaId {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for MinutiaId {
    fn from(index: usize) -> MinutiaId {
        MinutiaId(index as u32)
    }
}

/// Represents a single minutia. Created by the extractor, immutable thereafter.
#[derive(Debug, Clone, Copy)]
pub struct Minutia {
    /// Arena index inside the owning fingerprint.
    pub id: MinutiaId,
    /// Row coordinate.
    pub y: i32,
    /// Column coordinate.
    pub x: i32,
    /// Ridge tangent at the point, radians modulo pi.
    pub angle: f32,
    /// Type of the minutia.
    pub kind: MinutiaKind,
}

/// Direction class from one point to another, partitioned by the sign of
/// (dy, dx). Row coordinates grow downwards, so "up" means dy < 0.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Quadrant {
    /// Up-right.
    Q1,
    /// Up-left.
    Q2,
    /// Down-left.
    Q3,
    /// Down-right.
    Q4,
}

impl Quadrant {
    /// dy < 0 is up, dx > 0 is right; the zero axes fall on (down, left).
    pub fn classify(dy: i32, dx: i32) -> Quadrant {
        if dy < 0 {
            if dx > 0 {
                Quadrant::Q1
            } else {
                Quadrant::Q2
            }
        } else if dx <= 0 {
            Quadrant::Q3
        } else {
            Quadrant::Q4
        }
    }
}

/// Directed relation between two minutiae. Endpoints are referenced by arena
/// identity, never owned.
#[derive(Debug, Clone, Copy)]
pub struct EdgeDescriptor {
    pub from: MinutiaId,
    pub to: MinutiaId,
    /// Origin position (y, x).
    pub src: (i32, i32),
    /// Destination position (y, x).
    pub dst: (i32, i32),
    pub from_kind: MinutiaKind,
    pub to_kind: MinutiaKind,
    /// Euclidean length, rounded to two decimals.
    pub length: f32,
    pub quadrant: Quadrant,
    /// max(len, prev_len) / min(len, prev_len); 1 when there is no preceding edge.
    pub ratio: f32,
    /// Angle against the preceding edge in degrees, folded into [0, 90];
    /// 0 when there is no preceding edge.
    pub angle: f32,
    pub(crate) slope: Slope,
}

impl EdgeDescriptor {
    /// Builds the directed edge `from -> to`, chaining ratio and angle to
    /// `previous` when the edge extends an existing path.
    pub fn new(from: &Minutia, to: &Minutia, previous: Option<&EdgeDescriptor>) -> EdgeDescriptor {
        let src = (from.y, from.x);
        let dst = (to.y, to.x);
        let length = round2(euclidean(src, dst));
        let slope = edge_slope(src, dst);

        let (ratio, angle) = match previous {
            Some(prev) => {
                let (a, b) = if prev.length < length {
                    (length, prev.length)
                } else {
                    (prev.length, length)
                };
                let ratio = if b > 0.0 { a / b } else { 1.0 };
                (round2(ratio), round2(angle_between_edges(prev.slope, slope)))
            }
            None => (1.0, 0.0),
        };

        EdgeDescriptor {
            from: from.id,
            to: to.id,
            src,
            dst,
            from_kind: from.kind,
            to_kind: to.kind,
            length,
            quadrant: Quadrant::classify(dst.0 - src.0, dst.1 - src.1),
            ratio,
            angle,
            slope,
        }
    }
}

/// Ordered collection of edges from one minutia to its nearest neighbours,
/// sorted by ascending length.
#[derive(Debug, Clone)]
pub struct LocalStructure {
    pub center: MinutiaId,
    pub edges: Vec<EdgeDescriptor>,
}

/// Outcome of a match invocation. The discriminants are the stable return
/// codes of the external interface.
#[repr(i32)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verdict {
    FingerprintOk = 0,
    PoorQuality = 1,
    FewMinutiae = 2,
    VoidFingerprint = 3,
    DontMatch = 4,
    Match = 5,
    WrongAngles = 6,
}

impl Verdict {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Human-readable form of a verdict, for the presentation layer.
pub fn verdict_message(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::FingerprintOk => "fingerprint acquired",
        Verdict::PoorQuality => "image quality below the configured floor",
        Verdict::FewMinutiae => "too few minutiae after enhancement",
        Verdict::VoidFingerprint => "void fingerprint: empty image or empty region of interest",
        Verdict::DontMatch => "fingerprints do not match",
        Verdict::Match => "fingerprints match",
        Verdict::WrongAngles => "inconsistent triangle angle geometry",
    }
}
