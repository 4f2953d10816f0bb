use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

static LOCAL_RATIO_TOLERANCE: AtomicU32 = AtomicU32::new(0.1f32.to_bits());
static LOCAL_ANGLE_TOLERANCE: AtomicU32 = AtomicU32::new(1.0f32.to_bits());
static MATCHING_ANGLE_TOLERANCE: AtomicU32 = AtomicU32::new(1.5f32.to_bits());
static MATCHING_DISTANCE_TOLERANCE: AtomicU32 = AtomicU32::new(5.0f32.to_bits());
static MATCHING_RATIO_TOLERANCE: AtomicU32 = AtomicU32::new(0.5f32.to_bits());
static QUALITY_FLOOR: AtomicU32 = AtomicU32::new(0.3f32.to_bits());
static NEIGHBOUR_RADIUS: AtomicU32 = AtomicU32::new(1500.0f32.to_bits());
static CORE_DISTANCE_TOLERANCE: AtomicU32 = AtomicU32::new(50.0f32.to_bits());
static MIN_MINUTIAE: AtomicUsize = AtomicUsize::new(12);
static MIN_COMMON_POINTS: AtomicUsize = AtomicUsize::new(6);
static MIN_TREE_DEPTH: AtomicUsize = AtomicUsize::new(4);
static NEIGHBOUR_COUNT: AtomicUsize = AtomicUsize::new(5);

/// Tolerance on the ratio component when comparing local-structure edges.
pub fn local_ratio_tolerance() -> f32 {
    f32::from_bits(LOCAL_RATIO_TOLERANCE.load(Ordering::Relaxed))
}

pub fn set_local_ratio_tolerance(x: f32) {
    LOCAL_RATIO_TOLERANCE.store(x.to_bits(), Ordering::SeqCst)
}

/// Tolerance in degrees on the angle component when comparing local-structure edges.
pub fn local_angle_tolerance() -> f32 {
    f32::from_bits(LOCAL_ANGLE_TOLERANCE.load(Ordering::Relaxed))
}

pub fn set_local_angle_tolerance(x: f32) {
    LOCAL_ANGLE_TOLERANCE.store(x.to_bits(), Ordering::SeqCst)
}

/// Tolerance in degrees when comparing edges in the tree strategy.
pub fn matching_angle_tolerance() -> f32 {
    f32::from_bits(MATCHING_ANGLE_TOLERANCE.load(Ordering::Relaxed))
}

pub fn set_matching_angle_tolerance(x: f32) {
    MATCHING_ANGLE_TOLERANCE.store(x.to_bits(), Ordering::SeqCst)
}

/// Tolerance in pixels on edge lengths when seeding a tree.
pub fn matching_distance_tolerance() -> f32 {
    f32::from_bits(MATCHING_DISTANCE_TOLERANCE.load(Ordering::Relaxed))
}

pub fn set_matching_distance_tolerance(x: f32) {
    MATCHING_DISTANCE_TOLERANCE.store(x.to_bits(), Ordering::SeqCst)
}

/// Tolerance on the length ratio against the previous edge when growing a tree.
pub fn matching_ratio_tolerance() -> f32 {
    f32::from_bits(MATCHING_RATIO_TOLERANCE.load(Ordering::Relaxed))
}

pub fn set_matching_ratio_tolerance(x: f32) {
    MATCHING_RATIO_TOLERANCE.store(x.to_bits(), Ordering::SeqCst)
}

/// Lowest acceptable entropy-based quality index.
pub fn quality_floor() -> f32 {
    f32::from_bits(QUALITY_FLOOR.load(Ordering::Relaxed))
}

pub fn set_quality_floor(x: f32) {
    QUALITY_FLOOR.store(x.to_bits(), Ordering::SeqCst)
}

/// Maximum distance in pixels at which a minutia counts as a neighbour.
pub fn neighbour_radius() -> f32 {
    f32::from_bits(NEIGHBOUR_RADIUS.load(Ordering::Relaxed))
}

pub fn set_neighbour_radius(x: f32) {
    NEIGHBOUR_RADIUS.store(x.to_bits(), Ordering::SeqCst)
}

/// Maximum offset between core-point centroids accepted as global alignment.
pub fn core_distance_tolerance() -> f32 {
    f32::from_bits(CORE_DISTANCE_TOLERANCE.load(Ordering::Relaxed))
}

pub fn set_core_distance_tolerance(x: f32) {
    CORE_DISTANCE_TOLERANCE.store(x.to_bits(), Ordering::SeqCst)
}

/// Minimum number of extracted minutiae required before matching.
pub fn min_minutiae() -> usize {
    MIN_MINUTIAE.load(Ordering::Relaxed)
}

pub fn set_min_minutiae(n: usize) {
    MIN_MINUTIAE.store(n, Ordering::SeqCst)
}

/// Number of possible common points the original strategy requires for a match.
pub fn min_common_points() -> usize {
    MIN_COMMON_POINTS.load(Ordering::Relaxed)
}

pub fn set_min_common_points(n: usize) {
    MIN_COMMON_POINTS.store(n, Ordering::SeqCst)
}

/// Number of accepted edges the tree strategy requires for a match.
pub fn min_tree_depth() -> usize {
    MIN_TREE_DEPTH.load(Ordering::Relaxed)
}

pub fn set_min_tree_depth(n: usize) {
    MIN_TREE_DEPTH.store(n, Ordering::SeqCst)
}

/// Number of nearest neighbours collected into a local structure.
pub fn neighbour_count() -> usize {
    NEIGHBOUR_COUNT.load(Ordering::Relaxed)
}

pub fn set_neighbour_count(n: usize) {
    NEIGHBOUR_COUNT.store(n, Ordering::SeqCst)
}
