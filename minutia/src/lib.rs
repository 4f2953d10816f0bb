pub use crate::core_points::{find_core_points, CoreKind, CorePoint};
pub use crate::descriptors::build_local_structures;
pub use crate::enhance::{enhance, EnhanceOptions, EnhancedImage};
pub use crate::extract::extract_minutiae;
pub use crate::fingerprint::{Fingerprint, BORDER_MARGIN};
pub use crate::matching::{match_fingerprints, MatchMode};
pub use crate::math::{round2, triangle_angles_consistent};
pub use crate::quality::{BankError, QualityScorer, RingBank, DEFAULT_FILTER_COUNT};
pub use crate::template::{load_template, save_template, TemplateError};
pub use crate::types::{
    verdict_message, EdgeDescriptor, LocalStructure, Minutia, MinutiaId, MinutiaKind, Quadrant,
    Verdict,
};

pub mod consts;
mod core_points;
mod descriptors;
pub mod enhance;
mod extract;
mod fingerprint;
pub mod image;
mod matching;
mod math;
mod quality;
mod template;
pub mod types;
