mod compliance;
mod domain;
pub mod recompute;

pub use compliance::{evaluate_compliance, evaluate_position_compliance};
pub use domain::{ComplianceResult, CourseRecord, CourseStatus, PositionSnapshot, PASSING_SCORE};
pub(crate) use domain::round2;
pub use recompute::{
    apply_updates, recompute_matrices, InMemoryMatrixStore, MatrixStore, MatrixUpdate,
    RecomputeSummary, StoreError,
};
