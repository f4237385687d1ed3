//! Promotion eligibility: performance, tenure, matrix coverage, and exam
//! criteria, plus exam retake scheduling and rule-table import.

mod domain;
mod eligibility;
mod exam;
pub mod rules;

pub use domain::{
    EligibilityResult, ExamAttempt, ExamCriterion, ExamEligibility, ExamStatus, MatrixCriterion,
    OverallEligibility, PerformanceCriterion, PromotionRule, TemporalityCriterion,
    DEFAULT_EXAM_MIN_SCORE, DEFAULT_MATRIX_MIN_COVERAGE, DEFAULT_PERFORMANCE_MIN_SCORE,
};
pub use eligibility::{evaluate_eligibility, find_rule};
pub use exam::exam_eligibility;
pub use rules::{PromotionRuleImporter, RuleImportError};
