use crate::workflows::calendar::serde_date;
use crate::workflows::lenient;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PERFORMANCE_MIN_SCORE: u32 = 80;
pub const DEFAULT_MATRIX_MIN_COVERAGE: u32 = 90;
pub const DEFAULT_EXAM_MIN_SCORE: u32 = 80;

pub(crate) fn default_performance_min_score() -> u32 {
    DEFAULT_PERFORMANCE_MIN_SCORE
}

pub(crate) fn default_matrix_min_coverage() -> u32 {
    DEFAULT_MATRIX_MIN_COVERAGE
}

pub(crate) fn default_exam_min_score() -> u32 {
    DEFAULT_EXAM_MIN_SCORE
}

/// Thresholds gating a move from `current_position` to `promotion_to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionRule {
    pub current_position: String,
    pub promotion_to: String,
    #[serde(default)]
    pub temporality_months: u32,
    #[serde(default = "default_exam_min_score")]
    pub exam_min_score: u32,
    #[serde(default = "default_matrix_min_coverage")]
    pub matrix_min_coverage: u32,
    #[serde(default = "default_performance_min_score")]
    pub performance_min_score: u32,
}

impl PromotionRule {
    pub fn new(current_position: impl Into<String>, promotion_to: impl Into<String>) -> Self {
        Self {
            current_position: current_position.into(),
            promotion_to: promotion_to.into(),
            temporality_months: 0,
            exam_min_score: DEFAULT_EXAM_MIN_SCORE,
            matrix_min_coverage: DEFAULT_MATRIX_MIN_COVERAGE,
            performance_min_score: DEFAULT_PERFORMANCE_MIN_SCORE,
        }
    }
}

/// One sitting of the promotion exam. Callers supply attempts in
/// chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamAttempt {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub score: f64,
    #[serde(default, deserialize_with = "lenient::bool_or_false")]
    pub passed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamStatus {
    Passed,
    Available,
    Waiting,
    Blocked,
}

impl ExamStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Passed => "Passed",
            Self::Available => "Available",
            Self::Waiting => "Waiting",
            Self::Blocked => "Blocked",
        }
    }
}

/// Whether the exam can be (re)taken and, if not, from when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamEligibility {
    pub can_take_exam: bool,
    #[serde(default, with = "serde_date::option")]
    pub next_date: Option<NaiveDate>,
    pub reason: String,
    pub status: ExamStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceCriterion {
    pub met: bool,
    pub current: f64,
    pub required: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalityCriterion {
    pub met: bool,
    /// Calendar months in the current position.
    pub current: u32,
    pub required: u32,
    #[serde(with = "serde_date::option")]
    pub position_start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixCriterion {
    pub met: bool,
    pub current: f64,
    pub required: u32,
    /// Set when the stored percentage was replaced by a count from history.
    pub recomputed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamCriterion {
    pub met: bool,
    /// Score of the most recent attempt, if any.
    pub current: Option<f64>,
    pub required: u32,
    pub attempts: usize,
    pub schedule: ExamEligibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallEligibility {
    pub eligible: bool,
    pub met_count: u8,
    pub total: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityResult {
    pub performance: PerformanceCriterion,
    pub temporality: TemporalityCriterion,
    pub matrix: MatrixCriterion,
    pub exam: ExamCriterion,
    pub overall: OverallEligibility,
}

impl EligibilityResult {
    /// Criterion names that are not met, in display order.
    pub fn unmet_criteria(&self) -> Vec<&'static str> {
        [
            ("performance", self.performance.met),
            ("temporality", self.temporality.met),
            ("matrix", self.matrix.met),
            ("exam", self.exam.met),
        ]
        .into_iter()
        .filter(|(_, met)| !met)
        .map(|(name, _)| name)
        .collect()
    }
}
