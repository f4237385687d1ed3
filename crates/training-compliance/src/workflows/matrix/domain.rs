use crate::workflows::lenient;
use serde::{Deserialize, Serialize};

/// Minimum score that counts as a pass when a history entry is ingested.
pub const PASSING_SCORE: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    Approved,
    Failed,
}

impl CourseStatus {
    pub fn from_score(score: f64) -> Self {
        if score >= PASSING_SCORE {
            Self::Approved
        } else {
            Self::Failed
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::Failed => "Failed",
        }
    }
}

/// One entry of an employee's course history. The status is fixed when the
/// record is ingested and is never re-derived from the score afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    pub course_name: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub score: f64,
    pub status: CourseStatus,
}

impl CourseRecord {
    /// Builds a record from raw upload values: uppercases and trims the name,
    /// clamps the score into `[0, 100]`, and derives the status.
    pub fn ingest(course_name: &str, date: &str, score: f64) -> Self {
        let score = if score.is_finite() {
            score.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let course_name = course_name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();

        Self {
            course_name,
            date: date.trim().to_string(),
            score,
            status: CourseStatus::from_score(score),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status == CourseStatus::Approved
    }
}

/// A position and the courses its holders must pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSnapshot {
    pub name: String,
    #[serde(default, deserialize_with = "lenient::null_as_empty")]
    pub required_courses: Vec<String>,
}

/// Coverage of a position's required courses, stored on the employee record
/// under its `matrix` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResult {
    pub required_count: usize,
    pub completed_count: usize,
    pub missing_courses: Vec<String>,
    pub failed_courses: Vec<String>,
    pub pending_courses: Vec<String>,
    pub compliance_percentage: f64,
}

impl ComplianceResult {
    pub fn is_fully_compliant(&self) -> bool {
        self.missing_courses.is_empty()
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
