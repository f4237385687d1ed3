//! Employee and position snapshots as exported from the document store.

use super::lenient;
use super::matrix::{ComplianceResult, CourseRecord, PositionSnapshot};
use super::promotion::ExamAttempt;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Everything the evaluators read about one employee. Missing fields in the
/// source document fall back to empty values rather than failing the load.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeSnapshot {
    #[serde(deserialize_with = "lenient::string_or_empty")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string_or_empty")]
    pub name: String,
    #[serde(deserialize_with = "lenient::string_or_empty")]
    pub position: String,
    #[serde(deserialize_with = "lenient::string_or_empty")]
    pub department: String,
    #[serde(deserialize_with = "lenient::number_or_none")]
    pub performance_score: Option<f64>,
    #[serde(deserialize_with = "lenient::string_or_none")]
    pub position_start_date: Option<String>,
    #[serde(deserialize_with = "lenient::null_as_empty")]
    pub history: Vec<CourseRecord>,
    pub matrix: Option<ComplianceResult>,
    #[serde(deserialize_with = "lenient::null_as_empty")]
    pub exam_attempts: Vec<ExamAttempt>,
}

#[derive(Debug)]
pub enum SnapshotError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::Io(err) => write!(f, "failed to read snapshot: {}", err),
            SnapshotError::Json(err) => write!(f, "invalid snapshot JSON: {}", err),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Io(err) => Some(err),
            SnapshotError::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SnapshotError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

pub fn load_employees<P: AsRef<Path>>(path: P) -> Result<Vec<EmployeeSnapshot>, SnapshotError> {
    let file = std::fs::File::open(path)?;
    employees_from_reader(file)
}

pub fn employees_from_reader<R: Read>(reader: R) -> Result<Vec<EmployeeSnapshot>, SnapshotError> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn load_positions<P: AsRef<Path>>(path: P) -> Result<Vec<PositionSnapshot>, SnapshotError> {
    let file = std::fs::File::open(path)?;
    positions_from_reader(file)
}

pub fn positions_from_reader<R: Read>(reader: R) -> Result<Vec<PositionSnapshot>, SnapshotError> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn find_employee<'a>(
    employees: &'a [EmployeeSnapshot],
    id: &str,
) -> Option<&'a EmployeeSnapshot> {
    let id = id.trim();
    employees.iter().find(|employee| employee.id == id)
}
