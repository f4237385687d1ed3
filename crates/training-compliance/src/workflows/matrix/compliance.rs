use std::collections::HashSet;

use tracing::debug;

use super::domain::{round2, ComplianceResult, CourseRecord, PositionSnapshot};
use crate::workflows::normalizer::normalize_course_name;

/// Compares an employee's course history against a required-course list.
///
/// Every name on both sides goes through [`normalize_course_name`], so case,
/// spacing, and accent differences in legacy data do not create false gaps.
/// Required courses that collapse to the same normalized name count once,
/// keeping the first spelling. Missing courses keep the caller's order and
/// spelling. An empty requirement list is vacuously 100% compliant.
pub fn evaluate_compliance(
    history: &[CourseRecord],
    required_courses: &[String],
) -> ComplianceResult {
    let approved: HashSet<String> = history
        .iter()
        .filter(|record| record.is_approved())
        .map(|record| normalize_course_name(&record.course_name))
        .collect();
    let attempted: HashSet<String> = history
        .iter()
        .map(|record| normalize_course_name(&record.course_name))
        .collect();

    let mut seen = HashSet::new();
    let mut required_count = 0usize;
    let mut missing_courses = Vec::new();
    let mut failed_courses = Vec::new();
    let mut pending_courses = Vec::new();

    for course in required_courses {
        let normalized = normalize_course_name(course);
        if !seen.insert(normalized.clone()) {
            continue;
        }
        required_count += 1;

        if approved.contains(&normalized) {
            continue;
        }

        missing_courses.push(course.clone());
        if attempted.contains(&normalized) {
            failed_courses.push(course.clone());
        } else {
            pending_courses.push(course.clone());
        }
    }

    let completed_count = required_count - missing_courses.len();
    let compliance_percentage = if required_count > 0 {
        round2(completed_count as f64 / required_count as f64 * 100.0)
    } else {
        100.0
    };

    debug!(
        required_count,
        completed_count,
        missing = missing_courses.len(),
        compliance_percentage,
        "evaluated training compliance"
    );

    ComplianceResult {
        required_count,
        completed_count,
        missing_courses,
        failed_courses,
        pending_courses,
        compliance_percentage,
    }
}

pub fn evaluate_position_compliance(
    history: &[CourseRecord],
    position: &PositionSnapshot,
) -> ComplianceResult {
    evaluate_compliance(history, &position.required_courses)
}
