use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::domain::{
    EligibilityResult, ExamCriterion, MatrixCriterion, OverallEligibility, PerformanceCriterion,
    PromotionRule, TemporalityCriterion,
};
use super::exam::exam_eligibility;
use crate::workflows::calendar::{months_between, parse_date};
use crate::workflows::matrix::round2;
use crate::workflows::normalizer::{normalize_course_name, normalize_position_name};
use crate::workflows::roster::EmployeeSnapshot;

const CRITERIA_TOTAL: u8 = 4;

/// Evaluates all four promotion criteria. Every criterion is computed even
/// when an earlier one fails; eligibility requires all of them.
pub fn evaluate_eligibility(
    employee: &EmployeeSnapshot,
    rule: &PromotionRule,
    today: NaiveDate,
) -> EligibilityResult {
    let performance = performance_criterion(employee, rule);
    let temporality = temporality_criterion(employee, rule, today);
    let matrix = matrix_criterion(employee, rule);
    let exam = exam_criterion(employee, rule, today);

    let met_count = [performance.met, temporality.met, matrix.met, exam.met]
        .into_iter()
        .filter(|met| *met)
        .count() as u8;
    let overall = OverallEligibility {
        eligible: met_count == CRITERIA_TOTAL,
        met_count,
        total: CRITERIA_TOTAL,
    };

    debug!(
        employee_id = %employee.id,
        promotion_to = %rule.promotion_to,
        met_count,
        eligible = overall.eligible,
        "evaluated promotion eligibility"
    );

    EligibilityResult {
        performance,
        temporality,
        matrix,
        exam,
        overall,
    }
}

/// Finds the rule whose current position matches, ignoring case and accents.
pub fn find_rule<'a>(rules: &'a [PromotionRule], position: &str) -> Option<&'a PromotionRule> {
    let wanted = normalize_position_name(position);
    rules
        .iter()
        .find(|rule| normalize_position_name(&rule.current_position) == wanted)
}

fn performance_criterion(
    employee: &EmployeeSnapshot,
    rule: &PromotionRule,
) -> PerformanceCriterion {
    let current = employee
        .performance_score
        .filter(|score| score.is_finite())
        .unwrap_or(0.0);

    PerformanceCriterion {
        met: current >= f64::from(rule.performance_min_score),
        current,
        required: rule.performance_min_score,
    }
}

fn temporality_criterion(
    employee: &EmployeeSnapshot,
    rule: &PromotionRule,
    today: NaiveDate,
) -> TemporalityCriterion {
    let start = employee.position_start_date.as_deref().and_then(parse_date);
    let current = start.map(|start| months_between(today, start)).unwrap_or(0);
    let required = rule.temporality_months;

    TemporalityCriterion {
        met: required == 0 || current >= required,
        current,
        required,
        position_start_date: start,
    }
}

fn matrix_criterion(employee: &EmployeeSnapshot, rule: &PromotionRule) -> MatrixCriterion {
    let stored = employee.matrix.as_ref();
    let mut current = stored.map(|matrix| matrix.compliance_percentage).unwrap_or(0.0);
    let mut recomputed = false;

    // Stored matrices written before history was backfilled report zero
    // completions. Only that case is overridden; a genuine zero stays zero.
    if let Some(matrix) = stored {
        if !employee.history.is_empty()
            && matrix.required_count > 0
            && matrix.completed_count == 0
        {
            let approved: HashSet<String> = employee
                .history
                .iter()
                .filter(|record| record.is_approved())
                .map(|record| normalize_course_name(&record.course_name))
                .collect();

            // A zero matrix that lists every required course as missing lets
            // the approved history be matched exactly. Older matrices without
            // that list only bound coverage from above.
            let required: HashSet<String> = matrix
                .missing_courses
                .iter()
                .map(|course| normalize_course_name(course))
                .collect();
            let exact = required.len() == matrix.required_count;
            let completed = if exact {
                required.intersection(&approved).count()
            } else {
                approved.len().min(matrix.required_count)
            };

            if completed > 0 {
                current = round2(completed as f64 / matrix.required_count as f64 * 100.0);
                recomputed = true;
                if exact {
                    warn!(
                        employee_id = %employee.id,
                        stored = matrix.compliance_percentage,
                        recomputed = current,
                        "stored matrix reports no completions despite approved required courses; using recomputed coverage"
                    );
                } else {
                    warn!(
                        employee_id = %employee.id,
                        stored = matrix.compliance_percentage,
                        upper_bound = current,
                        "stored matrix reports no completions and lists no required courses; using upper bound of approved history, which may include courses outside the position"
                    );
                }
            }
        }
    }

    MatrixCriterion {
        met: current >= f64::from(rule.matrix_min_coverage),
        current,
        required: rule.matrix_min_coverage,
        recomputed,
    }
}

fn exam_criterion(
    employee: &EmployeeSnapshot,
    rule: &PromotionRule,
    today: NaiveDate,
) -> ExamCriterion {
    let attempts = &employee.exam_attempts;
    let min_score = f64::from(rule.exam_min_score);
    let met = attempts
        .iter()
        .any(|attempt| attempt.passed && attempt.score >= min_score);
    let schedule = exam_eligibility(
        attempts,
        rule.temporality_months,
        employee.position_start_date.as_deref(),
        today,
    );

    ExamCriterion {
        met,
        current: attempts.last().map(|attempt| attempt.score),
        required: rule.exam_min_score,
        attempts: attempts.len(),
        schedule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::matrix::{ComplianceResult, CourseRecord};
    use crate::workflows::promotion::domain::{ExamAttempt, ExamStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn rule() -> PromotionRule {
        PromotionRule {
            current_position: "Operador A".to_string(),
            promotion_to: "Operador B".to_string(),
            temporality_months: 6,
            exam_min_score: 80,
            matrix_min_coverage: 90,
            performance_min_score: 80,
        }
    }

    fn matrix(required: usize, completed: usize) -> ComplianceResult {
        ComplianceResult {
            required_count: required,
            completed_count: completed,
            missing_courses: Vec::new(),
            failed_courses: Vec::new(),
            pending_courses: Vec::new(),
            compliance_percentage: round2(completed as f64 / required as f64 * 100.0),
        }
    }

    fn strong_employee() -> EmployeeSnapshot {
        EmployeeSnapshot {
            id: "E-100".to_string(),
            name: "Lucía Pérez".to_string(),
            position: "Operador A".to_string(),
            department: "Producción".to_string(),
            performance_score: Some(92.0),
            position_start_date: Some("15/01/2023".to_string()),
            history: vec![CourseRecord::ingest("Seguridad", "01/02/2023", 95.0)],
            matrix: Some(matrix(10, 10)),
            exam_attempts: vec![ExamAttempt {
                date: "10/03/2024".to_string(),
                score: 88.0,
                passed: true,
            }],
        }
    }

    #[test]
    fn all_criteria_met_is_eligible() {
        let result = evaluate_eligibility(&strong_employee(), &rule(), date(2024, 6, 1));

        assert!(result.overall.eligible);
        assert_eq!(result.overall.met_count, 4);
        assert_eq!(result.overall.total, 4);
        assert_eq!(result.temporality.current, 17);
        assert!(result.unmet_criteria().is_empty());
        assert_eq!(result.exam.schedule.status, ExamStatus::Passed);
    }

    #[test]
    fn one_failed_criterion_blocks_promotion() {
        let mut employee = strong_employee();
        employee.exam_attempts = vec![ExamAttempt {
            date: "10/03/2024".to_string(),
            score: 60.0,
            passed: false,
        }];

        let result = evaluate_eligibility(&employee, &rule(), date(2024, 6, 1));

        assert!(result.performance.met);
        assert!(result.temporality.met);
        assert!(result.matrix.met);
        assert!(!result.exam.met);
        assert!(!result.overall.eligible);
        assert_eq!(result.overall.met_count, 3);
        assert_eq!(result.exam.attempts, 1);
        assert_eq!(result.exam.current, Some(60.0));
        assert_eq!(result.unmet_criteria(), vec!["exam"]);
    }

    #[test]
    fn passed_flag_below_rule_minimum_does_not_count() {
        let mut employee = strong_employee();
        employee.exam_attempts[0].score = 75.0;

        let result = evaluate_eligibility(&employee, &rule(), date(2024, 6, 1));

        assert!(!result.exam.met);
    }

    #[test]
    fn missing_data_degrades_to_unmet_criteria() {
        let employee = EmployeeSnapshot {
            id: "E-200".to_string(),
            ..EmployeeSnapshot::default()
        };

        let result = evaluate_eligibility(&employee, &rule(), date(2024, 6, 1));

        assert_eq!(result.performance.current, 0.0);
        assert!(!result.performance.met);
        assert_eq!(result.temporality.current, 0);
        assert!(result.temporality.position_start_date.is_none());
        assert!(!result.temporality.met);
        assert_eq!(result.matrix.current, 0.0);
        assert!(!result.exam.met);
        assert_eq!(result.exam.schedule.status, ExamStatus::Available);
        assert_eq!(result.overall.met_count, 0);
    }

    #[test]
    fn zero_temporality_is_always_met() {
        let mut employee = strong_employee();
        employee.position_start_date = None;
        let mut rule = rule();
        rule.temporality_months = 0;

        let result = evaluate_eligibility(&employee, &rule, date(2024, 6, 1));

        assert!(result.temporality.met);
    }

    #[test]
    fn tenure_counts_calendar_months() {
        let mut employee = strong_employee();
        employee.position_start_date = Some("31/12/2023".to_string());

        let short = evaluate_eligibility(&employee, &rule(), date(2024, 6, 1));
        assert_eq!(short.temporality.current, 6);
        assert!(short.temporality.met);

        let early = evaluate_eligibility(&employee, &rule(), date(2024, 5, 31));
        assert_eq!(early.temporality.current, 5);
        assert!(!early.temporality.met);
    }

    #[test]
    fn stale_zero_matrix_without_course_list_uses_upper_bound() {
        let mut employee = strong_employee();
        employee.history = vec![
            CourseRecord::ingest("A", "01/01/2024", 90.0),
            CourseRecord::ingest("a ", "02/01/2024", 95.0),
            CourseRecord::ingest("B", "01/01/2024", 40.0),
        ];
        employee.matrix = Some(matrix(4, 0));

        let result = evaluate_eligibility(&employee, &rule(), date(2024, 6, 1));

        assert!(result.matrix.recomputed);
        assert_eq!(result.matrix.current, 25.0);
        assert!(!result.matrix.met);
    }

    fn zero_matrix_missing(required: &[&str]) -> ComplianceResult {
        let required: Vec<String> = required.iter().map(|course| course.to_string()).collect();
        ComplianceResult {
            required_count: required.len(),
            completed_count: 0,
            missing_courses: required.clone(),
            failed_courses: Vec::new(),
            pending_courses: required,
            compliance_percentage: 0.0,
        }
    }

    #[test]
    fn stale_matrix_recompute_counts_only_required_courses() {
        let mut employee = strong_employee();
        employee.history = vec![
            CourseRecord::ingest("Seguridad Industrial", "01/01/2024", 90.0),
            CourseRecord::ingest("Ética", "01/01/2024", 90.0),
            CourseRecord::ingest("Excel Básico", "01/01/2024", 90.0),
            CourseRecord::ingest("Inducción", "01/01/2024", 90.0),
            CourseRecord::ingest("LOTO", "01/01/2024", 95.0),
        ];
        employee.matrix = Some(zero_matrix_missing(&[
            "loto",
            "Montacargas",
            "5S",
            "Primeros Auxilios",
        ]));

        let result = evaluate_eligibility(&employee, &rule(), date(2024, 6, 1));

        assert!(result.matrix.recomputed);
        assert_eq!(result.matrix.current, 25.0);
        assert!(!result.matrix.met);
    }

    #[test]
    fn unrelated_approvals_do_not_fill_a_listed_zero_matrix() {
        let mut employee = strong_employee();
        employee.history = vec![
            CourseRecord::ingest("Ética", "01/01/2024", 90.0),
            CourseRecord::ingest("Excel Básico", "01/01/2024", 90.0),
            CourseRecord::ingest("Inducción", "01/01/2024", 90.0),
            CourseRecord::ingest("Comunicación", "01/01/2024", 90.0),
        ];
        employee.matrix = Some(zero_matrix_missing(&[
            "LOTO",
            "Montacargas",
            "5S",
            "Primeros Auxilios",
        ]));

        let result = evaluate_eligibility(&employee, &rule(), date(2024, 6, 1));

        assert!(!result.matrix.recomputed);
        assert_eq!(result.matrix.current, 0.0);
        assert!(!result.matrix.met);
    }

    #[test]
    fn genuine_zero_matrix_is_kept() {
        let mut employee = strong_employee();
        employee.history = vec![CourseRecord::ingest("A", "01/01/2024", 40.0)];
        employee.matrix = Some(matrix(4, 0));

        let result = evaluate_eligibility(&employee, &rule(), date(2024, 6, 1));

        assert!(!result.matrix.recomputed);
        assert_eq!(result.matrix.current, 0.0);
    }

    #[test]
    fn nonzero_stored_matrix_is_trusted() {
        let mut employee = strong_employee();
        employee.matrix = Some(matrix(10, 9));

        let result = evaluate_eligibility(&employee, &rule(), date(2024, 6, 1));

        assert!(!result.matrix.recomputed);
        assert_eq!(result.matrix.current, 90.0);
        assert!(result.matrix.met);
    }

    #[test]
    fn rules_are_found_by_normalized_position() {
        let rules = vec![rule(), PromotionRule::new("Técnico", "Técnico Senior")];

        assert_eq!(
            find_rule(&rules, "TECNICO ").map(|rule| rule.promotion_to.as_str()),
            Some("Técnico Senior")
        );
        assert!(find_rule(&rules, "Gerente").is_none());
    }
}
