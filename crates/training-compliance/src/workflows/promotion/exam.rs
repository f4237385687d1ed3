//! Retake scheduling for the promotion exam.
//!
//! State is recomputed from the attempt history on every call:
//! a passed last attempt closes the exam, one failure imposes a one-month
//! cooldown, and a second failure blocks retakes until the position's
//! temporality period has elapsed.

use chrono::NaiveDate;
use tracing::debug;

use super::domain::{ExamAttempt, ExamEligibility, ExamStatus};
use crate::workflows::calendar::{add_months, format_date, parse_date};

const RETRY_COOLDOWN_MONTHS: u32 = 1;

pub fn exam_eligibility(
    attempts: &[ExamAttempt],
    temporality_months: u32,
    position_start_date: Option<&str>,
    today: NaiveDate,
) -> ExamEligibility {
    let Some(last) = attempts.last() else {
        return available("no previous attempts");
    };

    if last.passed {
        return ExamEligibility {
            can_take_exam: false,
            next_date: None,
            reason: "exam already passed".to_string(),
            status: ExamStatus::Passed,
        };
    }

    let failed = attempts.iter().filter(|attempt| !attempt.passed).count();
    debug!(attempts = attempts.len(), failed, "evaluating exam retake");

    if failed < 2 {
        // An unreadable attempt date restarts the cooldown from today.
        let last_date = parse_date(&last.date).unwrap_or(today);
        let next_date = add_months(last_date, RETRY_COOLDOWN_MONTHS);
        if today >= next_date {
            return available("retry cooldown elapsed");
        }

        return ExamEligibility {
            can_take_exam: false,
            next_date: Some(next_date),
            reason: format!(
                "failed attempt on {}; retry available from {}",
                format_date(last_date),
                format_date(next_date)
            ),
            status: ExamStatus::Waiting,
        };
    }

    let Some(start) = position_start_date.and_then(parse_date) else {
        return ExamEligibility {
            can_take_exam: false,
            next_date: None,
            reason: format!(
                "{failed} failed attempts and no position start date on record; retake cannot be scheduled"
            ),
            status: ExamStatus::Blocked,
        };
    };

    let next_date = add_months(start, temporality_months);
    if today >= next_date {
        return available("temporality reached after repeated failures");
    }

    ExamEligibility {
        can_take_exam: false,
        next_date: Some(next_date),
        reason: format!(
            "{failed} failed attempts; retake blocked until temporality of {temporality_months} month(s) is met on {}",
            format_date(next_date)
        ),
        status: ExamStatus::Blocked,
    }
}

fn available(reason: &str) -> ExamEligibility {
    ExamEligibility {
        can_take_exam: true,
        next_date: None,
        reason: reason.to_string(),
        status: ExamStatus::Available,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn failed(date: &str, score: f64) -> ExamAttempt {
        ExamAttempt {
            date: date.to_string(),
            score,
            passed: false,
        }
    }

    #[test]
    fn first_attempt_is_available() {
        let result = exam_eligibility(&[], 6, None, date(2024, 1, 1));
        assert_eq!(result.status, ExamStatus::Available);
        assert!(result.can_take_exam);
        assert!(result.next_date.is_none());
    }

    #[test]
    fn passed_last_attempt_closes_exam() {
        let attempts = vec![
            failed("01/01/2024", 50.0),
            ExamAttempt {
                date: "01/03/2024".to_string(),
                score: 92.0,
                passed: true,
            },
        ];

        let result = exam_eligibility(&attempts, 6, None, date(2024, 4, 1));

        assert_eq!(result.status, ExamStatus::Passed);
        assert!(!result.can_take_exam);
    }

    #[test]
    fn single_failure_waits_one_month() {
        let attempts = vec![failed("01/01/2024", 50.0)];

        let waiting = exam_eligibility(&attempts, 6, None, date(2024, 1, 15));
        assert_eq!(waiting.status, ExamStatus::Waiting);
        assert_eq!(waiting.next_date, Some(date(2024, 2, 1)));
        assert!(!waiting.can_take_exam);

        let on_the_day = exam_eligibility(&attempts, 6, None, date(2024, 2, 1));
        assert_eq!(on_the_day.status, ExamStatus::Available);

        let later = exam_eligibility(&attempts, 6, None, date(2024, 2, 2));
        assert_eq!(later.status, ExamStatus::Available);
        assert!(later.can_take_exam);
    }

    #[test]
    fn unreadable_attempt_date_restarts_cooldown_from_today() {
        let attempts = vec![failed("", 50.0)];

        let result = exam_eligibility(&attempts, 6, None, date(2024, 5, 10));

        assert_eq!(result.status, ExamStatus::Waiting);
        assert_eq!(result.next_date, Some(date(2024, 6, 10)));
    }

    #[test]
    fn double_failure_blocks_until_temporality() {
        let attempts = vec![failed("01/02/2023", 40.0), failed("01/04/2023", 55.0)];

        let blocked = exam_eligibility(&attempts, 12, Some("01/01/2023"), date(2023, 6, 1));
        assert_eq!(blocked.status, ExamStatus::Blocked);
        assert_eq!(blocked.next_date, Some(date(2024, 1, 1)));
        assert_eq!(
            serde_json::to_value(&blocked).expect("serializes")["nextDate"],
            "01/01/2024"
        );

        let released = exam_eligibility(&attempts, 12, Some("01/01/2023"), date(2024, 1, 1));
        assert_eq!(released.status, ExamStatus::Available);
    }

    #[test]
    fn double_failure_without_start_date_stays_blocked() {
        let attempts = vec![failed("01/02/2023", 40.0), failed("01/04/2023", 55.0)];

        for start in [None, Some(""), Some("not a date")] {
            let result = exam_eligibility(&attempts, 12, start, date(2030, 1, 1));
            assert_eq!(result.status, ExamStatus::Blocked);
            assert!(result.next_date.is_none());
            assert!(result.reason.contains("no position start date"));
        }
    }
}
