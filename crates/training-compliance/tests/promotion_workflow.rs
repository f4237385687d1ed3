use chrono::NaiveDate;
use training_compliance::workflows::matrix::{ComplianceResult, CourseRecord};
use training_compliance::workflows::promotion::{
    evaluate_eligibility, exam_eligibility, find_rule, ExamAttempt, ExamStatus,
    PromotionRuleImporter,
};
use training_compliance::workflows::roster::EmployeeSnapshot;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn failed_attempt(date: &str) -> ExamAttempt {
    ExamAttempt {
        date: date.to_string(),
        score: 50.0,
        passed: false,
    }
}

#[test]
fn single_failure_cooldown_then_available() {
    let attempts = vec![failed_attempt("01/01/2024")];

    let waiting = exam_eligibility(&attempts, 6, Some("01/01/2023"), date(2024, 1, 15));
    assert_eq!(waiting.status, ExamStatus::Waiting);
    assert_eq!(waiting.next_date, Some(date(2024, 2, 1)));

    let available = exam_eligibility(&attempts, 6, Some("01/01/2023"), date(2024, 2, 2));
    assert_eq!(available.status, ExamStatus::Available);
    assert!(available.can_take_exam);
}

#[test]
fn double_failure_blocked_until_temporality() {
    let attempts = vec![failed_attempt("01/02/2023"), failed_attempt("01/04/2023")];

    let result = exam_eligibility(&attempts, 12, Some("01/01/2023"), date(2023, 6, 1));

    assert_eq!(result.status, ExamStatus::Blocked);
    assert_eq!(result.next_date, Some(date(2024, 1, 1)));
    let json = serde_json::to_value(&result).expect("serializes");
    assert_eq!(json["status"], "blocked");
    assert_eq!(json["nextDate"], "01/01/2024");
    assert_eq!(json["canTakeExam"], false);
}

#[test]
fn imported_rule_drives_eligibility() {
    let csv = "PUESTO ACTUAL,PROMOCION A,TEMPORALIDAD,CALIFICACION EXAMEN,COBERTURA MATRIZ,DESEMPEÑO\n\
Operador A,Operador B,6 MESES,80%,90%,80%\n";
    let rules = PromotionRuleImporter::from_reader(csv.as_bytes()).expect("rules import");

    let employee = EmployeeSnapshot {
        id: "E-7".to_string(),
        name: "Marta".to_string(),
        position: "OPERADOR A".to_string(),
        department: "Ensamble".to_string(),
        performance_score: Some(85.0),
        position_start_date: Some("10/01/2024".to_string()),
        history: vec![CourseRecord::ingest("LOTO", "01/02/2024", 90.0)],
        matrix: Some(ComplianceResult {
            required_count: 10,
            completed_count: 9,
            missing_courses: vec!["5S".to_string()],
            failed_courses: Vec::new(),
            pending_courses: vec!["5S".to_string()],
            compliance_percentage: 90.0,
        }),
        exam_attempts: vec![failed_attempt("01/05/2024")],
    };

    let rule = find_rule(&rules, &employee.position).expect("rule for position");
    let result = evaluate_eligibility(&employee, rule, date(2024, 7, 20));

    assert!(result.performance.met);
    assert!(result.temporality.met);
    assert_eq!(result.temporality.current, 6);
    assert!(result.matrix.met);
    assert!(!result.exam.met);
    assert!(!result.overall.eligible);
    assert_eq!(result.overall.met_count, 3);
    assert_eq!(result.overall.total, 4);
    assert_eq!(result.exam.schedule.status, ExamStatus::Available);

    let json = serde_json::to_value(&result).expect("serializes");
    assert_eq!(json["overall"]["metCount"], 3);
    assert_eq!(json["temporality"]["positionStartDate"], "10/01/2024");
}
