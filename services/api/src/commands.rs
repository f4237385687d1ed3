use crate::infra::{parse_date, today_or_local};
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use training_compliance::config::RecomputeConfig;
use training_compliance::error::AppError;
use training_compliance::workflows::calendar::format_date;
use training_compliance::workflows::matrix::{
    apply_updates, evaluate_position_compliance, recompute_matrices, ComplianceResult,
    InMemoryMatrixStore, PositionSnapshot,
};
use training_compliance::workflows::normalizer::normalize_position_name;
use training_compliance::workflows::promotion::{
    evaluate_eligibility, exam_eligibility, find_rule, EligibilityResult, ExamEligibility,
    PromotionRule, PromotionRuleImporter,
};
use training_compliance::workflows::roster::{
    find_employee, load_employees, load_positions, EmployeeSnapshot,
};

#[derive(Args, Debug)]
pub(crate) struct ComplianceEvaluateArgs {
    /// Employee snapshot export (JSON array)
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Position catalog with required courses (JSON array)
    #[arg(long)]
    pub(crate) positions: PathBuf,
    /// Employee id to report on
    #[arg(long)]
    pub(crate) employee: String,
    /// Print the result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RecomputeArgs {
    /// Employee snapshot export (JSON array)
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Position catalog with required courses (JSON array)
    #[arg(long)]
    pub(crate) positions: PathBuf,
    /// Updates per persisted batch (defaults to APP_RECOMPUTE_BATCH_SIZE)
    #[arg(long)]
    pub(crate) batch_size: Option<usize>,
    /// Write the refreshed snapshot here (omit for a dry run)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct PromotionEvaluateArgs {
    /// Employee snapshot export (JSON array)
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Promotion rule sheet (CSV)
    #[arg(long)]
    pub(crate) rules: PathBuf,
    /// Employee id to evaluate
    #[arg(long)]
    pub(crate) employee: String,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExamArgs {
    /// Employee snapshot export (JSON array)
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Employee id to schedule
    #[arg(long)]
    pub(crate) employee: String,
    /// Promotion rule sheet (CSV) supplying the position's temporality
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Override the rule's temporality (months) for blocked retakes
    #[arg(long)]
    pub(crate) temporality_months: Option<u32>,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct RulesArgs {
    /// Promotion rule sheet (CSV)
    #[arg(long)]
    pub(crate) rules: PathBuf,
}

pub(crate) fn run_compliance_evaluate(args: ComplianceEvaluateArgs) -> Result<(), AppError> {
    let employees = load_employees(&args.snapshot)?;
    let positions = load_positions(&args.positions)?;
    let employee = lookup_employee(&employees, &args.employee)?;
    let position = lookup_position(&positions, &employee.position)?;

    let result = evaluate_position_compliance(&employee.history, position);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render_compliance(employee, &result);
    }
    Ok(())
}

pub(crate) fn run_compliance_recompute(
    args: RecomputeArgs,
    config: &RecomputeConfig,
) -> Result<(), AppError> {
    let mut employees = load_employees(&args.snapshot)?;
    let positions = load_positions(&args.positions)?;
    let batch_size = args.batch_size.unwrap_or(config.batch_size);

    let store = InMemoryMatrixStore::default();
    let summary = recompute_matrices(&employees, &positions, batch_size, &store)?;

    println!("Matrix recompute");
    println!(
        "- {} processed | {} updated | {} unchanged | {} skipped | {} batch(es)",
        summary.processed, summary.updated, summary.unchanged, summary.skipped, summary.batches
    );

    match args.output {
        Some(path) => {
            apply_updates(&mut employees, &store.updates());
            let file = std::fs::File::create(&path)?;
            serde_json::to_writer_pretty(file, &employees)?;
            println!("Refreshed snapshot written to {}", path.display());
        }
        None => println!("Dry run: no snapshot written (pass --output to persist)"),
    }
    Ok(())
}

pub(crate) fn run_promotion_evaluate(args: PromotionEvaluateArgs) -> Result<(), AppError> {
    let employees = load_employees(&args.snapshot)?;
    let rules = PromotionRuleImporter::from_path(&args.rules)?;
    let employee = lookup_employee(&employees, &args.employee)?;
    let rule = find_rule(&rules, &employee.position).ok_or_else(|| {
        AppError::NotFound(format!("promotion rule for position '{}'", employee.position))
    })?;
    let today = today_or_local(args.today);

    let result = evaluate_eligibility(employee, rule, today);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render_eligibility(employee, rule, &result, today);
    }
    Ok(())
}

pub(crate) fn run_promotion_exam(args: ExamArgs) -> Result<(), AppError> {
    let employees = load_employees(&args.snapshot)?;
    let employee = lookup_employee(&employees, &args.employee)?;
    let today = today_or_local(args.today);

    let schedule = schedule_exam(&args, employee, today)?;

    render_exam_schedule(employee, &schedule, today);
    Ok(())
}

fn schedule_exam(
    args: &ExamArgs,
    employee: &EmployeeSnapshot,
    today: NaiveDate,
) -> Result<ExamEligibility, AppError> {
    let temporality_months = match (args.temporality_months, &args.rules) {
        (Some(months), _) => months,
        (None, Some(path)) => {
            let rules = PromotionRuleImporter::from_path(path)?;
            find_rule(&rules, &employee.position)
                .map(|rule| rule.temporality_months)
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "promotion rule for position '{}'",
                        employee.position
                    ))
                })?
        }
        (None, None) => {
            return Err(AppError::NotFound(format!(
                "temporality for position '{}' (pass --rules or --temporality-months)",
                employee.position
            )))
        }
    };

    Ok(exam_eligibility(
        &employee.exam_attempts,
        temporality_months,
        employee.position_start_date.as_deref(),
        today,
    ))
}

pub(crate) fn run_promotion_rules(args: RulesArgs) -> Result<(), AppError> {
    let rules = PromotionRuleImporter::from_path(&args.rules)?;

    println!("Promotion rules ({})", rules.len());
    for rule in &rules {
        println!(
            "- {} -> {}: {} month(s), exam >= {}, matrix >= {}%, performance >= {}",
            rule.current_position,
            rule.promotion_to,
            rule.temporality_months,
            rule.exam_min_score,
            rule.matrix_min_coverage,
            rule.performance_min_score
        );
    }
    Ok(())
}

fn lookup_employee<'a>(
    employees: &'a [EmployeeSnapshot],
    id: &str,
) -> Result<&'a EmployeeSnapshot, AppError> {
    find_employee(employees, id).ok_or_else(|| AppError::NotFound(format!("employee '{id}'")))
}

fn lookup_position<'a>(
    positions: &'a [PositionSnapshot],
    name: &str,
) -> Result<&'a PositionSnapshot, AppError> {
    let wanted = normalize_position_name(name);
    positions
        .iter()
        .find(|position| normalize_position_name(&position.name) == wanted)
        .ok_or_else(|| AppError::NotFound(format!("position '{name}'")))
}

fn render_compliance(employee: &EmployeeSnapshot, result: &ComplianceResult) {
    println!("Training compliance for {} ({})", employee.name, employee.id);
    println!("Position: {}", employee.position);
    println!(
        "Coverage: {}/{} required courses ({:.2}%)",
        result.completed_count, result.required_count, result.compliance_percentage
    );

    if result.missing_courses.is_empty() {
        println!("\nMissing courses: none");
        return;
    }

    if !result.failed_courses.is_empty() {
        println!("\nAttempted but not approved");
        for course in &result.failed_courses {
            println!("- {course}");
        }
    }
    if !result.pending_courses.is_empty() {
        println!("\nNever attempted");
        for course in &result.pending_courses {
            println!("- {course}");
        }
    }
}

fn render_eligibility(
    employee: &EmployeeSnapshot,
    rule: &PromotionRule,
    result: &EligibilityResult,
    today: NaiveDate,
) {
    println!(
        "Promotion eligibility for {} ({}): {} -> {} (evaluated {})",
        employee.name,
        employee.id,
        rule.current_position,
        rule.promotion_to,
        format_date(today)
    );

    let mark = |met: bool| if met { "met" } else { "not met" };
    println!(
        "- Performance: {:.1} / {} required [{}]",
        result.performance.current,
        result.performance.required,
        mark(result.performance.met)
    );
    println!(
        "- Temporality: {} / {} month(s) [{}]",
        result.temporality.current,
        result.temporality.required,
        mark(result.temporality.met)
    );
    let recomputed_note = if result.matrix.recomputed {
        " (recomputed from history)"
    } else {
        ""
    };
    println!(
        "- Matrix: {:.2}% / {}% required{} [{}]",
        result.matrix.current,
        result.matrix.required,
        recomputed_note,
        mark(result.matrix.met)
    );
    let last_score = result
        .exam
        .current
        .map(|score| format!("{score:.1}"))
        .unwrap_or_else(|| "none".to_string());
    println!(
        "- Exam: last score {} / {} required, {} attempt(s) [{}]",
        last_score,
        result.exam.required,
        result.exam.attempts,
        mark(result.exam.met)
    );

    println!(
        "\nOverall: {} ({}/{} criteria met)",
        if result.overall.eligible {
            "eligible"
        } else {
            "not eligible"
        },
        result.overall.met_count,
        result.overall.total
    );

    if !result.exam.met {
        println!(
            "Next exam: {} - {}",
            result.exam.schedule.status.label(),
            result.exam.schedule.reason
        );
    }
}

fn render_exam_schedule(employee: &EmployeeSnapshot, schedule: &ExamEligibility, today: NaiveDate) {
    println!(
        "Exam schedule for {} ({}) as of {}",
        employee.name,
        employee.id,
        format_date(today)
    );
    println!("- Status: {}", schedule.status.label());
    println!("- Can take exam: {}", if schedule.can_take_exam { "yes" } else { "no" });
    if let Some(next) = schedule.next_date {
        println!("- Next date: {}", format_date(next));
    }
    println!("- Reason: {}", schedule.reason);
}
