use crate::infra::{today_or_local, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use training_compliance::workflows::calendar::serde_date;
use training_compliance::workflows::matrix::{evaluate_compliance, ComplianceResult, CourseRecord};
use training_compliance::workflows::promotion::{
    evaluate_eligibility, exam_eligibility, EligibilityResult, ExamAttempt, ExamEligibility,
    PromotionRule,
};
use training_compliance::workflows::roster::EmployeeSnapshot;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct ComplianceRequest {
    #[serde(default)]
    pub(crate) history: Vec<CourseRecord>,
    pub(crate) required_courses: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct PromotionRequest {
    pub(crate) employee: EmployeeSnapshot,
    pub(crate) rule: PromotionRule,
    #[serde(default, with = "serde_date::option")]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromotionResponse {
    pub(crate) employee_id: String,
    pub(crate) promotion_to: String,
    #[serde(with = "serde_date")]
    pub(crate) evaluated_on: NaiveDate,
    pub(crate) unmet_criteria: Vec<&'static str>,
    pub(crate) result: EligibilityResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct ExamEligibilityRequest {
    pub(crate) exam_attempts: Vec<ExamAttempt>,
    pub(crate) temporality_months: u32,
    #[serde(default)]
    pub(crate) position_start_date: Option<String>,
    #[serde(default, with = "serde_date::option")]
    pub(crate) today: Option<NaiveDate>,
}

/// Evaluation endpoints; health/readiness/metrics expect an `AppState`
/// extension layered on by the server.
pub(crate) fn api_router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/compliance/evaluate", post(compliance_endpoint))
        .route("/api/v1/promotion/evaluate", post(promotion_endpoint))
        .route(
            "/api/v1/promotion/exam-eligibility",
            post(exam_eligibility_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn compliance_endpoint(
    Json(payload): Json<ComplianceRequest>,
) -> Json<ComplianceResult> {
    Json(evaluate_compliance(&payload.history, &payload.required_courses))
}

pub(crate) async fn promotion_endpoint(
    Json(payload): Json<PromotionRequest>,
) -> Json<PromotionResponse> {
    let PromotionRequest {
        employee,
        rule,
        today,
    } = payload;

    let today = today_or_local(today);
    let result = evaluate_eligibility(&employee, &rule, today);

    Json(PromotionResponse {
        employee_id: employee.id,
        promotion_to: rule.promotion_to,
        evaluated_on: today,
        unmet_criteria: result.unmet_criteria(),
        result,
    })
}

pub(crate) async fn exam_eligibility_endpoint(
    Json(payload): Json<ExamEligibilityRequest>,
) -> Json<ExamEligibility> {
    let today = today_or_local(payload.today);
    Json(exam_eligibility(
        &payload.exam_attempts,
        payload.temporality_months,
        payload.position_start_date.as_deref(),
        today,
    ))
}
