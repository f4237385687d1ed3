use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use training_compliance::workflows::calendar;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Command-line dates: `YYYY-MM-DD` or the legacy `DD/MM/YYYY`.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    calendar::parse_date(raw)
        .ok_or_else(|| format!("failed to parse '{raw}' as YYYY-MM-DD or DD/MM/YYYY"))
}

pub(crate) fn today_or_local(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| chrono::Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_cli_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 2, 1).expect("valid date");
        assert_eq!(parse_date("2024-02-01"), Ok(expected));
        assert_eq!(parse_date("01/02/2024"), Ok(expected));
        assert!(parse_date("yesterday").is_err());
    }
}
