use super::super::domain::{
    default_exam_min_score, default_matrix_min_coverage, default_performance_min_score,
};
use crate::workflows::normalizer::normalize_course_name;
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One row of the promotion rule table as maintained by HR, with thresholds
/// still in their display form (`"90%"`, `"6 MESES"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawPromotionRule {
    #[serde(
        rename = "current_position",
        alias = "PUESTO ACTUAL",
        alias = "Puesto Actual",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub current_position: Option<String>,
    #[serde(
        rename = "promotion_to",
        alias = "PROMOCION A",
        alias = "PROMOCIÓN A",
        alias = "Promoción a",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub promotion_to: Option<String>,
    #[serde(
        rename = "temporality",
        alias = "TEMPORALIDAD",
        alias = "Temporalidad",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub temporality: Option<String>,
    #[serde(
        rename = "exam_min_score",
        alias = "CALIFICACION EXAMEN",
        alias = "CALIFICACIÓN EXAMEN",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub exam_min_score: Option<String>,
    #[serde(
        rename = "matrix_min_coverage",
        alias = "COBERTURA MATRIZ",
        alias = "Cobertura Matriz",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub matrix_min_coverage: Option<String>,
    #[serde(
        rename = "performance_min_score",
        alias = "DESEMPEÑO",
        alias = "DESEMPENO",
        alias = "Desempeño",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub performance_min_score: Option<String>,
}

pub(crate) struct ParsedRule {
    pub(crate) row: usize,
    pub(crate) raw: RawPromotionRule,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<ParsedRule>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<RawPromotionRule>().enumerate() {
        // Header is line 1; data rows start at 2.
        rows.push(ParsedRule {
            row: index + 2,
            raw: record?,
        });
    }

    Ok(rows)
}

impl RawPromotionRule {
    pub fn exam_min_score_or_default(&self) -> u32 {
        self.exam_min_score
            .as_deref()
            .and_then(parse_percentage)
            .unwrap_or_else(default_exam_min_score)
    }

    pub fn matrix_min_coverage_or_default(&self) -> u32 {
        self.matrix_min_coverage
            .as_deref()
            .and_then(parse_percentage)
            .unwrap_or_else(default_matrix_min_coverage)
    }

    pub fn performance_min_score_or_default(&self) -> u32 {
        self.performance_min_score
            .as_deref()
            .and_then(parse_percentage)
            .unwrap_or_else(default_performance_min_score)
    }

    pub fn temporality_months_or_default(&self) -> u32 {
        self.temporality
            .as_deref()
            .and_then(parse_months)
            .unwrap_or(0)
    }
}

/// `"90%"`, `"90 %"`, `"90"`, `"89.6"` → `90`.
pub fn parse_percentage(value: &str) -> Option<u32> {
    leading_number(value).map(|number| number.round() as u32)
}

/// `"6 MESES"` → `6`, `"1 AÑO"` → `12`, `"18"` → `18`.
pub fn parse_months(value: &str) -> Option<u32> {
    let number = leading_number(value)?;
    let unit = normalize_course_name(value);
    let months = if unit.contains("ANO") || unit.contains("YEAR") {
        number * 12.0
    } else {
        number
    };
    Some(months.round() as u32)
}

fn leading_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let end = trimmed
        .char_indices()
        .find(|(_, ch)| !(ch.is_ascii_digit() || *ch == '.' || *ch == ','))
        .map(|(index, _)| index)
        .unwrap_or(trimmed.len());
    let digits = trimmed[..end].replace(',', ".");
    digits
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite() && *number >= 0.0)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
