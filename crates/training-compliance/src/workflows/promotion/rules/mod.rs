//! Import of the tabular promotion rule sheet into [`PromotionRule`] values.

mod parser;

pub use parser::{parse_months, parse_percentage, RawPromotionRule};

use super::domain::PromotionRule;
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub enum RuleImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingPosition { row: usize },
}

impl std::fmt::Display for RuleImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleImportError::Io(err) => write!(f, "failed to read promotion rules: {}", err),
            RuleImportError::Csv(err) => write!(f, "invalid promotion rule CSV data: {}", err),
            RuleImportError::MissingPosition { row } => write!(
                f,
                "promotion rule on row {} is missing its current or target position",
                row
            ),
        }
    }
}

impl std::error::Error for RuleImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuleImportError::Io(err) => Some(err),
            RuleImportError::Csv(err) => Some(err),
            RuleImportError::MissingPosition { .. } => None,
        }
    }
}

impl From<std::io::Error> for RuleImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RuleImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct PromotionRuleImporter;

impl PromotionRuleImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<PromotionRule>, RuleImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<PromotionRule>, RuleImportError> {
        let mut rules = Vec::new();

        for parsed in parser::parse_rows(reader)? {
            let rule = normalize_rule(&parsed.raw)
                .ok_or(RuleImportError::MissingPosition { row: parsed.row })?;
            rules.push(rule);
        }

        debug!(count = rules.len(), "imported promotion rules");
        Ok(rules)
    }
}

/// Converts a raw row into thresholds; `None` when either position is blank.
pub fn normalize_rule(raw: &RawPromotionRule) -> Option<PromotionRule> {
    let current_position = raw.current_position.as_deref()?.trim().to_string();
    let promotion_to = raw.promotion_to.as_deref()?.trim().to_string();

    Some(PromotionRule {
        current_position,
        promotion_to,
        temporality_months: raw.temporality_months_or_default(),
        exam_min_score: raw.exam_min_score_or_default(),
        matrix_min_coverage: raw.matrix_min_coverage_or_default(),
        performance_min_score: raw.performance_min_score_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imports_spanish_rule_sheet() {
        let csv = "PUESTO ACTUAL,PROMOCION A,TEMPORALIDAD,CALIFICACION EXAMEN,COBERTURA MATRIZ,DESEMPEÑO\n\
Operador A,Operador B,6 MESES,80%,90%,85%\n\
Operador B,Líder de Línea,1 AÑO,,95%,\n";

        let rules = PromotionRuleImporter::from_reader(csv.as_bytes()).expect("rules import");

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].temporality_months, 6);
        assert_eq!(rules[0].performance_min_score, 85);
        assert_eq!(rules[1].promotion_to, "Líder de Línea");
        assert_eq!(rules[1].temporality_months, 12);
        assert_eq!(rules[1].exam_min_score, 80);
        assert_eq!(rules[1].matrix_min_coverage, 95);
        assert_eq!(rules[1].performance_min_score, 80);
    }

    #[test]
    fn imports_snake_case_headers() {
        let csv = "current_position,promotion_to,temporality,exam_min_score,matrix_min_coverage,performance_min_score\n\
Técnico,Técnico Senior,18,70,85,75\n";

        let rules = PromotionRuleImporter::from_reader(csv.as_bytes()).expect("rules import");

        assert_eq!(rules[0].temporality_months, 18);
        assert_eq!(rules[0].exam_min_score, 70);
    }

    #[test]
    fn rejects_rows_without_positions() {
        let csv = "PUESTO ACTUAL,PROMOCION A,TEMPORALIDAD\nOperador A,Operador B,6 MESES\n,Operador C,3 MESES\n";

        match PromotionRuleImporter::from_reader(csv.as_bytes()) {
            Err(RuleImportError::MissingPosition { row }) => assert_eq!(row, 3),
            other => panic!("expected missing position error, got {other:?}"),
        }
    }
}
