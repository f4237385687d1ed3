use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonical form used on both sides of every course-name comparison.
///
/// Strips diacritics (NFD + drop combining marks), removes BOM/zero-width
/// characters left behind by spreadsheet exports, collapses whitespace, and
/// uppercases. `"  Seguridad É  higiene "` becomes `"SEGURIDAD E HIGIENE"`.
pub fn normalize_course_name(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let stripped: String = cleaned.nfd().filter(|ch| !is_combining_mark(*ch)).collect();
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_uppercase()
}

/// Positions share the course-name canonical form so rule tables and employee
/// records written with different accents still line up.
pub fn normalize_position_name(value: &str) -> String {
    normalize_course_name(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case_whitespace_and_accents() {
        let expected = "SEGURIDAD E HIGIENE";
        assert_eq!(normalize_course_name("Seguridad e Higiene"), expected);
        assert_eq!(normalize_course_name("SEGURIDAD E HIGIENE "), expected);
        assert_eq!(normalize_course_name("SEGURIDAD É HIGIENE"), expected);
        assert_eq!(normalize_course_name("  seguridad   e\thigiene"), expected);
    }

    #[test]
    fn strips_export_artifacts() {
        assert_eq!(normalize_course_name("\u{feff}Primeros\u{200b} Auxilios"), "PRIMEROS AUXILIOS");
    }

    #[test]
    fn handles_tilde_and_empty_input() {
        assert_eq!(normalize_position_name("Diseñador"), "DISENADOR");
        assert_eq!(normalize_course_name("   "), "");
    }
}
