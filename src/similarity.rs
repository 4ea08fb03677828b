//! # Similarity Module
//!
//! Edit-distance-based fuzzy string similarity used for ingredient/menu name
//! resolution and duplicate-description comparison. Scores are normalized
//! Levenshtein distance: `1 - distance / max(len)`, so 1.0 is an exact match
//! and 0.0 shares nothing. Two empty strings score 1.0 by convention.

/// Similarity between two strings in `[0, 1]`
///
/// Symmetric and deterministic. Comparison is case-sensitive; callers that
/// want case-insensitive matching lower-case both inputs first.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    strsim::normalized_levenshtein(a, b)
}

/// Case-insensitive similarity convenience wrapper
pub fn similarity_ci(a: &str, b: &str) -> f64 {
    similarity(&a.to_lowercase(), &b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings() {
        assert_eq!(similarity("กุ้ง", "กุ้ง"), 1.0);
        assert_eq!(similarity("shrimp", "shrimp"), 1.0);
    }

    #[test]
    fn test_both_empty_is_exact() {
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn test_one_empty_is_zero() {
        assert_eq!(similarity("กุ้ง", ""), 0.0);
        assert_eq!(similarity("", "กุ้ง"), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ("กุ้งสด", "กุ้ง"),
            ("หมูสับ", "หมูบด"),
            ("chicken", "kitchen"),
        ];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a), "asymmetric for {a}/{b}");
        }
    }

    #[test]
    fn test_close_thai_names_score_high() {
        // "กุ้งสด" (fresh shrimp) should resolve toward "กุ้ง"
        assert!(similarity("กุ้งสด", "กุ้ง") > 0.6);
        assert!(similarity("น้ำปลา", "น้ำปลาร้า") > 0.6);
    }

    #[test]
    fn test_unrelated_names_score_low() {
        assert!(similarity("กุ้ง", "น้ำมันพืช") < 0.3);
    }

    #[test]
    fn test_case_insensitive_wrapper() {
        assert_eq!(similarity_ci("Pork", "pork"), 1.0);
        assert!(similarity_ci("Pork", "pork") > similarity("Pork", "pork"));
    }
}
