//! Artifact name validation.
//!
//! Names arrive from callers (CLI arguments, download locators) and are
//! joined onto the artifact directory, so they must be a single plain file
//! name.

use crate::ClassifierError;

/// Extension every result artifact carries.
pub const ARTIFACT_EXTENSION: &str = ".csv";

fn is_valid_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'
}

/// Validate that `name` is a safe artifact file name.
///
/// ```ignore
/// assert!(validate_artifact_name("batch_predictions_20250101_120000_000001.csv").is_ok());
/// assert!(validate_artifact_name("../secrets.csv").is_err());
/// ```
pub fn validate_artifact_name(name: &str) -> Result<&str, ClassifierError> {
    if !name.ends_with(ARTIFACT_EXTENSION) || name.len() == ARTIFACT_EXTENSION.len() {
        return Err(ClassifierError::Validation(format!(
            "Invalid artifact name '{}': expected a {} file",
            name, ARTIFACT_EXTENSION
        )));
    }

    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(ClassifierError::Validation(format!(
            "Invalid artifact name '{}': path components are not allowed",
            name
        )));
    }

    if !name.chars().all(is_valid_name_char) {
        return Err(ClassifierError::Validation(format!(
            "Invalid artifact name '{}': only alphanumerics, '_', '-' and '.' are allowed",
            name
        )));
    }

    Ok(name)
}

/// Strip an optional `download/` prefix so locators and bare names both work.
pub fn artifact_name_from_locator(locator: &str) -> &str {
    locator.strip_prefix("download/").unwrap_or(locator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(validate_artifact_name("batch_predictions_20250101_120000_000001.csv").is_ok());
        assert!(validate_artifact_name("results-v2.csv").is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert!(validate_artifact_name("").is_err());
        assert!(validate_artifact_name(".csv").is_err());
        assert!(validate_artifact_name("results.txt").is_err());
        assert!(validate_artifact_name("../results.csv").is_err());
        assert!(validate_artifact_name("temp/results.csv").is_err());
        assert!(validate_artifact_name("temp\\results.csv").is_err());
        assert!(validate_artifact_name("a..b.csv").is_err());
        assert!(validate_artifact_name("results .csv").is_err());
    }

    #[test]
    fn test_locator_prefix_stripped() {
        assert_eq!(artifact_name_from_locator("download/a.csv"), "a.csv");
        assert_eq!(artifact_name_from_locator("a.csv"), "a.csv");
    }

    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_generated_names_pass(stem in "[a-zA-Z0-9_-]{1,40}") {
                let name = format!("{}.csv", stem);
                prop_assert!(validate_artifact_name(&name).is_ok(), "Should accept: {}", name);
            }

            #[test]
            fn prop_separators_never_pass(
                prefix in "[a-z]{0,8}",
                sep in "(/|\\\\|\\.\\.)",
                suffix in "[a-z]{1,8}",
            ) {
                let name = format!("{}{}{}.csv", prefix, sep, suffix);
                prop_assert!(validate_artifact_name(&name).is_err(), "Should reject: {}", name);
            }
        }
    }
}
