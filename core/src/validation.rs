use crate::error::{Result, WorkspaceError};

/// Validation utilities for workspace records and wizard input
pub struct FieldValidator;

impl FieldValidator {
    /// Validate a workspace display name
    ///
    /// Names must:
    /// - Not be empty or only whitespace
    /// - Be at most 120 characters long after trimming
    ///
    /// # Returns
    /// * `Ok(())` - If the name is valid
    /// * `Err(WorkspaceError::Validation)` - If the name is invalid
    pub fn validate_workspace_name(name: &str) -> Result<()> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(WorkspaceError::empty_field("name"));
        }

        if trimmed.chars().count() > 120 {
            return Err(WorkspaceError::Validation(
                "Workspace name must be at most 120 characters long".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate a free-text field: non-empty after trimming
    pub fn validate_text(field: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(WorkspaceError::empty_field(field));
        }
        Ok(())
    }

    /// Validate a numeric field: must parse to a finite, positive number
    pub fn validate_positive_number(field: &str, value: &str) -> Result<()> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(WorkspaceError::empty_field(field));
        }

        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() && n > 0.0 => Ok(()),
            Ok(_) => Err(WorkspaceError::Validation(format!(
                "Field '{field}' must be a positive number"
            ))),
            Err(_) => Err(WorkspaceError::Validation(format!(
                "Field '{field}' must be a number, got '{trimmed}'"
            ))),
        }
    }

    /// Validate a fixed-choice field against its enumerated options
    pub fn validate_choice(field: &str, value: &str, options: &[&str]) -> Result<()> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(WorkspaceError::empty_field(field));
        }
        if !options.contains(&trimmed) {
            return Err(WorkspaceError::Validation(format!(
                "Field '{field}' must be one of: {}",
                options.join(", ")
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_workspace_names() {
        assert!(FieldValidator::validate_workspace_name("Q3 outbound").is_ok());
        assert!(FieldValidator::validate_workspace_name("A").is_ok());
        assert!(FieldValidator::validate_workspace_name(&"a".repeat(120)).is_ok());
    }

    #[test]
    fn test_invalid_workspace_names() {
        assert!(FieldValidator::validate_workspace_name("").is_err());
        assert!(FieldValidator::validate_workspace_name("   ").is_err());
        assert!(FieldValidator::validate_workspace_name(&"a".repeat(121)).is_err());
    }

    #[test]
    fn test_positive_numbers() {
        assert!(FieldValidator::validate_positive_number("n", "100").is_ok());
        assert!(FieldValidator::validate_positive_number("n", " 2.5 ").is_ok());

        assert!(FieldValidator::validate_positive_number("n", "").is_err());
        assert!(FieldValidator::validate_positive_number("n", "0").is_err());
        assert!(FieldValidator::validate_positive_number("n", "-4").is_err());
        assert!(FieldValidator::validate_positive_number("n", "abc").is_err());
        assert!(FieldValidator::validate_positive_number("n", "NaN").is_err());
        assert!(FieldValidator::validate_positive_number("n", "inf").is_err());
    }

    #[test]
    fn test_text() {
        assert!(FieldValidator::validate_text("t", "VP Sales").is_ok());
        assert!(FieldValidator::validate_text("t", " \t ").is_err());
    }

    #[test]
    fn test_choice() {
        let options = ["Email", "Phone"];
        assert!(FieldValidator::validate_choice("c", "Email", &options).is_ok());
        assert!(FieldValidator::validate_choice("c", "email", &options).is_err());
        assert!(FieldValidator::validate_choice("c", "", &options).is_err());
    }
}
