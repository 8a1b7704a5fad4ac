//! API and row types.
//!
//! Row types derive `sqlx::FromRow` and serialize to the camelCase JSON the
//! dashboards and menu client consume. `New*`/`Update*` types are request
//! bodies; each validates itself before any database access.

pub mod addon;
pub mod ai_agent;
pub mod cart;
pub mod company;
pub mod customer;
pub mod menu;
pub mod order;
pub mod stats;
pub mod store;
pub mod user;

use thiserror::Error;

/// A request body failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InputError(pub String);

/// Longest accepted name for companies, stores, sections, products and addons.
pub const MAX_NAME_LENGTH: usize = 120;

/// Longest accepted free-text field.
pub const MAX_TEXT_LENGTH: usize = 2_000;

/// Trim a required text field and enforce a length limit.
///
/// # Errors
///
/// Returns `InputError` if the trimmed value is empty or too long.
pub fn required_text(value: &str, field: &str, max: usize) -> Result<String, InputError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InputError(format!("{field} is required")));
    }
    if trimmed.chars().count() > max {
        return Err(InputError(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(trimmed.to_owned())
}

/// Trim an optional text field; blank becomes `None`.
///
/// # Errors
///
/// Returns `InputError` if the value is too long.
pub fn optional_text(
    value: Option<&str>,
    field: &str,
    max: usize,
) -> Result<Option<String>, InputError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => required_text(v, field, max).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("  Pizzas ", "name", 10).unwrap(), "Pizzas");
        assert_eq!(
            required_text("  ", "name", 10),
            Err(InputError("name is required".to_owned()))
        );
        assert!(required_text("abcdefghijk", "name", 10).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(None, "notes", 5).unwrap(), None);
        assert_eq!(optional_text(Some("   "), "notes", 5).unwrap(), None);
        assert_eq!(
            optional_text(Some(" ok "), "notes", 5).unwrap(),
            Some("ok".to_owned())
        );
        assert!(optional_text(Some("too long"), "notes", 5).is_err());
    }
}
