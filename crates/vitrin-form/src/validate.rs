//! Field-level validation rules.
//!
//! Validation is a pure read over current state: no side effects, safe to
//! recompute on every keystroke or wizard step.

use serde::{Deserialize, Serialize};

use vitrin_shared::numeric::strip_thousands;

use crate::schema::{FieldSpec, SemanticType};
use crate::state::FieldValue;

/// One failed check, addressed to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub field: String,
    pub reason: String,
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub failures: Vec<ValidationFailure>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn fail(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.failures.push(ValidationFailure {
            field: field.into(),
            reason: reason.into(),
        });
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.failures.extend(other.failures);
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_ok() {
            return write!(f, "ok");
        }
        let mut first = true;
        for failure in &self.failures {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", failure.field, failure.reason)?;
            first = false;
        }
        Ok(())
    }
}

/// Check one field's current value against its spec.
///
/// `None` means the field is unset; required fields fail on that, optional
/// fields pass. Returns the failure reason, if any.
pub fn check_value(spec: &FieldSpec, value: Option<&FieldValue>) -> Option<&'static str> {
    let Some(value) = value else {
        return spec.required.then_some("required");
    };

    match (spec.semantic, value) {
        (SemanticType::Text, FieldValue::Text(s)) => {
            (spec.required && s.trim().is_empty()).then_some("required")
        }
        (SemanticType::Number | SemanticType::Currency, FieldValue::Text(s)) => {
            let digits = strip_thousands(s);
            if digits.is_empty() {
                spec.required.then_some("required")
            } else {
                (!digits.bytes().all(|b| b.is_ascii_digit())).then_some("invalid_number")
            }
        }
        (SemanticType::Enum, FieldValue::Text(s)) => {
            if s.is_empty() {
                spec.required.then_some("required")
            } else {
                (!spec.enum_options.contains(&s.as_str())).then_some("invalid_option")
            }
        }
        (SemanticType::Boolean, FieldValue::Bool(_)) => None,
        (SemanticType::Boolean, FieldValue::Text(s)) => {
            (s != "true" && s != "false").then_some("invalid_value")
        }
        // A boolean where text belongs (or vice versa) is a caller bug,
        // surfaced as a validation failure rather than a panic.
        _ => Some("invalid_value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::schema_for;

    fn spec(key: &str) -> &'static FieldSpec {
        schema_for("otobus").field(key).unwrap()
    }

    #[test]
    fn test_required_unset_fails() {
        assert_eq!(check_value(spec("price"), None), Some("required"));
        assert_eq!(check_value(spec("enginePower"), None), None);
    }

    #[test]
    fn test_currency_accepts_formatted_input() {
        let value = FieldValue::Text("1.250.000".into());
        assert_eq!(check_value(spec("price"), Some(&value)), None);

        let bad = FieldValue::Text("çok pahalı".into());
        assert_eq!(check_value(spec("price"), Some(&bad)), Some("invalid_number"));
    }

    #[test]
    fn test_enum_must_match_an_option() {
        let ok = FieldValue::Text("dizel".into());
        assert_eq!(check_value(spec("fuelType"), Some(&ok)), None);

        let bad = FieldValue::Text("komur".into());
        assert_eq!(
            check_value(spec("fuelType"), Some(&bad)),
            Some("invalid_option")
        );
    }

    #[test]
    fn test_boolean_accepts_bool_and_literal_text() {
        let spec = spec("exchange");
        assert_eq!(check_value(spec, Some(&FieldValue::Bool(true))), None);
        assert_eq!(check_value(spec, Some(&FieldValue::Text("true".into()))), None);
        assert_eq!(
            check_value(spec, Some(&FieldValue::Text("maybe".into()))),
            Some("invalid_value")
        );
    }

    #[test]
    fn test_whitespace_only_text_is_not_a_value() {
        let title = spec("title");
        let blank = FieldValue::Text("   ".into());
        assert_eq!(check_value(title, Some(&blank)), Some("required"));
    }
}
