//! Structured validation results for account input

use serde::Serialize;
use validator::{Validate, ValidationError, ValidationErrors};

use super::account::Account;

/// Rule a field value broke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationRule {
    MaxLength { max: u64 },
    MinLength { min: u64 },
    Email,
    Required,
    MustMatch { other: String },
    InvalidDate,
    Password { code: String },
    Other { code: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub rule: ValidationRule,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &str, rule: ValidationRule, message: impl Into<String>) -> Self {
        Self {
            field: display_name(field),
            rule,
            message: message.into(),
        }
    }

    fn from_validator(field: &str, error: &ValidationError) -> Self {
        let param = |name: &str| error.params.get(name).and_then(|v| v.as_u64());
        let actual_len = error
            .params
            .get("value")
            .and_then(|v| v.as_str())
            .map(|s| s.chars().count() as u64);

        let rule = match error.code.as_ref() {
            "length" => match (param("min"), param("max"), actual_len) {
                (Some(min), _, Some(len)) if len < min => ValidationRule::MinLength { min },
                (_, Some(max), _) => ValidationRule::MaxLength { max },
                (Some(min), None, _) => ValidationRule::MinLength { min },
                _ => ValidationRule::Other { code: "length".to_string() },
            },
            "email" => ValidationRule::Email,
            "required" => ValidationRule::Required,
            code => ValidationRule::Other { code: code.to_string() },
        };

        let message = match (&error.message, &rule) {
            (Some(message), _) => message.to_string(),
            (None, ValidationRule::MaxLength { max }) => {
                format!("The field {} must be a string with a maximum length of {}.", display_name(field), max)
            }
            (None, _) => format!("The {} field is not valid.", display_name(field)),
        };

        Self {
            field: display_name(field),
            rule,
            message,
        }
    }
}

/// `last_name` -> `LastName`
fn display_name(field: &str) -> String {
    field
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Flattens validator output into field violations, ordered by field name.
pub fn violations_from(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut violations: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            let field: &str = field.as_ref();
            field_errors
                .iter()
                .map(|error| FieldViolation::from_validator(field, error))
                .collect::<Vec<_>>()
        })
        .collect();
    violations.sort_by(|a, b| a.field.cmp(&b.field));
    violations
}

/// Checks the declared bounds of the added account fields.
pub fn validate_account(account: &Account) -> Result<(), Vec<FieldViolation>> {
    account.validate().map_err(|e| violations_from(&e))
}
