//! Declarative field validation.
//!
//! Each form declares a static table of [`Rule`]s. [`validate`] evaluates
//! every rule against the (trimmed) field values and collects one
//! [`FieldViolation`] per failing field.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single constraint on a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    NonEmpty,
    /// Minimum length in characters.
    MinLength(usize),
    /// Plain decimal: optional sign, digits, at most one `.` followed by digits.
    Numeric,
    /// Must equal one of the listed values.
    OneOf(&'static [&'static str]),
}

impl Check {
    pub fn passes(&self, value: &str) -> bool {
        match self {
            Check::NonEmpty => !value.is_empty(),
            Check::MinLength(min) => value.chars().count() >= *min,
            Check::Numeric => is_decimal(value),
            Check::OneOf(allowed) => allowed.contains(&value),
        }
    }
}

/// `[+-]?([0-9]*\.)?[0-9]+`
fn is_decimal(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => ("", digits),
    };
    !fraction.is_empty()
        && fraction.chars().all(|c| c.is_ascii_digit())
        && whole.chars().all(|c| c.is_ascii_digit())
}

/// The checks for one field plus the message shown when any of them fails.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub field: &'static str,
    pub checks: &'static [Check],
    pub message: &'static str,
}

/// A failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Every violation found in one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single violation, for checks that run outside the rule table.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Whether `field` has at least one violation.
    pub fn has(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (i, v) in self.violations.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}: {}", sep, v.field, v.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Evaluate `rules` against the values returned by `value_of`.
///
/// Values are trimmed before checking. A missing field is treated as empty.
pub fn validate<'a>(
    rules: &[Rule],
    value_of: impl Fn(&str) -> Option<&'a str>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for rule in rules {
        let value = value_of(rule.field).unwrap_or("").trim();
        if !rule.checks.iter().all(|check| check.passes(value)) {
            errors.push(rule.field, rule.message);
        }
    }
    errors.into_result()
}
