//! Schema-driven payload validation.
//!
//! A [`Schema`] maps field names to a [`FieldRule`]: where the field lives, whether
//! it is required, an ordered list of [`Check`]s and the trim / integer-coercion
//! flags. [`validate`] runs every rule and collects every failure instead of
//! stopping at the first one, then applies the whitelist policy from
//! [`ValidationOptions`].
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use movies::validation::{validate, schemas, ValidationOptions};
//!
//! let payload = json!({ "title": "  Heat ", "year": "1995" });
//! let data = validate(
//!     &schemas::create_movie_schema(),
//!     payload.as_object().unwrap(),
//!     ValidationOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(data["title"], "Heat");
//! assert_eq!(data["year"], 1995);
//! ```

pub mod schemas;

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

use crate::error::{FieldError, FieldErrorKind, ValidationFailure, ValidationResult};

// =============================================================================
// Rule building blocks
// =============================================================================

/// Part of the request a field is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Body,
    Query,
}

/// Whether an absent field is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required(&'static str),
    Optional,
}

/// Custom predicate over the text form of a value.
#[derive(Clone, Copy)]
pub struct Predicate(pub fn(&str) -> bool);

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// A single check applied to a present value.
#[derive(Debug, Clone)]
pub enum Check {
    /// Value must be a JSON string.
    IsString { message: &'static str },
    /// JSON integer, or a string holding one.
    IsInteger { message: &'static str },
    /// Inclusive integer bounds.
    IntRange {
        min: Option<i64>,
        max: Option<i64>,
        message: &'static str,
    },
    /// Inclusive bounds on the number of characters.
    Length {
        min: Option<usize>,
        max: Option<usize>,
        message: &'static str,
    },
    /// Predicate that must hold on the text form.
    Custom {
        predicate: Predicate,
        message: &'static str,
    },
}

impl Check {
    /// Run the check. On failure returns the error category and message.
    pub fn apply(&self, value: &Value) -> Result<(), (FieldErrorKind, &'static str)> {
        match self {
            Check::IsString { message } => {
                if value.is_string() {
                    Ok(())
                } else {
                    Err((FieldErrorKind::InvalidType, *message))
                }
            }
            Check::IsInteger { message } => match as_integer(value) {
                Some(_) => Ok(()),
                None => Err((FieldErrorKind::InvalidType, *message)),
            },
            Check::IntRange { min, max, message } => {
                let in_range = as_integer(value).is_some_and(|n| {
                    min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi)
                });
                if in_range {
                    Ok(())
                } else {
                    Err((FieldErrorKind::InvalidValue, *message))
                }
            }
            Check::Length { min, max, message } => {
                let within = as_text(value).is_some_and(|text| {
                    let len = text.chars().count();
                    min.map_or(true, |lo| len >= lo) && max.map_or(true, |hi| len <= hi)
                });
                if within {
                    Ok(())
                } else {
                    Err((FieldErrorKind::InvalidLength, *message))
                }
            }
            Check::Custom { predicate, message } => {
                let holds = as_text(value).is_some_and(|text| (predicate.0)(&text));
                if holds {
                    Ok(())
                } else {
                    Err((FieldErrorKind::InvalidValue, *message))
                }
            }
        }
    }
}

/// Rules for one field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub location: Location,
    pub presence: Presence,
    pub trim: bool,
    pub to_int: bool,
    pub checks: Vec<Check>,
}

impl FieldRule {
    /// Optional body field with no checks.
    pub fn body() -> Self {
        Self::at(Location::Body)
    }

    /// Optional query-string field with no checks.
    pub fn query() -> Self {
        Self::at(Location::Query)
    }

    fn at(location: Location) -> Self {
        Self {
            location,
            presence: Presence::Optional,
            trim: false,
            to_int: false,
            checks: Vec::new(),
        }
    }

    pub fn required(mut self, message: &'static str) -> Self {
        self.presence = Presence::Required(message);
        self
    }

    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    /// Trim string values before the checks run.
    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    /// Replace the value with its integer form once every check passed.
    pub fn to_int(mut self) -> Self {
        self.to_int = true;
        self
    }

    pub fn string(self, message: &'static str) -> Self {
        self.check(Check::IsString { message })
    }

    pub fn integer(self, message: &'static str) -> Self {
        self.check(Check::IsInteger { message })
    }

    pub fn range(self, min: i64, max: i64, message: &'static str) -> Self {
        self.check(Check::IntRange {
            min: Some(min),
            max: Some(max),
            message,
        })
    }

    /// Integer within bounds, one message for both failures.
    pub fn int_in(self, min: i64, max: i64, message: &'static str) -> Self {
        self.integer(message).range(min, max, message)
    }

    pub fn length(self, min: usize, max: usize, message: &'static str) -> Self {
        self.check(Check::Length {
            min: Some(min),
            max: Some(max),
            message,
        })
    }

    pub fn min_length(self, min: usize, message: &'static str) -> Self {
        self.check(Check::Length {
            min: Some(min),
            max: None,
            message,
        })
    }

    pub fn custom(self, predicate: fn(&str) -> bool, message: &'static str) -> Self {
        self.check(Check::Custom {
            predicate: Predicate(predicate),
            message,
        })
    }

    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }
}

/// Ordered field name → rule mapping.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(&'static str, FieldRule)>,
}

impl Schema {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn field(mut self, name: &'static str, rule: FieldRule) -> Self {
        self.fields.push((name, rule));
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldRule)> {
        self.fields.iter().map(|(name, rule)| (*name, rule))
    }

    /// Whether `key` is named by the schema.
    pub fn allows(&self, key: &str) -> bool {
        self.fields.iter().any(|(name, _)| *name == key)
    }

    /// Location reported for keys the schema does not know.
    pub fn location(&self) -> Location {
        self.fields
            .first()
            .map(|(_, rule)| rule.location)
            .unwrap_or(Location::Body)
    }
}

// =============================================================================
// Whitelist policy
// =============================================================================

/// What to do with payload keys the schema does not name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Drop unknown keys from the validated output.
    pub whitelist: bool,
    /// Reject the whole payload when unknown keys are present.
    pub forbid_non_whitelisted: bool,
}

impl ValidationOptions {
    /// Unknown keys are dropped silently.
    pub fn whitelist() -> Self {
        Self {
            whitelist: true,
            forbid_non_whitelisted: false,
        }
    }

    /// Unknown keys reject the request.
    pub fn forbid_unknown() -> Self {
        Self {
            whitelist: true,
            forbid_non_whitelisted: true,
        }
    }

    /// Unknown keys are kept as they are.
    pub fn passthrough() -> Self {
        Self {
            whitelist: false,
            forbid_non_whitelisted: false,
        }
    }
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self::whitelist()
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Validate `payload` against `schema`.
///
/// Returns the coerced payload on success. Field errors take precedence over
/// the unknown-key policy.
pub fn validate(
    schema: &Schema,
    payload: &Map<String, Value>,
    options: ValidationOptions,
) -> ValidationResult<Map<String, Value>> {
    let mut errors = Vec::new();
    let mut coerced = Map::new();

    for (name, rule) in schema.fields() {
        match check_field(name, rule, payload.get(name)) {
            Ok(Some(value)) => {
                coerced.insert(name.to_string(), value);
            }
            Ok(None) => {}
            Err(mut field_errors) => errors.append(&mut field_errors),
        }
    }

    if !errors.is_empty() {
        return Err(ValidationFailure::Fields(errors));
    }

    if options.forbid_non_whitelisted {
        let unknown: Vec<String> = payload
            .keys()
            .filter(|key| !schema.allows(key))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(ValidationFailure::DisallowedFields {
                location: schema.location(),
                fields: unknown,
            });
        }
    }

    if options.whitelist {
        Ok(coerced)
    } else {
        let mut output = payload.clone();
        output.extend(coerced);
        Ok(output)
    }
}

fn check_field(
    name: &str,
    rule: &FieldRule,
    raw: Option<&Value>,
) -> Result<Option<Value>, Vec<FieldError>> {
    let value = match raw {
        None | Some(Value::Null) => {
            return match rule.presence {
                Presence::Required(message) => Err(vec![FieldError::new(
                    name,
                    rule.location,
                    FieldErrorKind::MissingField,
                    message,
                )]),
                Presence::Optional => Ok(None),
            };
        }
        Some(value) if rule.trim => trim_value(value),
        Some(value) => value.clone(),
    };

    let mut errors = Vec::new();
    for check in &rule.checks {
        if let Err((kind, message)) = check.apply(&value) {
            errors.push(FieldError::new(name, rule.location, kind, message));
            if kind == FieldErrorKind::InvalidType {
                break;
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    if rule.to_int {
        if let Some(n) = as_integer(&value) {
            return Ok(Some(Value::from(n)));
        }
    }
    Ok(Some(value))
}

/// Integer form of a JSON integer or of a string holding one.
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn trim_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        other => other.clone(),
    }
}

/// Query parameters as a JSON object of string values.
pub fn query_payload(params: &HashMap<String, String>) -> Map<String, Value> {
    params
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}
