// store_api/src/validation.rs

//! Field validation for request payloads and query identifiers.
//!
//! A [`Validator`] is built once at startup and shared through
//! [`AppState`](crate::state::AppState). Payload types describe their rules by
//! implementing [`Validate`]; the [`Translator`] turns the collected
//! [`FieldViolation`]s into English messages.

use rust_decimal::Decimal;

use crate::errors::{AppError, Result};

/// Money columns are `NUMERIC(12, 2)`: ten integer digits, two decimals.
pub const AMOUNT_SCALE: u32 = 2;
pub const AMOUNT_LIMIT: i64 = 10_000_000_000;

/// Whether `value` can be stored in a money column without rounding or overflow.
pub fn amount_fits(value: Decimal) -> bool {
  value.abs() < Decimal::from(AMOUNT_LIMIT) && value.normalize().scale() <= AMOUNT_SCALE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
  Required,
  GreaterThan(i64),
  AtLeast(i64),
  LessThan(i64),
  MaxDecimals(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldViolation {
  pub field: &'static str,
  pub rule: Rule,
}

/// Collector passed to [`Validate::validate`].
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
  pub fn push(&mut self, field: &'static str, rule: Rule) {
    self.0.push(FieldViolation { field, rule });
  }

  /// `required` plus `> 0`; zero counts as missing.
  pub fn positive(&mut self, field: &'static str, value: i64) {
    if value == 0 {
      self.push(field, Rule::Required);
    } else if value < 0 {
      self.push(field, Rule::GreaterThan(0));
    }
  }

  pub fn non_negative(&mut self, field: &'static str, value: i64) {
    if value < 0 {
      self.push(field, Rule::AtLeast(0));
    }
  }

  pub fn positive_decimal(&mut self, field: &'static str, value: Decimal) {
    if value.is_zero() {
      self.push(field, Rule::Required);
    } else if value.is_sign_negative() {
      self.push(field, Rule::GreaterThan(0));
    }
  }

  /// A positive money value that fits its column exactly.
  pub fn amount(&mut self, field: &'static str, value: Decimal) {
    self.positive_decimal(field, value);
    if value.abs() >= Decimal::from(AMOUNT_LIMIT) {
      self.push(field, Rule::LessThan(AMOUNT_LIMIT));
    }
    if value.normalize().scale() > AMOUNT_SCALE {
      self.push(field, Rule::MaxDecimals(AMOUNT_SCALE));
    }
  }

  pub fn non_empty(&mut self, field: &'static str, value: &str) {
    if value.trim().is_empty() {
      self.push(field, Rule::Required);
    }
  }

  pub fn present<T>(&mut self, field: &'static str, value: Option<&T>) {
    if value.is_none() {
      self.push(field, Rule::Required);
    }
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = &FieldViolation> {
    self.0.iter()
  }
}

pub trait Validate {
  fn validate(&self, violations: &mut Violations);
}

/// Message templates; `{field}` and `{param}` are substituted.
#[derive(Debug, Clone)]
pub struct Translator {
  required: String,
  greater_than: String,
  at_least: String,
  less_than: String,
  max_decimals: String,
}

impl Translator {
  pub fn english() -> Self {
    Self {
      required: "{field} is a required field".to_string(),
      greater_than: "{field} must be greater than {param}".to_string(),
      at_least: "{field} must be {param} or greater".to_string(),
      less_than: "{field} must be less than {param}".to_string(),
      max_decimals: "{field} must have at most {param} decimal places".to_string(),
    }
  }

  pub fn translate(&self, violation: &FieldViolation) -> String {
    let (template, param) = match violation.rule {
      Rule::Required => (&self.required, None),
      Rule::GreaterThan(n) => (&self.greater_than, Some(n)),
      Rule::AtLeast(n) => (&self.at_least, Some(n)),
      Rule::LessThan(n) => (&self.less_than, Some(n)),
      Rule::MaxDecimals(n) => (&self.max_decimals, Some(i64::from(n))),
    };
    let message = template.replace("{field}", violation.field);
    match param {
      Some(n) => message.replace("{param}", &n.to_string()),
      None => message,
    }
  }

  pub fn translate_all(&self, violations: &Violations) -> String {
    violations
      .iter()
      .map(|violation| self.translate(violation))
      .collect::<Vec<_>>()
      .join("; ")
  }
}

impl Default for Translator {
  fn default() -> Self {
    Self::english()
  }
}

#[derive(Debug, Clone, Default)]
pub struct Validator {
  translator: Translator,
}

impl Validator {
  pub fn new(translator: Translator) -> Self {
    Self { translator }
  }

  /// Validates a deserialized request body.
  pub fn check<T: Validate>(&self, payload: &T) -> Result<()> {
    let mut violations = Violations::default();
    payload.validate(&mut violations);
    if violations.is_empty() {
      return Ok(());
    }
    Err(self.body_error(&violations))
  }

  /// Validates a wire payload while converting it into its checked form.
  pub fn check_into<T, U>(&self, payload: T) -> Result<U>
  where
    U: TryFrom<T, Error = Violations>,
  {
    U::try_from(payload).map_err(|violations| self.body_error(&violations))
  }

  fn body_error(&self, violations: &Violations) -> AppError {
    AppError::Validation(format!(
      "Body validation failed. {}",
      self.translator.translate_all(violations)
    ))
  }

  /// Validates an identifier taken from the query string.
  pub fn check_id(&self, field: &'static str, value: Option<i64>) -> Result<i64> {
    let value = value.ok_or_else(|| AppError::Validation(format!("The {} in query required", field)))?;
    let mut violations = Violations::default();
    violations.positive(field, value);
    if violations.is_empty() {
      return Ok(value);
    }
    Err(AppError::Validation(format!(
      "The {} validation failed. {}",
      field,
      self.translator.translate_all(&violations)
    )))
  }
}
