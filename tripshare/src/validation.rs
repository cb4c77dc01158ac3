// tripshare/src/validation.rs

//! Field-level input rules, kept behind a trait so the identity workflows only
//! see "valid" or a structured failure.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use validator::{Validate, ValidationErrors};

/// The first rule a set of inputs broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
  pub field: String,
  pub reason: String,
}

impl ValidationFailure {
  pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
    Self {
      field: field.into(),
      reason: reason.into(),
    }
  }
}

impl fmt::Display for ValidationFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.field, self.reason)
  }
}

pub trait InputValidator: Send + Sync {
  fn validate_sign_up(&self, name: &str, email: &str) -> Result<(), ValidationFailure>;
  fn validate_login(&self, email: &str, password: &str) -> Result<(), ValidationFailure>;
  fn validate_change_password(&self, current_password: &str, new_password: &str) -> Result<(), ValidationFailure>;
  fn validate_trip(&self, title: &str, start_date: NaiveDate, end_date: NaiveDate) -> Result<(), ValidationFailure>;
  fn validate_schedule(
    &self,
    title: &str,
    start_date_time: DateTime<Utc>,
    end_date_time: DateTime<Utc>,
  ) -> Result<(), ValidationFailure>;
}

#[derive(Validate)]
struct SignUpFields {
  #[validate(length(min = 1, max = 255, message = "is required and at most 255 characters"))]
  name: String,
  #[validate(email(message = "must be a valid email address"))]
  email: String,
}

#[derive(Validate)]
struct LoginFields {
  #[validate(email(message = "must be a valid email address"))]
  email: String,
  #[validate(length(min = 8, message = "must be at least 8 characters"))]
  password: String,
}

#[derive(Validate)]
struct ChangePasswordFields {
  #[validate(length(min = 8, message = "must be at least 8 characters"))]
  current_password: String,
  #[validate(length(min = 8, max = 128, message = "must be between 8 and 128 characters"))]
  new_password: String,
}

#[derive(Validate)]
struct TripFields {
  #[validate(length(min = 1, max = 255, message = "is required and at most 255 characters"))]
  title: String,
}

#[derive(Validate)]
struct ScheduleFields {
  #[validate(length(min = 1, max = 255, message = "is required and at most 255 characters"))]
  title: String,
}

/// Picks one failure deterministically (alphabetical by field) out of a validator report.
fn first_failure(errors: ValidationErrors) -> ValidationFailure {
  let mut failures: Vec<ValidationFailure> = errors
    .field_errors()
    .into_iter()
    .map(|(field, errs)| {
      let reason = errs
        .first()
        .map(|e| match &e.message {
          Some(message) => message.to_string(),
          None => e.code.to_string(),
        })
        .unwrap_or_else(|| "is invalid".to_string());
      ValidationFailure::new(to_camel_case(&field.to_string()), reason)
    })
    .collect();
  failures.sort_by(|a, b| a.field.cmp(&b.field));
  failures
    .into_iter()
    .next()
    .unwrap_or_else(|| ValidationFailure::new("input", "is invalid"))
}

/// Field names are reported the way clients send them.
fn to_camel_case(snake: &str) -> String {
  let mut out = String::with_capacity(snake.len());
  let mut upper_next = false;
  for ch in snake.chars() {
    if ch == '_' {
      upper_next = true;
    } else if upper_next {
      out.extend(ch.to_uppercase());
      upper_next = false;
    } else {
      out.push(ch);
    }
  }
  out
}

/// Default rules, built on `validator` derives.
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldValidator;

impl InputValidator for FieldValidator {
  fn validate_sign_up(&self, name: &str, email: &str) -> Result<(), ValidationFailure> {
    SignUpFields {
      name: name.trim().to_string(),
      email: email.to_string(),
    }
    .validate()
    .map_err(first_failure)
  }

  fn validate_login(&self, email: &str, password: &str) -> Result<(), ValidationFailure> {
    LoginFields {
      email: email.to_string(),
      password: password.to_string(),
    }
    .validate()
    .map_err(first_failure)
  }

  fn validate_change_password(&self, current_password: &str, new_password: &str) -> Result<(), ValidationFailure> {
    ChangePasswordFields {
      current_password: current_password.to_string(),
      new_password: new_password.to_string(),
    }
    .validate()
    .map_err(first_failure)?;
    if current_password == new_password {
      return Err(ValidationFailure::new(
        "newPassword",
        "must differ from the current password",
      ));
    }
    Ok(())
  }

  fn validate_trip(&self, title: &str, start_date: NaiveDate, end_date: NaiveDate) -> Result<(), ValidationFailure> {
    TripFields {
      title: title.trim().to_string(),
    }
    .validate()
    .map_err(first_failure)?;
    if start_date > end_date {
      return Err(ValidationFailure::new("endDate", "must not be before startDate"));
    }
    Ok(())
  }

  fn validate_schedule(
    &self,
    title: &str,
    start_date_time: DateTime<Utc>,
    end_date_time: DateTime<Utc>,
  ) -> Result<(), ValidationFailure> {
    ScheduleFields {
      title: title.trim().to_string(),
    }
    .validate()
    .map_err(first_failure)?;
    if end_date_time <= start_date_time {
      return Err(ValidationFailure::new("endDateTime", "must be after startDateTime"));
    }
    Ok(())
  }
}
