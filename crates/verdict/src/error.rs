use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerdictError {
  #[error("Unsupported or malformed input: {message}")]
  InputFormat { message: String },

  #[error("Invalid {field}: {message}")]
  Validation { field: String, message: String },

  #[error("Resource failure: {message}")]
  Resource { message: String },

  #[error("Configuration error: {message}")]
  Config { message: String },
}

impl VerdictError {
  pub fn input_format(message: impl Into<String>) -> Self {
    Self::InputFormat { message: message.into() }
  }

  pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Validation { field: field.into(), message: message.into() }
  }

  pub fn resource(message: impl Into<String>) -> Self {
    Self::Resource { message: message.into() }
  }

  pub fn config(message: impl Into<String>) -> Self {
    Self::Config { message: message.into() }
  }

  /// Stable machine-readable tag for the error family
  pub fn kind(&self) -> &'static str {
    match self {
      Self::InputFormat { .. } => "input_format",
      Self::Validation { .. } => "validation",
      Self::Resource { .. } => "resource",
      Self::Config { .. } => "config",
    }
  }

  pub fn report(&self) -> ErrorReport {
    ErrorReport { kind: self.kind(), message: self.to_string() }
  }
}

/// Structured form of an error for callers that surface failures to users.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
  pub kind: &'static str,
  pub message: String,
}

impl From<std::io::Error> for VerdictError {
  fn from(err: std::io::Error) -> Self {
    Self::resource(err.to_string())
  }
}

pub type Result<T> = std::result::Result<T, VerdictError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_kinds() {
    assert_eq!(VerdictError::input_format("x").kind(), "input_format");
    assert_eq!(VerdictError::validation("colors", "x").kind(), "validation");
    assert_eq!(VerdictError::resource("x").kind(), "resource");
    assert_eq!(VerdictError::config("x").kind(), "config");
  }

  #[test]
  fn test_validation_message_names_field() {
    let err = VerdictError::validation("colors", "expected 3 colors, got 2");
    assert_eq!(err.to_string(), "Invalid colors: expected 3 colors, got 2");
  }

  #[test]
  fn test_report_serializes_kind_and_message() {
    let report = VerdictError::resource("disk full").report();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["kind"], "resource");
    assert_eq!(json["message"], "Resource failure: disk full");
  }

  #[test]
  fn test_io_errors_are_resource_errors() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: VerdictError = io.into();
    assert_eq!(err.kind(), "resource");
  }
}
