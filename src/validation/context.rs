//! Error accumulation for deferred validation passes.

use std::fmt;

use derive_more::with_trait::{Display, Error};
use serde::Serialize;

/// A deferred validation error.
///
/// Unlike [`SchemaError`](crate::schema::SchemaError) these are accumulated,
/// not thrown: one pass can report every defect it finds and the caller
/// decides whether to surface them as a hard failure.
#[derive(Clone, Debug, Display, Eq, Error, Ord, PartialEq, PartialOrd, Serialize)]
#[display("{message}")]
pub struct RuleError {
    message: String,
}

impl RuleError {
    /// A rule error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        RuleError {
            message: message.into(),
        }
    }

    /// Access the message for a validation error.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A non-empty batch of rule errors, for callers who want a single hard
/// failure out of an accumulating pass.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuleErrors(pub Vec<RuleError>);

impl fmt::Display for RuleErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RuleErrors {}

/// Shared accumulator threaded through the validation rules.
///
/// Deliberately a plain state object passed by reference; validation state
/// is never process-wide, so independent renders cannot observe each other.
#[derive(Debug, Default)]
pub struct ValidatorContext {
    errors: Vec<RuleError>,
}

impl ValidatorContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error by message.
    pub fn report_error(&mut self, message: impl Into<String>) {
        self.errors.push(RuleError::new(message));
    }

    /// Appends already-built errors.
    pub fn append_errors(&mut self, mut errors: Vec<RuleError>) {
        self.errors.append(&mut errors);
    }

    /// Whether anything has been reported.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Consumes the context, yielding the errors in report order.
    pub fn into_errors(self) -> Vec<RuleError> {
        self.errors
    }
}
