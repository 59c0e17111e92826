//! Structured error types shared across the simulation configuration crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`SimError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (field paths, command paths, values).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Records both sides of a violated numeric invariant.
    pub fn with_expected_actual(
        self,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        self.with_context("expected", expected)
            .with_context("actual", actual)
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the simulation configuration pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum SimError {
    /// A referenced prescription or macro file does not exist.
    #[error("not found: {0}")]
    NotFound(ErrorInfo),
    /// Malformed prescription or macro content, or an unsupported unit token.
    #[error("format error: {0}")]
    Format(ErrorInfo),
    /// A structural or geometric invariant does not hold.
    #[error("validation error: {0}")]
    Validation(ErrorInfo),
    /// Ambiguous dual specification of one logical quantity, or an
    /// unsupported named rule.
    #[error("conflict error: {0}")]
    Conflict(ErrorInfo),
    /// Serialization and filesystem boundary failures.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl SimError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            SimError::NotFound(info)
            | SimError::Format(info)
            | SimError::Validation(info)
            | SimError::Conflict(info)
            | SimError::Serde(info) => info,
        }
    }

    /// Adds a context entry to the underlying payload.
    pub fn with_context(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match self {
            SimError::NotFound(info) => SimError::NotFound(info.with_context(key, value)),
            SimError::Format(info) => SimError::Format(info.with_context(key, value)),
            SimError::Validation(info) => SimError::Validation(info.with_context(key, value)),
            SimError::Conflict(info) => SimError::Conflict(info.with_context(key, value)),
            SimError::Serde(info) => SimError::Serde(info.with_context(key, value)),
        }
    }
}
