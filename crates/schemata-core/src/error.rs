//! # Error Types
//!
//! Two families of failure live here, both derived with `thiserror`:
//!
//! - [`CoreError`] — a validator could not be *built* (missing extension
//!   rule, bad regular expression). Raised while composing validators.
//! - [`ValidationError`] — a value did not conform. Produced from a
//!   [`crate::Validation`] result, never raised by `validate` itself.
//!
//! Violations carry the JSON Pointer of the offending input location, a
//! dotted constraint code (`string.base`, `object.allowUnknown`, ...) and a
//! human-readable message.

use std::fmt;

use thiserror::Error;

/// Failure while building a validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// No registered extension provides the requested rule.
    #[error("no extension registered for rule '{rule}' on base type '{base}'")]
    MissingExtension {
        /// Base validator the rule was requested on.
        base: String,
        /// Rule name.
        rule: String,
    },

    /// The toolkit has no base validator of this name.
    #[error("unknown base validator '{0}'")]
    UnknownBase(String),

    /// A `pattern` could not be compiled.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending expression.
        pattern: String,
        /// Compiler message.
        reason: String,
    },
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating location in the input.
    pub instance_path: String,
    /// Constraint code, e.g. `number.min`.
    pub code: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations {
    violations: Vec<Violation>,
}

impl Violations {
    pub(crate) fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A value failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("validation failed:\n{violations}")]
pub struct ValidationError {
    /// Structured list of individual violations.
    pub violations: Violations,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_display_format() {
        let v = Violation {
            instance_path: "/tags/0".to_string(),
            code: "string.min".to_string(),
            message: r#""0" length must be at least 1 characters long"#.to_string(),
        };
        let display = v.to_string();
        assert!(display.contains("/tags/0"));
        assert!(display.contains("at least 1"));
    }

    #[test]
    fn test_violation_display_root() {
        let v = Violation {
            instance_path: String::new(),
            code: "any.required".to_string(),
            message: r#""value" is required"#.to_string(),
        };
        assert!(v.to_string().contains("(root)"));
    }

    #[test]
    fn test_validation_error_lists_every_violation() {
        let err = ValidationError {
            violations: Violations::new(vec![
                Violation {
                    instance_path: "/a".into(),
                    code: "string.base".into(),
                    message: r#""a" must be a string"#.into(),
                },
                Violation {
                    instance_path: "/b".into(),
                    code: "number.base".into(),
                    message: r#""b" must be a number"#.into(),
                },
            ]),
        };
        let text = err.to_string();
        assert!(text.contains("/a"));
        assert!(text.contains("/b"));
        assert_eq!(err.violations.len(), 2);
    }

    #[test]
    fn test_missing_extension_message() {
        let err = CoreError::MissingExtension {
            base: "string".into(),
            rule: "foo".into(),
        };
        assert!(err.to_string().contains("'foo'"));
    }
}
