//! # Extensions
//!
//! Caller-supplied validation rules, grouped per base validator, and the
//! [`Toolkit`] that hands out base validators with those rules attached.
//!
//! A custom type factory receives the toolkit and asks for e.g.
//! `toolkit.extended("string", "foo")`. Asking for a rule that no
//! registered extension provides is a build-time error, not a silent
//! no-op.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::CoreError;
use crate::validator::{
    ArrayRules, BinaryRules, NumberRules, ObjectRules, StringRules, Validator,
};

/// A named check run on a value after its base validator accepted it.
pub trait Rule: Send + Sync {
    /// Rule name; also the suffix of the violation code.
    fn name(&self) -> &str;

    /// Returns `Err(message)` when `value` breaks the rule.
    fn check(&self, value: &Value) -> Result<(), String>;
}

impl fmt::Debug for dyn Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("name", &self.name()).finish()
    }
}

struct FnRule<F> {
    name: String,
    check: F,
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&Value) -> Result<(), String> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        (self.check)(value)
    }
}

/// Build a [`Rule`] from a closure.
pub fn rule<F>(name: impl Into<String>, check: F) -> Arc<dyn Rule>
where
    F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
{
    Arc::new(FnRule {
        name: name.into(),
        check,
    })
}

/// A set of rules registered against one base validator name
/// (`"string"`, `"number"`, ...).
#[derive(Debug, Clone)]
pub struct Extension {
    /// Base validator name the rules extend.
    pub base: String,
    /// Rules contributed by this extension.
    pub rules: Vec<Arc<dyn Rule>>,
}

impl Extension {
    /// Create an empty extension for `base`.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            rules: Vec::new(),
        }
    }

    /// Add a rule.
    pub fn with_rule(mut self, rule: Arc<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }
}

/// Validator factory with a fixed set of extensions.
///
/// Later extensions shadow earlier ones that define a rule of the same
/// name on the same base.
#[derive(Debug, Clone, Default)]
pub struct Toolkit {
    extensions: Vec<Extension>,
}

impl Toolkit {
    /// Create a toolkit with the given extensions registered in order.
    pub fn new(extensions: Vec<Extension>) -> Self {
        Self { extensions }
    }

    /// Registered extensions, in registration order.
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub fn any(&self) -> Validator {
        Validator::any()
    }

    pub fn boolean(&self) -> Validator {
        Validator::boolean()
    }

    pub fn number(&self) -> Validator {
        Validator::number(NumberRules::default())
    }

    pub fn string(&self) -> Validator {
        Validator::string(StringRules::default())
    }

    pub fn binary(&self) -> Validator {
        Validator::binary(BinaryRules::default())
    }

    pub fn array(&self) -> Validator {
        Validator::array(ArrayRules::default())
    }

    pub fn object(&self) -> Validator {
        Validator::object(ObjectRules::default())
    }

    /// Base validator by name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownBase`] for names other than `any`,
    /// `boolean`, `number`, `string`, `binary`, `array` and `object`.
    pub fn base(&self, name: &str) -> Result<Validator, CoreError> {
        match name {
            "any" => Ok(self.any()),
            "boolean" => Ok(self.boolean()),
            "number" => Ok(self.number()),
            "string" => Ok(self.string()),
            "binary" => Ok(self.binary()),
            "array" => Ok(self.array()),
            "object" => Ok(self.object()),
            other => Err(CoreError::UnknownBase(other.to_string())),
        }
    }

    /// Look up an extension rule.
    pub fn find_rule(&self, base: &str, rule: &str) -> Option<Arc<dyn Rule>> {
        self.extensions
            .iter()
            .rev()
            .filter(|ext| ext.base == base)
            .flat_map(|ext| ext.rules.iter())
            .find(|r| r.name() == rule)
            .cloned()
    }

    /// Base validator `base` with extension rule `rule` attached.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingExtension`] if no registered extension on
    /// `base` provides `rule`.
    pub fn extended(&self, base: &str, rule: &str) -> Result<Validator, CoreError> {
        let found = self
            .find_rule(base, rule)
            .ok_or_else(|| CoreError::MissingExtension {
                base: base.to_string(),
                rule: rule.to_string(),
            })?;
        Ok(self.base(base)?.rule(found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn foo_extension() -> Extension {
        Extension::new("string").with_rule(rule("foo", |v| {
            if v == "foobar" {
                Ok(())
            } else {
                Err("needs to be 'foobar'".to_string())
            }
        }))
    }

    #[test]
    fn test_extended_rule_applies() {
        let toolkit = Toolkit::new(vec![foo_extension()]);
        let validator = toolkit.extended("string", "foo").unwrap();
        assert!(validator.validate(&json!("foobar")).is_valid());
        let result = validator.validate(&json!("foo"));
        assert!(!result.is_valid());
        assert_eq!(result.violations()[0].code, "string.foo");
    }

    #[test]
    fn test_extended_rule_keeps_base_checks() {
        let toolkit = Toolkit::new(vec![foo_extension()]);
        let validator = toolkit.extended("string", "foo").unwrap();
        assert!(!validator.validate(&json!(10)).is_valid());
    }

    #[test]
    fn test_missing_extension_is_an_error() {
        let toolkit = Toolkit::new(vec![foo_extension()]);
        let err = toolkit.extended("string", "baz").unwrap_err();
        assert!(matches!(err, CoreError::MissingExtension { .. }));
        let err = toolkit.extended("number", "foo").unwrap_err();
        assert!(matches!(err, CoreError::MissingExtension { .. }));
    }

    #[test]
    fn test_later_extension_shadows_earlier() {
        let strict = Extension::new("string").with_rule(rule("foo", |v| {
            if v == "foobaz" {
                Ok(())
            } else {
                Err("needs to be 'foobaz'".to_string())
            }
        }));
        let toolkit = Toolkit::new(vec![foo_extension(), strict]);
        let validator = toolkit.extended("string", "foo").unwrap();
        assert!(validator.validate(&json!("foobaz")).is_valid());
        assert!(!validator.validate(&json!("foobar")).is_valid());
    }

    #[test]
    fn test_unknown_base() {
        let toolkit = Toolkit::default();
        assert!(matches!(
            toolkit.base("date"),
            Err(CoreError::UnknownBase(name)) if name == "date"
        ));
    }
}
