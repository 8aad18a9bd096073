//! # Extension / Type Registry
//!
//! Caller overrides consulted by the resolver at fixed points: custom
//! types (last step of type dispatch), the `refine_type` hook (first step
//! of type dispatch), the `refine_schema` hook (after each fragment), and
//! the validator extensions, which are registered once into a [`Toolkit`]
//! when the registry is built. No resolution logic lives here.

use std::borrow::Cow;
use std::collections::HashMap;

use schemata_core::{Toolkit, Validator};
use serde_json::Value;

use crate::error::ResolveError;
use crate::options::{CustomType, RefineSchema, RefineType, ResolveOptions};

/// Overrides for one resolution, borrowed from its [`ResolveOptions`].
pub struct Registry<'a> {
    toolkit: Toolkit,
    types: &'a HashMap<String, CustomType>,
    refine_type: Option<&'a RefineType>,
    refine_schema: Option<&'a RefineSchema>,
}

impl<'a> Registry<'a> {
    pub fn new(options: &'a ResolveOptions) -> Self {
        Self {
            toolkit: Toolkit::new(options.extensions.clone()),
            types: &options.types,
            refine_type: options.refine_type.as_ref(),
            refine_schema: options.refine_schema.as_ref(),
        }
    }

    /// The type name to route on.
    pub fn refine_type<'t>(&self, ty: &'t str, format: Option<&str>) -> Cow<'t, str> {
        match self.refine_type.and_then(|refine| refine(ty, format)) {
            Some(refined) if refined != ty => {
                tracing::debug!(from = ty, to = %refined, "type refined");
                Cow::Owned(refined)
            }
            _ => Cow::Borrowed(ty),
        }
    }

    /// Build the custom type `name` for `fragment`, if one is registered.
    pub fn custom_type(
        &self,
        name: &str,
        fragment: &Value,
    ) -> Option<Result<Validator, ResolveError>> {
        let custom = self.types.get(name)?;
        Some(match custom {
            CustomType::Validator(v) => Ok(v.clone()),
            CustomType::Factory(factory) => {
                factory(&self.toolkit, fragment).map_err(|source| ResolveError::CustomType {
                    name: name.to_string(),
                    source,
                })
            }
        })
    }

    /// Apply the `refine_schema` hook, if any.
    pub fn refine_schema(&self, validator: Validator, fragment: &Value) -> Validator {
        match self.refine_schema {
            Some(refine) => refine(validator, fragment),
            None => validator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemata_core::{rule, CoreError, Extension};
    use serde_json::json;

    #[test]
    fn test_refine_type_defaults_to_declared() {
        let options = ResolveOptions::new();
        let registry = Registry::new(&options);
        assert_eq!(registry.refine_type("string", Some("binary")), "string");
    }

    #[test]
    fn test_refine_type_remaps() {
        let options = ResolveOptions::new().with_refine_type(|ty, format| {
            (ty == "string" && format == Some("binary")).then(|| "binary".to_string())
        });
        let registry = Registry::new(&options);
        assert_eq!(registry.refine_type("string", Some("binary")), "binary");
        assert_eq!(registry.refine_type("string", None), "string");
    }

    #[test]
    fn test_custom_factory_sees_fragment_and_toolkit() {
        let options = ResolveOptions::new()
            .with_extension(Extension::new("string").with_rule(rule("foo", |v| {
                if v == "foobar" {
                    Ok(())
                } else {
                    Err("needs to be 'foobar'".into())
                }
            })))
            .with_type(
                "test",
                CustomType::factory(|toolkit, fragment| {
                    let extra = fragment.get("x-value").cloned().unwrap_or_default();
                    Ok(toolkit.extended("string", "foo")?.allow(extra))
                }),
            );
        let registry = Registry::new(&options);
        let v = registry
            .custom_type("test", &json!({"type": "test", "x-value": "example"}))
            .unwrap()
            .unwrap();
        assert!(v.accepts(&json!("example")));
        assert!(v.accepts(&json!("foobar")));
        assert!(!v.accepts(&json!("other")));
    }

    #[test]
    fn test_custom_factory_error_is_wrapped() {
        let options = ResolveOptions::new()
            .with_type("baz", CustomType::factory(|t, _| Ok(t.extended("string", "baz")?)));
        let registry = Registry::new(&options);
        let err = registry.custom_type("baz", &json!({})).unwrap().unwrap_err();
        assert!(matches!(
            err,
            ResolveError::CustomType { ref name, source: CoreError::MissingExtension { .. } } if name == "baz"
        ));
    }

    #[test]
    fn test_unknown_custom_type() {
        let options = ResolveOptions::new();
        assert!(Registry::new(&options).custom_type("nope", &json!({})).is_none());
    }
}
