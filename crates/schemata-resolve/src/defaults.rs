//! Preconfigured resolution.
//!
//! [`Defaults`] holds options shared by many resolutions and merges
//! per-call options over them:
//!
//! - sub-schemas and custom types: union, per-call entries win;
//! - extensions: defaults first, then per-call (later ones shadow);
//! - hooks and diagnostics sink: per-call if set, else the default;
//! - `strict_mode` and `use_defaults`: either one enables.

use schemata_core::Validator;
use serde_json::Value;

use crate::error::ResolveError;
use crate::options::ResolveOptions;
use crate::resolver::resolve;

/// A resolver factory with default options.
#[derive(Debug, Clone, Default)]
pub struct Defaults {
    options: ResolveOptions,
}

impl Defaults {
    pub fn new(options: ResolveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// The defaults with `overrides` merged over them.
    pub fn merged(&self, overrides: &ResolveOptions) -> ResolveOptions {
        let base = &self.options;

        let mut sub_schemas = base.sub_schemas.clone();
        sub_schemas.extend(
            overrides
                .sub_schemas
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        let mut types = base.types.clone();
        types.extend(
            overrides
                .types
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        let mut extensions = base.extensions.clone();
        extensions.extend(overrides.extensions.iter().cloned());

        ResolveOptions {
            sub_schemas,
            types,
            refine_type: overrides.refine_type.clone().or_else(|| base.refine_type.clone()),
            refine_schema: overrides
                .refine_schema
                .clone()
                .or_else(|| base.refine_schema.clone()),
            strict_mode: overrides.strict_mode || base.strict_mode,
            use_defaults: overrides.use_defaults || base.use_defaults,
            extensions,
            diagnostics: overrides.diagnostics.clone().or_else(|| base.diagnostics.clone()),
        }
    }

    /// Resolve `schema` under the defaults merged with `overrides`.
    ///
    /// # Errors
    ///
    /// See [`ResolveError`].
    pub fn schema(
        &self,
        schema: &Value,
        overrides: &ResolveOptions,
    ) -> Result<Validator, ResolveError> {
        let merged = self.merged(overrides);
        resolve(schema, &merged)
    }
}
