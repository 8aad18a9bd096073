//! # Resolution Options
//!
//! [`ResolveOptions`] is the immutable configuration one resolution runs
//! under: the sub-schema table for namespaced `$ref`s, custom types, the
//! `refine_type`/`refine_schema` hooks, strict mode, default filling,
//! validator extensions, and the diagnostics sink.
//!
//! ```
//! use schemata_resolve::{CustomType, ResolveOptions};
//! use schemata_core::{StringRules, Validator};
//! use serde_json::json;
//!
//! let options = ResolveOptions::new()
//!     .with_sub_schema("definitions", json!({"name": {"type": "string"}}))
//!     .with_type("custom", CustomType::Validator(Validator::string(StringRules::default())))
//!     .strict_mode(true);
//! assert!(options.strict_mode);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use schemata_core::{CoreError, Extension, Toolkit, Validator};
use serde_json::Value;

use crate::diagnostics::{DiagnosticSink, TracingSink};

/// Remaps a `(type, format)` pair to another type name before dispatch.
/// Returning `None` keeps the declared type.
pub type RefineType = Arc<dyn Fn(&str, Option<&str>) -> Option<String> + Send + Sync>;

/// Post-processes every resolved validator together with its fragment.
pub type RefineSchema = Arc<dyn Fn(Validator, &Value) -> Validator + Send + Sync>;

/// Builds a validator for a custom type from its fragment.
pub type TypeFactory = Arc<dyn Fn(&Toolkit, &Value) -> Result<Validator, CoreError> + Send + Sync>;

/// A caller-supplied type, consulted when `type` is not a built-in name.
#[derive(Clone)]
pub enum CustomType {
    /// Used as is for every fragment of this type.
    Validator(Validator),
    /// Called with the extension toolkit and the fragment.
    Factory(TypeFactory),
}

impl CustomType {
    /// Wrap a factory closure.
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&Toolkit, &Value) -> Result<Validator, CoreError> + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(factory))
    }
}

impl From<Validator> for CustomType {
    fn from(validator: Validator) -> Self {
        Self::Validator(validator)
    }
}

impl fmt::Debug for CustomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validator(v) => f.debug_tuple("Validator").field(&v.kind_name()).finish(),
            Self::Factory(_) => f.write_str("Factory"),
        }
    }
}

/// Configuration for one resolution.
#[derive(Clone, Default)]
pub struct ResolveOptions {
    /// Namespace id (with or without trailing `#`) to document.
    pub sub_schemas: HashMap<String, Value>,
    /// Custom types by name.
    pub types: HashMap<String, CustomType>,
    pub refine_type: Option<RefineType>,
    /// Post-process each resolved validator with its fragment. A fragment
    /// reached again through a reference cycle resolves to the validator
    /// as it was before this hook ran.
    pub refine_schema: Option<RefineSchema>,
    /// Disable type coercion on every typed validator.
    pub strict_mode: bool,
    /// Substitute a fragment's `default` for absent input.
    pub use_defaults: bool,
    /// Validator extensions, registered in order.
    pub extensions: Vec<Extension>,
    /// Receiver for non-fatal notices. `None` logs through `tracing`.
    pub diagnostics: Option<Arc<dyn DiagnosticSink>>,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sub_schema(mut self, namespace: impl Into<String>, document: Value) -> Self {
        self.sub_schemas.insert(namespace.into(), document);
        self
    }

    pub fn with_type(mut self, name: impl Into<String>, custom: impl Into<CustomType>) -> Self {
        self.types.insert(name.into(), custom.into());
        self
    }

    pub fn with_refine_type<F>(mut self, refine: F) -> Self
    where
        F: Fn(&str, Option<&str>) -> Option<String> + Send + Sync + 'static,
    {
        self.refine_type = Some(Arc::new(refine));
        self
    }

    pub fn with_refine_schema<F>(mut self, refine: F) -> Self
    where
        F: Fn(Validator, &Value) -> Validator + Send + Sync + 'static,
    {
        self.refine_schema = Some(Arc::new(refine));
        self
    }

    pub fn strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    pub fn use_defaults(mut self, fill: bool) -> Self {
        self.use_defaults = fill;
        self
    }

    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.extensions.push(extension);
        self
    }

    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// The configured sink, or the `tracing` one.
    pub fn diagnostics(&self) -> Arc<dyn DiagnosticSink> {
        self.diagnostics
            .clone()
            .unwrap_or_else(|| Arc::new(TracingSink))
    }
}

impl fmt::Debug for ResolveOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut namespaces: Vec<&str> = self.sub_schemas.keys().map(String::as_str).collect();
        namespaces.sort_unstable();
        let mut types: Vec<&str> = self.types.keys().map(String::as_str).collect();
        types.sort_unstable();
        f.debug_struct("ResolveOptions")
            .field("sub_schemas", &namespaces)
            .field("types", &types)
            .field("refine_type", &self.refine_type.is_some())
            .field("refine_schema", &self.refine_schema.is_some())
            .field("strict_mode", &self.strict_mode)
            .field("use_defaults", &self.use_defaults)
            .field("extensions", &self.extensions.len())
            .finish()
    }
}
