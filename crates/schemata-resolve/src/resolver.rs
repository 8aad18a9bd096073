//! # Schema Resolver
//!
//! Walks a schema document and produces the equivalent [`Validator`].
//!
//! ## Dispatch
//!
//! For each structured fragment:
//!
//! 1. A `$ref` is followed and the target resolved in its place.
//! 2. Otherwise the primary shape comes from the first of `type`,
//!    `properties` (implied object), `format` (implied string) or `enum`.
//! 3. `anyOf`, `allOf`, `oneOf` and `not` are resolved independently and
//!    added alongside the primary shape. Several partial validators are
//!    combined with all-of; none at all yields an accept-anything validator
//!    and a diagnostic notice.
//! 4. The result is bound under the fragment's [`NodeId`], passed to the
//!    `refine_schema` hook, and wrapped to fill the fragment's `default`
//!    when `use_defaults` is on.
//!
//! ## Cycles
//!
//! Every object fragment gets a [`NodeId`] the first time it is seen, and
//! the ids from the root down to the current fragment are passed along as
//! the ancestor chain. Meeting a fragment whose id is on its own chain is a
//! cycle: the resolver returns a link to that id instead of recursing, and
//! the link finds the validator bound at step 4 when data is validated.
//! The returned root validator owns the link table.

use std::sync::Arc;

use schemata_core::{type_name, LinkTable, NodeId, Validator};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::diagnostics::DiagnosticSink;
use crate::error::ResolveError;
use crate::keywords::{number, string};
use crate::options::ResolveOptions;
use crate::reference;
use crate::registry::Registry;
use crate::visited::{Visit, Visited};

/// Composition keywords, in the order their validators are added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Composition {
    AnyOf,
    AllOf,
    OneOf,
    Not,
}

impl Composition {
    const ALL: [Self; 4] = [Self::AnyOf, Self::AllOf, Self::OneOf, Self::Not];

    fn keyword(self) -> &'static str {
        match self {
            Self::AnyOf => "anyOf",
            Self::AllOf => "allOf",
            Self::OneOf => "oneOf",
            Self::Not => "not",
        }
    }

    fn combine(self, branches: Vec<Validator>) -> Validator {
        match self {
            Self::AnyOf => Validator::any_of(branches),
            Self::AllOf => Validator::all_of(branches),
            Self::OneOf => Validator::one_of(branches),
            Self::Not => Validator::not(branches),
        }
    }
}

/// One resolution of one root document.
///
/// [`SchemaResolver::resolve`] consumes the resolver, so cycle-detection
/// state is never shared between resolutions.
pub struct SchemaResolver<'a> {
    root: &'a Value,
    options: &'a ResolveOptions,
    registry: Registry<'a>,
    diagnostics: Arc<dyn DiagnosticSink>,
    visited: Visited,
    links: Arc<LinkTable>,
}

impl<'a> SchemaResolver<'a> {
    /// Prepare to resolve `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidSchema`] unless `root` is an object or
    /// a type-name string.
    pub fn new(root: &'a Value, options: &'a ResolveOptions) -> Result<Self, ResolveError> {
        if !(root.is_object() || root.is_string()) {
            return Err(ResolveError::InvalidSchema(format!(
                "expected an object or a type name, found {}",
                type_name(root)
            )));
        }
        Ok(Self {
            root,
            options,
            registry: Registry::new(options),
            diagnostics: options.diagnostics(),
            visited: Visited::new(),
            links: LinkTable::new(),
        })
    }

    /// Resolve the root document.
    ///
    /// # Errors
    ///
    /// Any [`ResolveError`]; resolution stops at the first one.
    pub fn resolve(mut self) -> Result<Validator, ResolveError> {
        let root = self.root;
        let validator = self.resolve_fragment(root, &[])?;
        debug!(
            fragments = self.visited.len(),
            bound = self.links.len(),
            "schema resolved"
        );
        Ok(validator.with_links(self.links))
    }

    pub(crate) fn resolve_fragment(
        &mut self,
        fragment: &Value,
        ancestors: &[NodeId],
    ) -> Result<Validator, ResolveError> {
        let map = match fragment {
            Value::Object(map) => map,
            Value::String(name) => {
                let shorthand = json!({ "type": name });
                let validator = self.resolve_type(&shorthand, ancestors)?;
                return Ok(self.registry.refine_schema(validator, fragment));
            }
            other => {
                self.diagnostics.under_specified(other);
                return Ok(Validator::any());
            }
        };

        let id = match self.visited.visit(fragment, ancestors) {
            Visit::Cycle(id) => {
                debug!(node = %id, "reference cycle, linking back");
                return Ok(Validator::link(id, &self.links));
            }
            Visit::Shared(id) => {
                debug!(node = %id, "shared fragment resolved again");
                id
            }
            Visit::New(id) => id,
        };
        let mut chain = Vec::with_capacity(ancestors.len() + 1);
        chain.extend_from_slice(ancestors);
        chain.push(id);

        let validator = match map.get("$ref") {
            Some(Value::String(target)) => {
                let (root, options) = (self.root, self.options);
                let located = reference::locate(target, root, &options.sub_schemas)?;
                self.resolve_fragment(located, &chain)?
            }
            Some(other) => {
                return Err(ResolveError::InvalidSchema(format!(
                    "$ref must be a string, found {}",
                    type_name(other)
                )))
            }
            None => self.resolve_partials(fragment, map, &chain)?,
        };

        let validator = validator.with_id(id);
        self.links.bind(id, validator.clone());

        let mut validator = self.registry.refine_schema(validator, fragment);
        if self.options.use_defaults {
            if let Some(default) = map.get("default") {
                validator = validator.fill_default(default.clone());
            }
        }
        Ok(validator)
    }

    fn resolve_partials(
        &mut self,
        fragment: &Value,
        map: &Map<String, Value>,
        chain: &[NodeId],
    ) -> Result<Validator, ResolveError> {
        let mut partials = Vec::new();
        if map.contains_key("type") {
            partials.push(self.resolve_type(fragment, chain)?);
        } else if map.contains_key("properties") {
            let object = self.resolve_type_name("object", None, fragment, chain)?;
            partials.push(describe(object, fragment));
        } else if let Some(format) = map.get("format") {
            let string = self.resolve_type_name("string", format.as_str(), fragment, chain)?;
            partials.push(describe(string, fragment));
        } else if let Some(values) = map.get("enum") {
            partials.push(Validator::valid(enum_values(values)?));
        }

        for composition in Composition::ALL {
            if let Some(value) = map.get(composition.keyword()) {
                partials.push(self.resolve_composition(composition, value, chain)?);
            }
        }

        if partials.len() > 1 {
            return Ok(Validator::all_of(partials));
        }
        Ok(partials.pop().unwrap_or_else(|| {
            self.diagnostics.under_specified(fragment);
            Validator::any()
        }))
    }

    fn resolve_type(&mut self, fragment: &Value, chain: &[NodeId]) -> Result<Validator, ResolveError> {
        let format = fragment.get("format").and_then(Value::as_str);
        let validator = match fragment.get("type") {
            Some(Value::String(name)) => self.resolve_type_name(name, format, fragment, chain)?,
            Some(Value::Array(names)) => {
                let mut branches = Vec::with_capacity(names.len());
                for name in names {
                    let name = name.as_str().ok_or_else(|| {
                        ResolveError::InvalidSchema(format!("type names must be strings, found {name}"))
                    })?;
                    branches.push(self.resolve_type_name(name, format, fragment, chain)?);
                }
                Validator::any_of(branches)
            }
            Some(other) => return Err(ResolveError::UnresolvedType(other.to_string())),
            None => Validator::any(),
        };
        Ok(describe(validator, fragment))
    }

    fn resolve_type_name(
        &mut self,
        declared: &str,
        format: Option<&str>,
        fragment: &Value,
        chain: &[NodeId],
    ) -> Result<Validator, ResolveError> {
        let routed = self.registry.refine_type(declared, format);
        let validator = match routed.as_ref() {
            "array" => self.array(fragment, chain)?,
            "boolean" => Validator::boolean(),
            "integer" => number(fragment, true),
            "number" => number(fragment, false),
            "object" => self.object(fragment, chain)?,
            "string" => string(fragment)?,
            "null" => Validator::valid(vec![Value::Null]),
            custom => match self.registry.custom_type(custom, fragment) {
                Some(built) => built?,
                None => return Err(ResolveError::UnresolvedType(custom.to_string())),
            },
        };
        Ok(if self.options.strict_mode {
            validator.strict(true)
        } else {
            validator
        })
    }

    fn resolve_composition(
        &mut self,
        composition: Composition,
        value: &Value,
        chain: &[NodeId],
    ) -> Result<Validator, ResolveError> {
        let Value::Array(fragments) = value else {
            return Err(ResolveError::InvalidComposition {
                keyword: composition.keyword(),
            });
        };
        let branches = self.resolve_all(fragments, chain)?;
        Ok(composition.combine(branches))
    }

    pub(crate) fn resolve_all(
        &mut self,
        fragments: &[Value],
        chain: &[NodeId],
    ) -> Result<Vec<Validator>, ResolveError> {
        fragments
            .iter()
            .map(|fragment| self.resolve_fragment(fragment, chain))
            .collect()
    }
}

/// Attach `description`, `title` and `default` (as metadata only).
fn describe(mut validator: Validator, fragment: &Value) -> Validator {
    if let Some(description) = fragment.get("description").and_then(Value::as_str) {
        validator = validator.with_description(description);
    }
    if let Some(title) = fragment.get("title").and_then(Value::as_str) {
        validator = validator.with_label(title);
    }
    if let Some(default) = fragment.get("default") {
        validator = validator.with_default(default.clone());
    }
    validator
}

pub(crate) fn enum_values(values: &Value) -> Result<Vec<Value>, ResolveError> {
    match values {
        Value::Array(values) => Ok(values.clone()),
        other => Err(ResolveError::InvalidSchema(format!(
            "enum must be an array, found {}",
            type_name(other)
        ))),
    }
}

/// Resolve `schema` under `options`.
///
/// # Errors
///
/// See [`ResolveError`].
pub fn resolve(schema: &Value, options: &ResolveOptions) -> Result<Validator, ResolveError> {
    SchemaResolver::new(schema, options)?.resolve()
}
