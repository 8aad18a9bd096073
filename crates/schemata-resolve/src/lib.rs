//! # schemata-resolve — Schema Resolution Engine
//!
//! Translates a JSON-Schema-like document into a [`schemata_core::Validator`].
//!
//! ```
//! use schemata_resolve::{resolve, ResolveOptions};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {
//!         "value": {"type": "string"},
//!         "next": {"$ref": "#"}
//!     }
//! });
//! let validator = resolve(&schema, &ResolveOptions::default()).unwrap();
//! assert!(validator.accepts(&json!({"value": "a", "next": {"value": "b"}})));
//! assert!(!validator.accepts(&json!({"value": "a", "next": {"value": 0}})));
//! ```
//!
//! ## Components
//!
//! - [`resolver`]: dispatch, `$ref` following, cycle detection and the
//!   composition keywords.
//! - [`registry`]: custom types, `refine_type`/`refine_schema` hooks and
//!   the extension toolkit, consulted by the resolver.
//! - [`defaults`]: a factory that merges per-call options over defaults.
//! - [`diagnostics`]: where under-specified fragments are reported.
//!
//! ## Errors
//!
//! Schema-authoring mistakes (unknown type, bad `$ref`, composition keyword
//! that is not an array) abort resolution with a [`ResolveError`]. Data
//! errors are never raised here; they come back from `validate` as a
//! [`schemata_core::Validation`].
//!
//! ## Crate Policy
//!
//! - Depends only on `schemata-core` internally.
//! - Resolution is synchronous. Each call owns its cycle-detection state,
//!   so concurrent calls on the same document are safe.
//! - No `unsafe` code, no `.unwrap()` outside tests.

pub mod defaults;
pub mod diagnostics;
pub mod error;
mod keywords;
pub mod options;
mod reference;
pub mod registry;
pub mod resolver;
mod visited;

pub use defaults::Defaults;
pub use diagnostics::{CollectingSink, DiagnosticSink, TracingSink};
pub use error::ResolveError;
pub use options::{CustomType, RefineSchema, RefineType, ResolveOptions, TypeFactory};
pub use registry::Registry;
pub use resolver::{resolve, SchemaResolver};
