//! # schemata-core — Validator Combinator Runtime
//!
//! The runtime that resolved schemas compile to. A [`Validator`] is an
//! immutable tree of primitive kinds (boolean, number, string, binary,
//! array, object, literal sets) and combinators (any-of, one-of, all-of,
//! not), plus lazy [`Link`]s used to express recursive schemas.
//!
//! ## Validation Model
//!
//! - `validate` never panics and never returns `Err`: it returns a
//!   [`Validation`] carrying the possibly coerced/defaulted value and a list
//!   of [`Violation`]s with JSON Pointer paths.
//! - Coercion is on by default (`"true"` is a boolean, `"12"` a number,
//!   JSON text an object or array). [`Validator::strict`] turns it off for a
//!   subtree.
//! - Absent input is not `null`. It passes unless the validator is
//!   required, and is replaced by the default when the validator fills
//!   defaults.
//! - `one_of` counts a branch match as vacuous when the branch is an object
//!   validator none of whose declared keys are present. One substantive
//!   match, or only vacuous matches, pass.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `schemata-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod extension;
pub mod format;
pub mod link;
pub mod validate;
pub mod validator;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use error::{CoreError, ValidationError, Violation, Violations};
pub use extension::{rule, Extension, Rule, Toolkit};
pub use format::StringFormat;
pub use link::{Link, LinkTable, NodeId};
pub use validate::{Prefs, Validation};
pub use validator::{
    ArrayRules, BinaryEncoding, BinaryRules, NumberRules, ObjectRules, Pattern, Presence,
    StringRules, Uniqueness, Validator,
};
pub use value::type_name;
