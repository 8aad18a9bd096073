//! # Resolution Errors
//!
//! Everything that can go wrong while *building* a validator from a schema
//! document. These abort the whole resolution; there is no partial result.
//! Data that fails validation is reported through
//! [`schemata_core::Validation`] instead and never surfaces here.

use schemata_core::CoreError;
use thiserror::Error;

/// Failure while resolving a schema document into a validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// `type` names neither a built-in type nor a registered custom type.
    #[error("could not resolve type: {0}")]
    UnresolvedType(String),

    /// A `$ref` names a namespace the sub-schema table does not contain.
    #[error("can not find schema reference: {reference}")]
    ReferenceNotFound {
        /// The full reference string.
        reference: String,
    },

    /// A `$ref` path does not lead to a fragment.
    #[error("malformed schema reference '{reference}': {reason}")]
    MalformedReference {
        /// The full reference string.
        reference: String,
        /// What went wrong while walking the path.
        reason: String,
    },

    /// A composition keyword was not given a sequence of fragments.
    #[error("expected {keyword} to be an array")]
    InvalidComposition {
        /// `anyOf`, `allOf`, `oneOf` or `not`.
        keyword: &'static str,
    },

    /// The document (or one of its keywords) has an unusable shape.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// The validator runtime refused to build a constraint.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A custom type factory failed.
    #[error("custom type '{name}' failed to build")]
    CustomType {
        /// Registered type name.
        name: String,
        /// Underlying toolkit failure.
        #[source]
        source: CoreError,
    },
}
