//! # schemata-cli — Schema Validation Command-Line Interface
//!
//! Loads a schema document (JSON or YAML), any external sub-schema
//! documents, and a data document; resolves the schema and validates the
//! data against it.
//!
//! ```bash
//! schemata --schema person.yaml --data person.json
//! schemata --schema api.json --sub-schema definitions=defs.yaml --data body.json --strict
//! ```
//!
//! Exit status is `0` for valid data, `1` for data with violations and `2`
//! when the schema or a document could not be loaded or resolved.
//!
//! ## Crate Policy
//!
//! - Argument parsing and I/O only. Resolution and validation belong to
//!   `schemata-resolve` and `schemata-core`.

pub mod check;
pub mod load;
