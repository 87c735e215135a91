//! # docmeta validator
//!
//! Schema validation for documentation metadata. This crate provides:
//!
//! - A constraint engine (length, range, pattern, equality and IP rules)
//! - Validators for primitive, container and metadata-specific values
//! - A schema compiler turning YAML trees of validator expressions such as
//!   `str(required=False, upper_start=True)` into reusable schemas
//! - A tree walker collecting path-qualified errors
//! - Semantic checks on example metadata and a `MetadataValidator` that runs
//!   everything over a `.doc_gen` folder
//!
//! ## Example
//!
//! ```rust
//! use docmeta_parser::parse_yaml;
//! use docmeta_validator::{Schema, ValidatorRegistry};
//! use std::sync::Arc;
//!
//! let raw = parse_yaml("name: str()\nage: int(min=0)\n").unwrap();
//! let schema = Schema::new(&raw, "person", Arc::new(ValidatorRegistry::builtin()), None).unwrap();
//!
//! let data = parse_yaml("name: Ann\nage: -1\n").unwrap();
//! let result = schema.validate(&data, "ann.yaml", true);
//!
//! assert_eq!(result.errors, vec!["age: -1 is less than 0"]);
//! ```

mod constraints;
mod domain;
mod engine;
mod error;
mod examples;
mod registry;
mod schema;
mod syntax;
mod validators;

pub use constraints::*;
pub use domain::*;
pub use engine::*;
pub use error::*;
pub use examples::*;
pub use registry::*;
pub use schema::*;
pub use syntax::*;
pub use validators::*;
