//! # docmeta core
//!
//! Core data structures shared by the docmeta validation crates.
//!
//! The metadata validator checks two things about a code-examples repository:
//! that every documentation metadata file matches its schema, and that the
//! source tree itself is free of content-policy problems (deny-listed words,
//! leaked secrets, missing license headers, misplaced sample files).
//!
//! ## Key Concepts
//!
//! - **DataValue**: a YAML-shaped document value validated against a schema
//! - **DataPath**: an immutable breadcrumb identifying a location inside a document
//! - **MetadataError**: a single, file-qualified finding, collected in `MetadataErrors`
//! - **ValidationConfig**: allow-lists and flags read during a project scan
//! - **ReferenceData**: known services, SDKs and block-content files
//!
//! ## Example
//!
//! ```rust
//! use docmeta_core::{MetadataError, MetadataErrors};
//!
//! let mut errors = MetadataErrors::new();
//! let word = MetadataError::DenyListWord {
//!     file: "src/main.rs".into(),
//!     word: "alpha-docs-aws.amazon.com".to_string(),
//! };
//!
//! assert!(errors.add(word.clone()).is_ok());
//! assert!(errors.add(word).is_err());
//! assert_eq!(errors.len(), 1);
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod path;
pub mod reference;
pub mod value;

pub use builder::*;
pub use config::*;
pub use error::*;
pub use path::*;
pub use reference::*;
pub use value::*;
