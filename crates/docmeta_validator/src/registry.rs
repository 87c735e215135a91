//! Table of validators available to schema expressions.
//!
//! Each entry maps the name used in a schema (`str`, `include`,
//! `service_name`, ...) to a builder that turns call arguments into a
//! `Validator`. The table is extensible: callers register their own builders
//! alongside the built-in ones.

use crate::{Args, DomainValidator, StringRules, SyntaxError, SyntaxResult, Validator, ValidatorKind};
use docmeta_core::ReferenceData;
use regex::RegexBuilder;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Turns call arguments into a validator.
pub type ValidatorBuilder = Arc<dyn Fn(Args) -> SyntaxResult<Validator> + Send + Sync>;

/// Name to builder table consulted by the expression parser.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    builders: HashMap<String, ValidatorBuilder>,
}

impl ValidatorRegistry {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The general purpose validators.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_kind("str", || ValidatorKind::String);
        registry.register_kind("int", || ValidatorKind::Integer);
        registry.register_kind("num", || ValidatorKind::Number);
        registry.register_kind("bool", || ValidatorKind::Boolean);
        registry.register_kind("null", || ValidatorKind::Null);
        registry.register_kind("day", || ValidatorKind::Day);
        registry.register_kind("timestamp", || ValidatorKind::Timestamp);
        registry.register_kind("ip", || ValidatorKind::Ip);

        registry.register("enum", |args| {
            let kind = ValidatorKind::Enum(args.values("enum")?);
            Validator::build("enum", kind, &args)
        });
        registry.register("regex", |args| {
            let kind = regex_kind(&args)?;
            Validator::build("regex", kind, &args)
        });
        registry.register("list", |args| {
            let kind = ValidatorKind::List(args.validators("list")?);
            Validator::build("list", kind, &args)
        });
        registry.register("map", |args| {
            let kind = ValidatorKind::Map(args.validators("map")?);
            Validator::build("map", kind, &args)
        });
        registry.register("any", |args| {
            let kind = ValidatorKind::Any(args.validators("any")?);
            Validator::build("any", kind, &args)
        });
        registry.register("subset", |args| {
            let validators = args.validators("subset")?;
            if validators.is_empty() {
                return Err(SyntaxError::new("subset requires at least one validator"));
            }
            let kind = ValidatorKind::Subset {
                validators,
                allow_empty: args.flag("allow_empty", false)?,
            };
            Validator::build("subset", kind, &args)
        });
        registry.register("include", |args| {
            let name = match args.values("include")?.first() {
                Some(name) => name.key_text(),
                None => return Err(SyntaxError::new("include requires a schema name")),
            };
            let strict = match args.keyword("strict") {
                Some(_) => Some(args.flag("strict", true)?),
                None => None,
            };
            Validator::build("include", ValidatorKind::Include { name, strict }, &args)
        });
        registry
    }

    /// The built-in validators plus the documentation metadata ones.
    ///
    /// `str` is replaced by the extended string validator, and the reference
    /// backed validators share `reference`.
    pub fn metadata_validators(reference: Arc<ReferenceData>) -> Self {
        let mut registry = Self::builtin();

        registry.register("str", |args| {
            let kind = ValidatorKind::Domain(DomainValidator::StringExtension(
                StringRules::from_args(&args)?,
            ));
            Validator::build("str", kind, &args)
        });
        registry.register("service_version", |args| {
            let kind = ValidatorKind::Domain(DomainValidator::ServiceVersion);
            Validator::build("service_version", kind, &args)
        });
        registry.register_reference("service_name", &reference, DomainValidator::ServiceName);
        registry.register_reference("example_id", &reference, DomainValidator::ExampleId);
        registry.register_reference("block_content", &reference, DomainValidator::BlockContent);
        registry.register_reference("sdk_version", &reference, DomainValidator::SdkVersion);
        registry
    }

    /// Adds or replaces the builder for `tag`.
    pub fn register<F>(&mut self, tag: impl Into<String>, builder: F)
    where
        F: Fn(Args) -> SyntaxResult<Validator> + Send + Sync + 'static,
    {
        self.builders.insert(tag.into(), Arc::new(builder));
    }

    /// Builds the validator called `tag`.
    pub fn build(&self, tag: &str, args: Args) -> SyntaxResult<Validator> {
        let builder = self
            .builders
            .get(tag)
            .ok_or_else(|| SyntaxError::new(format!("Unknown validator '{}'", tag)))?;
        builder(args)
    }

    /// Returns true if `tag` has a builder.
    pub fn contains(&self, tag: &str) -> bool {
        self.builders.contains_key(tag)
    }

    /// Registered names, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    fn register_kind(&mut self, tag: &'static str, kind: fn() -> ValidatorKind) {
        self.register(tag, move |args| Validator::build(tag, kind(), &args));
    }

    fn register_reference(
        &mut self,
        tag: &'static str,
        reference: &Arc<ReferenceData>,
        domain: fn(Arc<ReferenceData>) -> DomainValidator,
    ) {
        let reference = Arc::clone(reference);
        self.register(tag, move |args| {
            let kind = ValidatorKind::Domain(domain(Arc::clone(&reference)));
            Validator::build(tag, kind, &args)
        });
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("validators", &self.tags())
            .finish()
    }
}

fn regex_kind(args: &Args) -> SyntaxResult<ValidatorKind> {
    let ignore_case = args.flag("ignore_case", false)?;
    let multiline = args.flag("multiline", false)?;
    let dotall = args.flag("dotall", false)?;

    let mut patterns = Vec::new();
    for value in args.values("regex")? {
        let pattern = value
            .as_str()
            .ok_or_else(|| SyntaxError::new("regex patterns must be strings"))?
            .to_string();
        let regex = RegexBuilder::new(&format!(r"\A(?:{})", pattern))
            .case_insensitive(ignore_case)
            .multi_line(multiline)
            .dot_matches_new_line(dotall)
            .build()
            .map_err(|_| SyntaxError::new(format!("'{}' is not a regex", pattern)))?;
        patterns.push((pattern, regex));
    }

    let name = match args.keyword("name") {
        Some(arg) => Some(
            arg.as_value()
                .and_then(|v| v.as_str())
                .ok_or_else(|| SyntaxError::new("name is not a str"))?
                .to_string(),
        ),
        None => None,
    };

    Ok(ValidatorKind::Regex { patterns, name })
}
