//! Schema compilation and validation.
//!
//! A raw schema is a YAML tree whose leaves are validator expressions.
//! Compiling it parses every leaf once; the compiled tree is then walked
//! together with each data document, collecting path-qualified errors.

use crate::{parse, SyntaxError, SyntaxResult, Validator, ValidatorKind, ValidatorRegistry};
use docmeta_core::{DataPath, DataValue, PathKey};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// A compiled schema tree.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// Static map: every declared key is looked up in the data
    Map(Vec<(String, SchemaNode)>),
    /// Static list: every declared index is looked up in the data
    List(Vec<SchemaNode>),
    /// A validator leaf
    Validator(Validator),
}

impl SchemaNode {
    /// Compiles a raw schema tree, parsing each leaf with `registry`.
    ///
    /// Parse failures carry the path of the offending leaf.
    pub fn compile(raw: &DataValue, registry: &ValidatorRegistry) -> SyntaxResult<Self> {
        compile_node(raw, registry, &DataPath::root())
    }

    fn is_optional(&self) -> bool {
        match self {
            SchemaNode::Validator(validator) => validator.is_optional,
            _ => false,
        }
    }
}

fn compile_node(
    raw: &DataValue,
    registry: &ValidatorRegistry,
    path: &DataPath,
) -> SyntaxResult<SchemaNode> {
    match raw {
        DataValue::Map(entries) => {
            let mut children = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                let key = key.key_text();
                let child = compile_node(value, registry, &path.join(key.as_str()))?;
                children.push((key, child));
            }
            Ok(SchemaNode::Map(children))
        }
        DataValue::List(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| compile_node(item, registry, &path.join(i)))
            .collect::<SyntaxResult<Vec<_>>>()
            .map(SchemaNode::List),
        DataValue::String(expression) => parse(expression, registry)
            .map(SchemaNode::Validator)
            .map_err(|e| e.at(path)),
        other => Err(SyntaxError::new(format!(
            "Invalid schema expression: '{}'. Expected a validator expression",
            other
        ))
        .at(path)),
    }
}

/// A named sub-schema registered with `Schema::add_include`.
#[derive(Debug)]
pub struct IncludedSchema {
    /// Include name
    pub name: String,
    /// Compiled tree
    pub root: SchemaNode,
}

/// Named sub-schemas shared by a schema and everything it includes.
///
/// Cloning the registry clones the handle, not the table: all clones see
/// every include registered through any of them.
#[derive(Debug, Clone, Default)]
pub struct IncludeRegistry {
    schemas: Arc<RwLock<HashMap<String, Arc<IncludedSchema>>>>,
}

impl IncludeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces `name`.
    pub fn insert(&self, name: impl Into<String>, root: SchemaNode) {
        let name = name.into();
        let schema = Arc::new(IncludedSchema {
            name: name.clone(),
            root,
        });
        self.schemas
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, schema);
    }

    /// Looks up an include.
    pub fn get(&self, name: &str) -> Option<Arc<IncludedSchema>> {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Registered include names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Number of registered includes.
    pub fn len(&self) -> usize {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A compiled schema with its named includes.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    root: SchemaNode,
    validators: Arc<ValidatorRegistry>,
    includes: IncludeRegistry,
}

impl Schema {
    /// Compiles `raw` with `validators`.
    ///
    /// Pass an existing `IncludeRegistry` to share includes with another
    /// schema; otherwise a new, empty one is created.
    pub fn new(
        raw: &DataValue,
        name: impl Into<String>,
        validators: Arc<ValidatorRegistry>,
        includes: Option<IncludeRegistry>,
    ) -> SyntaxResult<Self> {
        let root = SchemaNode::compile(raw, &validators)?;
        Ok(Self {
            name: name.into(),
            root,
            validators,
            includes: includes.unwrap_or_default(),
        })
    }

    /// Compiles every entry of `types` and registers it as a named include.
    ///
    /// Includes compile with this schema's validators and land in its shared
    /// registry, so they can include each other.
    pub fn add_include(&self, types: &DataValue) -> SyntaxResult<()> {
        let entries = types
            .as_map()
            .ok_or_else(|| SyntaxError::new(format!("Includes must be a map, got '{}'", types)))?;
        for (key, raw) in entries {
            let name = key.key_text();
            let root = compile_node(raw, &self.validators, &DataPath::new(name.as_str()))?;
            self.includes.insert(name, root);
        }
        Ok(())
    }

    /// Schema name used in results.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compiled main tree.
    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    /// The shared include registry.
    pub fn includes(&self) -> &IncludeRegistry {
        &self.includes
    }

    /// Validates `data`, collecting every error.
    ///
    /// With `strict`, keys present in the data but not declared by a static
    /// node of the schema are reported.
    pub fn validate(&self, data: &DataValue, data_name: &str, strict: bool) -> ValidationResult {
        let walker = Walker {
            includes: &self.includes,
        };
        let errors = walker.node(&self.root, data, &DataPath::root(), strict);
        ValidationResult {
            data_name: data_name.to_string(),
            schema_name: self.name.clone(),
            errors,
        }
    }
}

/// Errors from validating one document against one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Validated document
    pub data_name: String,
    /// Schema used
    pub schema_name: String,
    /// Path-qualified errors in discovery order
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Returns true if no errors were found.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(
                f,
                "Validation success: {} matches {}",
                self.data_name, self.schema_name
            );
        }
        write!(
            f,
            "Error validating data '{}' with schema '{}'",
            self.data_name, self.schema_name
        )?;
        for error in &self.errors {
            write!(f, "\n\t{}", error)?;
        }
        Ok(())
    }
}

struct Walker<'a> {
    includes: &'a IncludeRegistry,
}

impl Walker<'_> {
    fn node(&self, node: &SchemaNode, data: &DataValue, path: &DataPath, strict: bool) -> Vec<String> {
        match node {
            SchemaNode::Map(children) => {
                if !data.is_map() {
                    return vec![located(path, format!("'{}' is not a map", data))];
                }
                let mut errors = Vec::new();
                if strict {
                    for (key, _) in data.as_map().unwrap_or_default() {
                        let key = key.key_text();
                        if !children.iter().any(|(name, _)| *name == key) {
                            errors.push(format!("{}: Unexpected element", path.join(key)));
                        }
                    }
                }
                for (key, child) in children {
                    errors.extend(self.item(child, data, path, strict, PathKey::from(key.as_str())));
                }
                errors
            }
            SchemaNode::List(children) => {
                let Some(items) = data.as_list() else {
                    return vec![located(path, format!("'{}' is not a list", data))];
                };
                let mut errors = Vec::new();
                if strict {
                    for index in children.len()..items.len() {
                        errors.push(format!("{}: Unexpected element", path.join(index)));
                    }
                }
                for (index, child) in children.iter().enumerate() {
                    errors.extend(self.item(child, data, path, strict, PathKey::Index(index)));
                }
                errors
            }
            SchemaNode::Validator(validator) => self.validator(validator, data, path, strict),
        }
    }

    fn item(
        &self,
        node: &SchemaNode,
        data: &DataValue,
        path: &DataPath,
        strict: bool,
        key: PathKey,
    ) -> Vec<String> {
        let item_path = path.join(key.clone());
        match data.child(&key) {
            Some(item) => self.node(node, item, &item_path, strict),
            None if node.is_optional() => Vec::new(),
            None => vec![format!("{}: Required field missing", item_path)],
        }
    }

    fn validator(
        &self,
        validator: &Validator,
        data: &DataValue,
        path: &DataPath,
        strict: bool,
    ) -> Vec<String> {
        if data.is_null() && validator.is_optional && validator.can_be_none {
            return Vec::new();
        }

        let primitive: Vec<String> = validator
            .validate_value(data)
            .into_iter()
            .map(|error| located(path, error))
            .collect();
        if !primitive.is_empty() {
            return primitive;
        }

        match &validator.kind {
            ValidatorKind::Include { name, strict: own } => {
                self.include(name, *own, data, path, strict)
            }
            ValidatorKind::Map(children) | ValidatorKind::List(children) => {
                self.map_list(children, data, path, strict)
            }
            ValidatorKind::Any(children) => self.any(children, data, path, strict),
            ValidatorKind::Subset { validators, .. } => {
                self.subset(validators, data, path, strict)
            }
            ValidatorKind::String
            | ValidatorKind::Integer
            | ValidatorKind::Number
            | ValidatorKind::Boolean
            | ValidatorKind::Null
            | ValidatorKind::Enum(_)
            | ValidatorKind::Day
            | ValidatorKind::Timestamp
            | ValidatorKind::Regex { .. }
            | ValidatorKind::Ip
            | ValidatorKind::Domain(_) => Vec::new(),
        }
    }

    fn include(
        &self,
        name: &str,
        own_strict: Option<bool>,
        data: &DataValue,
        path: &DataPath,
        strict: bool,
    ) -> Vec<String> {
        let Some(schema) = self.includes.get(name) else {
            return vec![located(
                path,
                format!("Include '{}' has not been defined.", name),
            )];
        };
        self.node(&schema.root, data, path, own_strict.unwrap_or(strict))
    }

    fn map_list(
        &self,
        children: &[Validator],
        data: &DataValue,
        path: &DataPath,
        strict: bool,
    ) -> Vec<String> {
        if children.is_empty() {
            return Vec::new();
        }

        let mut errors = Vec::new();
        for (key, value) in entries(data) {
            let item_path = path.join(key);
            let failures: Vec<Vec<String>> = children
                .iter()
                .map(|child| self.validator(child, value, &item_path, strict))
                .filter(|e| !e.is_empty())
                .collect();
            if failures.len() == children.len() {
                errors.extend(failures.into_iter().flatten());
            }
        }
        errors
    }

    fn any(
        &self,
        children: &[Validator],
        data: &DataValue,
        path: &DataPath,
        strict: bool,
    ) -> Vec<String> {
        let failures: Vec<Vec<String>> = children
            .iter()
            .map(|child| self.validator(child, data, path, strict))
            .filter(|e| !e.is_empty())
            .collect();
        if failures.len() == children.len() {
            failures.into_iter().flatten().collect()
        } else {
            Vec::new()
        }
    }

    /// Each element must match one candidate. Only the last candidate's
    /// errors are kept when none matches.
    fn subset(
        &self,
        candidates: &[Validator],
        data: &DataValue,
        path: &DataPath,
        strict: bool,
    ) -> Vec<String> {
        let first_match = |element: &DataValue| -> Vec<String> {
            let mut last = Vec::new();
            for candidate in candidates {
                last = self.validator(candidate, element, path, strict);
                if last.is_empty() {
                    break;
                }
            }
            last
        };

        match data {
            DataValue::Map(map) => map
                .iter()
                .flat_map(|(k, v)| first_match(&DataValue::Map(vec![(k.clone(), v.clone())])))
                .collect(),
            DataValue::List(items) => items.iter().flat_map(first_match).collect(),
            scalar => first_match(scalar),
        }
    }
}

/// Prefixes `message` with `path`; errors at the document root are left bare.
fn located(path: &DataPath, message: String) -> String {
    if path.is_root() {
        message
    } else {
        format!("{}: {}", path, message)
    }
}

/// Child values of a map or list with their path keys.
fn entries(data: &DataValue) -> Vec<(PathKey, &DataValue)> {
    match data {
        DataValue::Map(map) => map
            .iter()
            .map(|(k, v)| (PathKey::Name(k.key_text()), v))
            .collect(),
        DataValue::List(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (PathKey::Index(i), v))
            .collect(),
        _ => Vec::new(),
    }
}
