//! # Validators
//!
//! [`Validator`] is an immutable, cheaply cloneable description of the
//! constraints a value must meet. Validators are composed bottom-up from
//! primitive kinds (string, number, object, ...) and combinators (any-of,
//! one-of, all-of, not) and may contain lazy [`Link`]s back to an
//! enclosing validator, which is how recursive schemas are expressed.
//!
//! Kind-specific constraints are plain rule structs ([`StringRules`],
//! [`ObjectRules`], ...). Presence, labels, defaults and coercion settings
//! are flags that apply to any kind.

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::error::CoreError;
use crate::extension::Rule;
use crate::format::StringFormat;
use crate::link::{Link, LinkTable, NodeId};

/// Whether a value must, may, or must not be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presence {
    #[default]
    Optional,
    Required,
    Forbidden,
}

/// A compiled regular-expression constraint.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compile `pattern` (unanchored, as JSON Schema `pattern` is).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPattern`] if the expression does not compile.
    pub fn new(pattern: &str) -> Result<Self, CoreError> {
        let regex = Regex::new(pattern).map_err(|e| CoreError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub(crate) fn describe(&self) -> &str {
        self.regex.as_str()
    }
}

/// Numeric constraints. `integer` demands an integral value.
#[derive(Debug, Clone, Default)]
pub struct NumberRules {
    pub integer: bool,
    /// Inclusive lower bound.
    pub minimum: Option<f64>,
    /// Inclusive upper bound.
    pub maximum: Option<f64>,
    /// Strict lower bound.
    pub greater: Option<f64>,
    /// Strict upper bound.
    pub less: Option<f64>,
    /// Nonzero divisor.
    pub multiple_of: Option<f64>,
}

/// String constraints. Lengths count characters.
#[derive(Debug, Clone, Default)]
pub struct StringRules {
    /// When false, `""` is rejected outright.
    pub allow_empty: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub patterns: Vec<Pattern>,
    pub format: Option<StringFormat>,
}

/// How a binary payload is carried in a JSON string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinaryEncoding {
    /// The string's UTF-8 bytes.
    #[default]
    Utf8,
    /// Standard padded base64.
    Base64,
}

/// Byte-buffer constraints. Lengths count bytes.
#[derive(Debug, Clone, Default)]
pub struct BinaryRules {
    pub encoding: BinaryEncoding,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

/// Element equality used by uniqueness checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Uniqueness {
    /// Deep JSON equality.
    Deep,
    /// Objects are equal when every listed key holds an equal value.
    Keys(Vec<String>),
}

/// Array constraints.
#[derive(Debug, Clone, Default)]
pub struct ArrayRules {
    /// Every element not covered by `tuple` must satisfy this.
    pub items: Option<Validator>,
    /// Element `i` must satisfy `tuple[i]`.
    pub tuple: Vec<Validator>,
    /// Reject elements beyond `tuple` when no `items` validator is set.
    pub closed: bool,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique: Option<Uniqueness>,
}

/// Object constraints.
#[derive(Debug, Clone, Default)]
pub struct ObjectRules {
    /// Declared properties, in declaration order. `None` means no key set
    /// was declared at all (as opposed to an empty one).
    pub keys: Option<Vec<(String, Validator)>>,
    /// Catch-all validator for undeclared properties.
    pub pattern: Option<Validator>,
    /// Explicit unknown-key policy. `None` allows unknown keys only when
    /// `keys` is `None` or the caller's preferences allow them.
    pub unknown: Option<bool>,
    pub min_properties: Option<usize>,
    pub max_properties: Option<usize>,
}

#[derive(Debug, Clone)]
pub(crate) enum Kind {
    Any,
    Boolean,
    Number(NumberRules),
    String(StringRules),
    Binary(BinaryRules),
    Array(ArrayRules),
    Object(ObjectRules),
    Valid(Vec<Value>),
    AnyOf(Vec<Validator>),
    OneOf(Vec<Validator>),
    AllOf(Vec<Validator>),
    Not(Vec<Validator>),
    Link(Link),
}

impl Kind {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Kind::Any | Kind::Valid(_) | Kind::Not(_) => "any",
            Kind::Boolean => "boolean",
            Kind::Number(_) => "number",
            Kind::String(_) => "string",
            Kind::Binary(_) => "binary",
            Kind::Array(_) => "array",
            Kind::Object(_) => "object",
            Kind::AnyOf(_) | Kind::OneOf(_) => "alternatives",
            Kind::AllOf(_) => "all",
            Kind::Link(_) => "link",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Flags {
    pub presence: Presence,
    pub label: Option<String>,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub fill_default: bool,
    pub convert: Option<bool>,
    pub allowed: Vec<Value>,
    pub rules: Vec<Arc<dyn Rule>>,
    pub id: Option<NodeId>,
}

impl Flags {
    fn is_plain(&self) -> bool {
        self.presence == Presence::Optional
            && self.label.is_none()
            && self.description.is_none()
            && self.default.is_none()
            && !self.fill_default
            && self.convert.is_none()
            && self.allowed.is_empty()
            && self.rules.is_empty()
    }
}

/// A composable value validator.
#[derive(Debug, Clone)]
pub struct Validator {
    pub(crate) kind: Arc<Kind>,
    pub(crate) flags: Flags,
    links: Option<Arc<LinkTable>>,
}

impl Validator {
    fn from_kind(kind: Kind) -> Self {
        Self {
            kind: Arc::new(kind),
            flags: Flags::default(),
            links: None,
        }
    }

    /// Accepts any value.
    pub fn any() -> Self {
        Self::from_kind(Kind::Any)
    }

    pub fn boolean() -> Self {
        Self::from_kind(Kind::Boolean)
    }

    pub fn number(rules: NumberRules) -> Self {
        Self::from_kind(Kind::Number(rules))
    }

    pub fn string(rules: StringRules) -> Self {
        Self::from_kind(Kind::String(rules))
    }

    pub fn binary(rules: BinaryRules) -> Self {
        Self::from_kind(Kind::Binary(rules))
    }

    pub fn array(rules: ArrayRules) -> Self {
        Self::from_kind(Kind::Array(rules))
    }

    pub fn object(rules: ObjectRules) -> Self {
        Self::from_kind(Kind::Object(rules))
    }

    /// Accepts exactly the listed literals.
    pub fn valid(values: Vec<Value>) -> Self {
        Self::from_kind(Kind::Valid(values))
    }

    /// Accepts a value if at least one branch does; the first accepting
    /// branch produces the output value.
    pub fn any_of(branches: Vec<Validator>) -> Self {
        Self::from_kind(Kind::AnyOf(branches))
    }

    /// Accepts a value if exactly one branch does (see the crate docs for
    /// how vacuous object matches are counted).
    pub fn one_of(branches: Vec<Validator>) -> Self {
        Self::from_kind(Kind::OneOf(branches))
    }

    /// Accepts a value only if every branch does. Branches are checked with
    /// unknown object keys allowed, and the output of each branch feeds the
    /// next. Nested plain all-of validators are flattened.
    pub fn all_of(branches: Vec<Validator>) -> Self {
        let mut flat = Vec::with_capacity(branches.len());
        for branch in branches {
            match branch.plain_all_of() {
                Some(inner) => flat.extend(inner.iter().cloned()),
                None => flat.push(branch),
            }
        }
        Self::from_kind(Kind::AllOf(flat))
    }

    /// Rejects a value matched by any branch.
    pub fn not(branches: Vec<Validator>) -> Self {
        Self::from_kind(Kind::Not(branches))
    }

    /// Defers to whatever validator is bound to `id` in `table`.
    pub fn link(id: NodeId, table: &Arc<LinkTable>) -> Self {
        Self::from_kind(Kind::Link(Link::new(id, table)))
    }

    pub fn required(mut self) -> Self {
        self.flags.presence = Presence::Required;
        self
    }

    pub fn forbidden(mut self) -> Self {
        self.flags.presence = Presence::Forbidden;
        self
    }

    /// Name used for this value in violation messages.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.flags.label = Some(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.flags.description = Some(description.into());
        self
    }

    /// Attach a default value as metadata only.
    pub fn with_default(mut self, value: Value) -> Self {
        self.flags.default = Some(value);
        self
    }

    /// Attach a default value and substitute it for absent input.
    pub fn fill_default(mut self, value: Value) -> Self {
        self.flags.default = Some(value);
        self.flags.fill_default = true;
        self
    }

    /// `strict(true)` disables type coercion for this validator and
    /// everything beneath it; `strict(false)` re-enables it.
    pub fn strict(mut self, strict: bool) -> Self {
        self.flags.convert = Some(!strict);
        self
    }

    /// Always accept `value`, bypassing every other check.
    pub fn allow(mut self, value: Value) -> Self {
        self.flags.allowed.push(value);
        self
    }

    /// Attach an extension rule.
    pub fn rule(mut self, rule: Arc<dyn Rule>) -> Self {
        self.flags.rules.push(rule);
        self
    }

    pub fn with_id(mut self, id: NodeId) -> Self {
        self.flags.id = Some(id);
        self
    }

    /// Keep `table` alive for as long as this validator is.
    pub fn with_links(mut self, table: Arc<LinkTable>) -> Self {
        self.links = Some(table);
        self
    }

    pub fn presence(&self) -> Presence {
        self.flags.presence
    }

    pub fn label(&self) -> Option<&str> {
        self.flags.label.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.flags.description.as_deref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.flags.default.as_ref()
    }

    pub fn fills_default(&self) -> bool {
        self.flags.fill_default
    }

    pub fn id(&self) -> Option<NodeId> {
        self.flags.id
    }

    pub fn is_strict(&self) -> bool {
        self.flags.convert == Some(false)
    }

    /// Kind name: `string`, `object`, `alternatives`, `all`, `link`, ...
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Declared property names of an object validator.
    pub fn object_keys(&self) -> Option<Vec<&str>> {
        match self.kind.as_ref() {
            Kind::Object(rules) => Some(
                rules
                    .keys
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(|(k, _)| k.as_str())
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Validator of a declared object property.
    ///
    /// The returned validator shares this validator's link table, so links
    /// inside it keep resolving after `self` is dropped.
    pub fn property(&self, name: &str) -> Option<Validator> {
        let Kind::Object(rules) = self.kind.as_ref() else {
            return None;
        };
        let (_, found) = rules.keys.as_deref()?.iter().find(|(k, _)| k == name)?;
        Some(match (&found.links, &self.links) {
            (None, Some(table)) => found.clone().with_links(Arc::clone(table)),
            _ => found.clone(),
        })
    }

    /// Branches of a combinator validator.
    ///
    /// Links inside a branch resolve through the link table owned by the
    /// root validator; a clone of a branch stops resolving them once the
    /// root is dropped. Use [`Validator::property`] for a detached handle.
    pub fn branches(&self) -> Option<&[Validator]> {
        match self.kind.as_ref() {
            Kind::AnyOf(b) | Kind::OneOf(b) | Kind::AllOf(b) | Kind::Not(b) => Some(b),
            _ => None,
        }
    }

    /// Target id of a link validator.
    pub fn link_id(&self) -> Option<NodeId> {
        match self.kind.as_ref() {
            Kind::Link(link) => Some(link.id()),
            _ => None,
        }
    }

    fn plain_all_of(&self) -> Option<&[Validator]> {
        match self.kind.as_ref() {
            Kind::AllOf(b) if self.flags.is_plain() && self.links.is_none() => Some(b),
            _ => None,
        }
    }
}
