//! # Validation Engine
//!
//! Walks a [`Validator`] against a JSON value. Validation never fails
//! loudly: the outcome is a [`Validation`] holding the (possibly coerced or
//! defaulted) value and every violation found.
//!
//! Absent input (a missing object property, or [`Validator::validate_missing`])
//! is distinct from `null`: it passes unless the validator is required, and
//! is replaced by the default when the validator fills defaults.

use serde_json::{Map, Value};

use crate::error::{ValidationError, Violation, Violations};
use crate::value::{escape_pointer_token, number_value, parse_structured, render_literals};
use crate::validator::{
    ArrayRules, BinaryEncoding, BinaryRules, Kind, NumberRules, ObjectRules, Presence,
    StringRules, Uniqueness, Validator,
};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Link dereferences allowed at one input location before giving up.
const MAX_LINK_HOPS: u8 = 32;

/// Tolerance for `multiple_of` on fractional divisors.
const MULTIPLE_EPSILON: f64 = 1e-9;

/// Caller preferences for one validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prefs {
    /// Coerce compatible input (`"true"` to `true`, `"12"` to `12`,
    /// JSON text to objects and arrays).
    pub convert: bool,
    /// Accept undeclared object keys when no explicit policy is set.
    pub allow_unknown: bool,
}

impl Default for Prefs {
    fn default() -> Self {
        Self {
            convert: true,
            allow_unknown: false,
        }
    }
}

/// Result of validating one value.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    value: Option<Value>,
    violations: Vec<Violation>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// The validated value: coerced and defaulted on success, the input
    /// unchanged on failure. `None` for absent input without a default.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// The violations as an error, if any.
    pub fn error(&self) -> Option<ValidationError> {
        if self.violations.is_empty() {
            None
        } else {
            Some(ValidationError {
                violations: Violations::new(self.violations.clone()),
            })
        }
    }

    /// # Errors
    ///
    /// Returns [`ValidationError`] when any violation was found.
    pub fn into_result(self) -> Result<Option<Value>, ValidationError> {
        if self.violations.is_empty() {
            Ok(self.value)
        } else {
            Err(ValidationError {
                violations: Violations::new(self.violations),
            })
        }
    }
}

type Outcome = Result<Option<Value>, Vec<Violation>>;

#[derive(Debug, Clone)]
struct Ctx {
    path: Vec<String>,
    prefs: Prefs,
    hops: u8,
}

impl Ctx {
    fn root(prefs: Prefs) -> Self {
        Self {
            path: Vec::new(),
            prefs,
            hops: 0,
        }
    }

    fn child(&self, segment: impl Into<String>) -> Self {
        let mut path = self.path.clone();
        path.push(segment.into());
        Self {
            path,
            prefs: self.prefs,
            hops: 0,
        }
    }

    fn pointer(&self) -> String {
        self.path
            .iter()
            .map(|s| format!("/{}", escape_pointer_token(s)))
            .collect()
    }
}

impl Validator {
    /// Validate a present value with default preferences.
    pub fn validate(&self, value: &Value) -> Validation {
        self.validate_with(Some(value), Prefs::default())
    }

    /// Validate an absent value.
    pub fn validate_missing(&self) -> Validation {
        self.validate_with(None, Prefs::default())
    }

    pub fn validate_with(&self, value: Option<&Value>, prefs: Prefs) -> Validation {
        match self.check(value.cloned(), &Ctx::root(prefs)) {
            Ok(value) => Validation {
                value,
                violations: Vec::new(),
            },
            Err(violations) => Validation {
                value: value.cloned(),
                violations,
            },
        }
    }

    /// Returns true if `value` passes (default preferences).
    pub fn accepts(&self, value: &Value) -> bool {
        self.validate(value).is_valid()
    }

    fn check(&self, input: Option<Value>, ctx: &Ctx) -> Outcome {
        let mut ctx = ctx.clone();
        if let Some(convert) = self.flags.convert {
            ctx.prefs.convert = convert;
        }

        let value = match input {
            None => {
                if self.flags.fill_default {
                    if let Some(default) = &self.flags.default {
                        return Ok(Some(default.clone()));
                    }
                }
                return match self.flags.presence {
                    Presence::Required => Err(vec![self.violation(&ctx, "any.required", "is required")]),
                    _ => Ok(None),
                };
            }
            Some(value) => value,
        };

        if self.flags.presence == Presence::Forbidden {
            return Err(vec![self.violation(&ctx, "any.unknown", "is not allowed")]);
        }
        if self.flags.allowed.contains(&value) {
            return Ok(Some(value));
        }

        let out = match self.kind.as_ref() {
            Kind::Any => value,
            Kind::Boolean => self.check_boolean(value, &ctx)?,
            Kind::Number(rules) => self.check_number(rules, value, &ctx)?,
            Kind::String(rules) => self.check_string(rules, value, &ctx)?,
            Kind::Binary(rules) => self.check_binary(rules, value, &ctx)?,
            Kind::Array(rules) => self.check_array(rules, value, &ctx)?,
            Kind::Object(rules) => self.check_object(rules, value, &ctx)?,
            Kind::Valid(values) => {
                if !values.contains(&value) {
                    let msg = format!("must be one of {}", render_literals(values));
                    return Err(vec![self.violation(&ctx, "any.allowOnly", &msg)]);
                }
                value
            }
            Kind::AnyOf(branches) => return self.check_any_of(branches, value, &ctx),
            Kind::OneOf(branches) => return self.check_one_of(branches, value, &ctx),
            Kind::AllOf(branches) => return self.check_all_of(branches, value, &ctx),
            Kind::Not(branches) => {
                let forbidden = branches
                    .iter()
                    .any(|b| b.check(Some(value.clone()), &ctx).is_ok());
                if forbidden {
                    return Err(vec![self.violation(&ctx, "any.not", "matches a forbidden schema")]);
                }
                value
            }
            Kind::Link(link) => {
                if ctx.hops >= MAX_LINK_HOPS {
                    return Err(vec![self.violation(&ctx, "link.depth", "references itself without consuming input")]);
                }
                let Some(target) = link.target() else {
                    let msg = format!("references unbound schema {}", link.id());
                    return Err(vec![self.violation(&ctx, "link.unresolved", &msg)]);
                };
                ctx.hops += 1;
                return target.check(Some(value), &ctx);
            }
        };

        self.apply_rules(out, &ctx)
    }

    fn apply_rules(&self, value: Value, ctx: &Ctx) -> Outcome {
        let mut violations = Vec::new();
        for rule in &self.flags.rules {
            if let Err(msg) = rule.check(&value) {
                let code = format!("{}.{}", self.kind_name(), rule.name());
                violations.push(self.violation(ctx, &code, &msg));
            }
        }
        if violations.is_empty() {
            Ok(Some(value))
        } else {
            Err(violations)
        }
    }

    fn violation(&self, ctx: &Ctx, code: &str, message: &str) -> Violation {
        let label = self
            .flags
            .label
            .as_deref()
            .or(ctx.path.last().map(String::as_str))
            .unwrap_or("value");
        Violation {
            instance_path: ctx.pointer(),
            code: code.to_string(),
            message: format!("\"{label}\" {message}"),
        }
    }

    fn check_boolean(&self, value: Value, ctx: &Ctx) -> Result<Value, Vec<Violation>> {
        match value {
            Value::Bool(_) => Ok(value),
            Value::String(ref s) if ctx.prefs.convert => match s.to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(vec![self.violation(ctx, "boolean.base", "must be a boolean")]),
            },
            _ => Err(vec![self.violation(ctx, "boolean.base", "must be a boolean")]),
        }
    }

    fn check_number(
        &self,
        rules: &NumberRules,
        value: Value,
        ctx: &Ctx,
    ) -> Result<Value, Vec<Violation>> {
        let (n, out) = match &value {
            Value::Number(num) => match num.as_f64() {
                Some(n) => (n, value.clone()),
                None => return Err(vec![self.violation(ctx, "number.base", "must be a number")]),
            },
            Value::String(s) if ctx.prefs.convert => {
                let parsed = s.trim().parse::<f64>().ok().filter(|n| n.is_finite());
                match parsed.and_then(|n| number_value(n).map(|v| (n, v))) {
                    Some(pair) => pair,
                    None => return Err(vec![self.violation(ctx, "number.base", "must be a number")]),
                }
            }
            _ => return Err(vec![self.violation(ctx, "number.base", "must be a number")]),
        };

        let mut violations = Vec::new();
        if rules.integer && n.fract() != 0.0 {
            violations.push(self.violation(ctx, "number.integer", "must be an integer"));
        }
        if let Some(min) = rules.minimum {
            if n < min {
                violations.push(self.violation(ctx, "number.min", &format!("must be larger than or equal to {min}")));
            }
        }
        if let Some(max) = rules.maximum {
            if n > max {
                violations.push(self.violation(ctx, "number.max", &format!("must be less than or equal to {max}")));
            }
        }
        if let Some(limit) = rules.greater {
            if n <= limit {
                violations.push(self.violation(ctx, "number.greater", &format!("must be greater than {limit}")));
            }
        }
        if let Some(limit) = rules.less {
            if n >= limit {
                violations.push(self.violation(ctx, "number.less", &format!("must be less than {limit}")));
            }
        }
        if let Some(m) = rules.multiple_of.filter(|m| *m != 0.0) {
            let q = n / m;
            if (q - q.round()).abs() > MULTIPLE_EPSILON {
                violations.push(self.violation(ctx, "number.multiple", &format!("must be a multiple of {m}")));
            }
        }

        if violations.is_empty() {
            Ok(out)
        } else {
            Err(violations)
        }
    }

    fn check_string(
        &self,
        rules: &StringRules,
        value: Value,
        ctx: &Ctx,
    ) -> Result<Value, Vec<Violation>> {
        let Value::String(text) = &value else {
            return Err(vec![self.violation(ctx, "string.base", "must be a string")]);
        };
        if text.is_empty() && !rules.allow_empty {
            return Err(vec![self.violation(ctx, "string.empty", "is not allowed to be empty")]);
        }

        let mut violations = Vec::new();
        let chars = text.chars().count();
        if let Some(min) = rules.min_length {
            if chars < min {
                violations.push(self.violation(ctx, "string.min", &format!("length must be at least {min} characters long")));
            }
        }
        if let Some(max) = rules.max_length {
            if chars > max {
                violations.push(self.violation(ctx, "string.max", &format!("length must be less than or equal to {max} characters long")));
            }
        }
        for pattern in &rules.patterns {
            if !pattern.is_match(text) {
                let msg = format!("with value \"{text}\" fails to match the {} pattern", pattern.describe());
                violations.push(self.violation(ctx, "string.pattern.base", &msg));
            }
        }
        if let Some(format) = rules.format {
            if !format.matches(text) {
                let code = format!("string.{}", format.code());
                violations.push(self.violation(ctx, &code, &format!("must be a valid {format}")));
            }
        }

        if violations.is_empty() {
            Ok(value)
        } else {
            Err(violations)
        }
    }

    fn check_binary(
        &self,
        rules: &BinaryRules,
        value: Value,
        ctx: &Ctx,
    ) -> Result<Value, Vec<Violation>> {
        let Value::String(text) = &value else {
            return Err(vec![self.violation(ctx, "binary.base", "must be a buffer or a string")]);
        };
        let len = match rules.encoding {
            BinaryEncoding::Utf8 => text.len(),
            BinaryEncoding::Base64 => match STANDARD.decode(text) {
                Ok(bytes) => bytes.len(),
                Err(_) => return Err(vec![self.violation(ctx, "binary.base", "must be a base64 encoded buffer")]),
            },
        };

        let mut violations = Vec::new();
        if let Some(min) = rules.min_length {
            if len < min {
                violations.push(self.violation(ctx, "binary.min", &format!("must be at least {min} bytes")));
            }
        }
        if let Some(max) = rules.max_length {
            if len > max {
                violations.push(self.violation(ctx, "binary.max", &format!("must be less than or equal to {max} bytes")));
            }
        }
        if violations.is_empty() {
            Ok(value)
        } else {
            Err(violations)
        }
    }

    fn check_array(
        &self,
        rules: &ArrayRules,
        value: Value,
        ctx: &Ctx,
    ) -> Result<Value, Vec<Violation>> {
        let value = match value {
            Value::String(s) if ctx.prefs.convert => parse_structured(&s, '[').unwrap_or(Value::String(s)),
            other => other,
        };
        let Value::Array(elements) = value else {
            return Err(vec![self.violation(ctx, "array.base", "must be an array")]);
        };

        let mut violations = Vec::new();
        let mut out = Vec::with_capacity(elements.len());
        for (i, element) in elements.into_iter().enumerate() {
            let child = ctx.child(i.to_string());
            let validator = rules.tuple.get(i).or(rules.items.as_ref());
            match validator {
                Some(v) => match v.check(Some(element.clone()), &child) {
                    Ok(checked) => out.push(checked.unwrap_or(element)),
                    Err(errs) => {
                        violations.extend(errs);
                        out.push(element);
                    }
                },
                None if rules.closed && !rules.tuple.is_empty() => {
                    let msg = format!("must contain at most {} items", rules.tuple.len());
                    violations.push(self.violation(ctx, "array.orderedLength", &msg));
                    out.push(element);
                }
                None => out.push(element),
            }
        }

        if let Some(min) = rules.min_items {
            if out.len() < min {
                violations.push(self.violation(ctx, "array.min", &format!("must contain at least {min} items")));
            }
        }
        if let Some(max) = rules.max_items {
            if out.len() > max {
                violations.push(self.violation(ctx, "array.max", &format!("must contain less than or equal to {max} items")));
            }
        }
        if let Some(unique) = &rules.unique {
            if let Some(pos) = first_duplicate(&out, unique) {
                let msg = format!("position {pos} contains a duplicate value");
                violations.push(self.violation(ctx, "array.unique", &msg));
            }
        }

        if violations.is_empty() {
            Ok(Value::Array(out))
        } else {
            Err(violations)
        }
    }

    fn check_object(
        &self,
        rules: &ObjectRules,
        value: Value,
        ctx: &Ctx,
    ) -> Result<Value, Vec<Violation>> {
        let value = match value {
            Value::String(s) if ctx.prefs.convert => parse_structured(&s, '{').unwrap_or(Value::String(s)),
            other => other,
        };
        let Value::Object(input) = value else {
            return Err(vec![self.violation(ctx, "object.base", "must be an object")]);
        };

        let mut violations = Vec::new();
        let count = input.len();
        if let Some(min) = rules.min_properties {
            if count < min {
                violations.push(self.violation(ctx, "object.min", &format!("must have at least {min} keys")));
            }
        }
        if let Some(max) = rules.max_properties {
            if count > max {
                violations.push(self.violation(ctx, "object.max", &format!("must have less than or equal to {max} keys")));
            }
        }

        let declared = rules.keys.as_deref().unwrap_or_default();
        let mut out = Map::new();
        for (key, validator) in declared {
            match validator.check(input.get(key).cloned(), &ctx.child(key.clone())) {
                Ok(Some(v)) => {
                    out.insert(key.clone(), v);
                }
                Ok(None) => {}
                Err(errs) => violations.extend(errs),
            }
        }

        let allow_unknown = rules
            .unknown
            .unwrap_or(rules.keys.is_none() || ctx.prefs.allow_unknown);
        for (key, v) in input {
            if declared.iter().any(|(k, _)| *k == key) {
                continue;
            }
            let child = ctx.child(key.clone());
            if let Some(pattern) = &rules.pattern {
                match pattern.check(Some(v.clone()), &child) {
                    Ok(checked) => {
                        out.insert(key, checked.unwrap_or(v));
                    }
                    Err(errs) => violations.extend(errs),
                }
            } else if allow_unknown {
                out.insert(key, v);
            } else {
                violations.push(Violation {
                    instance_path: child.pointer(),
                    code: "object.allowUnknown".to_string(),
                    message: format!("\"{key}\" is not allowed"),
                });
            }
        }

        if violations.is_empty() {
            Ok(Value::Object(out))
        } else {
            Err(violations)
        }
    }

    fn check_any_of(&self, branches: &[Validator], value: Value, ctx: &Ctx) -> Outcome {
        let mut last = Vec::new();
        for branch in branches {
            match branch.check(Some(value.clone()), ctx) {
                Ok(out) => return self.apply_rules(out.unwrap_or(value), ctx),
                Err(errs) => last = errs,
            }
        }
        if last.is_empty() {
            last.push(self.violation(ctx, "alternatives.base", "does not match any of the allowed types"));
        }
        Err(last)
    }

    fn check_one_of(&self, branches: &[Validator], value: Value, ctx: &Ctx) -> Outcome {
        let mut first_match = None;
        let mut substantive = 0usize;
        let mut matched = 0usize;
        for branch in branches {
            if let Ok(out) = branch.check(Some(value.clone()), ctx) {
                matched += 1;
                if branch.engages(&value, 0) {
                    substantive += 1;
                    if substantive == 1 {
                        first_match = Some(out);
                        continue;
                    }
                }
                if first_match.is_none() {
                    first_match = Some(out);
                }
            }
        }
        match (matched, substantive) {
            (0, _) => Err(vec![self.violation(ctx, "alternatives.match", "does not match any of the allowed types")]),
            (_, 0) | (_, 1) => self.apply_rules(first_match.flatten().unwrap_or(value), ctx),
            _ => Err(vec![self.violation(ctx, "alternatives.one", "matches more than one allowed type")]),
        }
    }

    /// Every branch sees the original input; the first branch's output is
    /// kept when all of them pass.
    fn check_all_of(&self, branches: &[Validator], value: Value, ctx: &Ctx) -> Outcome {
        let mut branch_ctx = ctx.clone();
        branch_ctx.prefs.allow_unknown = true;
        let mut first = None;
        let mut violations = Vec::new();
        for branch in branches {
            match branch.check(Some(value.clone()), &branch_ctx) {
                Ok(out) => {
                    if first.is_none() {
                        first = out;
                    }
                }
                Err(errs) => violations.extend(errs),
            }
        }
        if violations.is_empty() {
            self.apply_rules(first.unwrap_or(value), ctx)
        } else {
            Err(violations)
        }
    }

    /// Whether a match of this validator against `value` says anything
    /// about the value. An object validator whose declared keys are all
    /// absent from the input matches only vacuously.
    fn engages(&self, value: &Value, hops: u8) -> bool {
        match (self.kind.as_ref(), value) {
            (Kind::Object(rules), Value::Object(input)) => match rules.keys.as_deref() {
                Some(keys) if !keys.is_empty() => keys.iter().any(|(k, _)| input.contains_key(k)),
                _ => true,
            },
            (Kind::Link(link), _) if hops < MAX_LINK_HOPS => link
                .target()
                .map_or(true, |target| target.engages(value, hops + 1)),
            _ => true,
        }
    }
}

fn first_duplicate(elements: &[Value], unique: &Uniqueness) -> Option<usize> {
    for (i, a) in elements.iter().enumerate() {
        for b in &elements[..i] {
            let same = match unique {
                Uniqueness::Deep => a == b,
                Uniqueness::Keys(keys) => match (a, b) {
                    (Value::Object(x), Value::Object(y)) => keys.iter().all(|k| x.get(k) == y.get(k)),
                    _ => a == b,
                },
            };
            if same {
                return Some(i);
            }
        }
    }
    None
}
