//! Keyword families for the built-in types.
//!
//! Object and array rules recurse into nested fragments through the
//! resolver; number and string rules read scalar keywords only.

use schemata_core::{
    ArrayRules, BinaryRules, NodeId, NumberRules, ObjectRules, Pattern, StringFormat,
    StringRules, Uniqueness, Validator,
};
use serde_json::Value;

use crate::error::ResolveError;
use crate::resolver::{enum_values, SchemaResolver};

impl SchemaResolver<'_> {
    pub(crate) fn object(
        &mut self,
        fragment: &Value,
        chain: &[NodeId],
    ) -> Result<Validator, ResolveError> {
        let required: Vec<&str> = fragment
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let keys = match fragment.get("properties") {
            Some(Value::Object(properties)) => {
                let mut keys = Vec::with_capacity(properties.len());
                for (name, property) in properties {
                    let mut validator = self.resolve_fragment(property, chain)?;
                    // `required: true` on the property itself is the draft-3 form.
                    if required.contains(&name.as_str())
                        || property.get("required") == Some(&Value::Bool(true))
                    {
                        validator = validator.required();
                    }
                    keys.push((name.clone(), validator));
                }
                Some(keys)
            }
            _ => None,
        };

        let mut rules = ObjectRules {
            keys,
            min_properties: count(fragment, "minProperties"),
            max_properties: count(fragment, "maxProperties"),
            ..Default::default()
        };
        match fragment.get("additionalProperties") {
            None | Some(Value::Null) => {}
            Some(extra @ Value::Object(_)) => {
                rules.pattern = Some(self.resolve_fragment(extra, chain)?);
            }
            Some(flag) => rules.unknown = Some(truthy(flag)),
        }
        Ok(Validator::object(rules))
    }

    pub(crate) fn array(
        &mut self,
        fragment: &Value,
        chain: &[NodeId],
    ) -> Result<Validator, ResolveError> {
        let mut rules = ArrayRules::default();

        match (fragment.get("items"), fragment.get("ordered")) {
            (Some(Value::Array(list)), _) => rules.tuple = self.resolve_all(list, chain)?,
            (Some(single @ (Value::Object(_) | Value::String(_))), _) => {
                rules.items = Some(self.resolve_fragment(single, chain)?);
            }
            (_, Some(ordered)) => {
                rules.tuple = match ordered {
                    Value::Array(list) => self.resolve_all(list, chain)?,
                    single => vec![self.resolve_fragment(single, chain)?],
                };
                rules.closed = true;
            }
            _ => {}
        }

        rules.min_items = count(fragment, "minItems");
        rules.max_items = count(fragment, "maxItems");
        if !rules.tuple.is_empty() {
            match fragment.get("additionalItems") {
                Some(Value::Bool(false)) => {
                    let cap = rules.tuple.len();
                    rules.max_items = Some(rules.max_items.map_or(cap, |max| max.min(cap)));
                }
                Some(extra @ (Value::Object(_) | Value::String(_))) => {
                    rules.items = Some(self.resolve_fragment(extra, chain)?);
                }
                _ => {}
            }
        }

        if fragment.get("uniqueItems").is_some_and(truthy) {
            let keys: Vec<String> = fragment
                .get("uniques")
                .and_then(Value::as_array)
                .map(|keys| keys.iter().filter_map(Value::as_str).map(String::from).collect())
                .unwrap_or_default();
            rules.unique = Some(if keys.is_empty() {
                Uniqueness::Deep
            } else {
                Uniqueness::Keys(keys)
            });
        }

        Ok(Validator::array(rules))
    }
}

pub(crate) fn number(fragment: &Value, integer: bool) -> Validator {
    let mut rules = NumberRules {
        integer,
        minimum: float(fragment, "minimum"),
        maximum: float(fragment, "maximum"),
        greater: float(fragment, "exclusiveMinimum"),
        less: float(fragment, "exclusiveMaximum"),
        multiple_of: float(fragment, "multipleOf").filter(|m| *m != 0.0),
    };
    // Draft-4 boolean exclusives modify the inclusive bound.
    if fragment.get("exclusiveMinimum") == Some(&Value::Bool(true)) {
        rules.greater = rules.minimum.take();
    }
    if fragment.get("exclusiveMaximum") == Some(&Value::Bool(true)) {
        rules.less = rules.maximum.take();
    }
    Validator::number(rules)
}

pub(crate) fn string(fragment: &Value) -> Result<Validator, ResolveError> {
    if let Some(values) = fragment.get("enum") {
        return Ok(Validator::valid(enum_values(values)?));
    }

    let mut rules = StringRules::default();
    match fragment.get("format").and_then(Value::as_str) {
        Some("binary") => {
            return Ok(Validator::binary(BinaryRules {
                min_length: count(fragment, "minLength"),
                max_length: count(fragment, "maxLength"),
                ..Default::default()
            }))
        }
        Some("byte") => rules.format = Some(StringFormat::Base64),
        Some(name) => {
            if let Some(format) = named_format(name) {
                return Ok(Validator::string(StringRules {
                    format: Some(format),
                    ..Default::default()
                }));
            }
        }
        None => {}
    }

    if let Some(pattern) = fragment.get("pattern").and_then(Value::as_str) {
        rules.patterns.push(Pattern::new(pattern)?);
    }
    rules.min_length = count(fragment, "minLength");
    rules.max_length = count(fragment, "maxLength");
    rules.allow_empty = matches!(rules.min_length, None | Some(0));
    Ok(Validator::string(rules))
}

fn named_format(name: &str) -> Option<StringFormat> {
    Some(match name {
        "date" => StringFormat::Date,
        "time" => StringFormat::Time,
        "date-time" => StringFormat::DateTime,
        "email" => StringFormat::Email,
        "hostname" => StringFormat::Hostname,
        "ipv4" => StringFormat::Ipv4,
        "ipv6" => StringFormat::Ipv6,
        "uri" => StringFormat::Uri,
        "uuid" => StringFormat::Uuid,
        "guid" => StringFormat::Guid,
        _ => return None,
    })
}

fn count(fragment: &Value, keyword: &str) -> Option<usize> {
    fragment
        .get(keyword)
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
}

fn float(fragment: &Value, keyword: &str) -> Option<f64> {
    fragment.get(keyword).and_then(Value::as_f64)
}

/// Loose truthiness for flag-like keywords.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_draft4_exclusive() {
        let v = number(&json!({"minimum": 0, "exclusiveMinimum": true}), false);
        assert!(!v.accepts(&json!(0)));
        assert!(v.accepts(&json!(1)));
    }

    #[test]
    fn test_number_zero_multiple_ignored() {
        let v = number(&json!({"multipleOf": 0}), false);
        assert!(v.accepts(&json!(7)));
    }

    #[test]
    fn test_integer_flag() {
        let v = number(&json!({}), true);
        assert!(v.accepts(&json!(2)));
        assert!(!v.accepts(&json!(2.5)));
    }

    #[test]
    fn test_string_explicit_min_length_forbids_empty() {
        assert!(!string(&json!({"minLength": 1})).unwrap().accepts(&json!("")));
        assert!(string(&json!({"minLength": 0})).unwrap().accepts(&json!("")));
        assert!(string(&json!({})).unwrap().accepts(&json!("")));
    }

    #[test]
    fn test_string_enum_short_circuits() {
        let v = string(&json!({"enum": ["A", "B"], "minLength": 5})).unwrap();
        assert!(v.accepts(&json!("B")));
        assert!(!v.accepts(&json!("C")));
    }

    #[test]
    fn test_string_bad_pattern() {
        assert!(matches!(
            string(&json!({"pattern": "("})),
            Err(ResolveError::Core(_))
        ));
    }

    #[test]
    fn test_unknown_format_is_plain_string() {
        let v = string(&json!({"format": "color", "maxLength": 3})).unwrap();
        assert!(v.accepts(&json!("red")));
        assert!(!v.accepts(&json!("green")));
    }

    #[test]
    fn test_truthy() {
        assert!(truthy(&json!(1)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(truthy(&json!([])));
    }
}
