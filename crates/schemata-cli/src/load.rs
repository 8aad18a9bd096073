//! # Document Loading
//!
//! Reads schema and data documents from disk. Files ending in `.yaml` or
//! `.yml` are parsed with `serde_yaml` and converted to JSON values; every
//! other file is parsed as JSON.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use serde_json::Value;

/// Whether `path` names a YAML document.
fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

/// Read and parse one document.
pub fn read_document(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let value = if is_yaml(path) {
        let yaml: serde_yaml::Value = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing YAML {}", path.display()))?;
        yaml_to_json_value(&yaml)
            .map_err(|e| anyhow!("converting {} to JSON: {e}", path.display()))?
    } else {
        serde_json::from_str(&text).with_context(|| format!("parsing JSON {}", path.display()))?
    };
    tracing::debug!(path = %path.display(), "loaded document");
    Ok(value)
}

/// A `--sub-schema NS=PATH` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubSchemaArg {
    pub namespace: String,
    pub path: PathBuf,
}

impl std::str::FromStr for SubSchemaArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((namespace, path)) = s.split_once('=') else {
            bail!("expected NS=PATH, got '{s}'");
        };
        if namespace.is_empty() || path.is_empty() {
            bail!("expected NS=PATH, got '{s}'");
        }
        Ok(Self {
            namespace: namespace.to_string(),
            path: PathBuf::from(path),
        })
    }
}

/// Convert a YAML value into the equivalent JSON value. Tags are dropped;
/// scalar map keys are stringified.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("{f} has no JSON representation"))
            } else {
                Err(format!("unsupported YAML number {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML key {other:?}")),
                };
                object.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_yaml_conversion() {
        let yaml: serde_yaml::Value = serde_yaml::from_str(
            "type: object\nproperties:\n  n:\n    type: integer\n    minimum: 0\n  f: 1.5\n  1: true\n",
        )
        .unwrap();
        assert_eq!(
            yaml_to_json_value(&yaml).unwrap(),
            json!({
                "type": "object",
                "properties": {"n": {"type": "integer", "minimum": 0}, "f": 1.5, "1": true}
            })
        );
    }

    #[test]
    fn test_yaml_tags_are_dropped() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("!custom [1, null]").unwrap();
        assert_eq!(yaml_to_json_value(&yaml).unwrap(), json!([1, null]));
    }

    #[test]
    fn test_yaml_extension_detection() {
        assert!(is_yaml(Path::new("schema.yaml")));
        assert!(is_yaml(Path::new("dir/schema.yml")));
        assert!(!is_yaml(Path::new("schema.json")));
        assert!(!is_yaml(Path::new("schema")));
    }

    #[test]
    fn test_sub_schema_arg() {
        let arg: SubSchemaArg = "definitions=defs/common.yaml".parse().unwrap();
        assert_eq!(arg.namespace, "definitions");
        assert_eq!(arg.path, PathBuf::from("defs/common.yaml"));
        assert!("nopath".parse::<SubSchemaArg>().is_err());
        assert!("=x.json".parse::<SubSchemaArg>().is_err());
    }
}
