use crate::core::errors::{Result, TivorError};
use crate::core::models::variable::{Value, Variable, VariableSet};
use crate::core::traits::parser::VarsParser;

/// Parses Terraform's JSON variable files (`*.tfvars.json`) and renders
/// variable sets as JSON.
///
/// Member order is preserved. JSON has no comments, so the label passed to
/// `serialize` is ignored.
pub struct JsonVarsParser;

fn from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => Value::Number(n.to_string()),
        serde_json::Value::String(s) => Value::String(escape_templates(&s)),
        serde_json::Value::Array(items) => Value::List(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(map) => {
            Value::Map(map.into_iter().map(|(k, v)| (k, from_json(v))).collect())
        }
    }
}

/// JSON strings are literal; `Value::String` holds tfvars string text, where
/// `${` and `%{` open template sequences. Escape them as `$${` and `%%{`.
fn escape_templates(s: &str) -> String {
    s.replace("${", "$${").replace("%{", "%%{")
}

fn unescape_templates(s: &str) -> String {
    s.replace("$${", "${").replace("%%{", "%{")
}

fn to_json(key: &str, value: &Value) -> Result<serde_json::Value> {
    let json = match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::String(s) => serde_json::Value::String(unescape_templates(s)),
        Value::Number(n) => {
            let number: serde_json::Number = n.parse().map_err(|_| TivorError::Serialize {
                detail: format!("'{key}': number {n} has no JSON representation"),
            })?;
            serde_json::Value::Number(number)
        }
        // Terraform evaluates "${...}" strings in JSON files as expressions.
        Value::Expression(e) if !e.contains('\n') => serde_json::Value::String(format!("${{{e}}}")),
        Value::Expression(_) => {
            return Err(TivorError::Serialize {
                detail: format!("'{key}': multi-line expressions have no JSON representation"),
            });
        }
        Value::List(items) => serde_json::Value::Array(
            items
                .iter()
                .map(|item| to_json(key, item))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Map(entries) => {
            let mut map = serde_json::Map::new();
            for (k, v) in entries {
                map.insert(k.clone(), to_json(key, v)?);
            }
            serde_json::Value::Object(map)
        }
    };
    Ok(json)
}

impl VarsParser for JsonVarsParser {
    fn parse(&self, content: &str) -> Result<VariableSet> {
        let root: serde_json::Value =
            serde_json::from_str(content).map_err(|e| TivorError::Parse {
                file: "<json>".into(),
                line: e.line(),
                reason: e.to_string(),
            })?;

        let serde_json::Value::Object(members) = root else {
            return Err(TivorError::Parse {
                file: "<json>".into(),
                line: 1,
                reason: "expected a JSON object at the top level".into(),
            });
        };

        let mut set = VariableSet::new();
        for (key, value) in members {
            // serde_json reports no member positions; 0 marks "unknown".
            set.insert(Variable::new(key, from_json(value), 0));
        }
        Ok(set)
    }

    fn serialize(&self, variables: &VariableSet, _label: Option<&str>) -> Result<String> {
        let mut root = serde_json::Map::new();
        for variable in variables.iter() {
            root.insert(variable.key.clone(), to_json(&variable.key, &variable.value)?);
        }
        let mut output = serde_json::to_string_pretty(&serde_json::Value::Object(root))
            .map_err(|e| TivorError::Serialize {
                detail: e.to_string(),
            })?;
        output.push('\n');
        Ok(output)
    }

    fn supported_extensions(&self) -> &[&str] {
        &[".tfvars.json", ".json"]
    }
}
