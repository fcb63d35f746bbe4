use std::collections::HashMap;

/// A typed variable value as written in a variable-definition file.
///
/// Numbers keep their literal text so `1.50` is written back as `1.50`.
/// Constructs the parser does not model (references, function calls,
/// heredocs, operators) are kept verbatim as `Expression`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(String),
    Bool(bool),
    Null,
    List(Vec<Value>),
    Map(Vec<(String, Value)>),
    Expression(String),
}

impl Value {
    /// Short type tag, used in diagnostic log fields.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::Null => "null",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Expression(_) => "expression",
        }
    }

    /// True for lists and maps.
    pub fn is_collection(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }
}

/// A single `key = value` assignment.
#[derive(Debug, Clone)]
pub struct Variable {
    pub key: String,
    pub value: Value,
    /// Line of the key's first occurrence in its source file.
    pub line: usize,
}

impl Variable {
    pub fn new(key: impl Into<String>, value: Value, line: usize) -> Self {
        Self {
            key: key.into(),
            value,
            line,
        }
    }
}

/// An ordered set of variables with unique keys.
///
/// Iteration order is the order in which keys were first inserted.
/// Re-inserting a key replaces its value but keeps its original position,
/// which gives both the in-file "last assignment wins" rule and the
/// cross-file "later files override" rule a stable output order.
#[derive(Debug, Clone, Default)]
pub struct VariableSet {
    variables: Vec<Variable>,
    index: HashMap<String, usize>,
}

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or override a variable.
    ///
    /// Returns `true` when the key was new to this set.
    pub fn insert(&mut self, variable: Variable) -> bool {
        match self.index.get(&variable.key) {
            Some(&idx) => {
                self.variables[idx].value = variable.value;
                false
            }
            None => {
                self.index
                    .insert(variable.key.clone(), self.variables.len());
                self.variables.push(variable);
                true
            }
        }
    }

    /// Returns the value for the given key, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&idx| &self.variables[idx].value)
    }

    /// Returns all keys in output order.
    pub fn keys(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.key.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Two sets are equal when they hold the same keys and values in the same
/// order. Source line numbers are diagnostics only and do not participate.
impl PartialEq for VariableSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.key == b.key && a.value == b.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[test]
    fn insert_new_keys_keeps_order() {
        let mut set = VariableSet::new();
        set.insert(Variable::new("b", string("1"), 1));
        set.insert(Variable::new("a", string("2"), 2));

        assert_eq!(set.keys(), vec!["b", "a"]);
    }

    #[test]
    fn reinsert_overrides_value_but_keeps_position() {
        let mut set = VariableSet::new();
        assert!(set.insert(Variable::new("x", string("first"), 1)));
        set.insert(Variable::new("y", string("other"), 2));
        assert!(!set.insert(Variable::new("x", string("second"), 3)));

        assert_eq!(set.keys(), vec!["x", "y"]);
        assert_eq!(set.get("x"), Some(&string("second")));
        assert_eq!(set.iter().next().map(|v| v.line), Some(1));
    }

    #[test]
    fn equality_ignores_line_numbers() {
        let mut a = VariableSet::new();
        a.insert(Variable::new("k", Value::Bool(true), 1));
        let mut b = VariableSet::new();
        b.insert(Variable::new("k", Value::Bool(true), 42));

        assert_eq!(a, b);
    }

    #[test]
    fn equality_respects_order() {
        let mut a = VariableSet::new();
        a.insert(Variable::new("x", Value::Null, 1));
        a.insert(Variable::new("y", Value::Null, 2));
        let mut b = VariableSet::new();
        b.insert(Variable::new("y", Value::Null, 1));
        b.insert(Variable::new("x", Value::Null, 2));

        assert_ne!(a, b);
    }

    #[test]
    fn type_names() {
        assert_eq!(Value::Number("1".into()).type_name(), "number");
        assert_eq!(Value::Expression("var.x".into()).type_name(), "expression");
        assert!(Value::Map(Vec::new()).is_collection());
        assert!(!Value::Null.is_collection());
    }
}
