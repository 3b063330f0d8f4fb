//! Path expressions over `serde_json::Value` trees.

use serde_json::Value;

use crate::error::{QueryError, Result};

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Member lookup on an object.
    Field(String),
    /// Keep the elements of an array that satisfy the predicate.
    Filter(Predicate),
}

/// A relative path, evaluated against a set of context nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    /// The empty path, selecting its context node.
    pub fn current() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.steps.push(Step::Field(name.into()));
        self
    }

    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.steps.push(Step::Filter(predicate));
        self
    }

    /// Select every node reachable from `context` along this path.
    pub fn select<'a>(&self, context: &'a Value) -> Vec<&'a Value> {
        let mut nodes = vec![context];
        for step in &self.steps {
            nodes = apply_step(step, nodes);
            if nodes.is_empty() {
                break;
            }
        }
        nodes
    }
}

fn apply_step<'a>(step: &Step, nodes: Vec<&'a Value>) -> Vec<&'a Value> {
    match step {
        Step::Field(name) => nodes
            .into_iter()
            .filter_map(|node| node.as_object().and_then(|map| map.get(name)))
            .collect(),
        Step::Filter(predicate) => nodes
            .into_iter()
            .filter_map(Value::as_array)
            .flatten()
            .filter(|item| predicate.matches(item))
            .collect(),
    }
}

/// A test applied to a single node.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// The path selects at least one node.
    Exists(Path),
    /// The path selects a string equal to the literal.
    Equals(Path, String),
    /// The path selects a present value other than the literal string.
    NotEquals(Path, String),
    /// Every predicate holds.
    All(Vec<Predicate>),
}

impl Predicate {
    pub fn exists(path: Path) -> Self {
        Self::Exists(path)
    }

    pub fn equals(path: Path, literal: impl Into<String>) -> Self {
        Self::Equals(path, literal.into())
    }

    pub fn not_equals(path: Path, literal: impl Into<String>) -> Self {
        Self::NotEquals(path, literal.into())
    }

    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Self::All(predicates.into_iter().collect())
    }

    pub fn matches(&self, node: &Value) -> bool {
        match self {
            Self::Exists(path) => !path.select(node).is_empty(),
            Self::Equals(path, literal) => path
                .select(node)
                .into_iter()
                .any(|value| value.as_str() == Some(literal.as_str())),
            Self::NotEquals(path, literal) => path
                .select(node)
                .into_iter()
                .any(|value| value.as_str() != Some(literal.as_str())),
            Self::All(predicates) => predicates.iter().all(|predicate| predicate.matches(node)),
        }
    }
}

/// A path anchored at the document root.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    path: Path,
}

impl Query {
    pub fn new(path: Path) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Evaluate against a whole record.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::ScalarRoot`] when the record is not a container.
    pub fn select<'a>(&self, record: &'a Value) -> Result<Vec<&'a Value>> {
        match record {
            Value::Object(_) | Value::Array(_) => Ok(self.path.select(record)),
            other => Err(QueryError::ScalarRoot {
                found: kind_name(other),
            }),
        }
    }
}

/// A predicate applied item by item to a list of already selected nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct ListFilter {
    predicate: Predicate,
}

impl ListFilter {
    pub fn new(predicate: Predicate) -> Self {
        Self { predicate }
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn select<'a>(&self, items: &[&'a Value]) -> Vec<&'a Value> {
        items
            .iter()
            .copied()
            .filter(|item| self.predicate.matches(item))
            .collect()
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_steps_tolerate_missing_members() {
        let doc = json!({"a": {"b": 1}});
        assert_eq!(Path::current().field("a").field("b").select(&doc), vec![&json!(1)]);
        assert!(Path::current().field("a").field("c").select(&doc).is_empty());
        assert!(Path::current().field("a").field("b").field("c").select(&doc).is_empty());
    }

    #[test]
    fn filter_only_expands_arrays() {
        let doc = json!({"items": [{"k": "x"}, {"k": "y"}], "single": {"k": "x"}});
        let keep_x = Predicate::equals(Path::current().field("k"), "x");

        let from_array = Path::current().field("items").filter(keep_x.clone()).select(&doc);
        assert_eq!(from_array, vec![&json!({"k": "x"})]);

        let from_object = Path::current().field("single").filter(keep_x).select(&doc);
        assert!(from_object.is_empty());
    }

    #[test]
    fn equals_requires_exact_string() {
        let eq = Predicate::equals(Path::current().field("code"), "laboratory");
        assert!(eq.matches(&json!({"code": "laboratory"})));
        assert!(!eq.matches(&json!({"code": "Laboratory"})));
        assert!(!eq.matches(&json!({"code": "laboratory "})));
        assert!(!eq.matches(&json!({"code": ["laboratory"]})));
        assert!(!eq.matches(&json!({})));
    }

    #[test]
    fn not_equals_requires_presence() {
        let ne = Predicate::not_equals(Path::current().field("code"), "");
        assert!(ne.matches(&json!({"code": "718-7"})));
        assert!(!ne.matches(&json!({"code": ""})));
        assert!(!ne.matches(&json!({})));
        assert!(ne.matches(&json!({"code": 42})));
    }

    #[test]
    fn all_with_no_predicates_holds() {
        assert!(Predicate::all([]).matches(&json!(null)));
    }

    #[test]
    fn query_rejects_scalar_roots() {
        let query = Query::new(Path::current().field("entry"));
        assert!(matches!(
            query.select(&json!("text")),
            Err(QueryError::ScalarRoot { found: "a string" })
        ));
        assert!(query.select(&json!(null)).is_err());
        assert!(query.select(&json!([])).unwrap().is_empty());
        assert!(query.select(&json!({})).unwrap().is_empty());
    }
}
