//! Field abstraction: one attribute of one model

use super::type_expr::TypeExpr;
use super::types::Cardinality;

/// Where a relationship field points
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Relationship {
    /// Identity key of the target model
    pub target: String,
    pub cardinality: Cardinality,
}

/// One field of a model, as extracted by an adapter
///
/// Adapters return fields with no relationship attached; the graph builder
/// fills it in after running the relationship resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    /// Annotation text as declared
    pub raw_type: String,
    pub type_expr: TypeExpr,
    /// Qualified name of the class whose body declares this field. Names in
    /// the annotation are resolved in that class's module.
    pub declared_by: String,
    pub description: Option<String>,
    pub default: Option<serde_json::Value>,
    relationship: Option<Relationship>,
}

impl Field {
    pub fn new(
        name: impl Into<String>,
        raw_type: impl Into<String>,
        type_expr: TypeExpr,
        declared_by: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            raw_type: raw_type.into(),
            type_expr,
            declared_by: declared_by.into(),
            description: None,
            default: None,
            relationship: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_default(mut self, default: Option<serde_json::Value>) -> Self {
        self.default = default;
        self
    }

    pub fn with_relationship(mut self, relationship: Option<Relationship>) -> Self {
        self.relationship = relationship;
        self
    }

    pub fn relationship(&self) -> Option<&Relationship> {
        self.relationship.as_ref()
    }

    pub fn is_relationship(&self) -> bool {
        self.relationship.is_some()
    }

    /// Identity key of the related model, if any
    pub fn target(&self) -> Option<&str> {
        self.relationship.as_ref().map(|r| r.target.as_str())
    }

    pub fn cardinality(&self) -> Option<Cardinality> {
        self.relationship.as_ref().map(|r| r.cardinality)
    }

    /// Type text shown in diagrams
    ///
    /// A `Literal` of strings is an enumerated string, so it is shown as `str`.
    pub fn type_name(&self) -> &str {
        if self.type_expr.is_string_literal() {
            "str"
        } else {
            &self.raw_type
        }
    }

    /// Default value rendered the way Python would print it
    pub fn default_repr(&self) -> Option<String> {
        self.default.as_ref().map(python_repr)
    }
}

fn python_repr(value: &serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", s),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(python_repr).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("'{}': {}", k, python_repr(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}
