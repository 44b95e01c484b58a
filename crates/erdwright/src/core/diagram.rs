//! The finished entity relationship graph
//!
//! A [`Diagram`] is built once by the graph builder and then only read.
//! Nodes are kept sorted by identity key and edges by
//! `(source, target, field)`, so two builds over the same catalog compare
//! equal and project to identical DOT text.

use std::collections::HashSet;
use std::path::Path;

use super::error::{ErdError, Result};
use super::field::Field;
use super::render::{OutputFormat, RenderBackend};
use super::types::{Cardinality, Orientation};

/// One model class in the diagram
#[derive(Debug, Clone, PartialEq)]
pub struct ModelNode {
    /// Identity key, the qualified `module.Class` path
    pub key: String,
    /// Display name
    pub name: String,
    pub module: String,
    /// Name of the adapter that claimed the class
    pub adapter: &'static str,
    pub docstring: Option<String>,
    pub fields: Vec<Field>,
}

impl ModelNode {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields that point at another model
    pub fn relationship_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_relationship())
    }

    pub fn has_field_descriptions(&self) -> bool {
        self.fields.iter().any(|f| f.description.is_some())
    }

    /// First paragraph of the docstring
    pub fn summary(&self) -> Option<&str> {
        let doc = self.docstring.as_deref()?.trim();
        let first = match doc.find("\n\n") {
            Some(end) => &doc[..end],
            None => doc,
        };
        if first.is_empty() {
            None
        } else {
            Some(first)
        }
    }
}

/// A relationship from one model to another through one field
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub field: String,
    pub cardinality: Cardinality,
}

impl Edge {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        field: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            field: field.into(),
            cardinality,
        }
    }

    /// Deduplication key
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.source, &self.target, &self.field)
    }
}

/// Deduplicated node and edge sets ready for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    name: String,
    orientation: Orientation,
    nodes: Vec<ModelNode>,
    edges: Vec<Edge>,
}

impl Diagram {
    /// Assemble a diagram, sorting both collections
    ///
    /// Fails when two nodes share a key or an edge endpoint is missing.
    /// Repeated edges collapse into one.
    pub fn new(
        name: impl Into<String>,
        orientation: Orientation,
        mut nodes: Vec<ModelNode>,
        mut edges: Vec<Edge>,
    ) -> Result<Self> {
        let mut keys = HashSet::new();
        for node in &nodes {
            if !keys.insert(node.key.as_str()) {
                return Err(ErdError::schema_error(format!(
                    "model '{}' appears twice in one diagram",
                    node.key
                )));
            }
        }
        for edge in &edges {
            for endpoint in [&edge.source, &edge.target] {
                if !keys.contains(endpoint.as_str()) {
                    return Err(ErdError::schema_error(format!(
                        "edge {} -> {} via '{}' references unknown model '{}'",
                        edge.source, edge.target, edge.field, endpoint
                    )));
                }
            }
        }

        nodes.sort_by(|a, b| a.key.cmp(&b.key));
        edges.sort();
        edges.dedup_by(|a, b| a.key() == b.key());

        Ok(Self {
            name: name.into(),
            orientation,
            nodes,
            edges,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Same diagram, laid out in another direction
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Nodes sorted by identity key
    pub fn nodes(&self) -> &[ModelNode] {
        &self.nodes
    }

    /// Edges sorted by source, target, then field name
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, key: &str) -> Option<&ModelNode> {
        self.nodes
            .binary_search_by(|n| n.key.as_str().cmp(key))
            .ok()
            .map(|idx| &self.nodes[idx])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.node(key).is_some()
    }

    pub fn edge(&self, source: &str, target: &str, field: &str) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.key() == (source, target, field))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Graphviz DOT text for this diagram
    pub fn to_dot(&self) -> String {
        super::dot::diagram_to_dot(self)
    }

    /// Rendered bytes in the given format
    pub fn render_bytes(&self, format: OutputFormat, backend: &dyn RenderBackend) -> Result<Vec<u8>> {
        super::render::render_bytes(&self.to_dot(), format, backend)
    }

    /// Render to a file, format taken from the extension
    ///
    /// The file appears only once rendering has succeeded.
    pub fn render(&self, path: impl AsRef<Path>, backend: &dyn RenderBackend) -> Result<()> {
        super::render::render_to_path(&self.to_dot(), path.as_ref(), backend)
    }
}
