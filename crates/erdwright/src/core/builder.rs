//! Graph builder: breadth-first traversal from root models
//!
//! Every root starts at depth 0. A node is expanded (its relationships
//! turned into edges, its unseen targets queued) only while its depth is
//! below the limit. Nodes sitting on the limit are kept but contribute no
//! edges, which keeps `depth_limit = 0` a single-node diagram.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, info, span, trace, Level};

use super::catalog::{ClassHandle, Lookup, ModelCatalog};
use super::diagram::{Diagram, Edge, ModelNode};
use super::error::{ErdError, Result};
use super::registry::AdapterRegistry;
use super::resolver::{RelationshipResolver, ResolvedRelationship};
use super::types::{DiagramOptions, Orientation};

/// A discovered node waiting for expansion
struct Pending<'a> {
    key: String,
    depth: usize,
    links: Vec<(String, ResolvedRelationship<'a>)>,
}

/// Builds [`Diagram`]s from root classes
pub struct GraphBuilder<'r> {
    registry: &'r AdapterRegistry,
    options: DiagramOptions,
}

impl<'r> GraphBuilder<'r> {
    /// Builder with unbounded depth and horizontal layout
    pub fn new(registry: &'r AdapterRegistry) -> Self {
        Self {
            registry,
            options: DiagramOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DiagramOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.options.depth_limit = depth_limit;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.options.orientation = orientation;
        self
    }

    pub fn options(&self) -> DiagramOptions {
        self.options
    }

    /// Build the diagram reachable from one root
    pub fn build(&self, root: &ClassHandle<'_>) -> Result<Diagram> {
        self.build_many(std::slice::from_ref(root))
    }

    /// Build the diagram reachable from several roots
    ///
    /// Fails with `UnknownModel` if any root is not claimed by an adapter.
    pub fn build_many(&self, roots: &[ClassHandle<'_>]) -> Result<Diagram> {
        let build_span = span!(
            Level::INFO,
            "build_diagram",
            roots = roots.len(),
            depth_limit = self.options.depth_limit
        );
        let _enter = build_span.enter();

        let first = roots.first().ok_or_else(|| ErdError::NoModels { paths: Vec::new() })?;
        let resolver = RelationshipResolver::new(self.registry);

        let mut nodes: Vec<ModelNode> = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<Pending<'_>> = VecDeque::new();

        for root in roots {
            let (node, links) = self.make_node(&resolver, root)?;
            if !visited.insert(node.key.clone()) {
                debug!(root = %node.key, "Skipping repeated root");
                continue;
            }
            trace!(root = %node.key, "Seeded root");
            queue.push_back(Pending {
                key: node.key.clone(),
                depth: 0,
                links,
            });
            nodes.push(node);
        }

        let mut edges: HashMap<(String, String, String), Edge> = HashMap::new();

        while let Some(pending) = queue.pop_front() {
            if pending.depth >= self.options.depth_limit {
                trace!(model = %pending.key, depth = pending.depth, "Depth limit reached");
                continue;
            }
            trace!(model = %pending.key, depth = pending.depth, "Expanding model");

            for (field, link) in pending.links {
                if !visited.contains(&link.target_key) {
                    let (node, links) = self.make_node(&resolver, &link.target)?;
                    debug!(
                        model = %node.key,
                        depth = pending.depth + 1,
                        via = %pending.key,
                        "Discovered model"
                    );
                    visited.insert(node.key.clone());
                    queue.push_back(Pending {
                        key: node.key.clone(),
                        depth: pending.depth + 1,
                        links,
                    });
                    nodes.push(node);
                }

                let edge = Edge::new(&pending.key, &link.target_key, &field, link.cardinality);
                edges
                    .entry((edge.source.clone(), edge.target.clone(), edge.field.clone()))
                    .or_insert(edge);
            }
        }

        let diagram = Diagram::new(
            first.name(),
            self.options.orientation,
            nodes,
            edges.into_values().collect(),
        )?;

        info!(
            nodes = diagram.node_count(),
            edges = diagram.edge_count(),
            "Built diagram"
        );
        Ok(diagram)
    }

    /// Extract one class into a node plus its unexpanded relationships
    fn make_node<'a>(
        &self,
        resolver: &RelationshipResolver<'_>,
        class: &ClassHandle<'a>,
    ) -> Result<(ModelNode, Vec<(String, ResolvedRelationship<'a>)>)> {
        let adapter = self.registry.resolve_adapter(class)?;
        let mut links = Vec::new();
        let mut fields = Vec::new();

        for field in adapter.fields(class)? {
            let resolved = resolver.resolve(class, &field)?;
            let relationship = resolved.as_ref().map(ResolvedRelationship::to_relationship);
            if let Some(resolved) = resolved {
                links.push((field.name.clone(), resolved));
            }
            fields.push(field.with_relationship(relationship));
        }

        let node = ModelNode {
            key: adapter.identity_key(class),
            name: class.name().to_string(),
            module: class.module_name().to_string(),
            adapter: adapter.name(),
            docstring: adapter.docstring(class),
            fields,
        };
        Ok((node, links))
    }
}

/// Resolve dotted paths to root classes
///
/// A class path yields that class; a module path yields every class in the
/// module that some adapter claims, in declaration order. Unclaimed class
/// paths are kept so the build reports them as unknown models.
pub fn resolve_roots<'a, S: AsRef<str>>(
    catalog: &'a ModelCatalog,
    registry: &AdapterRegistry,
    paths: &[S],
) -> Result<Vec<ClassHandle<'a>>> {
    let mut roots = Vec::new();
    for path in paths {
        let path = path.as_ref().trim();
        match catalog.lookup(path)? {
            Lookup::Class(class) => roots.push(class),
            Lookup::Module(module) => {
                let found: Vec<ClassHandle<'a>> = catalog
                    .module_classes(&module.name)
                    .into_iter()
                    .filter(|class| registry.claims(class))
                    .collect();
                debug!(module = %module.name, models = found.len(), "Expanded module");
                roots.extend(found);
            }
        }
    }

    if roots.is_empty() {
        return Err(ErdError::NoModels {
            paths: paths.iter().map(|p| p.as_ref().to_string()).collect(),
        });
    }
    Ok(roots)
}
