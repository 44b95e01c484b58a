//! Erdwright - Entity relationship diagrams for data model classes
//!
//! Turns a catalog of class definitions (pydantic models, dataclasses)
//! into a deduplicated graph of models and relationships, and projects
//! that graph to Graphviz for rendering.
//!
//! # Quick Start
//!
//! ```rust
//! use erdwright::prelude::*;
//!
//! let catalog = ModelCatalog::from_json_str(r#"{
//!     "modules": [{
//!         "name": "game",
//!         "imports": {"BaseModel": "pydantic.BaseModel"},
//!         "classes": [
//!             {"name": "Party", "bases": ["BaseModel"],
//!              "fields": [{"name": "members", "type": "List[Adventurer]"}]},
//!             {"name": "Adventurer", "bases": ["BaseModel"],
//!              "fields": [{"name": "name", "type": "str"}]}
//!         ]
//!     }]
//! }"#).unwrap();
//! let registry = default_registry();
//!
//! let diagram = erdwright::create(&catalog, &registry, &["game.Party"], DiagramOptions::default())
//!     .unwrap();
//! assert_eq!(diagram.node_count(), 2);
//! assert_eq!(diagram.edges()[0].cardinality, Cardinality::Many);
//! assert!(diagram.to_dot().contains("crowodot"));
//! ```
//!
//! # Advanced Usage
//!
//! The pieces can be driven directly: resolve a class from the catalog,
//! pick its adapter from the registry, and run the [`GraphBuilder`].
//!
//! ```rust
//! use erdwright::prelude::*;
//!
//! let catalog = ModelCatalog::from_modules(vec![ModuleDef::new("shapes")
//!     .with_class(ClassDef::new("Point")
//!         .with_decorator("@dataclass")
//!         .with_field(AttributeDef::new("x", "float")))])
//! .unwrap();
//! let registry = default_registry();
//!
//! let point = catalog.class("shapes.Point").unwrap();
//! assert_eq!(registry.resolve_adapter(&point).unwrap().name(), "dataclasses");
//!
//! let diagram = GraphBuilder::new(&registry)
//!     .with_depth_limit(0)
//!     .build(&point)
//!     .unwrap();
//! assert_eq!(diagram.name(), "Point");
//! ```

pub mod core;
pub mod plugins;

pub use crate::core::*;
pub use plugins::default_registry;

use std::path::Path;

use tracing::{info, span, Level};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        AdapterRegistry, AttributeDef, Cardinality, ClassDef, ClassHandle, Diagram,
        DiagramOptions, Edge, ErdError, Field, GraphBuilder, GraphvizCli, ModelAdapter,
        ModelCatalog, ModelNode, ModuleDef, Orientation, OutputFormat, RenderBackend,
        UNBOUNDED_DEPTH,
    };
    pub use crate::plugins::{default_registry, DataclassAdapter, PydanticAdapter};
}

/// Build a diagram from dotted class or module paths
///
/// # Arguments
/// * `catalog` - The loaded model catalog
/// * `registry` - Adapters used to recognize models
/// * `paths` - Class paths (`game.Party`) or module paths (`game`)
/// * `options` - Depth limit and orientation
///
/// # Errors
/// `ModelOrModuleNotFound` for unknown paths, `NoModels` when the paths
/// contain no models, and any error raised while building.
pub fn create<S: AsRef<str>>(
    catalog: &ModelCatalog,
    registry: &AdapterRegistry,
    paths: &[S],
    options: DiagramOptions,
) -> Result<Diagram> {
    let create_span = span!(Level::INFO, "create", paths = paths.len());
    let _enter = create_span.enter();

    let roots = resolve_roots(catalog, registry, paths)?;
    GraphBuilder::new(registry).with_options(options).build_many(&roots)
}

/// Build a diagram and render it to `out`
///
/// The output format is inferred from the extension of `out`.
///
/// # Example
/// ```rust,no_run
/// use erdwright::prelude::*;
///
/// let catalog = ModelCatalog::from_path("models.json").unwrap();
/// erdwright::draw(
///     &catalog,
///     &default_registry(),
///     &["game"],
///     "diagram.svg",
///     DiagramOptions::default(),
///     &GraphvizCli::new(),
/// )
/// .unwrap();
/// ```
pub fn draw<S: AsRef<str>>(
    catalog: &ModelCatalog,
    registry: &AdapterRegistry,
    paths: &[S],
    out: impl AsRef<Path>,
    options: DiagramOptions,
    backend: &dyn RenderBackend,
) -> Result<()> {
    let out = out.as_ref();
    let diagram = create(catalog, registry, paths, options)?;
    diagram.render(out, backend)?;
    info!(out = %out.display(), "Diagram written");
    Ok(())
}

/// Build a diagram and return its DOT text
pub fn to_dot<S: AsRef<str>>(
    catalog: &ModelCatalog,
    registry: &AdapterRegistry,
    paths: &[S],
    options: DiagramOptions,
) -> Result<String> {
    Ok(create(catalog, registry, paths, options)?.to_dot())
}
