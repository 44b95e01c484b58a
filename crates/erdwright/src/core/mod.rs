//! Core abstractions for entity relationship diagrams
//!
//! Catalog loading, the adapter trait and registry, relationship
//! resolution, the graph builder and the DOT projection. Framework
//! specific code lives in [`crate::plugins`].

mod adapter;
mod builder;
mod catalog;
mod chumsky_utils;
mod diagram;
mod dot;
mod error;
mod field;
pub mod logging;
mod registry;
mod render;
mod resolver;
mod text;
mod type_expr;
mod types;

pub use adapter::*;
pub use builder::*;
pub use catalog::*;
pub use diagram::*;
pub use dot::*;
pub use error::*;
pub use field::*;
pub use logging::*;
pub use registry::*;
pub use render::*;
pub use resolver::*;
pub use text::*;
pub use type_expr::*;
pub use types::*;
