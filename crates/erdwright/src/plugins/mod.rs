//! Framework adapters
//!
//! One plugin per supported class-definition framework. Each implements
//! [`ModelAdapter`](crate::core::ModelAdapter); [`default_registry`] wires
//! them up in dispatch priority order.

pub mod dataclasses;
pub mod pydantic;

pub use dataclasses::*;
pub use pydantic::*;

use crate::core::AdapterRegistry;

/// Registry with every shipped adapter: `pydantic`, then `dataclasses`
pub fn default_registry() -> AdapterRegistry {
    AdapterRegistry::new()
        .with_adapter(Box::new(PydanticAdapter::new()))
        .with_adapter(Box::new(DataclassAdapter::new()))
}
