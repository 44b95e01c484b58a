//! Dataclasses plugin
//!
//! Recognizes classes decorated with `@dataclass`.

mod adapter;

pub use adapter::DataclassAdapter;
