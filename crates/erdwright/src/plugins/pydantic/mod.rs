//! Pydantic plugin
//!
//! Recognizes subclasses of `pydantic.BaseModel`.

mod adapter;

pub use adapter::PydanticAdapter;
