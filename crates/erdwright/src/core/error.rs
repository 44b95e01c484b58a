//! Core error types for diagram construction
//!
//! Every failure in the pipeline is deterministic for a given catalog, so
//! nothing here is retried. Errors propagate to the caller of `build` or
//! `render`; the CLI turns them into messages and exit codes.

use thiserror::Error;

/// Convenience alias used across the library
pub type Result<T> = std::result::Result<T, ErdError>;

/// Core error types for diagram construction and rendering
#[derive(Error, Debug)]
pub enum ErdError {
    #[error("Unknown model type: {model} is not recognized by any registered adapter")]
    UnknownModel { model: String },

    #[error("Adapter '{adapter}' failed to extract fields of {model}: {message}")]
    AdapterExtraction {
        adapter: String,
        model: String,
        message: String,
    },

    #[error(
        "Ambiguous relationship: field '{field}' of {model} refers to multiple models ({})",
        candidates.join(", ")
    )]
    AmbiguousRelationship {
        model: String,
        field: String,
        candidates: Vec<String>,
    },

    #[error("Render error: {message}")]
    RenderError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Schema error: {message}")]
    SchemaError { message: String },

    #[error("Model or module not found: {path}")]
    ModelOrModuleNotFound { path: String },

    #[error("No data model classes found in: {}", paths.join(", "))]
    NoModels { paths: Vec<String> },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl ErdError {
    /// Create a new unknown model error
    pub fn unknown_model(model: impl Into<String>) -> Self {
        Self::UnknownModel {
            model: model.into(),
        }
    }

    /// Create a new extraction error for a class claimed by `adapter`
    pub fn extraction_error(
        adapter: impl Into<String>,
        model: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::AdapterExtraction {
            adapter: adapter.into(),
            model: model.into(),
            message: message.into(),
        }
    }

    /// Create a new ambiguous relationship error
    pub fn ambiguous_relationship(
        model: impl Into<String>,
        field: impl Into<String>,
        candidates: Vec<String>,
    ) -> Self {
        Self::AmbiguousRelationship {
            model: model.into(),
            field: field.into(),
            candidates,
        }
    }

    /// Create a new render error without an underlying cause
    pub fn render_error(message: impl Into<String>) -> Self {
        Self::RenderError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new render error that keeps the backend failure as its source
    pub fn render_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::RenderError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new schema error
    pub fn schema_error(message: impl Into<String>) -> Self {
        Self::SchemaError {
            message: message.into(),
        }
    }

    /// Create a new not-found error for a dotted path
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::ModelOrModuleNotFound { path: path.into() }
    }
}
