//! Standard-library dataclass adapter

use tracing::trace;

use crate::core::{
    inherited_fields, is_class_or_init_var, ClassHandle, Field, ModelAdapter, ResolvedName,
    Result,
};

/// Adapter for `@dataclass` classes
pub struct DataclassAdapter;

impl DataclassAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Decorator text reduced to the name being applied:
    /// `@dataclass(frozen=True)` becomes `dataclass`
    fn decorator_name(decorator: &str) -> &str {
        let name = decorator.trim().trim_start_matches('@').trim_start();
        match name.find('(') {
            Some(end) => name[..end].trim_end(),
            None => name,
        }
    }
}

impl Default for DataclassAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelAdapter for DataclassAdapter {
    fn name(&self) -> &'static str {
        "dataclasses"
    }

    fn description(&self) -> &'static str {
        "Classes decorated with @dataclasses.dataclass"
    }

    fn is_model(&self, class: &ClassHandle<'_>) -> bool {
        class.def().decorators.iter().any(|decorator| {
            let name = Self::decorator_name(decorator);
            match class.resolve_name(name) {
                ResolvedName::External(resolved) => {
                    resolved == "dataclasses.dataclass" || resolved == "dataclass"
                }
                ResolvedName::Class(_) => false,
            }
        })
    }

    fn fields(&self, class: &ClassHandle<'_>) -> Result<Vec<Field>> {
        let fields = inherited_fields(
            self.name(),
            class,
            |base| self.is_model(base),
            |owner, _, expr| !is_class_or_init_var(owner, expr),
        )?;
        trace!(model = %class, fields = fields.len(), "Extracted dataclass fields");
        Ok(fields)
    }
}
