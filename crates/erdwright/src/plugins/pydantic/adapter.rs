//! Pydantic model adapter

use tracing::{debug, trace};

use crate::core::{
    inherited_fields, is_class_or_init_var, ClassHandle, Field, ModelAdapter, ResolvedName,
    Result,
};

/// Names under which `BaseModel` is exported by pydantic
const BASE_MODEL_PATHS: &[&str] = &["pydantic.BaseModel", "pydantic.main.BaseModel"];

/// Adapter for pydantic models
pub struct PydanticAdapter;

impl PydanticAdapter {
    pub fn new() -> Self {
        Self
    }

    fn is_base_model(name: &str) -> bool {
        // A bare `BaseModel` with no import entry is taken at its word
        BASE_MODEL_PATHS.contains(&name) || name == "BaseModel"
    }
}

impl Default for PydanticAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelAdapter for PydanticAdapter {
    fn name(&self) -> &'static str {
        "pydantic"
    }

    fn description(&self) -> &'static str {
        "Subclasses of pydantic.BaseModel"
    }

    fn is_model(&self, class: &ClassHandle<'_>) -> bool {
        class.bases().iter().any(|base| match base {
            ResolvedName::External(name) => Self::is_base_model(name),
            ResolvedName::Class(_) => false,
        })
    }

    fn fields(&self, class: &ClassHandle<'_>) -> Result<Vec<Field>> {
        let fields = inherited_fields(
            self.name(),
            class,
            |base| self.is_model(base),
            |owner, attr, expr| !attr.name.starts_with('_') && !is_class_or_init_var(owner, expr),
        )?;
        trace!(model = %class, fields = fields.len(), "Extracted pydantic fields");
        Ok(fields)
    }

    /// Class docstring, plus an `Attributes:` section built from field
    /// descriptions when any field has one
    ///
    /// The graph builder extracts fields before asking for the docstring, so
    /// extraction errors surface there. Here they only drop the section.
    fn docstring(&self, class: &ClassHandle<'_>) -> Option<String> {
        let mut out = class
            .doc()
            .map(crate::core::clean_docstring)
            .unwrap_or_default();

        let fields = self.fields(class).unwrap_or_else(|e| {
            debug!(model = %class, error = %e, "No attribute section in docstring");
            Vec::new()
        });
        if fields.iter().any(|f| f.description.is_some()) {
            out.push_str("\nAttributes:\n");
            for field in &fields {
                let Some(description) = field.description.as_deref() else {
                    continue;
                };
                let mut line = format!("{} ({}): {}", field.name, field.raw_type, description);
                if let Some(default) = field.default_repr() {
                    let trimmed = line.trim_end();
                    line = if trimmed.ends_with('.') {
                        format!("{} ", trimmed)
                    } else {
                        format!("{}. ", trimmed)
                    };
                    line.push_str(&format!("Default is {}.", default));
                }
                out.push_str("    ");
                out.push_str(line.trim());
                out.push('\n');
            }
        }

        if out.trim().is_empty() {
            None
        } else {
            Some(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AttributeDef, ClassDef, ModelCatalog, ModuleDef};
    use serde_json::json;

    fn catalog() -> ModelCatalog {
        ModelCatalog::from_modules(vec![
            ModuleDef::new("base")
                .with_import("pydantic", "pydantic")
                .with_class(
                    ClassDef::new("Entity")
                        .with_base("pydantic.BaseModel")
                        .with_field(AttributeDef::new("id", "int")),
                ),
            ModuleDef::new("game")
                .with_import("BaseModel", "pydantic.BaseModel")
                .with_import("Entity", "base.Entity")
                .with_import("CV", "typing.ClassVar")
                .with_class(
                    ClassDef::new("Adventurer")
                        .with_base("Entity")
                        .with_doc("\n    A hero.\n\n    Brave, mostly.\n    ")
                        .with_field(
                            AttributeDef::new("name", "str").with_description("Their name"),
                        )
                        .with_field(
                            AttributeDef::new("faction", "Optional[str]")
                                .with_description("Allegiance")
                                .with_default(json!(null)),
                        )
                        .with_field(
                            AttributeDef::new("title", "str")
                                .with_description("Honorific.")
                                .with_default(json!("Sir")),
                        )
                        .with_field(AttributeDef::new("level", "int"))
                        .with_field(AttributeDef::new("_secret", "str"))
                        .with_field(AttributeDef::new("registry", "CV[dict]")),
                )
                .with_class(
                    ClassDef::new("Legacy")
                        .with_base("pydantic.main.BaseModel")
                        .with_doc("Old import path."),
                )
                .with_class(ClassDef::new("Plain").with_field(AttributeDef::new("x", "int"))),
        ])
        .unwrap()
    }

    #[test]
    fn test_is_model() {
        let catalog = catalog();
        let adapter = PydanticAdapter::new();
        assert!(adapter.is_model(&catalog.class("base.Entity").unwrap()));
        assert!(adapter.is_model(&catalog.class("game.Adventurer").unwrap()));
        assert!(adapter.is_model(&catalog.class("game.Legacy").unwrap()));
        assert!(!adapter.is_model(&catalog.class("game.Plain").unwrap()));
    }

    #[test]
    fn test_fields_inherit_and_filter() {
        let catalog = catalog();
        let adventurer = catalog.class("game.Adventurer").unwrap();
        let fields = PydanticAdapter::new().fields(&adventurer).unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "faction", "title", "level"]);
        assert_eq!(fields[0].declared_by, "base.Entity");
    }

    #[test]
    fn test_docstring_with_attributes() {
        let catalog = catalog();
        let adventurer = catalog.class("game.Adventurer").unwrap();
        let doc = PydanticAdapter::new().docstring(&adventurer).unwrap();
        assert_eq!(
            doc,
            "A hero.\n\nBrave, mostly.\nAttributes:\n    \
             name (str): Their name\n    \
             faction (Optional[str]): Allegiance. Default is None.\n    \
             title (str): Honorific. Default is 'Sir'.\n"
        );
    }

    #[test]
    fn test_docstring_plain() {
        let catalog = catalog();
        let adapter = PydanticAdapter::new();
        let legacy = catalog.class("game.Legacy").unwrap();
        assert_eq!(adapter.docstring(&legacy).as_deref(), Some("Old import path."));
        let entity = catalog.class("base.Entity").unwrap();
        assert_eq!(adapter.docstring(&entity), None);
    }

    #[test]
    fn test_docstring_survives_broken_field() {
        let catalog = ModelCatalog::from_modules(vec![ModuleDef::new("m").with_class(
            ClassDef::new("A")
                .with_base("pydantic.BaseModel")
                .with_doc("Still documented.")
                .with_field(AttributeDef::new("x", "List[int").with_description("Broken")),
        )])
        .unwrap();
        let a = catalog.class("m.A").unwrap();
        let adapter = PydanticAdapter::new();
        assert!(adapter.fields(&a).is_err());
        assert_eq!(adapter.docstring(&a).as_deref(), Some("Still documented."));
    }
}
