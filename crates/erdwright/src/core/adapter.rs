//! Core adapter trait for recognizing model classes
//!
//! Each supported class-definition framework provides one adapter. The
//! traversal only talks to adapters through this trait, so a new framework
//! is a new implementation plus one registration call.

use super::catalog::{AttributeDef, ClassHandle, ResolvedName};
use super::error::{ErdError, Result};
use super::field::Field;
use super::text::clean_docstring;
use super::type_expr::TypeExpr;

/// Core trait for framework adapters
///
/// # Example
/// ```
/// use erdwright::core::{ClassDef, ModelAdapter, ModelCatalog, ModuleDef};
/// use erdwright::plugins::PydanticAdapter;
///
/// let catalog = ModelCatalog::from_modules(vec![ModuleDef::new("shop")
///     .with_class(ClassDef::new("Order").with_base("pydantic.BaseModel"))])
/// .unwrap();
/// let order = catalog.class("shop.Order").unwrap();
/// assert!(PydanticAdapter::new().is_model(&order));
/// ```
pub trait ModelAdapter: Send + Sync {
    /// Registry name of this adapter, e.g. `pydantic`
    fn name(&self) -> &'static str;

    /// One-line description used when listing adapters
    fn description(&self) -> &'static str;

    /// Whether the class is a model of this adapter's kind
    ///
    /// Must be a pure predicate: unrecognized classes return false.
    fn is_model(&self, class: &ClassHandle<'_>) -> bool;

    /// Stable identity of the class; equal keys collapse into one node
    fn identity_key(&self, class: &ClassHandle<'_>) -> String {
        class.qualified_name()
    }

    /// Fields in declaration order, inherited fields first
    ///
    /// Relationships are not resolved here.
    fn fields(&self, class: &ClassHandle<'_>) -> Result<Vec<Field>>;

    /// Best-effort documentation for tooltips and description rows
    fn docstring(&self, class: &ClassHandle<'_>) -> Option<String> {
        class
            .doc()
            .map(clean_docstring)
            .filter(|doc| !doc.is_empty())
    }
}

/// Collect fields along the inheritance chain of `class`
///
/// Bases for which `is_member` holds contribute their fields, furthest
/// ancestor first. A field redefined further down keeps its original
/// position but takes the new declaration. `include` drops attributes the
/// framework does not treat as fields (class variables, private names); it
/// receives the declaring class so names resolve in the right module.
pub fn inherited_fields<M, I>(
    adapter: &str,
    class: &ClassHandle<'_>,
    is_member: M,
    include: I,
) -> Result<Vec<Field>>
where
    M: Fn(&ClassHandle<'_>) -> bool,
    I: Fn(&ClassHandle<'_>, &AttributeDef, &TypeExpr) -> bool,
{
    let mut chain: Vec<ClassHandle<'_>> = class
        .bases()
        .into_iter()
        .filter_map(|base| match base {
            ResolvedName::Class(handle) if is_member(&handle) => Some(handle),
            _ => None,
        })
        .collect();
    chain.reverse();
    chain.push(*class);

    let mut fields: Vec<Field> = Vec::new();
    for owner in chain {
        let owner_name = owner.qualified_name();
        let mut declared_here: Vec<&str> = Vec::new();

        for attr in &owner.def().fields {
            if declared_here.contains(&attr.name.as_str()) {
                return Err(ErdError::extraction_error(
                    adapter,
                    &owner_name,
                    format!("field '{}' is declared more than once", attr.name),
                ));
            }
            declared_here.push(&attr.name);

            let raw = attr.annotation.as_deref().ok_or_else(|| {
                ErdError::extraction_error(
                    adapter,
                    &owner_name,
                    format!("field '{}' has no type annotation", attr.name),
                )
            })?;
            let canonical = |name: &str| owner.canonical_name(name);
            let expr = TypeExpr::parse_in(raw, &canonical).map_err(|message| {
                ErdError::extraction_error(
                    adapter,
                    &owner_name,
                    format!("field '{}': {}", attr.name, message),
                )
            })?;

            if !include(&owner, attr, &expr) {
                continue;
            }

            let field = Field::new(&attr.name, raw.trim(), expr, &owner_name)
                .with_description(attr.description.clone())
                .with_default(attr.default.clone());

            match fields.iter_mut().find(|existing| existing.name == attr.name) {
                Some(existing) => *existing = field,
                None => fields.push(field),
            }
        }
    }

    Ok(fields)
}

/// Whether an annotation is `ClassVar[...]` or `InitVar[...]`
///
/// `class` resolves the head name so aliased imports are recognized too.
pub fn is_class_or_init_var(class: &ClassHandle<'_>, expr: &TypeExpr) -> bool {
    let Some(head) = expr.head() else {
        return false;
    };
    let resolved = match class.resolve_name(head) {
        ResolvedName::External(name) => name,
        ResolvedName::Class(_) => return false,
    };
    matches!(
        super::type_expr::strip_typing_prefix(&resolved),
        "ClassVar" | "InitVar" | "dataclasses.InitVar"
    )
}
