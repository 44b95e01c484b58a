//! Relationship resolution
//!
//! Decides whether a field's annotation points at another model and with
//! what cardinality. The wrapper taxonomy lives in [`Wrapper::classify`];
//! everything that is not a known wrapper or a model is a plain attribute.

use tracing::trace;

use super::catalog::{ClassHandle, ResolvedName};
use super::error::{ErdError, Result};
use super::field::{Field, Relationship};
use super::registry::AdapterRegistry;
use super::type_expr::{strip_typing_prefix, TypeExpr};
use super::types::Cardinality;

/// A relationship field resolved against the catalog
#[derive(Debug, Clone)]
pub struct ResolvedRelationship<'a> {
    pub target: ClassHandle<'a>,
    /// Identity key reported by the target's adapter
    pub target_key: String,
    pub cardinality: Cardinality,
}

impl ResolvedRelationship<'_> {
    pub fn to_relationship(&self) -> Relationship {
        Relationship {
            target: self.target_key.clone(),
            cardinality: self.cardinality,
        }
    }
}

/// How a generic's base name affects the walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wrapper {
    /// `Optional[T]`
    Optional,
    /// `Union[A, B]`
    Union,
    /// Sequences, sets and mappings
    Many,
    /// Wrappers that say nothing about cardinality; only the first argument
    /// carries the type
    Transparent,
    /// Never a relationship
    Opaque,
}

impl Wrapper {
    fn classify(name: &str) -> Self {
        match strip_typing_prefix(name) {
            "Optional" => Wrapper::Optional,
            "Union" => Wrapper::Union,
            "List" | "list" | "Set" | "set" | "FrozenSet" | "frozenset" | "Sequence"
            | "MutableSequence" | "Iterable" | "Iterator" | "Collection" | "AbstractSet"
            | "MutableSet" | "Tuple" | "tuple" | "Deque" | "deque" => Wrapper::Many,
            "Dict" | "dict" | "Mapping" | "MutableMapping" | "DefaultDict" | "defaultdict"
            | "OrderedDict" | "Counter" | "ChainMap" => Wrapper::Many,
            "Annotated" | "Final" | "ClassVar" | "InitVar" | "dataclasses.InitVar"
            | "Required" | "NotRequired" | "ReadOnly" => Wrapper::Transparent,
            _ => Wrapper::Opaque,
        }
    }
}

/// Resolves field annotations to relationship targets
pub struct RelationshipResolver<'r> {
    registry: &'r AdapterRegistry,
}

impl<'r> RelationshipResolver<'r> {
    pub fn new(registry: &'r AdapterRegistry) -> Self {
        Self { registry }
    }

    /// Resolve one field of `owner`
    ///
    /// Returns `Ok(None)` for plain attributes. Names in the annotation are
    /// looked up in the module of the class that declared the field, which
    /// differs from `owner` for inherited fields.
    pub fn resolve<'a>(
        &self,
        owner: &ClassHandle<'a>,
        field: &Field,
    ) -> Result<Option<ResolvedRelationship<'a>>> {
        let scope = owner
            .catalog()
            .class(&field.declared_by)
            .unwrap_or(*owner);

        let mut candidates: Vec<ResolvedRelationship<'a>> = Vec::new();
        self.collect(&scope, &field.type_expr, Cardinality::One, &mut candidates)?;

        match candidates.len() {
            0 => {
                trace!(model = %owner, field = %field.name, "Plain attribute");
                Ok(None)
            }
            1 => {
                let resolved = candidates.remove(0);
                trace!(
                    model = %owner,
                    field = %field.name,
                    target = %resolved.target_key,
                    cardinality = %resolved.cardinality,
                    "Resolved relationship"
                );
                Ok(Some(resolved))
            }
            _ => Err(ErdError::ambiguous_relationship(
                owner.qualified_name(),
                &field.name,
                candidates.into_iter().map(|c| c.target_key).collect(),
            )),
        }
    }

    fn collect<'a>(
        &self,
        scope: &ClassHandle<'a>,
        expr: &TypeExpr,
        cardinality: Cardinality,
        out: &mut Vec<ResolvedRelationship<'a>>,
    ) -> Result<()> {
        match expr {
            TypeExpr::Name(name) => self.candidate(scope.resolve_name(name), cardinality, out),
            TypeExpr::Union(members) => self.collect_union(scope, members, cardinality, out),
            TypeExpr::Generic { base, args } => match scope.resolve_name(base) {
                model @ ResolvedName::Class(_) => self.candidate(model, cardinality, out),
                ResolvedName::External(name) => match Wrapper::classify(&name) {
                    Wrapper::Optional => {
                        let floor = cardinality.max(Cardinality::Optional);
                        for arg in args {
                            self.collect(scope, arg, floor, out)?;
                        }
                        Ok(())
                    }
                    Wrapper::Union => self.collect_union(scope, args, cardinality, out),
                    Wrapper::Many => {
                        for arg in args {
                            self.collect(scope, arg, Cardinality::Many, out)?;
                        }
                        Ok(())
                    }
                    Wrapper::Transparent => match args.first() {
                        Some(inner) => self.collect(scope, inner, cardinality, out),
                        None => Ok(()),
                    },
                    Wrapper::Opaque => Ok(()),
                },
            },
            TypeExpr::None
            | TypeExpr::List(_)
            | TypeExpr::Str(_)
            | TypeExpr::Literal(_)
            | TypeExpr::Ellipsis
            | TypeExpr::Opaque(_) => Ok(()),
        }
    }

    fn collect_union<'a>(
        &self,
        scope: &ClassHandle<'a>,
        members: &[TypeExpr],
        cardinality: Cardinality,
        out: &mut Vec<ResolvedRelationship<'a>>,
    ) -> Result<()> {
        let floor = if members.iter().any(TypeExpr::is_none) {
            cardinality.max(Cardinality::Optional)
        } else {
            cardinality
        };
        for member in members.iter().filter(|m| !m.is_none()) {
            self.collect(scope, member, floor, out)?;
        }
        Ok(())
    }

    fn candidate<'a>(
        &self,
        name: ResolvedName<'a>,
        cardinality: Cardinality,
        out: &mut Vec<ResolvedRelationship<'a>>,
    ) -> Result<()> {
        let ResolvedName::Class(class) = name else {
            return Ok(());
        };
        let adapter = match self.registry.resolve_adapter(&class) {
            Ok(adapter) => adapter,
            Err(ErdError::UnknownModel { .. }) => return Ok(()),
            Err(e) => return Err(e),
        };
        let key = adapter.identity_key(&class);

        match out.iter_mut().find(|c| c.target_key == key) {
            Some(existing) => existing.cardinality = existing.cardinality.max(cardinality),
            None => out.push(ResolvedRelationship {
                target: class,
                target_key: key,
                cardinality,
            }),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{AttributeDef, ClassDef, ModelCatalog, ModuleDef};
    use crate::plugins::default_registry;

    fn model(name: &str) -> ClassDef {
        ClassDef::new(name).with_base("BaseModel")
    }

    fn catalog() -> ModelCatalog {
        ModelCatalog::from_modules(vec![
            ModuleDef::new("game")
                .with_import("BaseModel", "pydantic.BaseModel")
                .with_import("t", "typing")
                .with_class(model("Item"))
                .with_class(model("Quest"))
                .with_class(ClassDef::new("Mood"))
                .with_class(model("Page"))
                .with_class(
                    model("Holder")
                        .with_field(AttributeDef::new("plain", "Item"))
                        .with_field(AttributeDef::new("maybe", "Optional[Item]"))
                        .with_field(AttributeDef::new("pep604", "Item | None"))
                        .with_field(AttributeDef::new("many", "List[Item]"))
                        .with_field(AttributeDef::new("nested", "Optional[List[Item]]"))
                        .with_field(AttributeDef::new("mapping", "Dict[str, Item]"))
                        .with_field(AttributeDef::new("aliased", "t.Sequence[Item]"))
                        .with_field(AttributeDef::new("forward", "List['Item']"))
                        .with_field(AttributeDef::new("annotated", "Annotated[Item, Field(gt=0)]"))
                        .with_field(AttributeDef::new("literal", "Literal['Item']"))
                        .with_field(AttributeDef::new("type_of", "Type[Item]"))
                        .with_field(AttributeDef::new("callable", "Callable[[Item], None]"))
                        .with_field(AttributeDef::new("scalar", "int"))
                        .with_field(AttributeDef::new("enum", "Mood"))
                        .with_field(AttributeDef::new("paged", "Page[Item]"))
                        .with_field(AttributeDef::new("same", "Union[Item, List[Item]]"))
                        .with_field(AttributeDef::new("either", "Union[Item, Quest]"))
                        .with_field(AttributeDef::new("foreign", "other.Thing")),
                ),
        ])
        .unwrap()
    }

    fn resolve(field_name: &str) -> Result<Option<(String, Cardinality)>> {
        let catalog = catalog();
        let registry = default_registry();
        let holder = catalog.class("game.Holder").unwrap();
        let adapter = registry.resolve_adapter(&holder).unwrap();
        let fields = adapter.fields(&holder).unwrap();
        let field = fields.iter().find(|f| f.name == field_name).unwrap();
        let resolver = RelationshipResolver::new(&registry);
        Ok(resolver
            .resolve(&holder, field)?
            .map(|r| (r.target_key, r.cardinality)))
    }

    fn rel(target: &str, cardinality: Cardinality) -> Option<(String, Cardinality)> {
        Some((target.to_string(), cardinality))
    }

    #[test]
    fn test_cardinality_from_wrappers() {
        assert_eq!(resolve("plain").unwrap(), rel("game.Item", Cardinality::One));
        assert_eq!(resolve("maybe").unwrap(), rel("game.Item", Cardinality::Optional));
        assert_eq!(resolve("pep604").unwrap(), rel("game.Item", Cardinality::Optional));
        assert_eq!(resolve("many").unwrap(), rel("game.Item", Cardinality::Many));
        assert_eq!(resolve("nested").unwrap(), rel("game.Item", Cardinality::Many));
        assert_eq!(resolve("mapping").unwrap(), rel("game.Item", Cardinality::Many));
        assert_eq!(resolve("aliased").unwrap(), rel("game.Item", Cardinality::Many));
    }

    #[test]
    fn test_forward_reference_and_transparent_wrappers() {
        assert_eq!(resolve("forward").unwrap(), rel("game.Item", Cardinality::Many));
        assert_eq!(resolve("annotated").unwrap(), rel("game.Item", Cardinality::One));
    }

    #[test]
    fn test_opaque_wrappers_are_plain() {
        assert_eq!(resolve("literal").unwrap(), None);
        assert_eq!(resolve("type_of").unwrap(), None);
        assert_eq!(resolve("callable").unwrap(), None);
    }

    #[test]
    fn test_non_models_are_plain() {
        assert_eq!(resolve("scalar").unwrap(), None);
        assert_eq!(resolve("enum").unwrap(), None);
        assert_eq!(resolve("foreign").unwrap(), None);
    }

    #[test]
    fn test_generic_model_targets_base() {
        assert_eq!(resolve("paged").unwrap(), rel("game.Page", Cardinality::One));
    }

    #[test]
    fn test_union_of_same_model_takes_widest() {
        assert_eq!(resolve("same").unwrap(), rel("game.Item", Cardinality::Many));
    }

    #[test]
    fn test_union_of_distinct_models_is_ambiguous() {
        match resolve("either") {
            Err(ErdError::AmbiguousRelationship {
                model,
                field,
                candidates,
            }) => {
                assert_eq!(model, "game.Holder");
                assert_eq!(field, "either");
                assert_eq!(candidates, vec!["game.Item", "game.Quest"]);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_wrapper_classification() {
        assert_eq!(Wrapper::classify("typing.Optional"), Wrapper::Optional);
        assert_eq!(Wrapper::classify("collections.abc.Mapping"), Wrapper::Many);
        assert_eq!(Wrapper::classify("typing_extensions.Annotated"), Wrapper::Transparent);
        assert_eq!(Wrapper::classify("Literal"), Wrapper::Opaque);
        assert_eq!(Wrapper::classify("mylib.List"), Wrapper::Opaque);
    }
}
