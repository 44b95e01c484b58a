//! Relationship resolution against the fixture catalog

use erdwright::core::RelationshipResolver;
use erdwright::prelude::*;

const FIXTURE: &str = include_str!("fixtures/game.json");

fn catalog() -> ModelCatalog {
    ModelCatalog::from_json_str(FIXTURE).unwrap()
}

/// Target and cardinality of every field of `model`, in field order
fn resolve_all(catalog: &ModelCatalog, model: &str) -> Vec<(String, Option<(String, Cardinality)>)> {
    let registry = default_registry();
    let class = catalog.class(model).unwrap();
    let adapter = registry.resolve_adapter(&class).unwrap();
    let resolver = RelationshipResolver::new(&registry);

    adapter
        .fields(&class)
        .unwrap()
        .iter()
        .map(|field| {
            let resolved = resolver
                .resolve(&class, field)
                .unwrap()
                .map(|r| (r.target_key, r.cardinality));
            (field.name.clone(), resolved)
        })
        .collect()
}

fn rel(target: &str, cardinality: Cardinality) -> Option<(String, Cardinality)> {
    Some((target.to_string(), cardinality))
}

#[test]
fn test_party_fields() {
    let catalog = catalog();
    let resolved = resolve_all(&catalog, "game.Party");
    assert_eq!(
        resolved,
        vec![
            ("name".to_string(), None),
            ("formed_datetime".to_string(), None),
            ("members".to_string(), rel("game.Adventurer", Cardinality::Many)),
            ("active_quest".to_string(), rel("game.Quest", Cardinality::Optional)),
        ]
    );
}

#[test]
fn test_forward_reference_to_self() {
    let catalog = catalog();
    let resolved = resolve_all(&catalog, "graph.Node");
    assert_eq!(resolved[1].1, rel("graph.Node", Cardinality::Optional));
    assert_eq!(resolved[2].1, rel("graph.Tree", Cardinality::Optional));
}

#[test]
fn test_mapping_values_are_many() {
    let catalog = catalog();
    let resolved = resolve_all(&catalog, "graph.Tree");
    assert_eq!(resolved[0].1, rel("graph.Node", Cardinality::One));
    assert_eq!(resolved[1].1, rel("graph.Node", Cardinality::Many));
}

#[test]
fn test_imported_names_resolve_across_modules() {
    let catalog = catalog();
    let resolved = resolve_all(&catalog, "canvas.Canvas");
    assert_eq!(resolved[0].1, rel("shapes.Point", Cardinality::Many));
    assert_eq!(resolved[1].1, rel("shapes.Point", Cardinality::One));
}

#[test]
fn test_inherited_fields_resolve_in_declaring_module() {
    let catalog = catalog();
    let resolved = resolve_all(&catalog, "guilds.Member");
    let names: Vec<&str> = resolved.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["id", "guild", "rank"]);
    assert_eq!(resolved[1].1, rel("base.Guild", Cardinality::Optional));

    let diagram = erdwright::create(
        &catalog,
        &default_registry(),
        &["guilds.Member"],
        DiagramOptions::default(),
    )
    .unwrap();
    assert_eq!(diagram.node_count(), 2);
    assert!(diagram.edge("guilds.Member", "base.Guild", "guild").is_some());
}

#[test]
fn test_ambiguous_union() {
    let catalog = catalog();
    let registry = default_registry();
    let holder = catalog.class("broken.Holder").unwrap();
    let fields = registry.resolve_adapter(&holder).unwrap().fields(&holder).unwrap();

    let err = RelationshipResolver::new(&registry)
        .resolve(&holder, &fields[0])
        .unwrap_err();
    match err {
        ErdError::AmbiguousRelationship {
            model,
            field,
            candidates,
        } => {
            assert_eq!(model, "broken.Holder");
            assert_eq!(field, "either");
            assert_eq!(candidates, vec!["broken.Item", "broken.Quest"]);
        }
        other => panic!("expected AmbiguousRelationship, got {:?}", other),
    }
}

#[test]
fn test_ambiguous_union_fails_the_build() {
    let err = erdwright::create(
        &catalog(),
        &default_registry(),
        &["broken"],
        DiagramOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ErdError::AmbiguousRelationship { .. }));
}

#[test]
fn test_models_unknown_to_the_registry_are_plain() {
    let catalog = catalog();
    let registry = AdapterRegistry::new().with_adapter(Box::new(PydanticAdapter::new()));
    let canvas = catalog.class("canvas.Canvas").unwrap();
    let fields = registry.resolve_adapter(&canvas).unwrap().fields(&canvas).unwrap();

    let resolver = RelationshipResolver::new(&registry);
    for field in &fields {
        assert!(resolver.resolve(&canvas, field).unwrap().is_none());
    }
}

fn shop_catalog() -> ModelCatalog {
    ModelCatalog::from_modules(vec![ModuleDef::new("shop")
        .with_import("BaseModel", "pydantic.BaseModel")
        .with_import("Generic", "typing.Generic")
        .with_import("Annotated", "typing.Annotated")
        .with_import("t", "typing")
        .with_class(ClassDef::new("Item").with_base("BaseModel"))
        .with_class(
            ClassDef::new("Page")
                .with_base("BaseModel")
                .with_base("Generic[T]")
                .with_field(AttributeDef::new("items", "List[T]"))
                .with_field(AttributeDef::new("total", "int")),
        )
        .with_class(ClassDef::new("ItemPage").with_base("Page[Item]"))
        .with_class(
            ClassDef::new("Order")
                .with_base("BaseModel")
                .with_field(AttributeDef::new("item", "Annotated[Item, \"the ordered item\"]"))
                .with_field(AttributeDef::new("mood", "t.Literal['very calm', 'angry']"))
                .with_field(AttributeDef::new("history", "ItemPage")),
        )])
    .unwrap()
}

#[test]
fn test_annotated_metadata_and_aliased_literal() {
    let catalog = shop_catalog();
    let diagram = erdwright::create(
        &catalog,
        &default_registry(),
        &["shop.Order"],
        DiagramOptions::default().with_depth_limit(1),
    )
    .unwrap();

    let order = diagram.node("shop.Order").unwrap();
    assert_eq!(
        diagram.edge("shop.Order", "shop.Item", "item").unwrap().cardinality,
        Cardinality::One
    );
    let mood = order.field("mood").unwrap();
    assert!(!mood.is_relationship());
    assert_eq!(mood.type_name(), "str");
}

#[test]
fn test_subclass_of_subscripted_generic_model() {
    let catalog = shop_catalog();
    let registry = default_registry();
    let item_page = catalog.class("shop.ItemPage").unwrap();
    assert_eq!(registry.resolve_adapter(&item_page).unwrap().name(), "pydantic");

    let resolved = resolve_all(&catalog, "shop.ItemPage");
    let names: Vec<&str> = resolved.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["items", "total"]);

    let diagram = erdwright::create(
        &catalog,
        &registry,
        &["shop.Order"],
        DiagramOptions::default(),
    )
    .unwrap();
    assert_eq!(
        diagram.edge("shop.Order", "shop.ItemPage", "history").unwrap().cardinality,
        Cardinality::One
    );
    assert!(diagram.contains("shop.ItemPage"));
}
