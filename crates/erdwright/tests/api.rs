//! Integration tests for the public API

use erdwright::prelude::*;
use erdwright::{create, draw, to_dot};

const FIXTURE: &str = include_str!("fixtures/game.json");

fn catalog() -> ModelCatalog {
    ModelCatalog::from_json_str(FIXTURE).unwrap()
}

fn build(paths: &[&str]) -> Diagram {
    create(&catalog(), &default_registry(), paths, DiagramOptions::default()).unwrap()
}

#[test]
fn test_fixture_loads() {
    let catalog = catalog();
    assert_eq!(catalog.module_count(), 8);
    assert!(catalog.class("game.Party").is_some());
    assert!(catalog.module("shapes").is_some());
}

#[test]
fn test_create_from_single_model() {
    let diagram = build(&["game.Party"]);
    assert_eq!(diagram.name(), "Party");
    assert_eq!(diagram.node_count(), 4);
    assert_eq!(diagram.edge_count(), 3);

    let keys: Vec<&str> = diagram.nodes().iter().map(|n| n.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["game.Adventurer", "game.Party", "game.Quest", "game.QuestGiver"]
    );

    assert_eq!(
        diagram.edge("game.Party", "game.Adventurer", "members").unwrap().cardinality,
        Cardinality::Many
    );
    assert_eq!(
        diagram.edge("game.Party", "game.Quest", "active_quest").unwrap().cardinality,
        Cardinality::Optional
    );
    assert_eq!(
        diagram.edge("game.Quest", "game.QuestGiver", "giver").unwrap().cardinality,
        Cardinality::One
    );
}

#[test]
fn test_enum_fields_are_not_relationships() {
    let diagram = build(&["game.Adventurer"]);
    assert_eq!(diagram.node_count(), 1);
    assert_eq!(diagram.edge_count(), 0);

    let adventurer = diagram.node("game.Adventurer").unwrap();
    assert_eq!(adventurer.fields.len(), 4);
    assert!(adventurer.field("alignment").unwrap().relationship().is_none());
}

#[test]
fn test_create_from_module() {
    let diagram = build(&["game"]);
    assert_eq!(diagram.name(), "Party");
    assert_eq!(diagram.node_count(), 4);
    assert!(!diagram.contains("game.Alignment"));
}

#[test]
fn test_create_from_several_roots() {
    let diagram = build(&["game.Quest", "shapes.Polygon"]);
    assert_eq!(diagram.name(), "Quest");
    assert_eq!(diagram.node_count(), 4);
    assert!(diagram.contains("shapes.Point"));
    assert!(!diagram.contains("game.Party"));
}

#[test]
fn test_models_from_different_adapters_link() {
    let diagram = build(&["canvas.Canvas"]);
    assert_eq!(diagram.node_count(), 2);
    assert_eq!(diagram.node("canvas.Canvas").unwrap().adapter, "pydantic");
    assert_eq!(diagram.node("shapes.Point").unwrap().adapter, "dataclasses");
    assert_eq!(diagram.edge_count(), 2);
}

#[test]
fn test_cycles_terminate() {
    let diagram = build(&["graph.Node"]);
    assert_eq!(diagram.node_count(), 2);
    assert_eq!(diagram.edge_count(), 4);
    assert!(diagram.edge("graph.Node", "graph.Node", "next").is_some());
    assert_eq!(
        diagram.edge("graph.Tree", "graph.Node", "index").unwrap().cardinality,
        Cardinality::Many
    );
}

#[test]
fn test_depth_limit() {
    let options = DiagramOptions::default().with_depth_limit(1);
    let diagram = create(&catalog(), &default_registry(), &["game.Party"], options).unwrap();
    assert_eq!(diagram.node_count(), 3);
    assert_eq!(diagram.edge_count(), 2);
    assert!(!diagram.contains("game.QuestGiver"));

    // Boundary nodes still know where their fields point
    let quest = diagram.node("game.Quest").unwrap();
    assert_eq!(quest.field("giver").unwrap().target(), Some("game.QuestGiver"));
}

#[test]
fn test_pydantic_docstring_lists_attributes() {
    let diagram = build(&["game.Party"]);
    let party = diagram.node("game.Party").unwrap();
    let doc = party.docstring.as_deref().unwrap();
    assert!(doc.starts_with("A group of adventurers finding their way in the world."));
    assert!(doc.contains("\nAttributes:\n"));
    assert!(doc.contains(
        "    active_quest (Optional[Quest]): Current quest that party is actively tackling. Default is None."
    ));
    assert!(doc.contains("    formed_datetime (datetime): Timestamp of when the party was formed.\n"));
}

#[test]
fn test_dataclass_docstring_is_cleaned() {
    let diagram = build(&["shapes.Polygon"]);
    let polygon = diagram.node("shapes.Polygon").unwrap();
    assert_eq!(
        polygon.docstring.as_deref(),
        Some("A closed shape.\n\nVertices are listed counter-clockwise.")
    );
    assert_eq!(polygon.summary(), Some("A closed shape."));
    let names: Vec<&str> = polygon.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["vertices", "centroid"]);
}

#[test]
fn test_to_dot() {
    let dot = to_dot(
        &catalog(),
        &default_registry(),
        &["game.Party"],
        DiagramOptions::default(),
    )
    .unwrap();
    assert!(dot.starts_with("digraph \"Party\" {"));
    assert!(dot.contains("rankdir=\"LR\";"));
    assert!(dot.contains(
        "\"game.Party\" -> \"game.Adventurer\" [tailport=\"members_e:e\", arrowhead=\"crowodot\"];"
    ));
}

#[test]
fn test_prelude_builder_path() {
    let catalog = catalog();
    let registry = default_registry();
    let party = catalog.class("game.Party").unwrap();

    let diagram = GraphBuilder::new(&registry)
        .with_orientation(Orientation::Vertical)
        .build(&party)
        .unwrap();
    assert_eq!(diagram.orientation(), Orientation::Vertical);
    assert_eq!(diagram, build(&["game.Party"]).with_orientation(Orientation::Vertical));
}

#[test]
fn test_draw_dot_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("party.dot");
    draw(
        &catalog(),
        &default_registry(),
        &["game"],
        &out,
        DiagramOptions::default(),
        &GraphvizCli::with_program("/nonexistent/dot"),
    )
    .unwrap();

    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(written, build(&["game"]).to_dot());
}
