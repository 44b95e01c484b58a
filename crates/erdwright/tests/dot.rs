//! DOT projection of fixture diagrams

use erdwright::core::{escape_label, html_escape, model_table};
use erdwright::prelude::*;

const FIXTURE: &str = include_str!("fixtures/game.json");

fn dot_for(paths: &[&str], orientation: Orientation) -> String {
    let catalog = ModelCatalog::from_json_str(FIXTURE).unwrap();
    erdwright::to_dot(
        &catalog,
        &default_registry(),
        paths,
        DiagramOptions::default().with_orientation(orientation),
    )
    .unwrap()
}

#[test]
fn test_graph_attributes() {
    let dot = dot_for(&["game.Party"], Orientation::Horizontal);
    let header: Vec<&str> = dot.lines().take(7).collect();
    assert_eq!(
        header,
        vec![
            "digraph \"Party\" {",
            "  nodesep=\"0.5\";",
            "  ranksep=\"1.5\";",
            "  rankdir=\"LR\";",
            "  fontsize=\"9\";",
            "  fontcolor=\"gray66\";",
            "  node [fontsize=\"14\", shape=\"plain\"];",
        ]
    );
    assert!(dot.ends_with("}\n"));
}

#[test]
fn test_vertical_layout() {
    let dot = dot_for(&["game.Party"], Orientation::Vertical);
    assert!(dot.contains("  rankdir=\"TB\";\n"));
}

#[test]
fn test_one_statement_per_node_and_edge() {
    let dot = dot_for(&["game.Party"], Orientation::Horizontal);
    let nodes = dot.lines().filter(|l| l.contains("[label=<")).count();
    let edges = dot.lines().filter(|l| l.contains(" -> ")).count();
    assert_eq!(nodes, 4);
    assert_eq!(edges, 3);
}

#[test]
fn test_edge_statements_in_sorted_order() {
    let dot = dot_for(&["game.Party"], Orientation::Horizontal);
    let edges: Vec<&str> = dot.lines().filter(|l| l.contains(" -> ")).map(str::trim).collect();
    assert_eq!(
        edges,
        vec![
            "\"game.Party\" -> \"game.Adventurer\" [tailport=\"members_e:e\", arrowhead=\"crowodot\"];",
            "\"game.Party\" -> \"game.Quest\" [tailport=\"active_quest_e:e\", arrowhead=\"noneteeodot\"];",
            "\"game.Quest\" -> \"game.QuestGiver\" [tailport=\"giver_e:e\", arrowhead=\"noneteetee\"];",
        ]
    );
}

#[test]
fn test_tooltips_carry_docstrings() {
    let dot = dot_for(&["shapes.Polygon"], Orientation::Horizontal);
    let polygon = dot
        .lines()
        .find(|l| l.trim_start().starts_with("\"shapes.Polygon\""))
        .unwrap();
    assert!(polygon.contains(
        "tooltip=\"A closed shape.\\n\\nVertices are listed counter-clockwise.\""
    ));

    let nodes = dot_for(&["graph.Tree"], Orientation::Horizontal);
    assert!(!nodes.contains("tooltip="));
}

#[test]
fn test_model_table_with_descriptions() {
    let catalog = ModelCatalog::from_json_str(FIXTURE).unwrap();
    let diagram = erdwright::create(
        &catalog,
        &default_registry(),
        &["game.Party"],
        DiagramOptions::default().with_depth_limit(0),
    )
    .unwrap();
    let table = model_table(diagram.node("game.Party").unwrap());

    assert!(table.starts_with("<table border=\"0\" cellborder=\"1\""));
    assert!(table.contains(r#"port="_root" colspan="3"><b>Party</b>"#));
    assert!(table.contains(r#"port="members_w"><b>members</b></td>"#));
    assert!(table.contains(">List[Adventurer]</td>"));
    assert!(table.contains(r#"port="active_quest_e">Current quest that party is actively<br/>tackling.</td>"#));
    assert!(table.ends_with("</table>"));
}

#[test]
fn test_model_table_without_descriptions() {
    let catalog = ModelCatalog::from_json_str(FIXTURE).unwrap();
    let diagram = erdwright::create(
        &catalog,
        &default_registry(),
        &["graph.Tree"],
        DiagramOptions::default().with_depth_limit(0),
    )
    .unwrap();
    let table = model_table(diagram.node("graph.Tree").unwrap());

    assert!(table.contains(r#"colspan="2""#));
    assert!(table.contains(r#"port="index_e">Dict[str, Node]</td>"#));
    assert!(!table.contains(r#"port="description""#));
}

#[test]
fn test_escaping_helpers() {
    assert_eq!(escape_label("a\\b"), "a\\\\b");
    assert_eq!(html_escape("Dict[str, List[\"A\"]]"), "Dict[str, List[&quot;A&quot;]]");
}
