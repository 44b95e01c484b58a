//! Graphviz DOT projection
//!
//! Each model becomes a `shape=plain` node whose label is an HTML-like
//! table, one row per field. Edges leave from the east port of the field
//! row that holds the relationship and carry crow's foot arrowheads.

use std::fmt::Write;

use super::diagram::{Diagram, Edge, ModelNode};
use super::field::Field;
use super::text::wrap_label;

pub const HEADER_ROW_COLOR: &str = "#f3f797";
pub const DESCRIPTION_ROW_COLOR: &str = "#fcffcc";
pub const ODD_ROW_COLOR: &str = "#FFFFFF";
pub const EVEN_ROW_COLOR: &str = "#e3e3e3";

/// Wrap width for field descriptions
pub const FIELD_DESCRIPTION_WIDTH: usize = 40;
/// Wrap width for the model description row
pub const MODEL_DESCRIPTION_WIDTH: usize = 100;

/// Escape special characters for quoted DOT strings.
pub fn escape_label(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Escape text placed inside an HTML-like label.
pub fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap text and join the escaped lines with HTML line breaks
fn wrap_html(text: &str, width: usize) -> String {
    wrap_label(text, width)
        .iter()
        .map(|line| html_escape(line))
        .collect::<Vec<_>>()
        .join("<br/>")
}

fn write_indent(output: &mut String, level: usize) {
    for _ in 0..level {
        output.push_str("  ");
    }
}

/// Incremental writer for one `digraph`
pub struct DotBuilder {
    output: String,
    indent: usize,
}

impl DotBuilder {
    pub fn new(name: &str) -> Self {
        let mut output = String::with_capacity(4096);
        let _ = writeln!(output, "digraph \"{}\" {{", escape_label(name));
        Self { output, indent: 1 }
    }

    /// Graph attribute
    pub fn attr(&mut self, key: &str, value: &str) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = writeln!(self.output, "{}=\"{}\";", key, escape_label(value));
        self
    }

    /// Default attributes for every node
    pub fn node_style(&mut self, attrs: &[(&str, &str)]) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = writeln!(self.output, "node [{}];", Self::attr_list(attrs));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.output.push('\n');
        self
    }

    /// Node with an HTML-like label and extra quoted attributes
    pub fn html_node(&mut self, id: &str, html: &str, attrs: &[(&str, &str)]) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = write!(self.output, "\"{}\" [label=<{}>", escape_label(id), html);
        if !attrs.is_empty() {
            let _ = write!(self.output, ", {}", Self::attr_list(attrs));
        }
        self.output.push_str("];\n");
        self
    }

    pub fn edge_with_attrs(&mut self, from: &str, to: &str, attrs: &[(&str, &str)]) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = write!(
            self.output,
            "\"{}\" -> \"{}\"",
            escape_label(from),
            escape_label(to)
        );
        if !attrs.is_empty() {
            let _ = write!(self.output, " [{}]", Self::attr_list(attrs));
        }
        self.output.push_str(";\n");
        self
    }

    pub fn build(mut self) -> String {
        self.output.push_str("}\n");
        self.output
    }

    fn attr_list(attrs: &[(&str, &str)]) -> String {
        attrs
            .iter()
            .map(|(key, value)| format!("{}=\"{}\"", key, escape_label(value)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// HTML-like table used as a model node's label
pub fn model_table(node: &ModelNode) -> String {
    let with_descriptions = node.has_field_descriptions();
    let columns = if with_descriptions { 3 } else { 2 };

    let mut html = String::from(
        r#"<table border="0" cellborder="1" cellpadding="5" cellspacing="0">"#,
    );
    let _ = write!(
        html,
        r#"<tr><td bgcolor="{}" port="_root" colspan="{}"><b>{}</b></td></tr>"#,
        HEADER_ROW_COLOR,
        columns,
        html_escape(&node.name)
    );
    if let Some(summary) = node.summary() {
        let _ = write!(
            html,
            r#"<tr><td bgcolor="{}" port="description" colspan="{}"><i>{}</i></td></tr>"#,
            DESCRIPTION_ROW_COLOR,
            columns,
            wrap_html(summary, MODEL_DESCRIPTION_WIDTH)
        );
    }
    for (index, field) in node.fields.iter().enumerate() {
        field_row(&mut html, index, field, with_descriptions);
    }
    html.push_str("</table>");
    html
}

fn field_row(html: &mut String, index: usize, field: &Field, with_descriptions: bool) {
    let color = if index % 2 == 0 {
        ODD_ROW_COLOR
    } else {
        EVEN_ROW_COLOR
    };
    let name = html_escape(&field.name);
    let type_name = html_escape(field.type_name());

    if with_descriptions {
        let description = field
            .description
            .as_deref()
            .map(|d| wrap_html(d, FIELD_DESCRIPTION_WIDTH))
            .unwrap_or_default();
        let _ = write!(
            html,
            r#"<tr><td bgcolor="{c}" port="{n}_w"><b>{n}</b></td><td bgcolor="{c}">{t}</td><td bgcolor="{c}" port="{n}_e">{d}</td></tr>"#,
            c = color,
            n = name,
            t = type_name,
            d = description
        );
    } else {
        let _ = write!(
            html,
            r#"<tr><td bgcolor="{c}" port="{n}_w">{n}</td><td bgcolor="{c}" port="{n}_e">{t}</td></tr>"#,
            c = color,
            n = name,
            t = type_name
        );
    }
}

fn edge_attrs(edge: &Edge) -> [(&'static str, String); 2] {
    [
        ("tailport", format!("{}_e:e", edge.field)),
        ("arrowhead", edge.cardinality.dot_arrowhead().to_string()),
    ]
}

/// Project a diagram to DOT text
pub fn diagram_to_dot(diagram: &Diagram) -> String {
    let mut dot = DotBuilder::new(diagram.name());
    dot.attr("nodesep", "0.5")
        .attr("ranksep", "1.5")
        .attr("rankdir", diagram.orientation().rankdir())
        .attr("fontsize", "9")
        .attr("fontcolor", "gray66")
        .node_style(&[("fontsize", "14"), ("shape", "plain")])
        .blank();

    for node in diagram.nodes() {
        let table = model_table(node);
        match node.docstring.as_deref() {
            Some(doc) if !doc.trim().is_empty() => {
                dot.html_node(&node.key, &table, &[("tooltip", doc)])
            }
            _ => dot.html_node(&node.key, &table, &[]),
        };
    }

    if !diagram.edges().is_empty() {
        dot.blank();
    }
    for edge in diagram.edges() {
        let attrs = edge_attrs(edge);
        let borrowed: Vec<(&str, &str)> = attrs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        dot.edge_with_attrs(&edge.source, &edge.target, &borrowed);
    }

    dot.build()
}
