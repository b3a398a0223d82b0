use std::fmt::{Display, Write};

use anyhow::Context;

use crate::config::DotConfig;
use crate::error::Result;
use crate::graph::{Graph, Label, DEFAULT_WEIGHT};

/// Renders `graph` as Graphviz DOT text.
///
/// Vertices are named by their internal key and shown with their label when
/// they have one, otherwise with the value's `Display` rendering. Edge weights
/// other than the default go to `xlabel` (Graphviz's own `weight` only takes
/// non-negative integers) and edge labels to `label`.
pub fn to_dot<V: Display>(graph: &Graph<V>, config: &DotConfig) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "digraph \"{}\" {{", escape_dot_label(&config.name))
        .context("failed to write graph header")?;
    if let Some(rankdir) = config.rankdir {
        writeln!(out, "  rankdir={};", rankdir.as_str()).context("failed to write rankdir")?;
    }

    for (key, value) in graph.vertices.iter() {
        let label = match graph.vertex_labels.get(key) {
            Some(label) => render_label(label),
            None => value.to_string(),
        };
        writeln!(out, "  \"{}\" [label=\"{}\"];", key, escape_dot_label(&label))
            .with_context(|| format!("failed to write vertex {key}"))?;
    }

    for (&(from, to), meta) in graph.edges.iter() {
        let mut attrs = Vec::new();
        if config.show_weights && meta.weight != DEFAULT_WEIGHT {
            attrs.push(format!("xlabel=\"{}\"", meta.weight));
        }
        if config.show_labels {
            if let Some(label) = &meta.label {
                attrs.push(format!("label=\"{}\"", escape_dot_label(&render_label(label))));
            }
        }
        let written = if attrs.is_empty() {
            writeln!(out, "  \"{from}\" -> \"{to}\";")
        } else {
            writeln!(out, "  \"{from}\" -> \"{to}\" [{}];", attrs.join(", "))
        };
        written.with_context(|| format!("failed to write edge {from} -> {to}"))?;
    }

    out.push_str("}\n");
    Ok(out)
}

impl<V: Display> Graph<V> {
    pub fn to_dot(&self) -> Result<String> {
        to_dot(self, &DotConfig::default())
    }
}

fn render_label(label: &Label) -> String {
    match label {
        Label::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn escape_dot_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
