use std::mem::size_of;

use serde::Serialize;

use crate::graph::{EdgeMeta, Graph, Label};
use crate::identity::VertexKey;

/// Summary returned by [`Graph::info`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphInfo {
    pub kind: &'static str,
    pub num_vertices: usize,
    pub num_edges: usize,
    pub size_in_bytes: usize,
}

// Rough per-entry overhead of a B-tree node slot on top of the payload.
const ENTRY_OVERHEAD: usize = 2 * size_of::<usize>();

fn label_size(label: &Label) -> usize {
    size_of::<Label>() + label.to_string().len()
}

impl<V> Graph<V> {
    /// Approximate memory footprint of this snapshot.
    ///
    /// Vertex values are counted by their shallow size and labels by their
    /// JSON text length, so heap data owned by `V` is not included. Tables
    /// shared with other snapshots are counted in full.
    pub fn size_in_bytes(&self) -> usize {
        let key = size_of::<VertexKey>();
        let vertices = self.vertices.len() * (key + size_of::<V>() + ENTRY_OVERHEAD);
        let vertex_labels: usize = self
            .vertex_labels
            .values()
            .map(|label| key + label_size(label) + ENTRY_OVERHEAD)
            .sum();
        let adjacency: usize = [&self.out_edges, &self.in_edges]
            .iter()
            .flat_map(|index| index.values())
            .map(|set| key + ENTRY_OVERHEAD + set.len() * (key + ENTRY_OVERHEAD))
            .sum();
        let edges: usize = self
            .edges
            .values()
            .map(|meta| {
                let label = meta.label.as_ref().map_or(0, label_size);
                2 * key + size_of::<EdgeMeta>() + label + ENTRY_OVERHEAD
            })
            .sum();
        size_of::<Self>() + vertices + vertex_labels + adjacency + edges
    }

    pub fn info(&self) -> GraphInfo {
        GraphInfo {
            kind: "directed",
            num_vertices: self.num_vertices(),
            num_edges: self.num_edges(),
            size_in_bytes: self.size_in_bytes(),
        }
    }
}
