//! Directed graph store.
//!
//! A [`Graph`] is an immutable snapshot: every mutation takes `&self` and
//! returns a new graph, leaving the receiver untouched. The tables are kept
//! behind [`Arc`] and copied on write, so snapshots derived from one another
//! share whatever they did not modify.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::Hash;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::{vertex_id, VertexKey};

pub mod builder;
pub mod components;
pub mod info;
pub mod input;
pub mod ops;
pub mod paths;
pub mod viz;

pub use input::{EdgeOptions, EdgeSpec};

/// Opaque label attached to vertices and edges.
pub type Label = serde_json::Value;

pub const DEFAULT_WEIGHT: f64 = 1.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("vertex {0} is not in the graph")]
    InvalidVertex(String),
    #[error("vertex {0} collides with an existing vertex")]
    VertexCollision(String),
    #[error("no edge from {0} to {1}")]
    NoSuchEdge(String, String),
    #[error("invalid edge option: {0}")]
    InvalidEdgeOption(String),
    #[error("invalid edge: {0}")]
    InvalidEdge(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeMeta {
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
}

impl Default for EdgeMeta {
    fn default() -> Self {
        Self {
            weight: DEFAULT_WEIGHT,
            label: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Edge<V> {
    pub v1: V,
    pub v2: V,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
}

impl<V> Edge<V> {
    pub fn new(v1: V, v2: V) -> Self {
        Self {
            v1,
            v2,
            weight: DEFAULT_WEIGHT,
            label: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_label(mut self, label: impl Into<Label>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub(crate) fn meta(&self) -> EdgeMeta {
        EdgeMeta {
            weight: self.weight,
            label: self.label.clone(),
        }
    }
}

fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

pub(crate) type AdjacencyIndex = BTreeMap<VertexKey, BTreeSet<VertexKey>>;
pub(crate) type EdgeTable = BTreeMap<(VertexKey, VertexKey), EdgeMeta>;

static NO_NEIGHBORS: BTreeSet<VertexKey> = BTreeSet::new();

#[derive(Debug, Clone, PartialEq)]
pub struct Graph<V> {
    pub(crate) vertices: Arc<BTreeMap<VertexKey, V>>,
    pub(crate) vertex_labels: Arc<BTreeMap<VertexKey, Label>>,
    // Sets are never left empty; a vertex without successors has no entry.
    pub(crate) out_edges: Arc<AdjacencyIndex>,
    pub(crate) in_edges: Arc<AdjacencyIndex>,
    pub(crate) edges: Arc<EdgeTable>,
}

impl<V> Default for Graph<V> {
    fn default() -> Self {
        Self {
            vertices: Arc::default(),
            vertex_labels: Arc::default(),
            out_edges: Arc::default(),
            in_edges: Arc::default(),
            edges: Arc::default(),
        }
    }
}

impl<V> Graph<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Reverse lookup from an internal key to the stored vertex value.
    pub fn vertex(&self, key: VertexKey) -> Option<&V> {
        self.vertices.get(&key)
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = VertexKey> + '_ {
        self.vertices.keys().copied()
    }

    pub(crate) fn contains_key(&self, key: VertexKey) -> bool {
        self.vertices.contains_key(&key)
    }

    pub(crate) fn successors(&self, key: VertexKey) -> &BTreeSet<VertexKey> {
        self.out_edges.get(&key).unwrap_or(&NO_NEIGHBORS)
    }

    pub(crate) fn predecessors(&self, key: VertexKey) -> &BTreeSet<VertexKey> {
        self.in_edges.get(&key).unwrap_or(&NO_NEIGHBORS)
    }

    /// Weight of the edge `from -> to`; missing metadata counts as the default weight.
    pub(crate) fn weight(&self, from: VertexKey, to: VertexKey) -> f64 {
        self.edges
            .get(&(from, to))
            .map(|meta| meta.weight)
            .unwrap_or(DEFAULT_WEIGHT)
    }
}

impl<V: Clone> Graph<V> {
    pub(crate) fn values_of<I>(&self, keys: I) -> Vec<V>
    where
        I: IntoIterator<Item = VertexKey>,
    {
        keys.into_iter()
            .filter_map(|key| self.vertices.get(&key).cloned())
            .collect()
    }

    pub(crate) fn edge_from_keys(
        &self,
        from: VertexKey,
        to: VertexKey,
        meta: &EdgeMeta,
    ) -> Option<Edge<V>> {
        Some(Edge {
            v1: self.vertices.get(&from)?.clone(),
            v2: self.vertices.get(&to)?.clone(),
            weight: meta.weight,
            label: meta.label.clone(),
        })
    }

    /// All vertices, ordered by internal key.
    pub fn vertices(&self) -> Vec<V> {
        self.vertices.values().cloned().collect()
    }

    /// All edges, ordered by `(source key, destination key)`.
    pub fn edges(&self) -> Vec<Edge<V>> {
        self.edges
            .iter()
            .filter_map(|(&(from, to), meta)| self.edge_from_keys(from, to, meta))
            .collect()
    }
}

impl<V: Clone + Eq + Hash> Graph<V> {
    pub fn has_vertex(&self, v: &V) -> bool {
        self.vertices.contains_key(&vertex_id(v))
    }

    pub fn has_edge(&self, a: &V, b: &V) -> bool {
        self.edges.contains_key(&(vertex_id(a), vertex_id(b)))
    }

    pub fn edge(&self, a: &V, b: &V) -> Option<Edge<V>> {
        let (from, to) = (vertex_id(a), vertex_id(b));
        let meta = self.edges.get(&(from, to))?;
        self.edge_from_keys(from, to, meta)
    }

    pub fn vertex_label(&self, v: &V) -> Option<&Label> {
        self.vertex_labels.get(&vertex_id(v))
    }

    pub fn edge_label(&self, a: &V, b: &V) -> Option<&Label> {
        self.edges
            .get(&(vertex_id(a), vertex_id(b)))
            .and_then(|meta| meta.label.as_ref())
    }

    pub fn in_degree(&self, v: &V) -> usize {
        self.predecessors(vertex_id(v)).len()
    }

    pub fn out_degree(&self, v: &V) -> usize {
        self.successors(vertex_id(v)).len()
    }

    pub fn in_neighbors(&self, v: &V) -> Vec<V> {
        self.values_of(self.predecessors(vertex_id(v)).iter().copied())
    }

    pub fn out_neighbors(&self, v: &V) -> Vec<V> {
        self.values_of(self.successors(vertex_id(v)).iter().copied())
    }

    /// Vertices adjacent to `v` in either direction, without duplicates.
    pub fn neighbors(&self, v: &V) -> Vec<V> {
        let key = vertex_id(v);
        let keys: BTreeSet<VertexKey> = self
            .successors(key)
            .union(self.predecessors(key))
            .copied()
            .collect();
        self.values_of(keys)
    }

    pub fn in_edges(&self, v: &V) -> Vec<Edge<V>> {
        let to = vertex_id(v);
        self.predecessors(to)
            .iter()
            .filter_map(|&from| {
                let meta = self.edges.get(&(from, to))?;
                self.edge_from_keys(from, to, meta)
            })
            .collect()
    }

    pub fn out_edges(&self, v: &V) -> Vec<Edge<V>> {
        let from = vertex_id(v);
        self.successors(from)
            .iter()
            .filter_map(|&to| {
                let meta = self.edges.get(&(from, to))?;
                self.edge_from_keys(from, to, meta)
            })
            .collect()
    }

    /// Every edge touching `v`; a self-loop is reported once.
    pub fn edges_of(&self, v: &V) -> Vec<Edge<V>> {
        let key = vertex_id(v);
        let mut out = self.out_edges(v);
        out.extend(
            self.in_edges(v)
                .into_iter()
                .filter(|edge| vertex_id(&edge.v1) != key),
        );
        out
    }

    /// True when every vertex of `self` is in `other` and each vertex's
    /// successors in `self` are a subset of its successors in `other`.
    pub fn is_subgraph(&self, other: &Graph<V>) -> bool {
        self.keys().all(|key| {
            other.contains_key(key) && self.successors(key).is_subset(other.successors(key))
        })
    }
}
