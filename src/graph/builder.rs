use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use tracing::debug;

use crate::graph::{AdjacencyIndex, EdgeMeta, EdgeOptions, EdgeSpec, Graph, GraphError, Label};
use crate::identity::{vertex_id, VertexKey};

impl<V: Clone + Eq + Hash + Debug> Graph<V> {
    pub fn add_vertex(&self, v: V) -> Self {
        let mut next = self.clone();
        next.insert_vertex(v, None);
        next
    }

    /// Adds `v` with a label. A vertex that already exists keeps its label.
    pub fn add_vertex_with_label(&self, v: V, label: impl Into<Label>) -> Self {
        let mut next = self.clone();
        next.insert_vertex(v, Some(label.into()));
        next
    }

    pub fn add_vertices<I>(&self, vs: I) -> Self
    where
        I: IntoIterator<Item = V>,
    {
        let mut next = self.clone();
        for v in vs {
            next.insert_vertex(v, None);
        }
        next
    }

    pub fn label_vertex(&self, v: &V, label: impl Into<Label>) -> Result<Self, GraphError> {
        let key = vertex_id(v);
        if !self.contains_key(key) {
            return Err(GraphError::InvalidVertex(format!("{v:?}")));
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.vertex_labels).insert(key, label.into());
        Ok(next)
    }

    /// Re-keys `v` as `replacement` across every table.
    ///
    /// Fails with [`GraphError::VertexCollision`] when `replacement` already
    /// names a different vertex of this graph.
    pub fn replace_vertex(&self, v: &V, replacement: V) -> Result<Self, GraphError> {
        let old = vertex_id(v);
        if !self.contains_key(old) {
            return Err(GraphError::InvalidVertex(format!("{v:?}")));
        }
        let new = vertex_id(&replacement);
        let mut next = self.clone();
        if new == old {
            Arc::make_mut(&mut next.vertices).insert(old, replacement);
            return Ok(next);
        }
        if self.contains_key(new) {
            return Err(GraphError::VertexCollision(format!("{replacement:?}")));
        }

        let rekey = |key: VertexKey| if key == old { new } else { key };
        let touching: BTreeMap<(VertexKey, VertexKey), EdgeMeta> = self
            .successors(old)
            .iter()
            .map(|&to| (old, to))
            .chain(self.predecessors(old).iter().map(|&from| (from, old)))
            .map(|pair| {
                let meta = self.edges.get(&pair).cloned().unwrap_or_default();
                (pair, meta)
            })
            .collect();

        for &(from, to) in touching.keys() {
            next.unlink(from, to);
        }
        Arc::make_mut(&mut next.vertices).remove(&old);
        Arc::make_mut(&mut next.vertices).insert(new, replacement);
        if let Some(label) = Arc::make_mut(&mut next.vertex_labels).remove(&old) {
            Arc::make_mut(&mut next.vertex_labels).insert(new, label);
        }
        for ((from, to), meta) in touching {
            next.link(rekey(from), rekey(to), meta);
        }

        debug!(from = ?v, to = ?next.vertices.get(&new), "replaced vertex");
        Ok(next)
    }

    pub fn delete_vertex(&self, v: &V) -> Self {
        let key = vertex_id(v);
        if !self.contains_key(key) {
            return self.clone();
        }
        let mut next = self.clone();
        next.remove_vertex_key(key);
        debug!(vertex = ?v, "deleted vertex");
        next
    }

    pub fn delete_vertices<'a, I>(&self, vs: I) -> Self
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        let mut next = self.clone();
        for v in vs {
            let key = vertex_id(v);
            if next.contains_key(key) {
                next.remove_vertex_key(key);
            }
        }
        next
    }

    /// Adds `a -> b` with default weight and no label, creating missing endpoints.
    pub fn add_edge(&self, a: V, b: V) -> Self {
        let mut next = self.clone();
        next.insert_edge(a, b, EdgeMeta::default());
        next
    }

    /// Adds `a -> b` with the given options, replacing any prior metadata.
    pub fn add_edge_with(&self, a: V, b: V, opts: EdgeOptions) -> Result<Self, GraphError> {
        opts.validate()?;
        let mut next = self.clone();
        next.insert_edge(a, b, opts.into_meta());
        Ok(next)
    }

    /// Folds [`Graph::add_edge_with`] over `edges`. On error the receiver is
    /// unchanged and nothing folded before the failing element is kept.
    pub fn add_edges<I, E>(&self, edges: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = E>,
        E: Into<EdgeSpec<V>>,
    {
        let mut next = self.clone();
        for spec in edges {
            match spec.into() {
                EdgeSpec::Pair(a, b) => next.insert_edge(a, b, EdgeMeta::default()),
                EdgeSpec::Edge(edge) => {
                    EdgeOptions::check_weight(edge.weight)?;
                    let meta = edge.meta();
                    next.insert_edge(edge.v1, edge.v2, meta);
                }
            }
        }
        Ok(next)
    }

    /// Merges `opts` into the metadata of `a -> b`.
    ///
    /// When the edge is missing but both endpoints exist it is created from
    /// `opts`; when either endpoint is missing the graph is returned unchanged.
    pub fn update_edge(&self, a: &V, b: &V, opts: EdgeOptions) -> Result<Self, GraphError> {
        opts.validate()?;
        let (from, to) = (vertex_id(a), vertex_id(b));
        if !self.contains_key(from) || !self.contains_key(to) {
            return Ok(self.clone());
        }
        let mut meta = self.edges.get(&(from, to)).cloned().unwrap_or_default();
        opts.merge_into(&mut meta);
        let mut next = self.clone();
        next.link(from, to, meta);
        Ok(next)
    }

    pub fn delete_edge(&self, a: &V, b: &V) -> Self {
        let pair = (vertex_id(a), vertex_id(b));
        if !self.edges.contains_key(&pair) {
            return self.clone();
        }
        let mut next = self.clone();
        next.unlink(pair.0, pair.1);
        next
    }

    pub fn delete_edges<'a, I>(&self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a V, &'a V)>,
        V: 'a,
    {
        let mut next = self.clone();
        for (a, b) in pairs {
            next.unlink(vertex_id(a), vertex_id(b));
        }
        next
    }

    /// Replaces `v1 -> v2` with `v1 -> v3 -> v2`; both new edges copy the
    /// original metadata.
    pub fn split_edge(&self, v1: &V, v2: &V, v3: V) -> Result<Self, GraphError> {
        let (from, to) = (vertex_id(v1), vertex_id(v2));
        let meta = self
            .edges
            .get(&(from, to))
            .cloned()
            .ok_or_else(|| GraphError::NoSuchEdge(format!("{v1:?}"), format!("{v2:?}")))?;
        let mid = vertex_id(&v3);
        let mut next = self.clone();
        next.unlink(from, to);
        next.insert_vertex(v3, None);
        next.link(from, mid, meta.clone());
        next.link(mid, to, meta);
        debug!(from = ?v1, to = ?v2, "split edge");
        Ok(next)
    }

    /// Reverses every edge. Vertices and labels are shared with `self`.
    pub fn transpose(&self) -> Self {
        let edges: BTreeMap<_, _> = self
            .edges
            .iter()
            .map(|(&(from, to), meta)| ((to, from), meta.clone()))
            .collect();
        Self {
            vertices: Arc::clone(&self.vertices),
            vertex_labels: Arc::clone(&self.vertex_labels),
            out_edges: Arc::clone(&self.in_edges),
            in_edges: Arc::clone(&self.out_edges),
            edges: Arc::new(edges),
        }
    }

    /// The vertices of `vs` present in `self`, with every edge between them.
    pub fn subgraph<'a, I>(&self, vs: I) -> Self
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        let mut next = Self::new();
        let keep: BTreeMap<VertexKey, V> = vs
            .into_iter()
            .filter_map(|v| {
                let key = vertex_id(v);
                Some((key, self.vertices.get(&key)?.clone()))
            })
            .collect();
        for (&key, value) in &keep {
            Arc::make_mut(&mut next.vertices).insert(key, value.clone());
            if let Some(label) = self.vertex_labels.get(&key) {
                Arc::make_mut(&mut next.vertex_labels).insert(key, label.clone());
            }
        }
        for (&(from, to), meta) in self.edges.iter() {
            if keep.contains_key(&from) && keep.contains_key(&to) {
                next.link(from, to, meta.clone());
            }
        }
        next
    }

    fn insert_vertex(&mut self, v: V, label: Option<Label>) -> VertexKey {
        let key = vertex_id(&v);
        if self.contains_key(key) {
            return key;
        }
        Arc::make_mut(&mut self.vertices).insert(key, v);
        if let Some(label) = label {
            Arc::make_mut(&mut self.vertex_labels).insert(key, label);
        }
        key
    }

    fn insert_edge(&mut self, a: V, b: V, meta: EdgeMeta) {
        let from = self.insert_vertex(a, None);
        let to = self.insert_vertex(b, None);
        self.link(from, to, meta);
    }
}

impl<V: Clone> Graph<V> {
    pub(crate) fn link(&mut self, from: VertexKey, to: VertexKey, meta: EdgeMeta) {
        Arc::make_mut(&mut self.out_edges)
            .entry(from)
            .or_default()
            .insert(to);
        Arc::make_mut(&mut self.in_edges)
            .entry(to)
            .or_default()
            .insert(from);
        Arc::make_mut(&mut self.edges).insert((from, to), meta);
    }

    pub(crate) fn unlink(&mut self, from: VertexKey, to: VertexKey) -> Option<EdgeMeta> {
        if !self.edges.contains_key(&(from, to)) {
            return None;
        }
        detach(Arc::make_mut(&mut self.out_edges), from, to);
        detach(Arc::make_mut(&mut self.in_edges), to, from);
        Arc::make_mut(&mut self.edges).remove(&(from, to))
    }

    fn remove_vertex_key(&mut self, key: VertexKey) {
        let outgoing: Vec<VertexKey> = self.successors(key).iter().copied().collect();
        let incoming: Vec<VertexKey> = self.predecessors(key).iter().copied().collect();
        for to in outgoing {
            self.unlink(key, to);
        }
        for from in incoming {
            self.unlink(from, key);
        }
        Arc::make_mut(&mut self.vertices).remove(&key);
        if self.vertex_labels.contains_key(&key) {
            Arc::make_mut(&mut self.vertex_labels).remove(&key);
        }
    }
}

fn detach(index: &mut AdjacencyIndex, key: VertexKey, neighbor: VertexKey) {
    if let Some(set) = index.get_mut(&key) {
        set.remove(&neighbor);
        if set.is_empty() {
            index.remove(&key);
        }
    }
}
