//! Connectivity: weak and strong components, k-core decomposition.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet, VecDeque};

use tracing::trace;

use crate::graph::Graph;
use crate::identity::VertexKey;

pub(crate) fn weak_component_keys<V>(graph: &Graph<V>) -> Vec<Vec<VertexKey>> {
    let mut seen: HashSet<VertexKey> = HashSet::with_capacity(graph.num_vertices());
    let mut components = Vec::new();

    for root in graph.keys() {
        if !seen.insert(root) {
            continue;
        }
        let mut component = vec![root];
        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            let around = graph
                .successors(current)
                .iter()
                .chain(graph.predecessors(current));
            for &next in around {
                if seen.insert(next) {
                    component.push(next);
                    queue.push_back(next);
                }
            }
        }
        components.push(component);
    }

    components
}

/// Weakly connected components: edge direction is ignored.
pub fn components<V: Clone>(graph: &Graph<V>) -> Vec<Vec<V>> {
    weak_component_keys(graph)
        .into_iter()
        .map(|component| graph.values_of(component))
        .collect()
}

struct Tarjan<'g, V> {
    graph: &'g Graph<V>,
    index: usize,
    indices: HashMap<VertexKey, usize>,
    lowlink: HashMap<VertexKey, usize>,
    stack: Vec<VertexKey>,
    on_stack: HashSet<VertexKey>,
    components: Vec<Vec<VertexKey>>,
}

impl<'g, V> Tarjan<'g, V> {
    fn new(graph: &'g Graph<V>) -> Self {
        Self {
            graph,
            index: 0,
            indices: HashMap::with_capacity(graph.num_vertices()),
            lowlink: HashMap::with_capacity(graph.num_vertices()),
            stack: Vec::new(),
            on_stack: HashSet::new(),
            components: Vec::new(),
        }
    }

    fn open(&mut self, v: VertexKey) {
        self.indices.insert(v, self.index);
        self.lowlink.insert(v, self.index);
        self.index += 1;
        self.stack.push(v);
        self.on_stack.insert(v);
    }

    fn lower(&mut self, v: VertexKey, candidate: usize) {
        if let Some(low) = self.lowlink.get_mut(&v) {
            *low = (*low).min(candidate);
        }
    }

    // Explicit call stack; recursion would overflow on long chains.
    fn strongconnect(&mut self, root: VertexKey) {
        let graph = self.graph;
        self.open(root);
        let mut call = vec![(root, graph.successors(root).iter())];

        while let Some((v, children)) = call.last_mut() {
            let v = *v;
            if let Some(&w) = children.next() {
                match self.indices.get(&w) {
                    None => {
                        self.open(w);
                        call.push((w, graph.successors(w).iter()));
                    }
                    Some(&w_index) if self.on_stack.contains(&w) => self.lower(v, w_index),
                    Some(_) => {}
                }
                continue;
            }

            call.pop();
            let v_low = self.lowlink[&v];
            if let Some(&(parent, _)) = call.last() {
                self.lower(parent, v_low);
            }
            if v_low == self.indices[&v] {
                let mut component = Vec::new();
                while let Some(w) = self.stack.pop() {
                    self.on_stack.remove(&w);
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                self.components.push(component);
            }
        }
    }
}

pub(crate) fn strong_component_keys<V>(graph: &Graph<V>) -> Vec<Vec<VertexKey>> {
    let mut tarjan = Tarjan::new(graph);
    for key in graph.keys() {
        if !tarjan.indices.contains_key(&key) {
            tarjan.strongconnect(key);
        }
    }
    trace!(
        vertices = graph.num_vertices(),
        components = tarjan.components.len(),
        "strong components"
    );
    tarjan.components
}

/// Strongly connected components, computed with Tarjan's algorithm.
///
/// Components come out in reverse topological order of the condensation.
pub fn strong_components<V: Clone>(graph: &Graph<V>) -> Vec<Vec<V>> {
    strong_component_keys(graph)
        .into_iter()
        .map(|component| graph.values_of(component))
        .collect()
}

fn core_number_keys<V>(graph: &Graph<V>) -> BTreeMap<VertexKey, usize> {
    let neighbors: HashMap<VertexKey, BTreeSet<VertexKey>> = graph
        .keys()
        .map(|key| {
            let mut around: BTreeSet<VertexKey> = graph
                .successors(key)
                .union(graph.predecessors(key))
                .copied()
                .collect();
            around.remove(&key);
            (key, around)
        })
        .collect();

    let mut degree: HashMap<VertexKey, usize> = neighbors
        .iter()
        .map(|(&key, around)| (key, around.len()))
        .collect();
    let mut heap: BinaryHeap<Reverse<(usize, VertexKey)>> =
        degree.iter().map(|(&key, &d)| Reverse((d, key))).collect();
    let mut removed: HashSet<VertexKey> = HashSet::with_capacity(degree.len());
    let mut cores = BTreeMap::new();
    let mut k = 0;

    while let Some(Reverse((d, key))) = heap.pop() {
        if removed.contains(&key) || degree.get(&key) != Some(&d) {
            continue;
        }
        k = k.max(d);
        cores.insert(key, k);
        removed.insert(key);
        for next in &neighbors[&key] {
            if removed.contains(next) {
                continue;
            }
            if let Some(nd) = degree.get_mut(next) {
                *nd -= 1;
                heap.push(Reverse((*nd, *next)));
            }
        }
    }

    cores
}

/// Core number of every vertex, treating edges as undirected and ignoring self-loops.
pub fn core_numbers<V: Clone>(graph: &Graph<V>) -> Vec<(V, usize)> {
    core_number_keys(graph)
        .into_iter()
        .filter_map(|(key, core)| Some((graph.vertex(key)?.clone(), core)))
        .collect()
}

/// Vertices of the `k`-core: those whose core number is at least `k`.
pub fn k_core<V: Clone>(graph: &Graph<V>, k: usize) -> Vec<V> {
    let keys = core_number_keys(graph)
        .into_iter()
        .filter(|&(_, core)| core >= k)
        .map(|(key, _)| key);
    graph.values_of(keys)
}

/// Largest `k` for which the `k`-core is non-empty.
pub fn degeneracy<V>(graph: &Graph<V>) -> usize {
    core_number_keys(graph).into_values().max().unwrap_or(0)
}
