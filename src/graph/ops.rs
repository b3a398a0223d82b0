use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;

use tracing::trace;

use crate::graph::components::weak_component_keys;
use crate::graph::Graph;
use crate::identity::{vertex_id, VertexKey};

#[derive(Clone, Copy)]
enum Direction {
    Outgoing,
    Incoming,
}

impl<V> Graph<V> {
    fn step(&self, key: VertexKey, direction: Direction) -> &BTreeSet<VertexKey> {
        match direction {
            Direction::Outgoing => self.successors(key),
            Direction::Incoming => self.predecessors(key),
        }
    }
}

struct DepthFirst {
    preorder: Vec<VertexKey>,
    postorder: Vec<VertexKey>,
}

fn depth_first<V>(graph: &Graph<V>) -> DepthFirst {
    let mut visited: HashSet<VertexKey> = HashSet::with_capacity(graph.num_vertices());
    let mut preorder = Vec::with_capacity(graph.num_vertices());
    let mut postorder = Vec::with_capacity(graph.num_vertices());

    for root in graph.keys() {
        if !visited.insert(root) {
            continue;
        }
        preorder.push(root);
        let mut stack = vec![(root, graph.successors(root).iter())];
        while let Some((node, children)) = stack.last_mut() {
            match children.find(|child| !visited.contains(*child)) {
                Some(&child) => {
                    visited.insert(child);
                    preorder.push(child);
                    stack.push((child, graph.successors(child).iter()));
                }
                None => {
                    postorder.push(*node);
                    stack.pop();
                }
            }
        }
    }

    DepthFirst {
        preorder,
        postorder,
    }
}

/// Vertices in depth-first preorder, covering every component.
pub fn preorder<V: Clone>(graph: &Graph<V>) -> Vec<V> {
    graph.values_of(depth_first(graph).preorder)
}

/// Vertices in depth-first postorder, covering every component.
pub fn postorder<V: Clone>(graph: &Graph<V>) -> Vec<V> {
    graph.values_of(depth_first(graph).postorder)
}

fn closure<V>(
    graph: &Graph<V>,
    seeds: &[VertexKey],
    direction: Direction,
    include_seeds: bool,
) -> Vec<VertexKey> {
    let mut seen: HashSet<VertexKey> = HashSet::new();
    let mut order = Vec::new();
    let mut queue: VecDeque<VertexKey> = VecDeque::new();

    for &seed in seeds {
        if !graph.contains_key(seed) {
            continue;
        }
        if include_seeds {
            if seen.insert(seed) {
                order.push(seed);
                queue.push_back(seed);
            }
        } else {
            for &next in graph.step(seed, direction) {
                if seen.insert(next) {
                    order.push(next);
                    queue.push_back(next);
                }
            }
        }
    }

    while let Some(current) = queue.pop_front() {
        for &next in graph.step(current, direction) {
            if seen.insert(next) {
                order.push(next);
                queue.push_back(next);
            }
        }
    }

    order
}

fn seed_keys<V: Hash>(vs: &[V]) -> Vec<VertexKey> {
    vs.iter().map(vertex_id).collect()
}

/// Every vertex reachable from `vs`, including the seeds themselves.
pub fn reachable<V: Clone + Hash>(graph: &Graph<V>, vs: &[V]) -> Vec<V> {
    let keys = closure(graph, &seed_keys(vs), Direction::Outgoing, true);
    graph.values_of(keys)
}

/// Vertices reachable from `vs` by a path of at least one edge.
pub fn reachable_neighbors<V: Clone + Hash>(graph: &Graph<V>, vs: &[V]) -> Vec<V> {
    let keys = closure(graph, &seed_keys(vs), Direction::Outgoing, false);
    graph.values_of(keys)
}

/// Every vertex that can reach one of `vs`, including the seeds themselves.
pub fn reaching<V: Clone + Hash>(graph: &Graph<V>, vs: &[V]) -> Vec<V> {
    let keys = closure(graph, &seed_keys(vs), Direction::Incoming, true);
    graph.values_of(keys)
}

/// Vertices that reach one of `vs` by a path of at least one edge.
pub fn reaching_neighbors<V: Clone + Hash>(graph: &Graph<V>, vs: &[V]) -> Vec<V> {
    let keys = closure(graph, &seed_keys(vs), Direction::Incoming, false);
    graph.values_of(keys)
}

pub(crate) fn topsort_keys<V>(graph: &Graph<V>) -> Option<Vec<VertexKey>> {
    let mut indegree: HashMap<VertexKey, usize> = graph
        .keys()
        .map(|key| (key, graph.predecessors(key).len()))
        .collect();

    let mut queue: VecDeque<VertexKey> = graph
        .keys()
        .filter(|key| indegree.get(key) == Some(&0))
        .collect();
    let mut order = Vec::with_capacity(graph.num_vertices());

    while let Some(node) = queue.pop_front() {
        order.push(node);
        for dep in graph.successors(node) {
            if let Some(count) = indegree.get_mut(dep) {
                *count -= 1;
                if *count == 0 {
                    queue.push_back(*dep);
                }
            }
        }
    }

    trace!(
        vertices = graph.num_vertices(),
        sorted = order.len(),
        "topological sort"
    );
    if order.len() != graph.num_vertices() {
        return None;
    }
    Some(order)
}

/// Orders vertices so every edge points forward; `None` if the graph has a cycle.
pub fn topsort<V: Clone>(graph: &Graph<V>) -> Option<Vec<V>> {
    topsort_keys(graph).map(|keys| graph.values_of(keys))
}

pub fn is_acyclic<V>(graph: &Graph<V>) -> bool {
    topsort_keys(graph).is_some()
}

pub fn is_cyclic<V>(graph: &Graph<V>) -> bool {
    !is_acyclic(graph)
}

/// Vertices carrying a self-loop.
pub fn loop_vertices<V: Clone>(graph: &Graph<V>) -> Vec<V> {
    graph.values_of(graph.keys().filter(|&key| graph.successors(key).contains(&key)))
}

fn arborescence_root_key<V>(graph: &Graph<V>) -> Option<VertexKey> {
    let mut root = None;
    for key in graph.keys() {
        match graph.predecessors(key).len() {
            0 if root.is_none() => root = Some(key),
            1 => {}
            _ => return None,
        }
    }
    let root = root?;
    if !is_acyclic(graph) {
        return None;
    }
    Some(root)
}

pub fn is_arborescence<V>(graph: &Graph<V>) -> bool {
    arborescence_root_key(graph).is_some()
}

/// The unique root of an arborescence, or `None` if `graph` is not one.
pub fn arborescence_root<V: Clone>(graph: &Graph<V>) -> Option<V> {
    arborescence_root_key(graph).and_then(|key| graph.vertex(key).cloned())
}

/// A tree has exactly `n - 1` edges and a single weak component.
pub fn is_tree<V>(graph: &Graph<V>) -> bool {
    match graph.num_vertices().checked_sub(1) {
        Some(expected) => graph.num_edges() == expected && weak_component_keys(graph).len() == 1,
        None => false,
    }
}

/// One representative cycle per back edge found by a depth-first walk.
pub fn find_cycles<V: Clone>(graph: &Graph<V>) -> Vec<Vec<V>> {
    let mut state: HashMap<VertexKey, VisitState> = HashMap::new();
    let mut stack: Vec<VertexKey> = Vec::new();
    let mut cycles = Vec::new();

    for node in graph.keys() {
        if state.contains_key(&node) {
            continue;
        }
        visit_from(node, graph, &mut state, &mut stack, &mut cycles);
    }

    cycles
        .into_iter()
        .map(|cycle| graph.values_of(cycle))
        .collect()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Visiting,
    Visited,
}

// `stack` mirrors `frames`: the vertices currently being visited, root first.
fn visit_from<V>(
    root: VertexKey,
    graph: &Graph<V>,
    state: &mut HashMap<VertexKey, VisitState>,
    stack: &mut Vec<VertexKey>,
    cycles: &mut Vec<Vec<VertexKey>>,
) {
    state.insert(root, VisitState::Visiting);
    stack.push(root);
    let mut frames = vec![graph.successors(root).iter()];

    while let Some(children) = frames.last_mut() {
        let Some(&dep) = children.next() else {
            frames.pop();
            if let Some(done) = stack.pop() {
                state.insert(done, VisitState::Visited);
            }
            continue;
        };
        match state.get(&dep) {
            Some(VisitState::Visiting) => {
                if let Some(pos) = stack.iter().position(|id| *id == dep) {
                    cycles.push(stack[pos..].to_vec());
                }
            }
            Some(VisitState::Visited) => {}
            None => {
                state.insert(dep, VisitState::Visiting);
                stack.push(dep);
                frames.push(graph.successors(dep).iter());
            }
        }
    }
}
