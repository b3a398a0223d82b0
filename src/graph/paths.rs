//! Shortest paths and simple-path enumeration.
//!
//! Edge weights come from edge metadata; an edge without metadata weighs
//! [`DEFAULT_WEIGHT`](crate::graph::DEFAULT_WEIGHT). Dijkstra and A* are
//! meant for non-negative weights and give up with `None` when they run into
//! a negative cycle; [`bellman_ford`] is the negative-weight entry point.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::hash::Hash;

use serde::Serialize;
use tracing::trace;

use crate::config::PathLimits;
use crate::graph::Graph;
use crate::identity::{vertex_id, VertexKey};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortestPath<V> {
    pub path: Vec<V>,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy)]
struct Frontier {
    priority: f64,
    seq: u64,
    cost: f64,
    key: VertexKey,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so `BinaryHeap` pops the lowest priority, then the earliest entry.
impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

// Vertices are reopened whenever their cost improves; there is no closed set.
fn search<V, H>(
    graph: &Graph<V>,
    source: VertexKey,
    target: VertexKey,
    heuristic: H,
) -> Option<(Vec<VertexKey>, f64)>
where
    H: Fn(VertexKey) -> f64,
{
    if !graph.contains_key(source) || !graph.contains_key(target) {
        return None;
    }

    // no simple path costs less than the sum of all negative weights
    let negative: f64 = graph.edges.values().map(|meta| meta.weight.min(0.0)).sum();
    let floor = negative - 1e-9 * (1.0 + negative.abs());
    let mut cost: HashMap<VertexKey, f64> = HashMap::from([(source, 0.0)]);
    let mut prev: HashMap<VertexKey, VertexKey> = HashMap::new();
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;
    let mut popped = 0usize;
    heap.push(Frontier {
        priority: heuristic(source),
        seq,
        cost: 0.0,
        key: source,
    });

    while let Some(entry) = heap.pop() {
        let key = entry.key;
        let so_far = cost.get(&key).copied().unwrap_or(f64::INFINITY);
        if entry.cost > so_far {
            continue;
        }
        popped += 1;
        if key == target {
            trace!(popped, cost = so_far, "path search reached target");
            return walk_back(&prev, source, target).map(|path| (path, so_far));
        }

        for &next in graph.successors(key) {
            let candidate = so_far + graph.weight(key, next);
            if candidate < floor {
                trace!(floor, "negative cycle reachable during path search");
                return None;
            }
            if cost.get(&next).map_or(true, |&known| candidate < known) {
                cost.insert(next, candidate);
                prev.insert(next, key);
                seq += 1;
                heap.push(Frontier {
                    priority: candidate + heuristic(next),
                    seq,
                    cost: candidate,
                    key: next,
                });
            }
        }
    }

    trace!(popped, "path search exhausted frontier");
    None
}

// `None` when the predecessor chain loops without reaching `source`, which
// only a negative cycle can cause.
fn walk_back(
    prev: &HashMap<VertexKey, VertexKey>,
    source: VertexKey,
    target: VertexKey,
) -> Option<Vec<VertexKey>> {
    let mut path = vec![target];
    let mut current = target;
    while current != source {
        if path.len() > prev.len() {
            return None;
        }
        let &step = prev.get(&current)?;
        path.push(step);
        current = step;
    }
    path.reverse();
    Some(path)
}

/// Minimum-weight path from `a` to `b` with its total cost.
pub fn shortest_path<V: Clone + Hash>(
    graph: &Graph<V>,
    a: &V,
    b: &V,
) -> Option<ShortestPath<V>> {
    a_star_path(graph, a, b, |_| 0.0)
}

/// Vertices of a minimum-weight path from `a` to `b`; `None` if `b` is unreachable.
pub fn dijkstra<V: Clone + Hash>(graph: &Graph<V>, a: &V, b: &V) -> Option<Vec<V>> {
    shortest_path(graph, a, b).map(|found| found.path)
}

/// A* search guided by `heuristic`, an estimate of the remaining cost to `b`.
///
/// The result is optimal only when `heuristic` never overestimates; this is
/// not checked.
pub fn a_star_path<V, H>(
    graph: &Graph<V>,
    a: &V,
    b: &V,
    heuristic: H,
) -> Option<ShortestPath<V>>
where
    V: Clone + Hash,
    H: Fn(&V) -> f64,
{
    let estimate = |key: VertexKey| graph.vertex(key).map_or(0.0, &heuristic);
    let (keys, cost) = search(graph, vertex_id(a), vertex_id(b), estimate)?;
    Some(ShortestPath {
        path: graph.values_of(keys),
        cost,
    })
}

pub fn a_star<V, H>(graph: &Graph<V>, a: &V, b: &V, heuristic: H) -> Option<Vec<V>>
where
    V: Clone + Hash,
    H: Fn(&V) -> f64,
{
    a_star_path(graph, a, b, heuristic).map(|found| found.path)
}

/// Every simple path from `a` to `b`.
///
/// Exhaustive and exponential in the worst case; use [`get_paths_bounded`]
/// on dense or highly cyclic graphs.
pub fn get_paths<V: Clone + Hash>(graph: &Graph<V>, a: &V, b: &V) -> Vec<Vec<V>> {
    get_paths_bounded(graph, a, b, &PathLimits::unbounded())
}

pub fn get_paths_bounded<V: Clone + Hash>(
    graph: &Graph<V>,
    a: &V,
    b: &V,
    limits: &PathLimits,
) -> Vec<Vec<V>> {
    let (source, target) = (vertex_id(a), vertex_id(b));
    if !graph.contains_key(source) || !graph.contains_key(target) {
        return Vec::new();
    }

    let paths = simple_paths(graph, source, target, limits);
    trace!(paths = paths.len(), "enumerated simple paths");

    paths
        .into_iter()
        .map(|path| graph.values_of(path))
        .collect()
}

// Explicit frame stack; one frame per vertex on the current path.
fn simple_paths<V>(
    graph: &Graph<V>,
    source: VertexKey,
    target: VertexKey,
    limits: &PathLimits,
) -> Vec<Vec<VertexKey>> {
    let mut paths = Vec::new();
    if source == target {
        paths.push(vec![source]);
        return paths;
    }
    if !limits.depth_allows(1) {
        return paths;
    }

    let mut path = vec![source];
    let mut on_path = HashSet::from([source]);
    let mut frames = vec![graph.successors(source).iter()];

    while let Some(children) = frames.last_mut() {
        if limits.is_exhausted(paths.len()) {
            break;
        }
        let Some(&next) = children.next() else {
            frames.pop();
            if let Some(done) = path.pop() {
                on_path.remove(&done);
            }
            continue;
        };
        if next == target {
            let mut found = path.clone();
            found.push(next);
            paths.push(found);
            continue;
        }
        // extending through `next` yields paths of at least path.len() + 1 edges
        if on_path.contains(&next) || !limits.depth_allows(path.len() + 1) {
            continue;
        }
        path.push(next);
        on_path.insert(next);
        frames.push(graph.successors(next).iter());
    }

    paths
}

/// Single-source distances allowing negative weights.
///
/// Returns the distance to every vertex reachable from `a`, ordered by
/// vertex key, or `None` when a negative cycle is reachable from `a`.
pub fn bellman_ford<V: Clone + Hash>(graph: &Graph<V>, a: &V) -> Option<Vec<(V, f64)>> {
    let source = vertex_id(a);
    if !graph.contains_key(source) {
        return Some(Vec::new());
    }

    let mut dist: HashMap<VertexKey, f64> = HashMap::from([(source, 0.0)]);
    for _ in 1..graph.num_vertices() {
        let mut changed = false;
        for (&(from, to), meta) in graph.edges.iter() {
            let Some(&base) = dist.get(&from) else {
                continue;
            };
            let candidate = base + meta.weight;
            if dist.get(&to).map_or(true, |&known| candidate < known) {
                dist.insert(to, candidate);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    for (&(from, to), meta) in graph.edges.iter() {
        if let (Some(&base), Some(&known)) = (dist.get(&from), dist.get(&to)) {
            if base + meta.weight < known {
                trace!("negative cycle reachable from source");
                return None;
            }
        }
    }

    Some(
        graph
            .keys()
            .filter_map(|key| Some((graph.vertex(key)?.clone(), *dist.get(&key)?)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use crate::config::PathLimits;
    use crate::graph::paths::{
        a_star, a_star_path, bellman_ford, dijkstra, get_paths, get_paths_bounded, shortest_path,
    };
    use crate::graph::{EdgeOptions, Graph};
    use crate::identity::vertex_id;

    fn weighted(edges: &[(&'static str, &'static str, f64)]) -> Graph<&'static str> {
        edges.iter().fold(Graph::new(), |graph, &(a, b, w)| {
            graph
                .add_edge_with(a, b, EdgeOptions::new().weight(w))
                .expect("weighted edge")
        })
    }

    #[test]
    fn dijkstra_prefers_cheaper_longer_path() {
        let graph = weighted(&[("a", "b", 2.0), ("b", "c", 1.0), ("a", "c", 5.0)]);
        let found = shortest_path(&graph, &"a", &"c").expect("path");
        assert_eq!(found.path, vec!["a", "b", "c"]);
        assert_eq!(found.cost, 3.0);
    }

    #[test]
    fn dijkstra_distinguishes_unreachable_from_trivial() {
        let graph = Graph::new()
            .add_edge("a", "c")
            .add_edge("b", "c")
            .add_edge("b", "d");
        assert_eq!(dijkstra(&graph, &"a", &"d"), None);
        assert_eq!(dijkstra(&graph, &"a", &"a"), Some(vec!["a"]));
        assert_eq!(dijkstra(&graph, &"a", &"missing"), None);
    }

    #[test]
    fn dijkstra_on_diamond_with_shortcut() {
        let graph = Graph::new()
            .add_edge("a", "b")
            .add_edge("b", "c")
            .add_edge("c", "d")
            .add_edge("b", "d");
        assert_eq!(dijkstra(&graph, &"a", &"d"), Some(vec!["a", "b", "d"]));
    }

    #[test]
    fn a_star_with_zero_heuristic_matches_dijkstra_cost() {
        let graph = weighted(&[
            ("s", "a", 1.0),
            ("s", "b", 4.0),
            ("a", "b", 2.0),
            ("a", "t", 6.0),
            ("b", "t", 1.0),
        ]);
        let plain = shortest_path(&graph, &"s", &"t").expect("dijkstra");
        let guided = a_star_path(&graph, &"s", &"t", |_| 0.0).expect("a*");
        assert_eq!(plain.cost, 4.0);
        assert_eq!(guided.cost, plain.cost);
    }

    #[test]
    fn a_star_uses_admissible_heuristic() {
        let graph = weighted(&[
            ("s", "a", 1.0),
            ("a", "t", 1.0),
            ("s", "b", 1.0),
            ("b", "t", 3.0),
        ]);
        let estimate = |v: &&str| match *v {
            "s" => 2.0,
            "a" => 1.0,
            "b" => 2.0,
            _ => 0.0,
        };
        assert_eq!(a_star(&graph, &"s", &"t", estimate), Some(vec!["s", "a", "t"]));
    }

    #[test]
    fn a_star_reopens_vertices_under_inconsistent_heuristic() {
        let graph = weighted(&[
            ("s", "a", 1.0),
            ("s", "b", 1.0),
            ("a", "c", 1.0),
            ("b", "c", 3.0),
            ("c", "t", 5.0),
        ]);
        // admissible (a is 6 from t) but not consistent along s -> a
        let estimate = |v: &&str| if *v == "a" { 6.0 } else { 0.0 };
        let found = a_star_path(&graph, &"s", &"t", estimate).expect("a*");
        assert_eq!(found.path, vec!["s", "a", "c", "t"]);
        assert_eq!(found.cost, 7.0);
        assert_eq!(shortest_path(&graph, &"s", &"t").map(|p| p.cost), Some(7.0));
    }

    #[test]
    fn equal_cost_routes_follow_discovery_order() {
        let graph = Graph::new()
            .add_edge("s", "x")
            .add_edge("s", "y")
            .add_edge("x", "t")
            .add_edge("y", "t");
        let first = if vertex_id(&"x") < vertex_id(&"y") { "x" } else { "y" };
        let found = shortest_path(&graph, &"s", &"t").expect("path");
        assert_eq!(found.path, vec!["s", first, "t"]);
        assert_eq!(found.cost, 2.0);
    }

    #[test]
    fn negative_weights_without_cycles_are_relaxed() {
        let graph = weighted(&[("a", "b", 4.0), ("a", "c", 2.0), ("c", "b", -1.0)]);
        let found = shortest_path(&graph, &"a", &"b").expect("path");
        assert_eq!(found.path, vec!["a", "c", "b"]);
        assert_eq!(found.cost, 1.0);
    }

    #[test]
    fn search_stops_on_reachable_negative_cycle() {
        let graph = weighted(&[("a", "b", 1.0), ("b", "c", -3.0), ("c", "b", 1.0)])
            .add_vertex("island");
        assert_eq!(dijkstra(&graph, &"a", &"island"), None);
    }

    #[test]
    fn get_paths_handles_long_chains() {
        let graph = Graph::new()
            .add_edges((0..20_000u32).map(|i| (i, i + 1)))
            .expect("chain");
        let paths = get_paths(&graph, &0, &20_000);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 20_001);
        assert_eq!(paths[0].first(), Some(&0));
        assert_eq!(paths[0].last(), Some(&20_000));
    }

    #[test]
    fn get_paths_lists_every_simple_path() {
        let graph = Graph::new()
            .add_edge("a", "b")
            .add_edge("b", "c")
            .add_edge("c", "d")
            .add_edge("b", "d")
            .add_edge("d", "a");
        let mut paths = get_paths(&graph, &"a", &"d");
        paths.sort();
        assert_eq!(paths, vec![vec!["a", "b", "c", "d"], vec!["a", "b", "d"]]);
        assert!(get_paths(&graph, &"a", &"missing").is_empty());
        assert!(get_paths(&Graph::new().add_edge("x", "y"), &"y", &"x").is_empty());
    }

    #[test]
    fn get_paths_bounded_respects_limits() {
        let graph = Graph::new()
            .add_edge("a", "b")
            .add_edge("b", "c")
            .add_edge("c", "d")
            .add_edge("b", "d");
        let shallow = PathLimits {
            max_depth: Some(2),
            max_paths: None,
        };
        assert_eq!(
            get_paths_bounded(&graph, &"a", &"d", &shallow),
            vec![vec!["a", "b", "d"]]
        );
        let single = PathLimits {
            max_depth: None,
            max_paths: Some(1),
        };
        assert_eq!(get_paths_bounded(&graph, &"a", &"d", &single).len(), 1);
    }

    #[test]
    fn bellman_ford_handles_negative_edges_and_cycles() {
        let graph = weighted(&[("a", "b", 4.0), ("a", "c", 2.0), ("c", "b", -1.0)]);
        let mut dist = bellman_ford(&graph, &"a").expect("no negative cycle");
        dist.sort_by(|x, y| x.0.cmp(y.0));
        assert_eq!(dist, vec![("a", 0.0), ("b", 1.0), ("c", 2.0)]);

        let cyclic = weighted(&[("a", "b", 1.0), ("b", "c", -3.0), ("c", "b", 1.0)]);
        assert_eq!(bellman_ford(&cyclic, &"a"), None);
        assert_eq!(bellman_ford(&cyclic, &"missing"), Some(Vec::new()));
    }
}
