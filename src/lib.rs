#![forbid(unsafe_code)]
//! In-memory directed graphs with snapshot semantics.
//!
//! Every mutation on [`Graph`] returns a new graph and leaves the receiver
//! untouched. Traversal, connectivity and shortest-path algorithms live in
//! [`graph::ops`], [`graph::components`] and [`graph::paths`].

pub mod config;
pub mod error;
pub mod graph;
pub mod identity;

pub use error::{Error, Result};
pub use graph::components::{components, core_numbers, degeneracy, k_core, strong_components};
pub use graph::info::GraphInfo;
pub use graph::ops::{
    arborescence_root, find_cycles, is_acyclic, is_arborescence, is_cyclic, is_tree,
    loop_vertices, postorder, preorder, reachable, reachable_neighbors, reaching,
    reaching_neighbors, topsort,
};
pub use graph::paths::{
    a_star, a_star_path, bellman_ford, dijkstra, get_paths, get_paths_bounded, shortest_path,
    ShortestPath,
};
pub use graph::viz::to_dot;
pub use graph::{Edge, EdgeMeta, EdgeOptions, EdgeSpec, Graph, GraphError, Label};
pub use identity::{vertex_id, VertexKey};
