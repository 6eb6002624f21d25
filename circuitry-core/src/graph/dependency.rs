//! Graph Storage
//!
//! Vertex and edge bookkeeping for [`DependencyGraph`].

use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;
use smallvec::SmallVec;
use thiserror::Error;

/// Errors raised by the graph engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError<V: Debug> {
    /// An edge referenced a vertex that was never added.
    #[error("vertex {0:?} is not in the graph")]
    MissingVertex(V),

    /// The graph has no topological order. Carries the vertices of one
    /// cycle, each followed by the vertex it points to, closing back on the
    /// first.
    #[error("dependency cycle through {} vertices", .0.len())]
    Cycle(Vec<V>),
}

/// A directed, labeled edge between two vertex slots.
#[derive(Debug, Clone)]
pub(super) struct Edge<E> {
    pub(super) from: usize,
    pub(super) to: usize,
    label: E,
}

impl<E> Edge<E> {
    pub(super) fn label(&self) -> &E {
        &self.label
    }
}

/// Edge indices touching one vertex.
#[derive(Debug, Clone, Default)]
pub(super) struct Adjacency {
    pub(super) outgoing: SmallVec<[usize; 4]>,
    pub(super) incoming: SmallVec<[usize; 4]>,
}

/// A generic directed multigraph used to order evaluation.
///
/// # Example
///
/// ```rust
/// use circuitry_core::graph::DependencyGraph;
///
/// let mut graph = DependencyGraph::new();
/// graph.add_vertex("a");
/// graph.add_vertex("b");
/// graph.add_edge(&"a", &"b", ()).unwrap();
///
/// assert_eq!(graph.calc_order().unwrap(), vec!["a", "b"]);
/// ```
#[derive(Debug, Clone)]
pub struct DependencyGraph<V, E> {
    /// Vertices in insertion order, each with its adjacency lists.
    pub(super) vertices: IndexMap<V, Adjacency>,

    /// Every edge, in insertion order.
    pub(super) edges: Vec<Edge<E>>,
}

impl<V, E> DependencyGraph<V, E>
where
    V: Clone + Eq + Hash + Debug,
{
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            vertices: IndexMap::new(),
            edges: Vec::new(),
        }
    }

    /// Insert a vertex if absent.
    ///
    /// Returns `true` when the vertex is new, `false` when it was already
    /// present (in which case nothing changes).
    pub fn add_vertex(&mut self, vertex: V) -> bool {
        if self.vertices.contains_key(&vertex) {
            return false;
        }
        self.vertices.insert(vertex, Adjacency::default());
        true
    }

    /// Add a directed edge `from -> to`.
    ///
    /// Both endpoints must already be present. Parallel edges are retained.
    pub fn add_edge(&mut self, from: &V, to: &V, label: E) -> Result<(), GraphError<V>> {
        let from_index = self
            .vertices
            .get_index_of(from)
            .ok_or_else(|| GraphError::MissingVertex(from.clone()))?;
        let to_index = self
            .vertices
            .get_index_of(to)
            .ok_or_else(|| GraphError::MissingVertex(to.clone()))?;

        let edge_index = self.edges.len();
        self.edges.push(Edge {
            from: from_index,
            to: to_index,
            label,
        });
        self.vertices[from_index].outgoing.push(edge_index);
        self.vertices[to_index].incoming.push(edge_index);
        Ok(())
    }

    /// Check whether a vertex is present.
    pub fn contains(&self, vertex: &V) -> bool {
        self.vertices.contains_key(vertex)
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges, parallel edges counted separately.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &V> {
        self.vertices.keys()
    }

    /// Edges in insertion order as `(from, to, label)`.
    pub fn edges(&self) -> impl Iterator<Item = (&V, &V, &E)> {
        self.edges.iter().map(move |edge| {
            (
                self.vertex_at(edge.from),
                self.vertex_at(edge.to),
                edge.label(),
            )
        })
    }

    /// Labels of every edge from `from` to `to`.
    pub fn edges_between<'a>(&'a self, from: &V, to: &V) -> Vec<&'a E> {
        let (Some(from_index), Some(to_index)) = (
            self.vertices.get_index_of(from),
            self.vertices.get_index_of(to),
        ) else {
            return Vec::new();
        };

        self.vertices[from_index]
            .outgoing
            .iter()
            .map(|&edge| &self.edges[edge])
            .filter(|edge| edge.to == to_index)
            .map(Edge::label)
            .collect()
    }

    /// Direct successors of a vertex, one entry per edge.
    pub fn successors(&self, vertex: &V) -> Vec<&V> {
        self.vertices
            .get(vertex)
            .map(|adjacency| {
                adjacency
                    .outgoing
                    .iter()
                    .map(|&edge| self.vertex_at(self.edges[edge].to))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Direct predecessors of a vertex, one entry per edge.
    pub fn predecessors(&self, vertex: &V) -> Vec<&V> {
        self.vertices
            .get(vertex)
            .map(|adjacency| {
                adjacency
                    .incoming
                    .iter()
                    .map(|&edge| self.vertex_at(self.edges[edge].from))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(super) fn vertex_at(&self, index: usize) -> &V {
        // Edge endpoints are always valid slots; vertices are never removed.
        self.vertices
            .get_index(index)
            .map(|(vertex, _)| vertex)
            .unwrap_or_else(|| unreachable!("edge endpoint {index} out of range"))
    }
}

impl<V, E> Default for DependencyGraph<V, E>
where
    V: Clone + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_vertex_is_idempotent() {
        let mut graph: DependencyGraph<&str, ()> = DependencyGraph::new();

        assert!(graph.add_vertex("a"));
        assert!(!graph.add_vertex("a"));
        assert!(graph.add_vertex("b"));

        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.vertices().copied().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn add_edge_requires_both_endpoints() {
        let mut graph = DependencyGraph::new();
        graph.add_vertex("a");

        assert_eq!(
            graph.add_edge(&"a", &"missing", 0),
            Err(GraphError::MissingVertex("missing"))
        );
        assert_eq!(
            graph.add_edge(&"missing", &"a", 0),
            Err(GraphError::MissingVertex("missing"))
        );
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn parallel_edges_are_retained() {
        let mut graph = DependencyGraph::new();
        graph.add_vertex("a");
        graph.add_vertex("b");

        graph.add_edge(&"a", &"b", 1).unwrap();
        graph.add_edge(&"a", &"b", 2).unwrap();

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edges_between(&"a", &"b"), vec![&1, &2]);
        assert!(graph.edges_between(&"b", &"a").is_empty());
        assert_eq!(graph.successors(&"a"), vec![&"b", &"b"]);
        assert_eq!(graph.predecessors(&"b"), vec![&"a", &"a"]);
    }

    #[test]
    fn edges_iterate_in_insertion_order() {
        let mut graph = DependencyGraph::new();
        for vertex in ["x", "y", "z"] {
            graph.add_vertex(vertex);
        }
        graph.add_edge(&"y", &"z", 'b').unwrap();
        graph.add_edge(&"x", &"y", 'a').unwrap();

        let edges: Vec<_> = graph.edges().map(|(f, t, l)| (*f, *t, *l)).collect();
        assert_eq!(edges, vec![("y", "z", 'b'), ("x", "y", 'a')]);
    }
}
