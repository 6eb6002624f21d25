//! Evaluation Order
//!
//! Topological ordering of a [`DependencyGraph`].
//!
//! # Algorithm
//!
//! We use Kahn's algorithm:
//!
//! 1. Count the incoming edges of every vertex (parallel edges count twice)
//! 2. Seed a FIFO queue with every vertex of in-degree zero, in insertion order
//! 3. Pop a vertex, emit it, and decrement the in-degree of each successor,
//!    queueing successors that reach zero in edge insertion order
//! 4. If fewer vertices were emitted than exist, the rest sit on or behind a
//!    cycle; walk incoming edges backward among them to recover one cycle
//!
//! Every choice in the walk follows insertion order, so the result for an
//! unmodified graph is identical on every call.

use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

use super::dependency::{DependencyGraph, GraphError};

impl<V, E> DependencyGraph<V, E>
where
    V: Clone + Eq + Hash + Debug,
{
    /// Compute an order in which every edge `u -> v` has `u` before `v`.
    ///
    /// Returns every vertex exactly once, or [`GraphError::Cycle`] when no
    /// such order exists. Never returns a partial order.
    pub fn calc_order(&self) -> Result<Vec<V>, GraphError<V>> {
        let mut in_degree: Vec<usize> = self
            .vertices
            .values()
            .map(|adjacency| adjacency.incoming.len())
            .collect();

        let mut queue: VecDeque<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(index, _)| index)
            .collect();

        let mut result = Vec::with_capacity(self.vertices.len());

        while let Some(index) = queue.pop_front() {
            result.push(self.vertex_at(index).clone());

            for &edge in &self.vertices[index].outgoing {
                let target = self.edges[edge].to;
                in_degree[target] -= 1;
                if in_degree[target] == 0 {
                    queue.push_back(target);
                }
            }
        }

        if result.len() == self.vertices.len() {
            return Ok(result);
        }

        Err(GraphError::Cycle(self.find_cycle(&in_degree)))
    }

    /// Recover one cycle among the vertices Kahn's algorithm left behind.
    ///
    /// Every leftover vertex has at least one leftover predecessor, so
    /// walking predecessors must eventually revisit a vertex.
    fn find_cycle(&self, in_degree: &[usize]) -> Vec<V> {
        let Some(start) = in_degree.iter().position(|&degree| degree > 0) else {
            return Vec::new();
        };

        let mut seen: HashMap<usize, usize> = HashMap::new();
        let mut walk = Vec::new();
        let mut current = start;

        loop {
            if let Some(&position) = seen.get(&current) {
                // The walk went backward along edges; reverse it so each
                // vertex is followed by its successor.
                let mut cycle: Vec<V> = walk[position..]
                    .iter()
                    .map(|&index| self.vertex_at(index).clone())
                    .collect();
                cycle.reverse();
                return cycle;
            }
            seen.insert(current, walk.len());
            walk.push(current);

            let predecessor = self.vertices[current]
                .incoming
                .iter()
                .map(|&edge| self.edges[edge].from)
                .find(|&from| in_degree[from] > 0);

            match predecessor {
                Some(from) => current = from,
                None => return Vec::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_from(
        vertices: &[&'static str],
        edges: &[(&'static str, &'static str)],
    ) -> DependencyGraph<&'static str, ()> {
        let mut graph = DependencyGraph::new();
        for vertex in vertices {
            graph.add_vertex(*vertex);
        }
        for (from, to) in edges {
            graph.add_edge(from, to, ()).unwrap();
        }
        graph
    }

    fn position(order: &[&str], vertex: &str) -> usize {
        order.iter().position(|v| *v == vertex).unwrap()
    }

    #[test]
    fn order_respects_every_edge() {
        let edges = [("a", "c"), ("b", "c"), ("c", "d"), ("a", "d"), ("e", "b")];
        let graph = graph_from(&["d", "c", "b", "a", "e"], &edges);

        let order = graph.calc_order().unwrap();

        assert_eq!(order.len(), 5);
        for (from, to) in edges {
            assert!(position(&order, from) < position(&order, to), "{from} before {to}");
        }
    }

    #[test]
    fn unconstrained_vertices_keep_insertion_order() {
        let graph = graph_from(&["z", "y", "x"], &[]);
        assert_eq!(graph.calc_order().unwrap(), vec!["z", "y", "x"]);
    }

    #[test]
    fn order_is_stable_across_calls() {
        let graph = graph_from(
            &["a", "b", "c", "d", "e", "f"],
            &[("a", "d"), ("b", "d"), ("c", "e"), ("d", "f"), ("e", "f")],
        );

        let first = graph.calc_order().unwrap();
        for _ in 0..10 {
            assert_eq!(graph.calc_order().unwrap(), first);
        }
    }

    #[test]
    fn parallel_edges_do_not_release_early() {
        let graph = graph_from(&["a", "b", "c"], &[("a", "c"), ("a", "c"), ("b", "c")]);
        let order = graph.calc_order().unwrap();
        assert_eq!(order.last(), Some(&"c"));
    }

    #[test]
    fn cycle_is_reported_not_truncated() {
        let graph = graph_from(
            &["src", "a", "b", "c", "sink"],
            &[("src", "a"), ("a", "b"), ("b", "c"), ("c", "a"), ("c", "sink")],
        );

        match graph.calc_order() {
            Err(GraphError::Cycle(cycle)) => {
                assert_eq!(cycle.len(), 3);
                assert!(cycle.contains(&"a"));
                assert!(cycle.contains(&"b"));
                assert!(cycle.contains(&"c"));
                assert!(!cycle.contains(&"sink"));
                // Each vertex points at the next one.
                for pair in cycle.windows(2) {
                    assert!(graph.successors(&pair[0]).contains(&&pair[1]));
                }
            }
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let graph = graph_from(&["a"], &[("a", "a")]);
        assert_eq!(graph.calc_order(), Err(GraphError::Cycle(vec!["a"])));
    }

    #[test]
    fn empty_graph_has_empty_order() {
        let graph: DependencyGraph<u32, ()> = DependencyGraph::new();
        assert!(graph.calc_order().unwrap().is_empty());
    }
}
