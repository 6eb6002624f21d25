//! Dependency Graph
//!
//! This module implements the generic directed graph that the simulator
//! flattens a circuit into before computing an evaluation order.
//!
//! # Overview
//!
//! The graph is agnostic to what its vertices and edge labels are:
//!
//! - Vertices are any `Clone + Eq + Hash` identity. The simulator uses a
//!   two-variant tag over pin and component ids.
//! - Edges are directed and labeled. If A must be evaluated before B there is
//!   an edge from A to B. Parallel edges between the same pair are kept.
//!
//! # Design Decisions
//!
//! 1. Vertices live in an insertion-ordered map, so the order computed for
//!    unconstrained vertices is reproducible across runs.
//!
//! 2. Vertex insertion is idempotent. Inserting the same identity twice is a
//!    no-op, which makes a "duplicate vertex" state unrepresentable.
//!
//! 3. We maintain both outgoing and incoming edge lists per vertex so that
//!    ordering can walk forward and cycle reporting can walk backward.

mod dependency;
mod order;

pub use dependency::{DependencyGraph, GraphError};
