//! Flattening
//!
//! Turns a component tree into one dependency graph over pins and builtin
//! leaves.
//!
//! # Algorithm
//!
//! Depth-first, children before parent:
//!
//! 1. Flatten every child
//! 2. Custom component: add its boundary pins as vertices and one edge per
//!    internal wire. The component itself never becomes a vertex.
//! 3. Builtin component: add it and its pins as vertices, with a dummy edge
//!    from each combinational input to the component and from the component
//!    to each output. Registered inputs get a sample edge from the component
//!    to the pin instead, so the component reads last tick's value.
//!
//! Alongside the graph we keep a handle to every pin's value cell, the driver
//! of every wired pin, and the evaluation closure of every leaf, so that the
//! execution plan never needs to walk the tree again.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::trace;

use crate::circuit::{
    Body, Component, ComponentId, Evaluator, Link, PinHandle, PinId, Timing, Vertex,
};
use crate::error::{Result, SimError};
use crate::graph::{DependencyGraph, GraphError};

/// A builtin leaf as the execution plan sees it.
pub(crate) struct Leaf {
    pub(crate) path: String,
    pub(crate) need_run: bool,
    pub(crate) evaluator: Arc<Evaluator>,
    pub(crate) inputs: Vec<(String, PinHandle)>,
    pub(crate) outputs: Vec<(String, PinHandle)>,
}

/// The flattened form of one component tree.
pub struct Netlist {
    pub(crate) graph: DependencyGraph<Vertex, Link>,
    pub(crate) pins: HashMap<PinId, PinHandle>,
    pub(crate) drivers: HashMap<PinId, PinId>,
    pub(crate) leaves: HashMap<ComponentId, Leaf>,
}

/// Flatten a component tree rooted at `root`.
pub fn flatten(root: &Component) -> Result<Netlist> {
    let mut netlist = Netlist {
        graph: DependencyGraph::new(),
        pins: HashMap::new(),
        drivers: HashMap::new(),
        leaves: HashMap::new(),
    };
    netlist.add(root, root.name().to_string())?;
    Ok(netlist)
}

impl Netlist {
    /// The dependency graph over pins and leaves.
    pub fn graph(&self) -> &DependencyGraph<Vertex, Link> {
        &self.graph
    }

    /// Hierarchical path of a vertex, e.g. `top.half.xor` or `top.half.xor.a`.
    pub fn label(&self, vertex: &Vertex) -> Option<&str> {
        match vertex {
            Vertex::Pin(id) => self.pins.get(id).map(PinHandle::path),
            Vertex::Component(id) => self.leaves.get(id).map(|leaf| leaf.path.as_str()),
        }
    }

    /// The pin driving `pin` through a wire, if any.
    pub fn driver(&self, pin: PinId) -> Option<PinId> {
        self.drivers.get(&pin).copied()
    }

    /// Number of builtin leaves.
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Number of pin vertices.
    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    /// Paths of builtin input pins that nothing drives, excluding `exempt`.
    pub fn undriven_inputs(&self, exempt: &HashSet<PinId>) -> Vec<&str> {
        let mut undriven: Vec<&str> = self
            .leaves
            .values()
            .flat_map(|leaf| leaf.inputs.iter().map(|(_, pin)| pin))
            .filter(|pin| !exempt.contains(&pin.id()) && !self.drivers.contains_key(&pin.id()))
            .map(PinHandle::path)
            .collect();
        undriven.sort_unstable();
        undriven
    }

    /// Translate a graph error into a system error with readable labels.
    pub(crate) fn describe(&self, error: GraphError<Vertex>) -> SimError {
        let label = |vertex: &Vertex| {
            self.label(vertex)
                .map(str::to_string)
                .unwrap_or_else(|| vertex.to_string())
        };
        match error {
            GraphError::Cycle(vertices) => SimError::CyclicDependency {
                participants: vertices.iter().map(label).collect(),
            },
            GraphError::MissingVertex(vertex) => SimError::DanglingEdge(label(&vertex)),
        }
    }

    fn add(&mut self, component: &Component, path: String) -> Result<()> {
        for child in component.children() {
            self.add(child, format!("{}.{}", path, child.name()))?;
        }

        match component.body() {
            Body::Custom { wires, .. } => {
                for pin in component.inputs().chain(component.outputs()) {
                    self.add_pin(pin.id(), pin.handle(format!("{}.{}", path, pin.name())));
                }
                for wire in wires {
                    self.edge(Vertex::Pin(wire.from), Vertex::Pin(wire.to), Link::Wire(*wire))?;
                    self.drivers.insert(wire.to, wire.from);
                }
                trace!(component = %path, wires = wires.len(), "flattened custom component");
            }
            Body::Builtin { evaluator } => {
                let vertex = Vertex::Component(component.id());
                self.graph.add_vertex(vertex);

                let mut inputs = Vec::new();
                for pin in component.inputs() {
                    let handle = pin.handle(format!("{}.{}", path, pin.name()));
                    self.add_pin(pin.id(), handle.clone());
                    let pin_vertex = Vertex::Pin(pin.id());
                    match pin.timing() {
                        Timing::Combinational => self.edge(pin_vertex, vertex, Link::Dummy)?,
                        Timing::Registered => self.edge(vertex, pin_vertex, Link::Sample)?,
                    }
                    inputs.push((pin.name().to_string(), handle));
                }

                let mut outputs = Vec::new();
                for pin in component.outputs() {
                    let handle = pin.handle(format!("{}.{}", path, pin.name()));
                    self.add_pin(pin.id(), handle.clone());
                    self.edge(vertex, Vertex::Pin(pin.id()), Link::Dummy)?;
                    outputs.push((pin.name().to_string(), handle));
                }

                self.leaves.insert(
                    component.id(),
                    Leaf {
                        path,
                        need_run: component.need_run(),
                        evaluator: Arc::clone(evaluator),
                        inputs,
                        outputs,
                    },
                );
            }
        }
        Ok(())
    }

    fn add_pin(&mut self, id: PinId, handle: PinHandle) {
        if self.graph.add_vertex(Vertex::Pin(id)) {
            self.pins.insert(id, handle);
        }
    }

    fn edge(&mut self, from: Vertex, to: Vertex, link: Link) -> Result<()> {
        self.graph.add_edge(&from, &to, link).map_err(|error| self.describe(error))
    }
}
