//! Execution Plans
//!
//! A plan is the flattened graph's topological order, filtered down to the
//! vertices that do work on a tick:
//!
//! - a pin with a driving wire copies its driver's value (a relay step)
//! - a builtin with `need_run` calls its evaluation closure
//!
//! Undriven pins and idle builtins are ordering markers only and are dropped.
//! The plan holds handles to pin value cells, so executing it never touches
//! the component tree.

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use super::flatten::{Leaf, Netlist};
use crate::circuit::{PinHandle, Signals, Vertex};
use crate::error::{Result, SimError};

/// What a plan step does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// Copy a driving pin's value into a wired pin.
    Relay,

    /// Invoke a builtin's evaluation closure.
    Evaluate,
}

/// One step of a plan, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanStep {
    pub kind: StepKind,

    /// Hierarchical path of the pin or component.
    pub name: String,
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            StepKind::Relay => write!(f, "relay {}", self.name),
            StepKind::Evaluate => write!(f, "evaluate {}", self.name),
        }
    }
}

/// Structured description of a constructed plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    /// Vertices in the flattened graph.
    pub vertex_count: usize,

    /// Edges in the flattened graph.
    pub edge_count: usize,

    /// Builtin leaves in the flattened graph, runnable or not.
    pub leaf_count: usize,

    /// The runnable steps, in execution order.
    pub steps: Vec<PlanStep>,
}

impl PlanSummary {
    /// Position of the step with the given path, if it is runnable.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.name == name)
    }
}

enum Step {
    Relay {
        target: PinHandle,
        driver: PinHandle,
    },
    Evaluate {
        leaf: Leaf,
        inputs: Signals,
        outputs: Signals,
    },
}

/// A fixed, runnable order over one flattened circuit.
pub struct ExecutionPlan {
    steps: Vec<Step>,
    summary: PlanSummary,
}

impl ExecutionPlan {
    /// Order a netlist and keep only the runnable vertices.
    pub fn compile(mut netlist: Netlist) -> Result<Self> {
        let order = netlist
            .graph
            .calc_order()
            .map_err(|error| netlist.describe(error))?;

        let mut steps = Vec::new();
        let mut names = Vec::new();

        for vertex in &order {
            match vertex {
                Vertex::Pin(id) => {
                    let Some(driver) = netlist.drivers.get(id) else {
                        continue;
                    };
                    let (Some(target), Some(driver)) =
                        (netlist.pins.get(id), netlist.pins.get(driver))
                    else {
                        return Err(SimError::DanglingEdge(vertex.to_string()));
                    };
                    names.push(PlanStep {
                        kind: StepKind::Relay,
                        name: target.path().to_string(),
                    });
                    steps.push(Step::Relay {
                        target: target.clone(),
                        driver: driver.clone(),
                    });
                }
                Vertex::Component(id) => {
                    let Some(leaf) = netlist.leaves.remove(id) else {
                        return Err(SimError::DanglingEdge(vertex.to_string()));
                    };
                    if !leaf.need_run {
                        continue;
                    }
                    names.push(PlanStep {
                        kind: StepKind::Evaluate,
                        name: leaf.path.clone(),
                    });
                    steps.push(Step::Evaluate {
                        inputs: signals(&leaf.inputs),
                        outputs: signals(&leaf.outputs),
                        leaf,
                    });
                }
            }
        }

        let summary = PlanSummary {
            vertex_count: netlist.graph.vertex_count(),
            edge_count: netlist.graph.edge_count(),
            leaf_count: order.iter().filter(|vertex| vertex.is_component()).count(),
            steps: names,
        };

        debug!(
            vertices = summary.vertex_count,
            edges = summary.edge_count,
            steps = summary.steps.len(),
            "execution plan compiled"
        );
        for step in &summary.steps {
            trace!(%step, "plan step");
        }

        Ok(Self { steps, summary })
    }

    /// Run every step once, in order.
    ///
    /// Stops at the first failing evaluation. Steps before it have taken
    /// effect; the plan itself is unchanged and can run again.
    pub fn execute(&mut self) -> Result<()> {
        for step in &mut self.steps {
            match step {
                Step::Relay { target, driver } => target.write(driver.read()),
                Step::Evaluate {
                    leaf,
                    inputs,
                    outputs,
                } => evaluate(leaf, inputs, outputs)?,
            }
        }
        Ok(())
    }

    pub fn summary(&self) -> &PlanSummary {
        &self.summary
    }

    /// Number of runnable steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Scratch signals for one side of a leaf, in declaration order.
fn signals(pins: &[(String, PinHandle)]) -> Signals {
    pins.iter().map(|(name, pin)| (name.clone(), pin.read())).collect()
}

fn evaluate(leaf: &Leaf, inputs: &mut Signals, outputs: &mut Signals) -> Result<()> {
    for (index, (_, pin)) in leaf.inputs.iter().enumerate() {
        inputs.store(index, pin.read());
    }
    for (index, (_, pin)) in leaf.outputs.iter().enumerate() {
        outputs.store(index, pin.read());
    }

    (leaf.evaluator)(inputs, outputs).map_err(|source| SimError::Evaluation {
        instance: leaf.path.clone(),
        source,
    })?;

    for ((_, pin), (_, value)) in leaf.outputs.iter().zip(outputs.iter()) {
        pin.write(value);
    }
    trace!(instance = %leaf.path, "evaluated");
    Ok(())
}
