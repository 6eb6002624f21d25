//! Simulation System
//!
//! Flattening, plan compilation and tick execution.
//!
//! # Overview
//!
//! - `flatten` turns the main component's tree into a [`Netlist`]: one
//!   dependency graph over every pin and builtin leaf, plus the handles the
//!   plan needs to read and write pin values.
//! - `plan` orders the netlist and keeps the runnable steps as an
//!   [`ExecutionPlan`].
//! - `simulator` holds the [`System`] that ties registration, construction,
//!   graph building and ticking together.

mod flatten;
mod plan;
mod simulator;

pub use flatten::{flatten, Netlist};
pub use plan::{ExecutionPlan, PlanStep, PlanSummary, StepKind};
pub use simulator::{System, TickResult};
