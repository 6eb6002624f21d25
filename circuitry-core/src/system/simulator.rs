//! Simulation System
//!
//! The system is the entry point hosts drive. It moves through four stages:
//!
//! 1. Registration: builtin generators and custom templates are added
//! 2. Construction: components are instantiated from the registry
//! 3. Graph build: the main component is flattened and ordered into a plan
//! 4. Ticking: the plan runs once per tick, as often as the host wants
//!
//! The graph build can be repeated at any time; a new plan only replaces the
//! old one once it has been built successfully.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use super::flatten::flatten;
use super::plan::{ExecutionPlan, PlanSummary};
use crate::circuit::{
    Component, ComponentGenerator, ComponentTemplate, Direction, Library, Pin, Value,
};
use crate::config::SystemConfig;
use crate::error::{Result, SimError};

/// The externally observable result of one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickResult {
    /// 1-based tick number since the main component was set.
    pub tick: u64,

    /// Main component boundary inputs, by name, in declaration order.
    pub inputs: IndexMap<String, Value>,

    /// Main component boundary outputs, by name, in declaration order.
    pub outputs: IndexMap<String, Value>,
}

/// Orchestrates registration, construction, graph building and ticking.
///
/// # Example
///
/// ```rust
/// use circuitry_core::circuit::Component;
/// use circuitry_core::System;
///
/// let mut system = System::new();
/// system.register_library_component("AND", |name: &str| {
///     Component::builtin(name)
///         .input("x")
///         .input("y")
///         .output("z")
///         .evaluate(|i, o| o.set("z", i.get("x")? && i.get("y")?))
///         .build()
/// });
///
/// let and = system.instantiate("AND", "and").unwrap();
/// system.set_main_component(and);
/// system.construct_graph().unwrap();
///
/// system.set_input("x", true).unwrap();
/// system.set_input("y", true).unwrap();
/// let tick = system.run_clock().unwrap();
/// assert_eq!(tick.outputs["z"], true);
/// ```
pub struct System {
    config: SystemConfig,
    library: Library,
    main: Option<Component>,
    plan: Option<ExecutionPlan>,
    ticks: u64,
}

impl System {
    pub fn new() -> Self {
        Self::with_config(SystemConfig::default())
    }

    pub fn with_config(config: SystemConfig) -> Self {
        Self {
            library: Library::new(config.max_nesting_depth),
            config,
            main: None,
            plan: None,
            ticks: 0,
        }
    }

    /// Register a builtin component type. Must happen before any template
    /// referring to `type_name` is instantiated.
    pub fn register_library_component<G>(&mut self, type_name: impl Into<String>, generator: G)
    where
        G: ComponentGenerator + 'static,
    {
        let type_name = type_name.into();
        debug!(%type_name, "registered builtin component");
        self.library.register_generator(type_name, generator);
    }

    /// Register a custom component type that other templates can nest.
    pub fn register_template(&mut self, type_name: impl Into<String>, template: ComponentTemplate) {
        let type_name = type_name.into();
        debug!(%type_name, children = template.children.len(), "registered template");
        self.library.register_template(type_name, template);
    }

    /// Build a custom component from a template, instantiating its children
    /// from the registry.
    pub fn create_custom_component(
        &self,
        name: &str,
        template: &ComponentTemplate,
    ) -> Result<Component> {
        self.library.build_custom(name, template)
    }

    /// Instantiate any registered type.
    pub fn instantiate(&self, type_name: &str, name: &str) -> Result<Component> {
        self.library.instantiate(type_name, name)
    }

    /// Set the simulation root, returning the previous one.
    ///
    /// Discards the current plan and resets the tick counter; call
    /// [`System::construct_graph`] before ticking again.
    pub fn set_main_component(&mut self, component: Component) -> Option<Component> {
        self.plan = None;
        self.ticks = 0;
        self.main.replace(component)
    }

    pub fn main_component(&self) -> Option<&Component> {
        self.main.as_ref()
    }

    /// Flatten the main component and compile a new execution plan.
    ///
    /// On failure the previous plan, if any, stays in place.
    pub fn construct_graph(&mut self) -> Result<PlanSummary> {
        let main = self.main.as_ref().ok_or(SimError::NoMainComponent)?;
        let netlist = flatten(main)?;

        if self.config.warn_undriven_inputs {
            let boundary: HashSet<_> = main.inputs().map(Pin::id).collect();
            for pin in netlist.undriven_inputs(&boundary) {
                warn!(pin, "builtin input has no driver");
            }
        }

        let plan = ExecutionPlan::compile(netlist)?;
        let summary = plan.summary().clone();
        debug!(main = main.name(), steps = summary.steps.len(), "graph constructed");

        self.plan = Some(plan);
        Ok(summary)
    }

    /// Summary of the current plan, if one has been built.
    pub fn plan_summary(&self) -> Option<&PlanSummary> {
        self.plan.as_ref().map(ExecutionPlan::summary)
    }

    /// Drive one of the main component's boundary inputs.
    pub fn set_input(&self, name: &str, value: Value) -> Result<()> {
        self.boundary_pin(name, Direction::Input)?.write(value);
        Ok(())
    }

    /// Current value of one of the main component's boundary inputs.
    pub fn input(&self, name: &str) -> Result<Value> {
        Ok(self.boundary_pin(name, Direction::Input)?.read())
    }

    /// Current value of one of the main component's boundary outputs.
    pub fn output(&self, name: &str) -> Result<Value> {
        Ok(self.boundary_pin(name, Direction::Output)?.read())
    }

    /// Number of ticks run since the main component was set.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Advance the circuit by one tick.
    ///
    /// Runs every plan step in order and returns the main component's
    /// boundary values. A failing evaluation aborts the tick with the
    /// failing instance named; values downstream of it are unspecified for
    /// that tick, but the plan stays valid.
    pub fn run_clock(&mut self) -> Result<TickResult> {
        let plan = self.plan.as_mut().ok_or(SimError::GraphNotBuilt)?;
        let main = self.main.as_ref().ok_or(SimError::NoMainComponent)?;

        plan.execute()?;
        self.ticks += 1;

        let result = TickResult {
            tick: self.ticks,
            inputs: main.inputs().map(|pin| (pin.name().to_string(), pin.read())).collect(),
            outputs: main.outputs().map(|pin| (pin.name().to_string(), pin.read())).collect(),
        };
        debug!(tick = result.tick, inputs = ?result.inputs, outputs = ?result.outputs, "tick");
        Ok(result)
    }

    fn boundary_pin(&self, name: &str, direction: Direction) -> Result<&Pin> {
        let main = self.main.as_ref().ok_or(SimError::NoMainComponent)?;
        let pin = match direction {
            Direction::Input => main.input(name),
            Direction::Output => main.output(name),
        };
        pin.ok_or_else(|| SimError::NoSuchBoundaryPin {
            pin: name.to_string(),
            direction,
        })
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn and_gate(name: &str) -> Result<Component> {
        Component::builtin(name)
            .input("x")
            .input("y")
            .output("z")
            .evaluate(|i, o| o.set("z", i.get("x")? && i.get("y")?))
            .build()
    }

    #[test]
    fn run_before_build_fails() {
        let mut system = System::new();
        assert!(matches!(system.run_clock(), Err(SimError::GraphNotBuilt)));
        assert!(matches!(system.construct_graph(), Err(SimError::NoMainComponent)));
    }

    #[test]
    fn set_main_discards_plan() {
        let mut system = System::new();
        system.register_library_component("AND", and_gate);
        system.set_main_component(system.instantiate("AND", "a1").unwrap());
        system.construct_graph().unwrap();
        assert!(system.plan_summary().is_some());

        let previous = system.set_main_component(system.instantiate("AND", "a2").unwrap());
        assert_eq!(previous.unwrap().name(), "a1");
        assert!(system.plan_summary().is_none());
        assert!(matches!(system.run_clock(), Err(SimError::GraphNotBuilt)));
    }

    #[test]
    fn boundary_access_checks_names() {
        let mut system = System::new();
        system.register_library_component("AND", and_gate);
        system.set_main_component(system.instantiate("AND", "and").unwrap());

        assert!(matches!(
            system.set_input("z", true),
            Err(SimError::NoSuchBoundaryPin { direction: Direction::Input, .. })
        ));
        assert!(system.output("z").is_ok());
    }

    #[test]
    fn nesting_limit_applies_equally_to_both_entry_points() {
        let mut system = System::with_config(SystemConfig {
            max_nesting_depth: 0,
            ..SystemConfig::default()
        });
        system.register_library_component("AND", and_gate);
        let flat = ComponentTemplate::new()
            .input("x")
            .input("y")
            .output("z")
            .child("g", "AND")
            .wire("x", "g.x")
            .wire("y", "g.y")
            .wire("g.z", "z");
        system.register_template("FLAT", flat.clone());

        let built = system.create_custom_component("top", &flat).unwrap();
        let instantiated = system.instantiate("FLAT", "top").unwrap();
        assert_eq!(built.leaf_count(), instantiated.leaf_count());

        let wrapped = ComponentTemplate::new().child("inner", "FLAT");
        system.register_template("WRAPPED", wrapped.clone());
        assert!(matches!(
            system.create_custom_component("top", &wrapped),
            Err(SimError::NestingTooDeep { max: 0 })
        ));
        assert!(matches!(
            system.instantiate("WRAPPED", "top"),
            Err(SimError::NestingTooDeep { max: 0 })
        ));

        system.set_main_component(instantiated);
        system.construct_graph().unwrap();
        system.set_input("x", true).unwrap();
        system.set_input("y", true).unwrap();
        assert!(system.run_clock().unwrap().outputs["z"]);
    }

    #[test]
    fn tick_counter_advances() {
        let mut system = System::new();
        system.register_library_component("AND", and_gate);
        system.set_main_component(system.instantiate("AND", "and").unwrap());
        system.construct_graph().unwrap();

        assert_eq!(system.run_clock().unwrap().tick, 1);
        assert_eq!(system.run_clock().unwrap().tick, 2);
        assert_eq!(system.tick_count(), 2);
    }
}
