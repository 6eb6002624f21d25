//! Components
//!
//! A component is either a *builtin* leaf with an opaque evaluation closure,
//! or a *custom* composite that exclusively owns named child instances and
//! the wires between them.
//!
//! # Ownership
//!
//! The hierarchy is a tree: a custom component owns its children by value.
//! Two instances built from the same template share nothing, so every pin
//! in the tree has its own identity and its own value cell.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::id::{ComponentId, PinId};
use super::pin::{Direction, Pin, Timing, Value};
use super::template::ComponentTemplate;
use super::wire::{PinPath, Wire};
use crate::error::{EvalError, Result, SimError};

/// A builtin's evaluation closure: reads `inputs`, writes `outputs`.
///
/// `outputs` is pre-filled with the current output values, so outputs the
/// closure leaves alone keep their value.
pub type Evaluator =
    dyn Fn(&Signals, &mut Signals) -> std::result::Result<(), EvalError> + Send + Sync;

/// Named pin values handed to and returned from an evaluation closure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signals {
    values: IndexMap<String, Value>,
}

impl Signals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the named input.
    pub fn get(&self, name: &str) -> std::result::Result<Value, EvalError> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::MissingInput(name.to_string()))
    }

    /// Set the named output. Only declared outputs can be written.
    pub fn set(&mut self, name: &str, value: Value) -> std::result::Result<(), EvalError> {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(EvalError::UnknownOutput(name.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Overwrite the value at a declaration index.
    pub(crate) fn store(&mut self, index: usize, value: Value) {
        if let Some((_, slot)) = self.values.get_index_mut(index) {
            *slot = value;
        }
    }
}

impl FromIterator<(String, Value)> for Signals {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// What a component is made of.
pub(crate) enum Body {
    Builtin {
        evaluator: Arc<Evaluator>,
    },
    Custom {
        children: IndexMap<String, Component>,
        wires: Vec<Wire>,
    },
}

/// One component instance.
pub struct Component {
    id: ComponentId,
    name: String,
    type_name: String,
    inputs: IndexMap<String, Pin>,
    outputs: IndexMap<String, Pin>,
    need_run: bool,
    body: Body,
}

impl Component {
    /// Start building a builtin component instance.
    ///
    /// ```rust
    /// use circuitry_core::circuit::Component;
    ///
    /// let and = Component::builtin("and")
    ///     .input("x")
    ///     .input("y")
    ///     .output("z")
    ///     .evaluate(|inputs, outputs| outputs.set("z", inputs.get("x")? && inputs.get("y")?))
    ///     .build()
    ///     .unwrap();
    ///
    /// assert!(!and.is_custom());
    /// ```
    pub fn builtin(name: impl Into<String>) -> BuiltinBuilder {
        BuiltinBuilder::new(name.into())
    }

    /// Build a custom component from a template and already instantiated
    /// children, one per template child in the same order.
    ///
    /// Resolves every template wire against the new boundary pins and the
    /// children's pins, enforcing wire direction and single drivers.
    pub(crate) fn custom(
        name: impl Into<String>,
        type_name: impl Into<String>,
        template: &ComponentTemplate,
        children: IndexMap<String, Component>,
    ) -> Result<Self> {
        let name = name.into();
        let id = ComponentId::new();

        let inputs = declare_pins(
            &name,
            id,
            Direction::Input,
            template.inputs.iter().map(|n| (n.as_str(), Timing::Combinational)),
        )?;
        let outputs = declare_pins(
            &name,
            id,
            Direction::Output,
            template.outputs.iter().map(|n| (n.as_str(), Timing::Combinational)),
        )?;

        let scope = Scope {
            name: &name,
            inputs: &inputs,
            outputs: &outputs,
            children: &children,
        };

        let mut wires = Vec::with_capacity(template.wires.len());
        let mut driven: HashSet<PinId> = HashSet::new();

        for declared in &template.wires {
            let from: PinPath = declared.from.parse()?;
            let to: PinPath = declared.to.parse()?;

            let wire = Wire::new(scope.source(&from, &to)?, scope.sink(&from, &to)?);
            if !driven.insert(wire.to) {
                return Err(SimError::MultipleDrivers {
                    component: name.clone(),
                    pin: to.to_string(),
                });
            }
            wires.push(wire);
        }

        Ok(Self {
            id,
            name,
            type_name: type_name.into(),
            inputs,
            outputs,
            need_run: false,
            body: Body::Custom { children, wires },
        })
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Instance name, unique among siblings.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered type this instance was built from.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn set_type_name(&mut self, type_name: impl Into<String>) {
        self.type_name = type_name.into();
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.body, Body::Custom { .. })
    }

    /// Whether the execution plan needs to evaluate this component on each
    /// tick. Always `false` for custom components, which have no behavior.
    pub fn need_run(&self) -> bool {
        self.need_run
    }

    pub fn input(&self, name: &str) -> Option<&Pin> {
        self.inputs.get(name)
    }

    pub fn output(&self, name: &str) -> Option<&Pin> {
        self.outputs.get(name)
    }

    /// Boundary input pins in declaration order.
    pub fn inputs(&self) -> impl Iterator<Item = &Pin> {
        self.inputs.values()
    }

    /// Boundary output pins in declaration order.
    pub fn outputs(&self) -> impl Iterator<Item = &Pin> {
        self.outputs.values()
    }

    /// Direct children in declaration order. Empty for builtins.
    pub fn children(&self) -> impl Iterator<Item = &Component> {
        let children = match &self.body {
            Body::Custom { children, .. } => Some(children.values()),
            Body::Builtin { .. } => None,
        };
        children.into_iter().flatten()
    }

    pub fn child(&self, name: &str) -> Option<&Component> {
        match &self.body {
            Body::Custom { children, .. } => children.get(name),
            Body::Builtin { .. } => None,
        }
    }

    /// Internal wires. Empty for builtins.
    pub fn wires(&self) -> &[Wire] {
        match &self.body {
            Body::Custom { wires, .. } => wires,
            Body::Builtin { .. } => &[],
        }
    }

    pub(crate) fn body(&self) -> &Body {
        &self.body
    }

    /// Total number of builtin leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        match &self.body {
            Body::Builtin { .. } => 1,
            Body::Custom { children, .. } => children.values().map(Component::leaf_count).sum(),
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Component");
        debug
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("inputs", &self.inputs.keys().collect::<Vec<_>>())
            .field("outputs", &self.outputs.keys().collect::<Vec<_>>())
            .field("need_run", &self.need_run);
        match &self.body {
            Body::Builtin { .. } => debug.field("body", &"builtin"),
            Body::Custom { children, wires } => debug
                .field("children", &children.values().collect::<Vec<_>>())
                .field("wires", wires),
        };
        debug.finish()
    }
}

/// Builder for builtin component instances.
///
/// Generators registered with the system typically call
/// [`Component::builtin`] and finish with [`BuiltinBuilder::build`].
pub struct BuiltinBuilder {
    name: String,
    type_name: Option<String>,
    inputs: Vec<(String, Timing)>,
    outputs: Vec<String>,
    need_run: bool,
    evaluator: Option<Arc<Evaluator>>,
}

impl BuiltinBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            type_name: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            need_run: true,
            evaluator: None,
        }
    }

    /// Type name; defaults to the instance name and is overwritten when the
    /// component comes out of a registered generator.
    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Declare a combinational input.
    pub fn input(mut self, name: impl Into<String>) -> Self {
        self.inputs.push((name.into(), Timing::Combinational));
        self
    }

    /// Declare an input sampled from the previous tick.
    pub fn registered_input(mut self, name: impl Into<String>) -> Self {
        self.inputs.push((name.into(), Timing::Registered));
        self
    }

    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.outputs.push(name.into());
        self
    }

    /// Whether the plan evaluates this component each tick. Defaults to
    /// `true`; components whose outputs never change can opt out.
    pub fn need_run(mut self, need_run: bool) -> Self {
        self.need_run = need_run;
        self
    }

    pub fn evaluate<F>(mut self, evaluator: F) -> Self
    where
        F: Fn(&Signals, &mut Signals) -> std::result::Result<(), EvalError> + Send + Sync + 'static,
    {
        self.evaluator = Some(Arc::new(evaluator));
        self
    }

    pub fn build(self) -> Result<Component> {
        let id = ComponentId::new();
        let inputs = declare_pins(
            &self.name,
            id,
            Direction::Input,
            self.inputs.iter().map(|(n, t)| (n.as_str(), *t)),
        )?;
        let outputs = declare_pins(
            &self.name,
            id,
            Direction::Output,
            self.outputs.iter().map(|n| (n.as_str(), Timing::Combinational)),
        )?;
        let evaluator: Arc<Evaluator> = self.evaluator.unwrap_or_else(|| Arc::new(idle));

        Ok(Component {
            id,
            type_name: self.type_name.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            inputs,
            outputs,
            need_run: self.need_run,
            body: Body::Builtin { evaluator },
        })
    }
}

fn idle(_: &Signals, _: &mut Signals) -> std::result::Result<(), EvalError> {
    Ok(())
}

fn declare_pins<'a>(
    component: &str,
    owner: ComponentId,
    direction: Direction,
    names: impl Iterator<Item = (&'a str, Timing)>,
) -> Result<IndexMap<String, Pin>> {
    let mut pins = IndexMap::new();
    for (name, timing) in names {
        if pins.contains_key(name) {
            return Err(SimError::DuplicatePin {
                component: component.to_string(),
                pin: name.to_string(),
                direction,
            });
        }
        pins.insert(name.to_string(), Pin::new(name, direction, timing, owner));
    }
    Ok(pins)
}

/// Pin lookup while resolving the wires of one custom component.
struct Scope<'a> {
    name: &'a str,
    inputs: &'a IndexMap<String, Pin>,
    outputs: &'a IndexMap<String, Pin>,
    children: &'a IndexMap<String, Component>,
}

impl Scope<'_> {
    /// Resolve a wire's driving end: an own input or a child's output.
    fn source(&self, from: &PinPath, to: &PinPath) -> Result<PinId> {
        let (drivers, others, owner) = self.sides(from, Direction::Input)?;
        if let Some(pin) = drivers.get(&from.pin) {
            return Ok(pin.id());
        }
        if others.contains_key(&from.pin) {
            return Err(self.invalid(from, to, "the source pin cannot drive a wire"));
        }
        Err(SimError::UnknownPin {
            component: owner,
            pin: from.pin.clone(),
        })
    }

    /// Resolve a wire's driven end: an own output or a child's input.
    fn sink(&self, from: &PinPath, to: &PinPath) -> Result<PinId> {
        let (sinks, others, owner) = self.sides(to, Direction::Output)?;
        if let Some(pin) = sinks.get(&to.pin) {
            return Ok(pin.id());
        }
        if others.contains_key(&to.pin) {
            return Err(self.invalid(from, to, "the target pin cannot be driven by a wire"));
        }
        Err(SimError::UnknownPin {
            component: owner,
            pin: to.pin.clone(),
        })
    }

    /// The pin set a path resolves into, the opposite set, and the owner's
    /// display name.
    ///
    /// `own` is the direction that plays this role on the component's own
    /// boundary; a child plays the same role with the other direction.
    fn sides(
        &self,
        path: &PinPath,
        own: Direction,
    ) -> Result<(&IndexMap<String, Pin>, &IndexMap<String, Pin>, String)> {
        let (inputs, outputs, owner) = match &path.child {
            None => (self.inputs, self.outputs, self.name.to_string()),
            Some(child) => {
                let component = self.children.get(child).ok_or_else(|| SimError::UnknownChild {
                    component: self.name.to_string(),
                    child: child.clone(),
                })?;
                // A child's sides are mirrored relative to the boundary.
                (&component.outputs, &component.inputs, format!("{}.{}", self.name, child))
            }
        };
        Ok(match own {
            Direction::Input => (inputs, outputs, owner),
            Direction::Output => (outputs, inputs, owner),
        })
    }

    fn invalid(&self, from: &PinPath, to: &PinPath, reason: &'static str) -> SimError {
        SimError::InvalidWire {
            component: self.name.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            reason,
        }
    }
}
