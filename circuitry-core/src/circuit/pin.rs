//! Pins
//!
//! A pin is a named signal endpoint on one component instance. The value
//! lives in a shared cell so that a compiled execution plan can read and
//! write pins directly without borrowing the component tree that owns them.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::id::{ComponentId, PinId};

/// A single logic level.
pub type Value = bool;

/// Which side of its component a pin sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => f.write_str("input"),
            Direction::Output => f.write_str("output"),
        }
    }
}

/// When a builtin observes one of its input pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timing {
    /// The input must be current before the component evaluates.
    #[default]
    Combinational,

    /// The component reads the value latched at the end of the previous
    /// tick. Used by stateful elements to break feedback loops.
    Registered,
}

/// A named signal endpoint owned by one component instance.
#[derive(Debug)]
pub struct Pin {
    id: PinId,
    name: String,
    direction: Direction,
    timing: Timing,
    owner: ComponentId,
    value: Arc<RwLock<Value>>,
}

impl Pin {
    pub(crate) fn new(
        name: impl Into<String>,
        direction: Direction,
        timing: Timing,
        owner: ComponentId,
    ) -> Self {
        Self {
            id: PinId::new(),
            name: name.into(),
            direction,
            timing,
            owner,
            value: Arc::new(RwLock::new(Value::default())),
        }
    }

    pub fn id(&self) -> PinId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// The component instance this pin belongs to.
    pub fn owner(&self) -> ComponentId {
        self.owner
    }

    /// Current value.
    pub fn read(&self) -> Value {
        *self.value.read()
    }

    /// Overwrite the current value.
    ///
    /// During simulation only the owner's evaluation or an incoming wire
    /// writes a pin; hosts use this for undriven boundary inputs.
    pub fn write(&self, value: Value) {
        *self.value.write() = value;
    }

    /// A handle sharing this pin's value cell, labeled with a display path.
    pub(crate) fn handle(&self, path: String) -> PinHandle {
        PinHandle {
            id: self.id,
            path: path.into(),
            value: Arc::clone(&self.value),
        }
    }
}

/// A detached reference to a pin's value, used by execution plans.
#[derive(Debug, Clone)]
pub struct PinHandle {
    id: PinId,
    path: Arc<str>,
    value: Arc<RwLock<Value>>,
}

impl PinHandle {
    pub fn id(&self) -> PinId {
        self.id
    }

    /// Hierarchical path, e.g. `main.half.xor.a`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn read(&self) -> Value {
        *self.value.read()
    }

    pub fn write(&self, value: Value) {
        *self.value.write() = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pins_start_low() {
        let pin = Pin::new("a", Direction::Input, Timing::Combinational, ComponentId::new());
        assert!(!pin.read());
        assert_eq!(pin.name(), "a");
        assert_eq!(pin.direction(), Direction::Input);
    }

    #[test]
    fn handle_shares_value_cell() {
        let pin = Pin::new("q", Direction::Output, Timing::Combinational, ComponentId::new());
        let handle = pin.handle("top.q".to_string());

        handle.write(true);
        assert!(pin.read());

        pin.write(false);
        assert!(!handle.read());
        assert_eq!(handle.id(), pin.id());
        assert_eq!(handle.path(), "top.q");
    }

    #[test]
    fn same_name_pins_are_distinct() {
        let owner = ComponentId::new();
        let first = Pin::new("a", Direction::Input, Timing::Combinational, owner);
        let second = Pin::new("a", Direction::Input, Timing::Combinational, owner);
        assert_ne!(first.id(), second.id());
    }
}
