//! Instance Identities
//!
//! Pins and components are identified by process-unique ids, never by name:
//! two `a` pins in two instances of the same template are distinct vertices.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::wire::Wire;

/// Unique identifier for one pin instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(u64);

impl PinId {
    /// Generate a new unique pin ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for PinId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for one component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    /// Generate a new unique component ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::new()
    }
}

/// A vertex of the flattened circuit graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vertex {
    /// A pin of any component, builtin or custom.
    Pin(PinId),

    /// A builtin leaf component. Custom components never become vertices.
    Component(ComponentId),
}

impl Vertex {
    pub fn is_pin(&self) -> bool {
        matches!(self, Vertex::Pin(_))
    }

    pub fn is_component(&self) -> bool {
        matches!(self, Vertex::Component(_))
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vertex::Pin(id) => write!(f, "pin#{}", id.raw()),
            Vertex::Component(id) => write!(f, "component#{}", id.raw()),
        }
    }
}

/// The label on an edge of the flattened circuit graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// A wire drawn inside a custom component.
    Wire(Wire),

    /// Implicit binding between a builtin and one of its own pins:
    /// input pin -> component, or component -> output pin.
    Dummy,

    /// Builtin -> registered input pin. The component reads the value the pin
    /// held at the end of the previous tick, so it must run before the pin
    /// is refreshed.
    Sample,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(PinId::new(), PinId::new());
        assert_ne!(ComponentId::new(), ComponentId::new());
    }

    #[test]
    fn vertex_kind() {
        assert!(Vertex::Pin(PinId::new()).is_pin());
        assert!(Vertex::Component(ComponentId::new()).is_component());
    }
}
