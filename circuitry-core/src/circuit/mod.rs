//! Circuit Model
//!
//! Pins, wires, components and the templates and library they are built
//! from.
//!
//! # Concepts
//!
//! ## Builtin components
//!
//! A builtin is a leaf with an opaque evaluation closure. The simulator never
//! interprets gate semantics; it only decides when to call the closure.
//!
//! ## Custom components
//!
//! A custom component is pure structure: named children plus the wires
//! between them and its own boundary pins. It has no behavior of its own and
//! disappears when the circuit is flattened.
//!
//! ## Registered inputs
//!
//! A builtin may declare an input as registered. It then reads the value the
//! pin held at the end of the previous tick, which lets stateful elements sit
//! inside feedback loops without creating a dependency cycle.

mod id;
mod pin;
mod wire;
mod component;
mod template;
mod library;

pub use id::{ComponentId, Link, PinId, Vertex};
pub use pin::{Direction, Pin, PinHandle, Timing, Value};
pub use wire::{PinPath, PinPathError, Wire};
pub use component::{BuiltinBuilder, Component, Evaluator, Signals};
pub use template::{ComponentTemplate, WireTemplate};
pub use library::{ComponentGenerator, Library};

pub(crate) use component::Body;
