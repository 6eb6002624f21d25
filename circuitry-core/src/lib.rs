//! Circuitry Core
//!
//! This crate provides the execution engine for the Circuitry hierarchical
//! logic simulator. It implements:
//!
//! - A circuit model of pins, wires, builtin and custom components
//! - Flattening of nested components into one dependency graph
//! - Topological evaluation order with cycle detection
//! - Tick execution over a precomputed, minimal plan
//!
//! The crate is designed to be used both as a native Rust library and, with
//! the `python` feature, as a Python extension module via PyO3.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `graph`: Generic dependency graph and topological ordering
//! - `circuit`: Pins, wires, components, templates and the type registry
//! - `system`: Flattening, execution plans and the simulation driver
//!
//! # Example
//!
//! ```rust
//! use circuitry_core::circuit::{Component, ComponentTemplate};
//! use circuitry_core::System;
//!
//! let mut system = System::new();
//! system.register_library_component("NOT", |name: &str| {
//!     Component::builtin(name)
//!         .input("a")
//!         .output("y")
//!         .evaluate(|i, o| o.set("y", !i.get("a")?))
//!         .build()
//! });
//!
//! let buffer = ComponentTemplate::new()
//!     .input("in")
//!     .output("out")
//!     .child("n1", "NOT")
//!     .child("n2", "NOT")
//!     .wire("in", "n1.a")
//!     .wire("n1.y", "n2.a")
//!     .wire("n2.y", "out");
//!
//! let main = system.create_custom_component("buffer", &buffer).unwrap();
//! system.set_main_component(main);
//! system.construct_graph().unwrap();
//!
//! system.set_input("in", true).unwrap();
//! assert!(system.run_clock().unwrap().outputs["out"]);
//! ```

pub mod graph;
pub mod circuit;
pub mod system;
pub mod config;
pub mod error;

#[cfg(feature = "python")]
mod python;

pub use config::SystemConfig;
pub use error::{EvalError, Result, SimError};
pub use system::{System, TickResult};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module definition.
///
/// This function is called by Python when importing the module.
/// It registers all Python-exposed types.
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PySystem>()?;

    // Add version info
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
