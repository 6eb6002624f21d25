//! Python Bindings
//!
//! Exposes [`System`] to Python. Builtin components are registered with a
//! Python callable as their evaluation closure; templates are handed over as
//! JSON.

use std::collections::HashMap;
use std::sync::Arc;

use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;

use crate::circuit::{Component, ComponentTemplate, Signals};
use crate::error::{EvalError, SimError};
use crate::system::System;

impl From<SimError> for PyErr {
    fn from(error: SimError) -> Self {
        PyRuntimeError::new_err(error.to_string())
    }
}

/// Python-exposed simulation system.
#[pyclass(name = "System")]
pub struct PySystem {
    inner: System,
}

#[pymethods]
impl PySystem {
    #[new]
    fn new() -> Self {
        Self { inner: System::new() }
    }

    /// Register a builtin type.
    ///
    /// `func` is called once per evaluation with a dict of input values and
    /// must return a dict of output values.
    fn register_library_component(
        &mut self,
        type_name: String,
        inputs: Vec<String>,
        outputs: Vec<String>,
        func: PyObject,
    ) {
        let func = Arc::new(func);
        self.inner.register_library_component(type_name, move |name: &str| {
            let func = Arc::clone(&func);
            let mut builder = Component::builtin(name);
            for input in &inputs {
                builder = builder.input(input.clone());
            }
            for output in &outputs {
                builder = builder.output(output.clone());
            }
            builder
                .evaluate(move |i, o| call_python(&func, i, o))
                .build()
        });
    }

    /// Register a custom type from a JSON template.
    fn register_template(&mut self, type_name: String, template_json: &str) -> PyResult<()> {
        let template = ComponentTemplate::from_json(template_json).map_err(SimError::from)?;
        self.inner.register_template(type_name, template);
        Ok(())
    }

    /// Instantiate a registered type and make it the simulation root.
    fn set_main(&mut self, type_name: &str, name: &str) -> PyResult<()> {
        let component = self.inner.instantiate(type_name, name)?;
        self.inner.set_main_component(component);
        Ok(())
    }

    /// Build the execution plan. Returns its steps for display.
    fn construct_graph(&mut self) -> PyResult<Vec<String>> {
        let summary = self.inner.construct_graph()?;
        Ok(summary.steps.iter().map(ToString::to_string).collect())
    }

    fn set_input(&self, name: &str, value: bool) -> PyResult<()> {
        Ok(self.inner.set_input(name, value)?)
    }

    /// Run one tick. Returns `(inputs, outputs)` of the main component.
    fn run_clock(&mut self) -> PyResult<(HashMap<String, bool>, HashMap<String, bool>)> {
        let tick = self.inner.run_clock()?;
        Ok((tick.inputs.into_iter().collect(), tick.outputs.into_iter().collect()))
    }

    #[getter]
    fn tick_count(&self) -> u64 {
        self.inner.tick_count()
    }

    fn __repr__(&self) -> String {
        let steps = self
            .inner
            .plan_summary()
            .map(|summary| summary.steps.len().to_string())
            .unwrap_or_else(|| "unbuilt".to_string());
        let main = self
            .inner
            .main_component()
            .map(|component| component.name().to_string())
            .unwrap_or_else(|| "none".to_string());
        format!("System(main={}, ticks={}, steps={})", main, self.inner.tick_count(), steps)
    }
}

fn call_python(func: &Py<PyAny>, inputs: &Signals, outputs: &mut Signals) -> Result<(), EvalError> {
    Python::with_gil(|py| {
        let args: HashMap<&str, bool> = inputs.iter().collect();
        let result = func
            .call1(py, (args,))
            .map_err(|e| EvalError::failed(e.to_string()))?;
        let values: HashMap<String, bool> = result
            .extract(py)
            .map_err(|e| EvalError::failed(e.to_string()))?;
        for (name, value) in values {
            outputs.set(&name, value)?;
        }
        Ok(())
    })
}
