//! Error Types
//!
//! Structural errors are detected eagerly, while components are built or the
//! graph is constructed. Once a plan exists, the only error a tick can raise
//! is a failing evaluation closure.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors raised while building circuits, constructing plans or ticking.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("component type `{0}` is not registered")]
    UnregisteredType(String),

    #[error("template `{0}` expands into itself")]
    RecursiveTemplate(String),

    #[error("component nesting exceeds the configured depth of {max}")]
    NestingTooDeep { max: usize },

    #[error("component `{component}` declares {direction} pin `{pin}` twice")]
    DuplicatePin {
        component: String,
        pin: String,
        direction: crate::circuit::Direction,
    },

    #[error("component `{component}` has no child named `{child}`")]
    UnknownChild { component: String, child: String },

    #[error("component `{component}` has no pin `{pin}`")]
    UnknownPin { component: String, pin: String },

    #[error("wire {from} -> {to} in `{component}` is invalid: {reason}")]
    InvalidWire {
        component: String,
        from: String,
        to: String,
        reason: &'static str,
    },

    #[error("pin `{pin}` in `{component}` is driven by more than one wire")]
    MultipleDrivers { component: String, pin: String },

    #[error("no main component has been set")]
    NoMainComponent,

    #[error("the execution plan has not been constructed")]
    GraphNotBuilt,

    #[error("main component has no {direction} pin `{pin}`")]
    NoSuchBoundaryPin {
        pin: String,
        direction: crate::circuit::Direction,
    },

    #[error("cyclic dependency: {}", .participants.join(" -> "))]
    CyclicDependency { participants: Vec<String> },

    #[error("flattened graph is inconsistent: {0}")]
    DanglingEdge(String),

    #[error("evaluation of `{instance}` failed: {source}")]
    Evaluation {
        instance: String,
        #[source]
        source: EvalError,
    },

    #[error(transparent)]
    PinPath(#[from] crate::circuit::PinPathError),

    #[error("invalid template: {0}")]
    Template(#[from] serde_json::Error),
}

/// Errors returned by a builtin's evaluation closure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("no input named `{0}`")]
    MissingInput(String),

    #[error("no output named `{0}`")]
    UnknownOutput(String),

    #[error("{0}")]
    Failed(String),
}

impl EvalError {
    /// Construct a free-form evaluation failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
