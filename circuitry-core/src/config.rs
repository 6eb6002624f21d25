//! System Configuration

/// Tunables for a [`System`](crate::system::System).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemConfig {
    /// Maximum number of nested custom-template expansions below the
    /// component being built.
    pub max_nesting_depth: usize,

    /// Log a warning at plan construction for every builtin input pin that
    /// nothing drives. Boundary inputs of the main component are exempt.
    pub warn_undriven_inputs: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: 64,
            warn_undriven_inputs: true,
        }
    }
}
