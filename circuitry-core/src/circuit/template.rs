//! Component Templates
//!
//! A template describes a custom component: its boundary pins, its named
//! children (by type) and the wires between them. Templates are produced by
//! an editor or persistence layer and only consumed here.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One wire as written in a template.
///
/// Endpoints are `pin` for the component's own boundary pins or
/// `child.pin` for a pin of a direct child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTemplate {
    pub from: String,
    pub to: String,
}

/// Descriptor of a custom component.
///
/// # Example
///
/// ```rust
/// use circuitry_core::circuit::ComponentTemplate;
///
/// let buffer = ComponentTemplate::new()
///     .input("in")
///     .output("out")
///     .child("n1", "NOT")
///     .child("n2", "NOT")
///     .wire("in", "n1.a")
///     .wire("n1.y", "n2.a")
///     .wire("n2.y", "out");
///
/// assert_eq!(buffer.children.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentTemplate {
    /// Boundary input pin names.
    #[serde(default)]
    pub inputs: Vec<String>,

    /// Boundary output pin names.
    #[serde(default)]
    pub outputs: Vec<String>,

    /// Child instance name -> component type, in declaration order.
    #[serde(default)]
    pub children: IndexMap<String, String>,

    /// Internal wiring.
    #[serde(default)]
    pub wires: Vec<WireTemplate>,
}

impl ComponentTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a template handed over as JSON by a host.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn input(mut self, name: impl Into<String>) -> Self {
        self.inputs.push(name.into());
        self
    }

    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.outputs.push(name.into());
        self
    }

    /// Declare a child. A later declaration with the same name replaces the
    /// earlier one's type but keeps its position.
    pub fn child(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.children.insert(name.into(), type_name.into());
        self
    }

    pub fn wire(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.wires.push(WireTemplate {
            from: from.into(),
            to: to.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_template_json() {
        let json = r#"{
            "inputs": ["a", "b"],
            "outputs": ["sum", "carry"],
            "children": {"xor": "XOR", "and": "AND"},
            "wires": [
                {"from": "a", "to": "xor.a"},
                {"from": "b", "to": "xor.b"},
                {"from": "a", "to": "and.a"},
                {"from": "b", "to": "and.b"},
                {"from": "xor.y", "to": "sum"},
                {"from": "and.y", "to": "carry"}
            ]
        }"#;

        let template = ComponentTemplate::from_json(json).unwrap();
        assert_eq!(template.inputs, vec!["a", "b"]);
        assert_eq!(template.outputs, vec!["sum", "carry"]);
        assert_eq!(template.children.keys().collect::<Vec<_>>(), vec!["xor", "and"]);
        assert_eq!(template.wires.len(), 6);
        assert_eq!(template.children["and"], "AND");
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let template = ComponentTemplate::from_json(r#"{"inputs": ["x"]}"#).unwrap();
        assert_eq!(template.inputs, vec!["x"]);
        assert!(template.outputs.is_empty());
        assert!(template.children.is_empty());
        assert!(template.wires.is_empty());
    }

    #[test]
    fn builder_matches_json() {
        let built = ComponentTemplate::new()
            .input("in")
            .output("out")
            .child("n", "NOT")
            .wire("in", "n.a")
            .wire("n.y", "out");
        let json = serde_json::to_string(&built).unwrap();
        assert_eq!(ComponentTemplate::from_json(&json).unwrap(), built);
    }
}
