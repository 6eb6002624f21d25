//! Component Library
//!
//! The registry of component types a system can instantiate: builtin
//! generators supplied by a gate library, and custom templates that may nest
//! other registered types by name.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use super::component::Component;
use super::template::ComponentTemplate;
use crate::error::{Result, SimError};

/// A factory for builtin component instances.
///
/// Implemented for any `Fn(&str) -> Result<Component>`; the argument is the
/// instance name the new component should carry.
pub trait ComponentGenerator: Send + Sync {
    fn generate(&self, instance: &str) -> Result<Component>;
}

impl<F> ComponentGenerator for F
where
    F: Fn(&str) -> Result<Component> + Send + Sync,
{
    fn generate(&self, instance: &str) -> Result<Component> {
        self(instance)
    }
}

/// Registered component types.
pub struct Library {
    generators: HashMap<String, Arc<dyn ComponentGenerator>>,
    templates: HashMap<String, Arc<ComponentTemplate>>,
    max_nesting_depth: usize,
}

impl Library {
    /// Create an empty library that refuses hierarchies deeper than
    /// `max_nesting_depth` levels of custom components.
    pub fn new(max_nesting_depth: usize) -> Self {
        Self {
            generators: HashMap::new(),
            templates: HashMap::new(),
            max_nesting_depth,
        }
    }

    /// Register a builtin type, replacing any earlier generator of that name.
    pub fn register_generator<G>(&mut self, type_name: impl Into<String>, generator: G)
    where
        G: ComponentGenerator + 'static,
    {
        self.generators.insert(type_name.into(), Arc::new(generator));
    }

    /// Register a custom type, replacing any earlier template of that name.
    pub fn register_template(&mut self, type_name: impl Into<String>, template: ComponentTemplate) {
        self.templates.insert(type_name.into(), Arc::new(template));
    }

    /// Instantiate any registered type. Builtin generators take precedence
    /// over templates of the same name.
    ///
    /// The result always carries `instance` as its name and `type_name` as
    /// its type, whatever the generator set.
    pub fn instantiate(&self, type_name: &str, instance: &str) -> Result<Component> {
        self.instantiate_at(type_name, instance, &mut Vec::new(), 0)
    }

    /// Build a custom component from an unregistered template.
    pub fn build_custom(&self, name: &str, template: &ComponentTemplate) -> Result<Component> {
        self.build_custom_at(name, name, template, &mut Vec::new(), 0)
    }

    /// `depth` is the number of custom components above `instance` in the
    /// tree being built.
    fn instantiate_at(
        &self,
        type_name: &str,
        instance: &str,
        expanding: &mut Vec<String>,
        depth: usize,
    ) -> Result<Component> {
        if let Some(generator) = self.generators.get(type_name) {
            let mut component = generator.generate(instance)?;
            if component.name() != instance {
                trace!(generated = component.name(), instance, "renaming generated component");
                component.set_name(instance);
            }
            component.set_type_name(type_name);
            return Ok(component);
        }

        let template = self
            .templates
            .get(type_name)
            .cloned()
            .ok_or_else(|| SimError::UnregisteredType(type_name.to_string()))?;

        if expanding.iter().any(|open| open == type_name) {
            return Err(SimError::RecursiveTemplate(type_name.to_string()));
        }

        expanding.push(type_name.to_string());
        let component = self.build_custom_at(instance, type_name, &template, expanding, depth);
        expanding.pop();
        component
    }

    fn build_custom_at(
        &self,
        name: &str,
        type_name: &str,
        template: &ComponentTemplate,
        expanding: &mut Vec<String>,
        depth: usize,
    ) -> Result<Component> {
        if depth > self.max_nesting_depth {
            return Err(SimError::NestingTooDeep {
                max: self.max_nesting_depth,
            });
        }

        trace!(component = name, type_name, depth, "expanding template");

        let mut children = IndexMap::with_capacity(template.children.len());
        for (child, child_type) in &template.children {
            let component = self.instantiate_at(child_type, child, expanding, depth + 1)?;
            children.insert(child.clone(), component);
        }

        Component::custom(name, type_name, template, children)
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new(crate::config::SystemConfig::default().max_nesting_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_generator(instance: &str) -> Result<Component> {
        Component::builtin(instance)
            .input("a")
            .output("y")
            .evaluate(|inputs, outputs| outputs.set("y", !inputs.get("a")?))
            .build()
    }

    fn buffer() -> ComponentTemplate {
        ComponentTemplate::new()
            .input("in")
            .output("out")
            .child("n1", "NOT")
            .child("n2", "NOT")
            .wire("in", "n1.a")
            .wire("n1.y", "n2.a")
            .wire("n2.y", "out")
    }

    #[test]
    fn generator_output_carries_registered_type() {
        let mut library = Library::default();
        library.register_generator("NOT", not_generator);

        let gate = library.instantiate("NOT", "inv").unwrap();
        assert_eq!(gate.name(), "inv");
        assert_eq!(gate.type_name(), "NOT");
    }

    #[test]
    fn unknown_type_is_reported() {
        let library = Library::default();
        assert!(matches!(
            library.instantiate("XOR", "x"),
            Err(SimError::UnregisteredType(t)) if t == "XOR"
        ));

        let template = ComponentTemplate::new().child("x", "XOR");
        assert!(matches!(
            library.build_custom("top", &template),
            Err(SimError::UnregisteredType(_))
        ));
    }

    #[test]
    fn templates_nest_by_type_name() {
        let mut library = Library::default();
        library.register_generator("NOT", not_generator);
        library.register_template("BUF", buffer());

        let outer = ComponentTemplate::new()
            .input("in")
            .output("out")
            .child("b1", "BUF")
            .child("b2", "BUF")
            .wire("in", "b1.in")
            .wire("b1.out", "b2.in")
            .wire("b2.out", "out");

        let top = library.build_custom("top", &outer).unwrap();
        assert_eq!(top.leaf_count(), 4);
        assert_eq!(top.child("b1").unwrap().type_name(), "BUF");

        // Same template, distinct pins.
        let b1 = top.child("b1").unwrap().child("n1").unwrap();
        let b2 = top.child("b2").unwrap().child("n1").unwrap();
        assert_ne!(b1.input("a").unwrap().id(), b2.input("a").unwrap().id());
    }

    #[test]
    fn recursive_template_is_rejected() {
        let mut library = Library::default();
        library.register_template("LOOP", ComponentTemplate::new().child("inner", "LOOP"));

        assert!(matches!(
            library.instantiate("LOOP", "l"),
            Err(SimError::RecursiveTemplate(t)) if t == "LOOP"
        ));
    }

    #[test]
    fn generated_components_take_the_instance_name() {
        let mut library = Library::default();
        library.register_generator("FIXED", |_: &str| {
            Component::builtin("fixed").input("a").output("y").build()
        });

        let template = ComponentTemplate::new().child("g1", "FIXED").child("g2", "FIXED");
        let top = library.build_custom("top", &template).unwrap();
        let names: Vec<&str> = top.children().map(Component::name).collect();
        assert_eq!(names, vec!["g1", "g2"]);
        assert_eq!(top.child("g2").unwrap().type_name(), "FIXED");
    }

    #[test]
    fn depth_counts_only_levels_below_the_root() {
        let mut library = Library::new(0);
        library.register_generator("NOT", not_generator);
        let flat = ComponentTemplate::new().child("g", "NOT");
        library.register_template("FLAT", flat.clone());
        library.register_template("WRAP", ComponentTemplate::new().child("c", "FLAT"));

        assert!(library.build_custom("top", &flat).is_ok());
        assert!(library.instantiate("FLAT", "top").is_ok());

        let wrap = ComponentTemplate::new().child("c", "FLAT");
        assert!(matches!(
            library.build_custom("top", &wrap),
            Err(SimError::NestingTooDeep { max: 0 })
        ));
        assert!(matches!(
            library.instantiate("WRAP", "top"),
            Err(SimError::NestingTooDeep { max: 0 })
        ));
    }

    #[test]
    fn nesting_depth_is_bounded() {
        let mut library = Library::new(2);
        library.register_generator("NOT", not_generator);
        library.register_template("L0", ComponentTemplate::new().child("g", "NOT"));
        library.register_template("L1", ComponentTemplate::new().child("c", "L0"));
        library.register_template("L2", ComponentTemplate::new().child("c", "L1"));
        library.register_template("L3", ComponentTemplate::new().child("c", "L2"));

        assert!(library.instantiate("L1", "ok").is_ok());
        assert!(matches!(
            library.instantiate("L3", "deep"),
            Err(SimError::NestingTooDeep { max: 2 })
        ));
    }
}
