//! The application root: an ordered collection of stacks and the synthesis
//! entry point.

use crate::core::stack::Stack;
use crate::error::{Error, Result};
use crate::template::Template;
use indexmap::IndexMap;
use tracing::info;

/// Top-level construct holding every declared stack.
///
/// Stack names are unique within the app; stacks synthesize in the order
/// they were added, so output is deterministic for a given declaration.
#[derive(Debug, Default)]
pub struct App {
    stacks: IndexMap<String, Stack>,
}

impl App {
    /// Creates an empty app.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stack, rejecting duplicate names.
    pub fn add_stack(&mut self, stack: Stack) -> Result<()> {
        if self.stacks.contains_key(stack.name()) {
            return Err(Error::DuplicateStack(stack.name().to_string()));
        }
        self.stacks.insert(stack.name().to_string(), stack);
        Ok(())
    }

    /// Looks up a stack by name.
    pub fn stack(&self, name: &str) -> Option<&Stack> {
        self.stacks.get(name)
    }

    /// Mutable lookup by name.
    pub fn stack_mut(&mut self, name: &str) -> Option<&mut Stack> {
        self.stacks.get_mut(name)
    }

    /// Stack names in declaration order.
    pub fn stack_names(&self) -> Vec<&str> {
        self.stacks.keys().map(String::as_str).collect()
    }

    /// Synthesizes every stack into an [`Assembly`].
    pub fn synth(&self) -> Result<Assembly> {
        let mut templates = IndexMap::new();
        for (name, stack) in &self.stacks {
            let template = stack.synth()?;
            info!(stack = %name, resources = template.resources.len(), "synthesized");
            templates.insert(name.clone(), template);
        }
        Ok(Assembly { templates })
    }
}

/// The result of synthesizing an app: one template per stack, in declaration
/// order.
#[derive(Debug)]
pub struct Assembly {
    templates: IndexMap<String, Template>,
}

impl Assembly {
    /// Template for a single stack.
    pub fn template(&self, stack_name: &str) -> Result<&Template> {
        self.templates
            .get(stack_name)
            .ok_or_else(|| Error::StackNotFound(stack_name.to_string()))
    }

    /// Iterates (stack name, template) pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Template)> {
        self.templates.iter().map(|(n, t)| (n.as_str(), t))
    }

    /// Number of synthesized stacks.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// True when the app declared no stacks.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stack::Environment;

    #[test]
    fn test_duplicate_stack_rejected() {
        let mut app = App::new();
        app.add_stack(Stack::new("WebApp", Environment::default()))
            .unwrap();
        let err = app
            .add_stack(Stack::new("WebApp", Environment::default()))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateStack(_)));
    }

    #[test]
    fn test_synth_preserves_stack_order() {
        let mut app = App::new();
        app.add_stack(Stack::new("Zeta", Environment::default()))
            .unwrap();
        app.add_stack(Stack::new("Alpha", Environment::default()))
            .unwrap();

        let assembly = app.synth().unwrap();
        let names: Vec<_> = assembly.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_assembly_unknown_stack() {
        let app = App::new();
        let assembly = app.synth().unwrap();
        assert!(assembly.template("Nope").is_err());
        assert!(assembly.is_empty());
    }
}
