//! Stacks: named deployable units that own their resource declarations.

use crate::core::resource::CfnResource;
use crate::error::{Error, Result};
use crate::template::Template;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Target environment a stack synthesizes against.
///
/// The original toolchain resolved availability zones by querying the target
/// account; synthesis here is offline, so AZ names are derived
/// deterministically from the region (`us-east-1` -> `us-east-1a`,
/// `us-east-1b`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// Target region, e.g. `us-east-1`.
    pub region: String,
    /// Number of availability zones constructs spread across.
    pub availability_zones: usize,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            availability_zones: 2,
        }
    }
}

impl Environment {
    /// Derived availability zone names, `<region>a` through at most
    /// `<region>f`.
    pub fn zone_names(&self) -> Vec<String> {
        const SUFFIXES: [char; 6] = ['a', 'b', 'c', 'd', 'e', 'f'];
        SUFFIXES
            .iter()
            .take(self.availability_zones.clamp(1, SUFFIXES.len()))
            .map(|s| format!("{}{}", self.region, s))
            .collect()
    }
}

/// One deployable unit of infrastructure configuration.
///
/// A stack exclusively owns its resources; constructs register their
/// declarations as children and nothing is shared across stacks. Logical ids
/// must be unique within the stack, enforced at registration time. Problems
/// detected while constructs build (a subnet mask that does not fit, a
/// duplicate subnet group name) are recorded against the stack and surfaced
/// when [`synth`](Stack::synth) runs, not when the construct is created.
#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    description: Option<String>,
    env: Environment,
    resources: IndexMap<String, CfnResource>,
    errors: Vec<String>,
}

impl Stack {
    /// Creates an empty stack for the given environment.
    pub fn new(name: impl Into<String>, env: Environment) -> Self {
        Self {
            name: name.into(),
            description: None,
            env,
            resources: IndexMap::new(),
            errors: Vec::new(),
        }
    }

    /// The stack's unique name within the app.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The environment this stack synthesizes against.
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Sets the template description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    /// Registers a resource as a child of this stack.
    ///
    /// Fails on an invalid or duplicate logical id.
    pub fn add_resource(&mut self, resource: CfnResource) -> Result<()> {
        validate_logical_id(resource.logical_id())?;
        if self.resources.contains_key(resource.logical_id()) {
            return Err(Error::duplicate_resource(&self.name, resource.logical_id()));
        }
        debug!(
            stack = %self.name,
            logical_id = %resource.logical_id(),
            resource_type = %resource.resource_type(),
            "registered resource"
        );
        self.resources
            .insert(resource.logical_id().to_string(), resource);
        Ok(())
    }

    /// Looks up a resource by logical id.
    pub fn resource(&self, logical_id: &str) -> Option<&CfnResource> {
        self.resources.get(logical_id)
    }

    /// Mutable lookup by logical id.
    pub fn resource_mut(&mut self, logical_id: &str) -> Option<&mut CfnResource> {
        self.resources.get_mut(logical_id)
    }

    /// Finds the first resource whose type discriminator matches.
    ///
    /// This is the lookup behind the property override escape hatch. A
    /// missing match is an explicit [`Error::ResourceNotFound`], not a panic.
    pub fn find_resource_mut(&mut self, resource_type: &str) -> Result<&mut CfnResource> {
        let name = self.name.clone();
        self.resources
            .values_mut()
            .find(|r| r.resource_type() == resource_type)
            .ok_or_else(|| Error::resource_not_found(name, resource_type))
    }

    /// Iterates resources in declaration order.
    pub fn resources(&self) -> impl Iterator<Item = &CfnResource> {
        self.resources.values()
    }

    /// Records a construction-time problem to be surfaced at synthesis.
    pub fn record_error(&mut self, error: Error) {
        self.errors.push(error.to_string());
    }

    /// Synthesizes the stack into a CloudFormation template.
    ///
    /// Fails with the first recorded construction problem, if any.
    pub fn synth(&self) -> Result<Template> {
        if let Some(first) = self.errors.first() {
            return Err(Error::synth_failed(&self.name, first));
        }
        let mut template = Template::new(self.description.clone());
        for resource in self.resources.values() {
            template
                .resources
                .insert(resource.logical_id().to_string(), resource.render());
        }
        debug!(stack = %self.name, resources = template.resources.len(), "synthesized stack");
        Ok(template)
    }
}

/// Validates a CloudFormation logical id: non-empty, ASCII alphanumeric.
pub fn validate_logical_id(id: &str) -> Result<()> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Strips non-alphanumeric characters so construct names can be composed
/// into logical ids.
pub fn sanitize_id(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}
