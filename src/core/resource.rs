//! Low-level resource declarations and the property override escape hatch.

use indexmap::IndexMap;
use serde_json::{json, Value};

/// Tag collection for a taggable resource.
///
/// Tags keep insertion order so rendered templates are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagManager {
    tags: IndexMap<String, String>,
}

impl TagManager {
    /// Creates an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a tag, replacing any previous value for the key.
    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    /// Returns the value for a tag key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Returns true if no tags are set.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Renders the tags as a CloudFormation `Tags` property value.
    pub fn render(&self) -> Value {
        Value::Array(
            self.tags
                .iter()
                .map(|(k, v)| json!({ "Key": k, "Value": v }))
                .collect(),
        )
    }
}

/// A single CloudFormation resource declaration owned by a stack.
///
/// Properties set through the typed construct surface land in `properties`;
/// [`override_property`](CfnResource::override_property) values are kept
/// separately and merged last during rendering, so an override always wins
/// over whatever the typed path produced.
#[derive(Debug, Clone)]
pub struct CfnResource {
    logical_id: String,
    resource_type: String,
    properties: IndexMap<String, Value>,
    property_overrides: IndexMap<String, Value>,
    tags: TagManager,
    depends_on: Vec<String>,
}

impl CfnResource {
    /// Creates a resource with the given logical id and type discriminator.
    pub fn new(logical_id: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            resource_type: resource_type.into(),
            properties: IndexMap::new(),
            property_overrides: IndexMap::new(),
            tags: TagManager::new(),
            depends_on: Vec::new(),
        }
    }

    /// The logical id of this resource within its stack.
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// The CloudFormation resource type discriminator, e.g.
    /// `AWS::AutoScaling::LaunchConfiguration`.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Sets a typed property. Builder-style for construct code.
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Sets a typed property on an existing resource.
    pub fn set_property(&mut self, key: impl Into<String>, value: Value) {
        self.properties.insert(key.into(), value);
    }

    /// Returns a typed property value previously set.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Force-sets a raw property, bypassing the typed surface.
    ///
    /// Overrides are merged after typed properties when the resource is
    /// rendered, so they replace whatever the construct emitted for the key.
    pub fn override_property(&mut self, key: impl Into<String>, value: Value) {
        self.property_overrides.insert(key.into(), value);
    }

    /// Returns the raw override value for a key, if one was set.
    pub fn property_override(&self, key: &str) -> Option<&Value> {
        self.property_overrides.get(key)
    }

    /// Mutable access to the resource's tags.
    pub fn tags_mut(&mut self) -> &mut TagManager {
        &mut self.tags
    }

    /// Read access to the resource's tags.
    pub fn tags(&self) -> &TagManager {
        &self.tags
    }

    /// Adds an explicit `DependsOn` edge to another logical id.
    pub fn add_depends_on(&mut self, logical_id: impl Into<String>) {
        self.depends_on.push(logical_id.into());
    }

    /// Builder-style variant of [`add_depends_on`](Self::add_depends_on).
    pub fn with_depends_on(mut self, logical_id: impl Into<String>) -> Self {
        self.depends_on.push(logical_id.into());
        self
    }

    /// Renders the resource declaration, merging typed properties, tags, and
    /// overrides (overrides last).
    pub fn render(&self) -> Value {
        let mut props = self.properties.clone();
        if !self.tags.is_empty() {
            props.insert("Tags".to_string(), self.tags.render());
        }
        for (key, value) in &self.property_overrides {
            props.insert(key.clone(), value.clone());
        }

        let mut decl = IndexMap::new();
        decl.insert("Type".to_string(), Value::String(self.resource_type.clone()));
        if !props.is_empty() {
            decl.insert(
                "Properties".to_string(),
                Value::Object(props.into_iter().collect()),
            );
        }
        if !self.depends_on.is_empty() {
            decl.insert(
                "DependsOn".to_string(),
                Value::Array(
                    self.depends_on
                        .iter()
                        .map(|id| Value::String(id.clone()))
                        .collect(),
                ),
            );
        }
        Value::Object(decl.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_without_properties() {
        let res = CfnResource::new("Topic", "AWS::SNS::Topic");
        assert_eq!(res.render(), json!({ "Type": "AWS::SNS::Topic" }));
    }

    #[test]
    fn test_override_wins_over_typed_property() {
        let mut res = CfnResource::new("Lc", "AWS::AutoScaling::LaunchConfiguration")
            .with_property("AssociatePublicIpAddress", json!(false))
            .with_property("InstanceType", json!("t3.micro"));
        res.override_property("AssociatePublicIpAddress", json!(true));

        let rendered = res.render();
        assert_eq!(
            rendered["Properties"]["AssociatePublicIpAddress"],
            json!(true)
        );
        assert_eq!(rendered["Properties"]["InstanceType"], json!("t3.micro"));
    }

    #[test]
    fn test_tags_rendered_in_insertion_order() {
        let mut res = CfnResource::new("Vpc", "AWS::EC2::VPC");
        res.tags_mut().set_tag("Name", "demo/Vpc");
        res.tags_mut().set_tag("kubernetes.io/cluster/PublicEks", "shared");

        let rendered = res.render();
        assert_eq!(
            rendered["Properties"]["Tags"],
            json!([
                { "Key": "Name", "Value": "demo/Vpc" },
                { "Key": "kubernetes.io/cluster/PublicEks", "Value": "shared" },
            ])
        );
    }

    #[test]
    fn test_depends_on() {
        let res = CfnResource::new("Route", "AWS::EC2::Route").with_depends_on("GatewayAttachment");
        assert_eq!(res.render()["DependsOn"], json!(["GatewayAttachment"]));
    }
}
