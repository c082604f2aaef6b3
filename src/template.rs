//! CloudFormation template model and rendering.
//!
//! A [`Template`] is the synthesized form of one stack: an ordered map of
//! logical ids to resource declarations plus optional outputs. Rendering is
//! deterministic; the same construct input always serializes to the same
//! bytes, which is what makes template diffing and snapshot testing usable.

use crate::error::Result;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};

/// The CloudFormation template format version emitted for every stack.
pub const FORMAT_VERSION: &str = "2010-09-09";

/// A synthesized CloudFormation template.
#[derive(Debug, Clone, Serialize)]
pub struct Template {
    /// Template format version, always [`FORMAT_VERSION`].
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,

    /// Optional human-readable stack description.
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Resource declarations in declaration order.
    #[serde(rename = "Resources")]
    pub resources: IndexMap<String, Value>,

    /// Stack outputs in declaration order.
    #[serde(rename = "Outputs", skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, Value>,
}

impl Template {
    /// Creates an empty template.
    pub fn new(description: Option<String>) -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            description,
            resources: IndexMap::new(),
            outputs: IndexMap::new(),
        }
    }

    /// Renders the template as pretty-printed JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }

    /// Renders the template as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Looks up a resource declaration by logical id.
    pub fn resource(&self, logical_id: &str) -> Option<&Value> {
        self.resources.get(logical_id)
    }

    /// Logical ids of all resources whose `Type` matches `resource_type`.
    pub fn resources_of_type(&self, resource_type: &str) -> Vec<&str> {
        self.resources
            .iter()
            .filter(|(_, decl)| decl.get("Type").and_then(Value::as_str) == Some(resource_type))
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// Builds a `{"Ref": id}` intrinsic.
pub fn cfn_ref(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

/// Builds a `{"Fn::GetAtt": [id, attribute]}` intrinsic.
pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}
