//! SQS queue construct.

use crate::core::{sanitize_id, CfnResource, Stack};
use crate::error::Result;
use serde_json::json;

/// CloudFormation type discriminator for SQS queues.
pub const QUEUE_TYPE: &str = "AWS::SQS::Queue";

/// Configuration for a [`Queue`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueProps {
    /// Visibility timeout in seconds; service default when omitted.
    pub visibility_timeout_secs: Option<u32>,
}

/// An SQS queue construct.
#[derive(Debug, Clone)]
pub struct Queue {
    logical_id: String,
}

impl Queue {
    /// Declares the queue as a child of `stack`.
    pub fn new(stack: &mut Stack, id: &str, props: QueueProps) -> Result<Self> {
        let logical_id = sanitize_id(id);
        let mut queue = CfnResource::new(&logical_id, QUEUE_TYPE);
        if let Some(timeout) = props.visibility_timeout_secs {
            queue.set_property("VisibilityTimeout", json!(timeout));
        }
        stack.add_resource(queue)?;
        Ok(Self { logical_id })
    }

    /// Logical id of the `AWS::SQS::Queue` resource.
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Environment;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_queue_with_visibility_timeout() {
        let mut stack = Stack::new("Messaging", Environment::default());
        let queue = Queue::new(
            &mut stack,
            "VpcExamplesQueue",
            QueueProps {
                visibility_timeout_secs: Some(300),
            },
        )
        .unwrap();

        let template = stack.synth().unwrap();
        let decl = template.resource(queue.logical_id()).unwrap();
        assert_eq!(decl["Type"], json!(QUEUE_TYPE));
        assert_eq!(decl["Properties"]["VisibilityTimeout"], json!(300));
    }

    #[test]
    fn test_queue_defaults_omit_properties() {
        let mut stack = Stack::new("Messaging", Environment::default());
        let queue = Queue::new(&mut stack, "Plain", QueueProps::default()).unwrap();
        let template = stack.synth().unwrap();
        assert!(template.resource(queue.logical_id()).unwrap().get("Properties").is_none());
    }
}
