//! SNS topic construct and topic-to-queue subscriptions.

use crate::aws::sqs::Queue;
use crate::core::{sanitize_id, CfnResource, Stack};
use crate::error::Result;
use crate::template::{cfn_ref, get_att};
use serde_json::json;

/// CloudFormation type discriminator for SNS topics.
pub const TOPIC_TYPE: &str = "AWS::SNS::Topic";
/// CloudFormation type discriminator for SNS subscriptions.
pub const SUBSCRIPTION_TYPE: &str = "AWS::SNS::Subscription";

/// An SNS topic construct.
#[derive(Debug, Clone)]
pub struct Topic {
    logical_id: String,
}

impl Topic {
    /// Declares the topic as a child of `stack`.
    pub fn new(stack: &mut Stack, id: &str) -> Result<Self> {
        let logical_id = sanitize_id(id);
        stack.add_resource(CfnResource::new(&logical_id, TOPIC_TYPE))?;
        Ok(Self { logical_id })
    }

    /// Logical id of the `AWS::SNS::Topic` resource.
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// Subscribes a queue to this topic.
    ///
    /// Emits the subscription plus a queue policy allowing the topic to send
    /// messages, scoped to this topic's ARN.
    pub fn subscribe_queue(&self, stack: &mut Stack, queue: &Queue) -> Result<()> {
        let subscription_id = format!("{}{}Subscription", self.logical_id, queue.logical_id());
        stack.add_resource(
            CfnResource::new(&subscription_id, SUBSCRIPTION_TYPE)
                .with_property("Protocol", json!("sqs"))
                .with_property("TopicArn", cfn_ref(&self.logical_id))
                .with_property("Endpoint", get_att(queue.logical_id(), "Arn")),
        )?;

        let policy_id = format!("{}Policy", queue.logical_id());
        stack.add_resource(
            CfnResource::new(&policy_id, "AWS::SQS::QueuePolicy")
                .with_property("Queues", json!([cfn_ref(queue.logical_id())]))
                .with_property(
                    "PolicyDocument",
                    json!({
                        "Version": "2012-10-17",
                        "Statement": [{
                            "Effect": "Allow",
                            "Principal": { "Service": "sns.amazonaws.com" },
                            "Action": "sqs:SendMessage",
                            "Resource": get_att(queue.logical_id(), "Arn"),
                            "Condition": {
                                "ArnEquals": { "aws:SourceArn": cfn_ref(&self.logical_id) }
                            }
                        }]
                    }),
                ),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::sqs::QueueProps;
    use crate::core::Environment;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_subscribe_queue_emits_subscription_and_policy() {
        let mut stack = Stack::new("Messaging", Environment::default());
        let queue = Queue::new(&mut stack, "Q", QueueProps::default()).unwrap();
        let topic = Topic::new(&mut stack, "T").unwrap();
        topic.subscribe_queue(&mut stack, &queue).unwrap();

        let template = stack.synth().unwrap();
        assert_eq!(template.resources_of_type(SUBSCRIPTION_TYPE).len(), 1);
        assert_eq!(template.resources_of_type("AWS::SQS::QueuePolicy").len(), 1);

        let sub = template.resource("TQSubscription").unwrap();
        assert_eq!(sub["Properties"]["Protocol"], json!("sqs"));
        assert_eq!(sub["Properties"]["TopicArn"], json!({ "Ref": "T" }));
        assert_eq!(
            sub["Properties"]["Endpoint"],
            json!({ "Fn::GetAtt": ["Q", "Arn"] })
        );

        let policy = template.resource("QPolicy").unwrap();
        let statement = &policy["Properties"]["PolicyDocument"]["Statement"][0];
        assert_eq!(statement["Action"], json!("sqs:SendMessage"));
        assert_eq!(
            statement["Condition"]["ArnEquals"]["aws:SourceArn"],
            json!({ "Ref": "T" })
        );
    }
}
