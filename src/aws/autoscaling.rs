//! Autoscaling constructs: launch configurations and autoscaling groups.

use crate::aws::ec2::{AmazonLinuxImage, InstanceType, SubnetType, Vpc};
use crate::core::{sanitize_id, CfnResource, Stack};
use crate::error::Result;
use crate::template::cfn_ref;
use serde_json::{json, Value};

/// CloudFormation type discriminator for launch configurations.
pub const LAUNCH_CONFIGURATION_TYPE: &str = "AWS::AutoScaling::LaunchConfiguration";
/// CloudFormation type discriminator for autoscaling groups.
pub const AUTO_SCALING_GROUP_TYPE: &str = "AWS::AutoScaling::AutoScalingGroup";

/// Configuration for an [`AutoScalingGroup`].
#[derive(Debug, Clone)]
pub struct AutoScalingGroupProps {
    /// Instance type for launched instances.
    pub instance_type: InstanceType,
    /// Machine image for launched instances.
    pub machine_image: AmazonLinuxImage,
    /// Minimum group size.
    pub min_capacity: u32,
    /// Maximum group size.
    pub max_capacity: u32,
    /// Desired group size.
    pub desired_capacity: u32,
}

impl AutoScalingGroupProps {
    /// One-instance group with the given type and image.
    pub fn new(instance_type: InstanceType, machine_image: AmazonLinuxImage) -> Self {
        Self {
            instance_type,
            machine_image,
            min_capacity: 1,
            max_capacity: 1,
            desired_capacity: 1,
        }
    }
}

/// An autoscaling group construct.
///
/// Emits a security group, a launch configuration, and the autoscaling group
/// itself. Instances land in the VPC's private subnets when it has any,
/// otherwise its public subnets.
#[derive(Debug, Clone)]
pub struct AutoScalingGroup {
    logical_id: String,
    launch_configuration_id: String,
}

impl AutoScalingGroup {
    /// Declares the autoscaling group as children of `stack`.
    pub fn new(
        stack: &mut Stack,
        id: &str,
        vpc: &Vpc,
        props: AutoScalingGroupProps,
    ) -> Result<Self> {
        let base = sanitize_id(id);
        let sg_id = format!("{base}InstanceSecurityGroup");
        let lc_id = format!("{base}LaunchConfig");
        let asg_id = format!("{base}ASG");

        let mut sg = CfnResource::new(&sg_id, "AWS::EC2::SecurityGroup")
            .with_property(
                "GroupDescription",
                json!(format!("{}/{} security group", stack.name(), id)),
            )
            .with_property(
                "SecurityGroupEgress",
                json!([{
                    "CidrIp": "0.0.0.0/0",
                    "Description": "Allow all outbound traffic by default",
                    "IpProtocol": "-1",
                }]),
            )
            .with_property("VpcId", cfn_ref(vpc.logical_id()));
        sg.tags_mut()
            .set_tag("Name", format!("{}/{}", stack.name(), id));
        stack.add_resource(sg)?;

        let image_id = props.machine_image.image_id(&stack.env().region)?;
        stack.add_resource(
            CfnResource::new(&lc_id, LAUNCH_CONFIGURATION_TYPE)
                .with_property("ImageId", json!(image_id))
                .with_property("InstanceType", json!(props.instance_type.to_string()))
                .with_property("SecurityGroups", json!([cfn_ref(&sg_id)])),
        )?;

        let subnet_refs: Vec<Value> = Self::placement_subnets(vpc)
            .iter()
            .map(|logical_id| cfn_ref(logical_id))
            .collect();
        stack.add_resource(
            CfnResource::new(&asg_id, AUTO_SCALING_GROUP_TYPE)
                .with_property("MinSize", json!(props.min_capacity.to_string()))
                .with_property("MaxSize", json!(props.max_capacity.to_string()))
                .with_property(
                    "DesiredCapacity",
                    json!(props.desired_capacity.to_string()),
                )
                .with_property("LaunchConfigurationName", cfn_ref(&lc_id))
                .with_property("VPCZoneIdentifier", Value::Array(subnet_refs)),
        )?;

        Ok(Self {
            logical_id: asg_id,
            launch_configuration_id: lc_id,
        })
    }

    /// Private subnets when the VPC has them, public otherwise.
    fn placement_subnets(vpc: &Vpc) -> Vec<String> {
        let private: Vec<String> = vpc
            .subnets_of_type(SubnetType::Private)
            .map(|s| s.logical_id.clone())
            .collect();
        if !private.is_empty() {
            return private;
        }
        vpc.subnets_of_type(SubnetType::Public)
            .map(|s| s.logical_id.clone())
            .collect()
    }

    /// Logical id of the `AWS::AutoScaling::AutoScalingGroup` resource.
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// Logical id of the launch configuration resource.
    pub fn launch_configuration_id(&self) -> &str {
        &self.launch_configuration_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::ec2::{InstanceClass, InstanceSize, SubnetConfig, VpcProps};
    use crate::core::Environment;
    use pretty_assertions::assert_eq;

    fn public_only_vpc(stack: &mut Stack) -> Vpc {
        let props = VpcProps {
            cidr: None,
            subnet_configuration: Some(vec![SubnetConfig::new(
                "public",
                SubnetType::Public,
                24,
            )]),
            nat_gateways: None,
        };
        Vpc::new(stack, "Vpc", props).unwrap()
    }

    #[test]
    fn test_asg_emits_three_resources() {
        let mut stack = Stack::new("Overrides", Environment::default());
        let vpc = public_only_vpc(&mut stack);
        let asg = AutoScalingGroup::new(
            &mut stack,
            "MyASG",
            &vpc,
            AutoScalingGroupProps::new(
                InstanceType::new(InstanceClass::Burstable3, InstanceSize::Micro),
                AmazonLinuxImage,
            ),
        )
        .unwrap();

        let template = stack.synth().unwrap();
        assert_eq!(template.resources_of_type(LAUNCH_CONFIGURATION_TYPE).len(), 1);
        assert_eq!(template.resources_of_type(AUTO_SCALING_GROUP_TYPE).len(), 1);
        assert_eq!(template.resources_of_type("AWS::EC2::SecurityGroup").len(), 1);

        let lc = template.resource(asg.launch_configuration_id()).unwrap();
        assert_eq!(lc["Properties"]["InstanceType"], json!("t3.micro"));
        // The typed surface never sets AssociatePublicIpAddress.
        assert!(lc["Properties"].get("AssociatePublicIpAddress").is_none());
    }

    #[test]
    fn test_asg_prefers_private_subnets() {
        let mut stack = Stack::new("Test", Environment::default());
        let vpc = Vpc::new(&mut stack, "Vpc", VpcProps::default()).unwrap();
        let asg = AutoScalingGroup::new(
            &mut stack,
            "MyASG",
            &vpc,
            AutoScalingGroupProps::new(
                InstanceType::new(InstanceClass::Burstable3, InstanceSize::Micro),
                AmazonLinuxImage,
            ),
        )
        .unwrap();

        let template = stack.synth().unwrap();
        let zone_ids = &template.resource(asg.logical_id()).unwrap()["Properties"]
            ["VPCZoneIdentifier"];
        let expected: Vec<Value> = vpc
            .subnets_of_type(SubnetType::Private)
            .map(|s| cfn_ref(&s.logical_id))
            .collect();
        assert_eq!(zone_ids, &Value::Array(expected));
    }
}
