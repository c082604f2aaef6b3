//! The deployment scenarios shipped with the CLI.
//!
//! [`build_app`] assembles the fixed set of example stacks: a public VPC
//! hosting an autoscaling group with a raw property override, the default
//! VPC layout, two EKS-discoverable VPCs, a three-tier web application
//! network, and an SNS/SQS messaging pair. All configuration flows in
//! through [`Config`]; nothing is read from ambient process state.

use crate::aws::autoscaling::{
    AutoScalingGroup, AutoScalingGroupProps, LAUNCH_CONFIGURATION_TYPE,
};
use crate::aws::ec2::{
    AmazonLinuxImage, InstanceClass, InstanceSize, InstanceType, SubnetConfig, SubnetType, Vpc,
    VpcProps,
};
use crate::aws::sns::Topic;
use crate::aws::sqs::{Queue, QueueProps};
use crate::config::Config;
use crate::core::{App, Environment, Stack};
use crate::error::Result;
use serde_json::json;

/// Configuration for one VPC scenario stack.
#[derive(Debug, Clone, Default)]
pub struct VpcStackProps {
    /// VPC shape; framework defaults when omitted.
    pub vpc: VpcProps,
    /// When set, the VPC carries a `kubernetes.io/cluster/<name> = shared`
    /// discovery tag so cluster tooling can find it.
    pub eks_cluster_name: Option<String>,
}

/// Declares a stack containing a single VPC, optionally tagged for EKS
/// discovery.
pub fn vpc_stack(name: &str, env: Environment, props: VpcStackProps) -> Result<Stack> {
    let mut stack = Stack::new(name, env);
    let vpc = Vpc::new(&mut stack, "Vpc", props.vpc)?;
    if let Some(cluster) = &props.eks_cluster_name {
        vpc.set_tag(
            &mut stack,
            format!("kubernetes.io/cluster/{cluster}"),
            "shared",
        )?;
    }
    Ok(stack)
}

/// Declares the override scenario: an autoscaling group in a public-only
/// VPC whose launch configuration gets `AssociatePublicIpAddress` forced on.
///
/// The typed autoscaling surface does not expose that property. One use
/// case is importing an existing VPC whose public subnets do not set
/// `MapPublicIpOnLaunch`; the override reaches past the typed surface to
/// the underlying launch configuration.
pub fn asg_override_stack(env: Environment) -> Result<Stack> {
    let mut stack = Stack::new("Overrides", env);
    let vpc = Vpc::new(
        &mut stack,
        "Vpc",
        VpcProps {
            subnet_configuration: Some(vec![SubnetConfig::new("public", SubnetType::Public, 24)]),
            ..VpcProps::default()
        },
    )?;
    AutoScalingGroup::new(
        &mut stack,
        "MyASG",
        &vpc,
        AutoScalingGroupProps::new(
            InstanceType::new(InstanceClass::Burstable3, InstanceSize::Micro),
            AmazonLinuxImage,
        ),
    )?;

    let launch_config = stack.find_resource_mut(LAUNCH_CONFIGURATION_TYPE)?;
    launch_config.override_property("AssociatePublicIpAddress", json!(true));
    Ok(stack)
}

/// Declares the messaging scenario: a queue subscribed to a topic.
pub fn messaging_stack(env: Environment) -> Result<Stack> {
    let mut stack = Stack::new("VpcExamplesStack", env);
    let queue = Queue::new(
        &mut stack,
        "VpcExamplesQueue",
        QueueProps {
            visibility_timeout_secs: Some(300),
        },
    )?;
    let topic = Topic::new(&mut stack, "VpcExamplesTopic")?;
    topic.subscribe_queue(&mut stack, &queue)?;
    Ok(stack)
}

/// Assembles the full example app.
pub fn build_app(config: &Config) -> Result<App> {
    let env = &config.environment;
    let mut app = App::new();

    app.add_stack(asg_override_stack(env.clone())?)?;

    app.add_stack(vpc_stack(
        "DefaultVpcStack",
        env.clone(),
        VpcStackProps::default(),
    )?)?;

    app.add_stack(vpc_stack(
        "EksVpcPublic",
        env.clone(),
        VpcStackProps {
            eks_cluster_name: Some("PublicEks".to_string()),
            vpc: VpcProps {
                subnet_configuration: Some(vec![SubnetConfig::sized_by_default(
                    "EksPublic",
                    SubnetType::Public,
                )]),
                ..VpcProps::default()
            },
        },
    )?)?;

    app.add_stack(vpc_stack(
        "EksVpcPrivate",
        env.clone(),
        VpcStackProps {
            eks_cluster_name: Some("PrivateEks".to_string()),
            vpc: VpcProps {
                subnet_configuration: Some(vec![SubnetConfig::sized_by_default(
                    "EksPrivate",
                    SubnetType::Private,
                )]),
                ..VpcProps::default()
            },
        },
    )?)?;

    app.add_stack(vpc_stack(
        "WebApp",
        env.clone(),
        VpcStackProps {
            eks_cluster_name: None,
            vpc: VpcProps {
                cidr: Some("192.168.0.0/16".to_string()),
                subnet_configuration: Some(vec![
                    SubnetConfig::new("App", SubnetType::Private, 21),
                    SubnetConfig::new("PublicLoadBalancers", SubnetType::Public, 24),
                    SubnetConfig::new("RdsDatabases", SubnetType::Isolated, 27),
                ]),
                ..VpcProps::default()
            },
        },
    )?)?;

    app.add_stack(messaging_stack(env.clone())?)?;

    Ok(app)
}
