//! EC2 networking constructs: VPCs, subnets, gateways, and instance types.
//!
//! [`Vpc`] is the workhorse construct. Given an address block and an ordered
//! list of subnet configurations it emits the full networking graph into its
//! stack: the VPC itself, one subnet per (configuration x availability
//! zone), per-subnet route tables, an internet gateway for public subnets,
//! and NAT gateways for private egress. Subnet address ranges are carved out
//! of the VPC block sequentially and never overlap.
//!
//! Configuration mistakes (masks that do not fit, colliding group names) are
//! recorded against the owning stack and fail synthesis, not construction.

use crate::cidr::{even_division_mask, CidrAllocator, Ipv4Cidr};
use crate::core::{sanitize_id, CfnResource, Stack};
use crate::error::{Error, Result};
use crate::template::{cfn_ref, get_att};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// CloudFormation type discriminator for VPC resources.
pub const VPC_RESOURCE_TYPE: &str = "AWS::EC2::VPC";
/// CloudFormation type discriminator for subnet resources.
pub const SUBNET_RESOURCE_TYPE: &str = "AWS::EC2::Subnet";

/// Default VPC address block when none is configured.
pub const DEFAULT_CIDR: &str = "10.0.0.0/16";

/// Placement class of a subnet group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubnetType {
    /// Routed to an internet gateway; instances get public IPs on launch.
    Public,
    /// Egress through a NAT gateway, no inbound internet route.
    Private,
    /// No internet route at all.
    Isolated,
}

impl fmt::Display for SubnetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubnetType::Public => write!(f, "Public"),
            SubnetType::Private => write!(f, "Private"),
            SubnetType::Isolated => write!(f, "Isolated"),
        }
    }
}

/// One named, typed, sized partition request of the VPC address block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetConfig {
    /// Group name; unique within the VPC.
    pub name: String,
    /// Placement class.
    pub subnet_type: SubnetType,
    /// Mask length for each subnet in the group. When omitted, the VPC
    /// block is divided evenly among all requested subnets.
    pub cidr_mask: Option<u8>,
}

impl SubnetConfig {
    /// Creates a subnet configuration with an explicit mask.
    pub fn new(name: impl Into<String>, subnet_type: SubnetType, cidr_mask: u8) -> Self {
        Self {
            name: name.into(),
            subnet_type,
            cidr_mask: Some(cidr_mask),
        }
    }

    /// Creates a subnet configuration using the even-division default mask.
    pub fn sized_by_default(name: impl Into<String>, subnet_type: SubnetType) -> Self {
        Self {
            name: name.into(),
            subnet_type,
            cidr_mask: None,
        }
    }
}

/// Configuration for a [`Vpc`] construct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VpcProps {
    /// Address block, defaults to [`DEFAULT_CIDR`].
    pub cidr: Option<String>,
    /// Subnet layout; defaults to one public and one private group.
    pub subnet_configuration: Option<Vec<SubnetConfig>>,
    /// Number of NAT gateways; defaults to one per availability zone when
    /// the layout has both public and private subnets.
    pub nat_gateways: Option<usize>,
}

fn default_subnet_configuration() -> Vec<SubnetConfig> {
    vec![
        SubnetConfig::sized_by_default("Public", SubnetType::Public),
        SubnetConfig::sized_by_default("Private", SubnetType::Private),
    ]
}

/// Handle to one subnet emitted by a [`Vpc`].
#[derive(Debug, Clone)]
pub struct SubnetRef {
    /// Logical id of the `AWS::EC2::Subnet` resource.
    pub logical_id: String,
    /// Placement class of the subnet.
    pub subnet_type: SubnetType,
    /// Group name from the originating configuration.
    pub group_name: String,
    /// Availability zone the subnet lands in.
    pub availability_zone: String,
}

/// A VPC construct and handles to the subnets it declared.
#[derive(Debug, Clone)]
pub struct Vpc {
    logical_id: String,
    subnets: Vec<SubnetRef>,
}

impl Vpc {
    /// Declares a VPC and its networking graph as children of `stack`.
    ///
    /// Construct-tree violations (duplicate logical ids) fail immediately;
    /// address-math and layout problems are recorded on the stack and fail
    /// at synthesis.
    pub fn new(stack: &mut Stack, id: &str, props: VpcProps) -> Result<Self> {
        let logical_id = sanitize_id(id);

        let cidr_str = props.cidr.clone().unwrap_or_else(|| DEFAULT_CIDR.to_string());
        let configs = props
            .subnet_configuration
            .clone()
            .unwrap_or_else(default_subnet_configuration);
        let zones = stack.env().zone_names();

        let mut vpc_resource = CfnResource::new(&logical_id, VPC_RESOURCE_TYPE)
            .with_property("CidrBlock", json!(cidr_str))
            .with_property("EnableDnsSupport", json!(true))
            .with_property("EnableDnsHostnames", json!(true))
            .with_property("InstanceTenancy", json!("default"));
        vpc_resource
            .tags_mut()
            .set_tag("Name", format!("{}/{}", stack.name(), id));
        stack.add_resource(vpc_resource)?;

        let mut vpc = Self {
            logical_id,
            subnets: Vec::new(),
        };

        // Group names must be unique within the VPC.
        for (i, config) in configs.iter().enumerate() {
            if configs[..i].iter().any(|c| c.name == config.name) {
                stack.record_error(Error::subnet_config(
                    id,
                    format!("duplicate subnet group name '{}'", config.name),
                ));
                return Ok(vpc);
            }
        }

        let parent = match Ipv4Cidr::parse(&cidr_str) {
            Ok(parent) => parent,
            Err(err) => {
                stack.record_error(err);
                return Ok(vpc);
            }
        };

        let default_mask = if configs.iter().any(|c| c.cidr_mask.is_none()) {
            match even_division_mask(&parent, configs.len() * zones.len()) {
                Ok(mask) => Some(mask),
                Err(err) => {
                    stack.record_error(err);
                    return Ok(vpc);
                }
            }
        } else {
            None
        };

        let mut allocator = CidrAllocator::new(parent);
        for config in &configs {
            let mask = match (config.cidr_mask, default_mask) {
                (Some(mask), _) => mask,
                (None, Some(mask)) => mask,
                (None, None) => unreachable!("default mask computed when any config omits one"),
            };
            for (zone_index, zone) in zones.iter().enumerate() {
                let block = match allocator.allocate(mask) {
                    Ok(block) => block,
                    Err(err) => {
                        stack.record_error(err);
                        return Ok(vpc);
                    }
                };
                vpc.emit_subnet(stack, id, config, zone, zone_index, block)?;
            }
        }

        vpc.emit_routing(stack, id, &props, &zones)?;
        Ok(vpc)
    }

    fn emit_subnet(
        &mut self,
        stack: &mut Stack,
        id: &str,
        config: &SubnetConfig,
        zone: &str,
        zone_index: usize,
        block: Ipv4Cidr,
    ) -> Result<()> {
        let subnet_id = sanitize_id(&format!(
            "{}{}Subnet{}",
            self.logical_id,
            config.name,
            zone_index + 1
        ));
        let mut subnet = CfnResource::new(&subnet_id, SUBNET_RESOURCE_TYPE)
            .with_property("VpcId", cfn_ref(&self.logical_id))
            .with_property("CidrBlock", json!(block.to_string()))
            .with_property("AvailabilityZone", json!(zone));
        if config.subnet_type == SubnetType::Public {
            subnet.set_property("MapPublicIpOnLaunch", json!(true));
        }
        subnet.tags_mut().set_tag(
            "Name",
            format!("{}/{}/{}Subnet{}", stack.name(), id, config.name, zone_index + 1),
        );
        subnet.tags_mut().set_tag("rustack:subnet-name", &config.name);
        subnet
            .tags_mut()
            .set_tag("rustack:subnet-type", config.subnet_type.to_string());
        stack.add_resource(subnet)?;

        self.subnets.push(SubnetRef {
            logical_id: subnet_id,
            subnet_type: config.subnet_type,
            group_name: config.name.clone(),
            availability_zone: zone.to_string(),
        });
        Ok(())
    }

    /// Emits route tables, the internet gateway, and NAT gateways for the
    /// subnets declared so far.
    fn emit_routing(
        &self,
        stack: &mut Stack,
        id: &str,
        props: &VpcProps,
        zones: &[String],
    ) -> Result<()> {
        let has_public = self.subnets_of_type(SubnetType::Public).next().is_some();
        let has_private = self.subnets_of_type(SubnetType::Private).next().is_some();

        let igw_id = sanitize_id(&format!("{}IGW", self.logical_id));
        let attachment_id = sanitize_id(&format!("{}VPCGW", self.logical_id));
        if has_public {
            let mut igw = CfnResource::new(&igw_id, "AWS::EC2::InternetGateway");
            igw.tags_mut()
                .set_tag("Name", format!("{}/{}", stack.name(), id));
            stack.add_resource(igw)?;
            stack.add_resource(
                CfnResource::new(&attachment_id, "AWS::EC2::VPCGatewayAttachment")
                    .with_property("VpcId", cfn_ref(&self.logical_id))
                    .with_property("InternetGatewayId", cfn_ref(&igw_id)),
            )?;
        }

        // NAT gateways live in public subnets, spread one per zone.
        let nat_count = if has_public && has_private {
            props.nat_gateways.unwrap_or(zones.len())
        } else {
            0
        };
        let mut nat_ids = Vec::new();
        for public in self
            .subnets_of_type(SubnetType::Public)
            .take(nat_count)
        {
            let eip_id = format!("{}EIP", public.logical_id);
            let nat_id = format!("{}NATGateway", public.logical_id);
            stack.add_resource(
                CfnResource::new(&eip_id, "AWS::EC2::EIP")
                    .with_property("Domain", json!("vpc"))
                    .with_depends_on(&attachment_id),
            )?;
            stack.add_resource(
                CfnResource::new(&nat_id, "AWS::EC2::NatGateway")
                    .with_property("SubnetId", cfn_ref(&public.logical_id))
                    .with_property("AllocationId", get_att(&eip_id, "AllocationId")),
            )?;
            nat_ids.push(nat_id);
        }

        for (index, subnet) in self.subnets.iter().enumerate() {
            let table_id = format!("{}RouteTable", subnet.logical_id);
            let mut table = CfnResource::new(&table_id, "AWS::EC2::RouteTable")
                .with_property("VpcId", cfn_ref(&self.logical_id));
            table
                .tags_mut()
                .set_tag("Name", format!("{}/{}/{}", stack.name(), id, subnet.logical_id));
            stack.add_resource(table)?;
            stack.add_resource(
                CfnResource::new(
                    format!("{}RouteTableAssociation", subnet.logical_id),
                    "AWS::EC2::SubnetRouteTableAssociation",
                )
                .with_property("SubnetId", cfn_ref(&subnet.logical_id))
                .with_property("RouteTableId", cfn_ref(&table_id)),
            )?;

            match subnet.subnet_type {
                SubnetType::Public => {
                    stack.add_resource(
                        CfnResource::new(
                            format!("{}DefaultRoute", subnet.logical_id),
                            "AWS::EC2::Route",
                        )
                        .with_property("RouteTableId", cfn_ref(&table_id))
                        .with_property("DestinationCidrBlock", json!("0.0.0.0/0"))
                        .with_property("GatewayId", cfn_ref(&igw_id))
                        .with_depends_on(&attachment_id),
                    )?;
                }
                SubnetType::Private if !nat_ids.is_empty() => {
                    // Pair each private subnet with the NAT gateway in its
                    // zone, falling back round-robin when there are fewer
                    // gateways than zones.
                    let zone_index = zones
                        .iter()
                        .position(|z| z == &subnet.availability_zone)
                        .unwrap_or(index);
                    let nat_id = &nat_ids[zone_index % nat_ids.len()];
                    stack.add_resource(
                        CfnResource::new(
                            format!("{}DefaultRoute", subnet.logical_id),
                            "AWS::EC2::Route",
                        )
                        .with_property("RouteTableId", cfn_ref(&table_id))
                        .with_property("DestinationCidrBlock", json!("0.0.0.0/0"))
                        .with_property("NatGatewayId", cfn_ref(nat_id)),
                    )?;
                }
                // Isolated subnets (and private ones without NAT) get no
                // default route.
                _ => {}
            }
        }
        Ok(())
    }

    /// Logical id of the `AWS::EC2::VPC` resource.
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// Handles to every declared subnet, in declaration order.
    pub fn subnets(&self) -> &[SubnetRef] {
        &self.subnets
    }

    /// Subnets of one placement class.
    pub fn subnets_of_type(&self, subnet_type: SubnetType) -> impl Iterator<Item = &SubnetRef> {
        self.subnets
            .iter()
            .filter(move |s| s.subnet_type == subnet_type)
    }

    /// Sets a tag on the VPC resource itself.
    ///
    /// Used for discovery tags such as `kubernetes.io/cluster/<name>`.
    pub fn set_tag(
        &self,
        stack: &mut Stack,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        let resource = stack
            .resource_mut(&self.logical_id)
            .ok_or_else(|| Error::Internal(format!("VPC '{}' missing from stack", self.logical_id)))?;
        resource.tags_mut().set_tag(key, value);
        Ok(())
    }
}

/// EC2 instance family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceClass {
    /// `t2` burstable instances.
    Burstable2,
    /// `t3` burstable instances.
    Burstable3,
    /// `m5` general-purpose instances.
    Standard5,
    /// `c5` compute-optimized instances.
    Compute5,
    /// `r5` memory-optimized instances.
    Memory5,
}

impl InstanceClass {
    fn api_name(self) -> &'static str {
        match self {
            InstanceClass::Burstable2 => "t2",
            InstanceClass::Burstable3 => "t3",
            InstanceClass::Standard5 => "m5",
            InstanceClass::Compute5 => "c5",
            InstanceClass::Memory5 => "r5",
        }
    }
}

/// EC2 instance size within a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceSize {
    Micro,
    Small,
    Medium,
    Large,
    Xlarge,
}

impl InstanceSize {
    fn api_name(self) -> &'static str {
        match self {
            InstanceSize::Micro => "micro",
            InstanceSize::Small => "small",
            InstanceSize::Medium => "medium",
            InstanceSize::Large => "large",
            InstanceSize::Xlarge => "xlarge",
        }
    }
}

/// A typed class/size pair rendering to the API instance type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceType {
    class: InstanceClass,
    size: InstanceSize,
}

impl InstanceType {
    /// Pairs an instance class with a size.
    pub fn new(class: InstanceClass, size: InstanceSize) -> Self {
        Self { class, size }
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class.api_name(), self.size.api_name())
    }
}

/// The latest Amazon Linux machine image, resolved per region.
///
/// Synthesis is offline and deterministic, so the image id comes from a
/// fixed per-region table instead of an SSM parameter lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmazonLinuxImage;

impl AmazonLinuxImage {
    /// Resolves the AMI id for a region.
    pub fn image_id(&self, region: &str) -> Result<&'static str> {
        match region {
            "us-east-1" => Ok("ami-0b69ea66ff7391e80"),
            "us-east-2" => Ok("ami-00c03f7f7f2ec15c3"),
            "us-west-2" => Ok("ami-04b762b4289fba92b"),
            "eu-west-1" => Ok("ami-01f14919ba412de34"),
            "eu-central-1" => Ok("ami-0f3a43fbf2d3899f7"),
            other => Err(Error::UnknownRegion(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Environment;
    use pretty_assertions::assert_eq;

    fn stack() -> Stack {
        Stack::new("Test", Environment::default())
    }

    #[test]
    fn test_default_vpc_layout() {
        let mut stack = stack();
        let vpc = Vpc::new(&mut stack, "Vpc", VpcProps::default()).unwrap();

        // Two groups x two zones.
        assert_eq!(vpc.subnets().len(), 4);
        assert_eq!(vpc.subnets_of_type(SubnetType::Public).count(), 2);
        assert_eq!(vpc.subnets_of_type(SubnetType::Private).count(), 2);

        let template = stack.synth().unwrap();
        assert_eq!(template.resources_of_type(VPC_RESOURCE_TYPE).len(), 1);
        assert_eq!(template.resources_of_type(SUBNET_RESOURCE_TYPE).len(), 4);
        assert_eq!(template.resources_of_type("AWS::EC2::InternetGateway").len(), 1);
        assert_eq!(template.resources_of_type("AWS::EC2::NatGateway").len(), 2);
        assert_eq!(
            template.resource("Vpc").unwrap()["Properties"]["CidrBlock"],
            json!(DEFAULT_CIDR)
        );
    }

    #[test]
    fn test_default_masks_divide_evenly() {
        let mut stack = stack();
        let vpc = Vpc::new(&mut stack, "Vpc", VpcProps::default()).unwrap();
        let template = stack.synth().unwrap();

        // 4 subnets in a /16 -> /18 each.
        for subnet in vpc.subnets() {
            let decl = template.resource(&subnet.logical_id).unwrap();
            let block = decl["Properties"]["CidrBlock"].as_str().unwrap();
            assert!(block.ends_with("/18"), "unexpected block {block}");
        }
    }

    #[test]
    fn test_explicit_masks_do_not_overlap() {
        let mut stack = stack();
        let props = VpcProps {
            cidr: Some("192.168.0.0/16".into()),
            subnet_configuration: Some(vec![
                SubnetConfig::new("App", SubnetType::Private, 21),
                SubnetConfig::new("PublicLoadBalancers", SubnetType::Public, 24),
                SubnetConfig::new("RdsDatabases", SubnetType::Isolated, 27),
            ]),
            nat_gateways: None,
        };
        let vpc = Vpc::new(&mut stack, "Vpc", props).unwrap();
        let template = stack.synth().unwrap();

        let blocks: Vec<Ipv4Cidr> = vpc
            .subnets()
            .iter()
            .map(|s| {
                let decl = template.resource(&s.logical_id).unwrap();
                Ipv4Cidr::parse(decl["Properties"]["CidrBlock"].as_str().unwrap()).unwrap()
            })
            .collect();
        let parent = Ipv4Cidr::parse("192.168.0.0/16").unwrap();
        for (i, a) in blocks.iter().enumerate() {
            assert!(parent.contains(a.network()));
            for b in &blocks[i + 1..] {
                assert!(!a.overlaps(b), "{a} overlaps {b}");
            }
        }
    }

    #[test]
    fn test_mask_that_does_not_fit_fails_at_synth() {
        let mut stack = stack();
        let props = VpcProps {
            cidr: Some("10.0.0.0/24".into()),
            subnet_configuration: Some(vec![SubnetConfig::new(
                "Big",
                SubnetType::Public,
                16,
            )]),
            nat_gateways: None,
        };
        // Construction succeeds; the failure is deferred.
        let vpc = Vpc::new(&mut stack, "Vpc", props).unwrap();
        assert!(vpc.subnets().is_empty());
        assert!(matches!(stack.synth(), Err(Error::SynthFailed { .. })));
    }

    #[test]
    fn test_duplicate_group_name_fails_at_synth() {
        let mut stack = stack();
        let props = VpcProps {
            cidr: None,
            subnet_configuration: Some(vec![
                SubnetConfig::new("App", SubnetType::Public, 24),
                SubnetConfig::new("App", SubnetType::Private, 24),
            ]),
            nat_gateways: None,
        };
        Vpc::new(&mut stack, "Vpc", props).unwrap();
        assert!(stack.synth().is_err());
    }

    #[test]
    fn test_public_subnets_map_public_ips() {
        let mut stack = stack();
        let props = VpcProps {
            cidr: None,
            subnet_configuration: Some(vec![SubnetConfig::new(
                "public",
                SubnetType::Public,
                24,
            )]),
            nat_gateways: None,
        };
        let vpc = Vpc::new(&mut stack, "Vpc", props).unwrap();
        let template = stack.synth().unwrap();
        for subnet in vpc.subnets() {
            let decl = template.resource(&subnet.logical_id).unwrap();
            assert_eq!(decl["Properties"]["MapPublicIpOnLaunch"], json!(true));
        }
        // Public-only layout: no NAT gateways.
        assert!(template.resources_of_type("AWS::EC2::NatGateway").is_empty());
    }

    #[test]
    fn test_isolated_subnets_have_no_default_route() {
        let mut stack = stack();
        let props = VpcProps {
            cidr: None,
            subnet_configuration: Some(vec![SubnetConfig::new(
                "RdsDatabases",
                SubnetType::Isolated,
                27,
            )]),
            nat_gateways: None,
        };
        Vpc::new(&mut stack, "Vpc", props).unwrap();
        let template = stack.synth().unwrap();
        assert!(template.resources_of_type("AWS::EC2::Route").is_empty());
        assert!(template.resources_of_type("AWS::EC2::InternetGateway").is_empty());
        // Route tables still exist and are associated.
        assert_eq!(template.resources_of_type("AWS::EC2::RouteTable").len(), 2);
    }

    #[test]
    fn test_subnet_tags_carry_group_and_type() {
        let mut stack = stack();
        let props = VpcProps {
            cidr: None,
            subnet_configuration: Some(vec![SubnetConfig::new(
                "EksPublic",
                SubnetType::Public,
                24,
            )]),
            nat_gateways: None,
        };
        let vpc = Vpc::new(&mut stack, "Vpc", props).unwrap();
        let template = stack.synth().unwrap();
        let first = &vpc.subnets()[0];
        let tags = &template.resource(&first.logical_id).unwrap()["Properties"]["Tags"];
        let tags: Vec<(String, String)> = tags
            .as_array()
            .unwrap()
            .iter()
            .map(|t| {
                (
                    t["Key"].as_str().unwrap().to_string(),
                    t["Value"].as_str().unwrap().to_string(),
                )
            })
            .collect();
        assert!(tags.contains(&("rustack:subnet-name".into(), "EksPublic".into())));
        assert!(tags.contains(&("rustack:subnet-type".into(), "Public".into())));
    }

    #[test]
    fn test_instance_type_display() {
        let it = InstanceType::new(InstanceClass::Burstable3, InstanceSize::Micro);
        assert_eq!(it.to_string(), "t3.micro");
        let it = InstanceType::new(InstanceClass::Memory5, InstanceSize::Xlarge);
        assert_eq!(it.to_string(), "r5.xlarge");
    }

    #[test]
    fn test_amazon_linux_image_lookup() {
        let image = AmazonLinuxImage;
        assert!(image.image_id("us-east-1").is_ok());
        assert!(matches!(
            image.image_id("mars-north-1"),
            Err(Error::UnknownRegion(_))
        ));
    }

    #[test]
    fn test_vpc_set_tag() {
        let mut stack = stack();
        let vpc = Vpc::new(&mut stack, "Vpc", VpcProps::default()).unwrap();
        vpc.set_tag(&mut stack, "kubernetes.io/cluster/PublicEks", "shared")
            .unwrap();
        let template = stack.synth().unwrap();
        let tags = &template.resource("Vpc").unwrap()["Properties"]["Tags"];
        assert!(tags
            .as_array()
            .unwrap()
            .iter()
            .any(|t| t["Key"] == "kubernetes.io/cluster/PublicEks" && t["Value"] == "shared"));
    }
}
