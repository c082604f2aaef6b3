//! # Rustack - Typed Infrastructure Stacks
//!
//! Rustack is a small infrastructure-as-code construct library: you declare
//! AWS resources as typed configuration objects grouped into named stacks,
//! and a single synthesis pass renders them into deterministic
//! CloudFormation templates.
//!
//! ## Core Concepts
//!
//! - **App**: the top-level construct holding an ordered set of stacks
//! - **Stack**: one deployable unit that exclusively owns its resources
//! - **Constructs**: typed builders (VPC, autoscaling group, topic, queue)
//!   that emit low-level resource declarations into a stack
//! - **Override**: an escape hatch that force-sets a raw resource property
//!   the typed surface does not expose
//! - **Synthesis**: the pass that validates the declared graph and renders
//!   one template per stack
//!
//! ## Quick Example
//!
//! ```rust
//! use rustack::aws::ec2::{SubnetConfig, SubnetType, Vpc, VpcProps};
//! use rustack::core::{App, Environment, Stack};
//!
//! # fn main() -> rustack::error::Result<()> {
//! let mut stack = Stack::new("WebApp", Environment::default());
//! Vpc::new(
//!     &mut stack,
//!     "Vpc",
//!     VpcProps {
//!         cidr: Some("192.168.0.0/16".to_string()),
//!         subnet_configuration: Some(vec![
//!             SubnetConfig::new("App", SubnetType::Private, 21),
//!             SubnetConfig::new("PublicLoadBalancers", SubnetType::Public, 24),
//!         ]),
//!         ..VpcProps::default()
//!     },
//! )?;
//!
//! let mut app = App::new();
//! app.add_stack(stack)?;
//! let assembly = app.synth()?;
//! println!("{}", assembly.template("WebApp")?.to_yaml()?);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::aws::autoscaling::{AutoScalingGroup, AutoScalingGroupProps};
    pub use crate::aws::ec2::{
        AmazonLinuxImage, InstanceClass, InstanceSize, InstanceType, SubnetConfig, SubnetType,
        Vpc, VpcProps,
    };
    pub use crate::aws::sns::Topic;
    pub use crate::aws::sqs::{Queue, QueueProps};
    pub use crate::cidr::Ipv4Cidr;
    pub use crate::config::Config;
    pub use crate::core::{App, Assembly, CfnResource, Environment, Stack, TagManager};
    pub use crate::error::{Error, Result};
    pub use crate::template::Template;
}

// ============================================================================
// Core Modules
// ============================================================================

/// Error types and result aliases for Rustack operations.
pub mod error;

/// IPv4 CIDR arithmetic used for VPC subnet partitioning.
pub mod cidr;

/// Construct tree core: apps, stacks, resources, tags.
pub mod core;

/// CloudFormation template model and rendering.
pub mod template;

// ============================================================================
// Constructs
// ============================================================================

/// Typed L2 constructs for AWS resources.
pub mod aws;

/// The example deployment scenarios assembled by the CLI.
pub mod stacks;

// ============================================================================
// CLI Support
// ============================================================================

/// Command-line interface definitions and command execution.
pub mod cli;

/// Configuration loading and merging.
pub mod config;

/// Returns the current version of Rustack.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
