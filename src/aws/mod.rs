//! Typed L2 constructs for AWS resources.
//!
//! Each construct takes a configuration record and declares its low-level
//! resources as children of a stack. The typed surface covers the common
//! properties; anything it does not expose can still be reached through
//! [`CfnResource::override_property`](crate::core::CfnResource::override_property).

pub mod autoscaling;
pub mod ec2;
pub mod sns;
pub mod sqs;
