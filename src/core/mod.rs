//! Construct tree core: apps, stacks, resources, and tags.
//!
//! The ownership hierarchy is explicit: an [`App`](app::App) owns its
//! [`Stack`](stack::Stack)s, and each stack exclusively owns the
//! [`CfnResource`](resource::CfnResource) declarations its constructs emit.
//! Nothing is shared across stacks.

pub mod app;
pub mod resource;
pub mod stack;

pub use app::{App, Assembly};
pub use resource::{CfnResource, TagManager};
pub use stack::{sanitize_id, validate_logical_id, Environment, Stack};
