//! Error types for Rustack.
//!
//! This module defines the error types used throughout Rustack, covering
//! construct-tree violations, CIDR arithmetic failures, and synthesis-time
//! validation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Rustack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Rustack.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Construct Tree Errors
    // ========================================================================
    /// A stack with the same name was already added to the app.
    #[error("Stack '{0}' already exists in the app")]
    DuplicateStack(String),

    /// A resource with the same logical id was already added to the stack.
    #[error("Logical id '{logical_id}' already exists in stack '{stack}'")]
    DuplicateResource {
        /// Stack name
        stack: String,
        /// Colliding logical id
        logical_id: String,
    },

    /// A construct id contains characters that cannot form a logical id.
    #[error("Invalid construct id '{0}': ids must be non-empty and alphanumeric")]
    InvalidId(String),

    /// No resource of the requested type exists in the stack.
    ///
    /// Raised by the override lookup instead of letting a missing match
    /// propagate as a panic.
    #[error("No resource of type '{resource_type}' found in stack '{stack}'")]
    ResourceNotFound {
        /// Stack that was searched
        stack: String,
        /// CloudFormation resource type discriminator
        resource_type: String,
    },

    /// A stack name given on the command line does not exist in the app.
    #[error("Stack '{0}' not found; run `rustack list` to see available stacks")]
    StackNotFound(String),

    // ========================================================================
    // CIDR Errors
    // ========================================================================
    /// A CIDR string failed to parse.
    #[error("Invalid CIDR '{cidr}': {message}")]
    InvalidCidr {
        /// The offending CIDR string
        cidr: String,
        /// Reason it was rejected
        message: String,
    },

    /// A subnet allocation did not fit in the remaining address space.
    #[error("Address space exhausted in {block}: cannot carve a /{mask} subnet")]
    CidrExhausted {
        /// Parent address block
        block: String,
        /// Requested subnet mask length
        mask: u8,
    },

    // ========================================================================
    // Synthesis Errors
    // ========================================================================
    /// A VPC subnet configuration is inconsistent.
    #[error("Invalid subnet configuration for '{vpc}': {message}")]
    SubnetConfig {
        /// VPC construct id
        vpc: String,
        /// Reason the configuration was rejected
        message: String,
    },

    /// Errors were recorded against a stack during construction and surfaced
    /// when the stack was synthesized.
    #[error("Synthesis of stack '{stack}' failed: {message}")]
    SynthFailed {
        /// Stack name
        stack: String,
        /// First recorded error
        message: String,
    },

    /// No machine image is known for the requested region.
    #[error("No machine image mapping for region '{0}'")]
    UnknownRegion(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidConfig {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // ========================================================================
    // Other Errors
    // ========================================================================
    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a new duplicate resource error.
    pub fn duplicate_resource(stack: impl Into<String>, logical_id: impl Into<String>) -> Self {
        Self::DuplicateResource {
            stack: stack.into(),
            logical_id: logical_id.into(),
        }
    }

    /// Creates a new resource-not-found error.
    pub fn resource_not_found(stack: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            stack: stack.into(),
            resource_type: resource_type.into(),
        }
    }

    /// Creates a new invalid CIDR error.
    pub fn invalid_cidr(cidr: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidCidr {
            cidr: cidr.into(),
            message: message.into(),
        }
    }

    /// Creates a new subnet configuration error.
    pub fn subnet_config(vpc: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SubnetConfig {
            vpc: vpc.into(),
            message: message.into(),
        }
    }

    /// Creates a new synthesis failure for a stack.
    pub fn synth_failed(stack: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SynthFailed {
            stack: stack.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::SynthFailed { .. }
            | Error::SubnetConfig { .. }
            | Error::CidrExhausted { .. }
            | Error::InvalidCidr { .. } => 2,
            Error::DuplicateStack(_)
            | Error::DuplicateResource { .. }
            | Error::InvalidId(_)
            | Error::ResourceNotFound { .. } => 3,
            Error::StackNotFound(_) => 4,
            Error::Config(_) | Error::InvalidConfig { .. } | Error::TomlParse(_) => 5,
            _ => 1,
        }
    }
}
