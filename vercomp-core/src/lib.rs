//! vercomp core library — domain types, clone configuration, errors.
//!
//! - [`types`] — entity kinds, entities, selection policies, project keys
//! - [`config`] — load / validate the YAML clone configuration
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{AuthConfig, CloneConfig};
pub use error::ConfigError;
pub use types::{Attributes, Entity, EntityKind, ProjectKey, Selection};
