//! # vercomp-jira
//!
//! Blocking Jira REST v2 client implementing [`vercomp_sync::RemoteCollection`].

pub mod client;
pub mod error;

pub use client::JiraClient;
pub use error::JiraError;
