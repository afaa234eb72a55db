pub mod check;
pub mod clone;

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use vercomp_core::{config, CloneConfig};
use vercomp_jira::JiraClient;

/// Load `path`, or `~/.vercomp/config.yaml` when none was given.
pub(crate) fn load_config(path: Option<&Path>) -> Result<CloneConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config::default_path().context("could not locate default config")?,
    };
    config::load_at(&path).with_context(|| format!("failed to load config '{}'", path.display()))
}

/// Log in and make sure both projects are visible before anything else happens.
///
/// Returns the client and a label for the logged-in user.
pub(crate) fn connect(config: &CloneConfig) -> Result<(JiraClient, String)> {
    tracing::debug!("connecting to Jira: {}", config.base_url);
    let client = JiraClient::from_config(config);

    let me = client
        .myself()
        .with_context(|| format!("failed to log in to {}", config.base_url))?;
    let user = user_label(&me).to_string();
    tracing::info!("logged in as {user}");

    for key in [&config.source_project, &config.dest_project] {
        client
            .project(key)
            .with_context(|| format!("project {key} is not accessible"))?;
    }
    Ok((client, user))
}

pub(crate) fn user_label(user: &Value) -> &str {
    ["key", "name", "accountId"]
        .iter()
        .find_map(|field| user.get(*field).and_then(Value::as_str))
        .unwrap_or("<unknown>")
}
