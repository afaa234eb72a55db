//! YAML clone configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.vercomp/
//!   config.yaml    (default; any path can be passed with --config)
//! ```
//!
//! # API pattern
//!
//! - `fn_at(home: &Path, …)` — explicit home; used in tests with `TempDir`
//! - `fn(…)` — derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Secrets may be left out of the file and supplied through
//! [`TOKEN_ENV`] / [`PASSWORD_ENV`] instead.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{invalid, ConfigError};
use crate::types::{EntityKind, ProjectKey, Selection};

/// Fills `auth.token` when the file omits it.
pub const TOKEN_ENV: &str = "VERCOMP_TOKEN";
/// Fills `auth.password` when the file omits it.
pub const PASSWORD_ENV: &str = "VERCOMP_PASSWORD";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// How to authenticate against the Jira server.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum AuthConfig {
    /// Username + password (HTTP basic).
    Basic {
        user: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
    },
    /// Personal access token (HTTP bearer).
    Token {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthConfig::Basic { user, password } => f
                .debug_struct("Basic")
                .field("user", user)
                .field("password", &password.as_ref().map(|_| "<redacted>"))
                .finish(),
            AuthConfig::Token { token } => f
                .debug_struct("Token")
                .field("token", &token.as_ref().map(|_| "<redacted>"))
                .finish(),
        }
    }
}

/// Everything one clone run needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneConfig {
    pub base_url: String,
    pub auth: AuthConfig,
    pub source_project: ProjectKey,
    pub dest_project: ProjectKey,
    #[serde(default)]
    pub components: Selection,
    #[serde(default)]
    pub versions: Selection,
    /// Leave every cloned version unarchived so issues can be moved to it.
    #[serde(default)]
    pub unarchive: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl CloneConfig {
    pub fn selection(&self, kind: EntityKind) -> &Selection {
        match kind {
            EntityKind::Component => &self.components,
            EntityKind::Version => &self.versions,
        }
    }

    /// Fill secrets the file left out from `lookup` (normally the process environment).
    pub fn fill_secrets(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        match &mut self.auth {
            AuthConfig::Basic { password, .. } if password.is_none() => {
                *password = lookup(PASSWORD_ENV);
            }
            AuthConfig::Token { token } if token.is_none() => {
                *token = lookup(TOKEN_ENV);
            }
            _ => {}
        }
    }

    /// Check every field before any remote call is attempted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let host = self
            .base_url
            .strip_prefix("https://")
            .or_else(|| self.base_url.strip_prefix("http://"));
        match host {
            Some(rest) if !rest.trim_matches('/').is_empty() => {}
            _ => {
                return Err(invalid(
                    "base_url",
                    format!("'{}' does not look like a valid URL", self.base_url),
                ))
            }
        }

        for (field, key) in [
            ("source_project", &self.source_project),
            ("dest_project", &self.dest_project),
        ] {
            if !key.is_well_formed() {
                return Err(invalid(
                    field,
                    format!("expected an uppercase project key, not '{key}'"),
                ));
            }
        }
        if self.source_project == self.dest_project {
            return Err(invalid(
                "dest_project",
                format!("must differ from source_project '{}'", self.source_project),
            ));
        }

        if self.components.is_none() && self.versions.is_none() {
            return Err(invalid(
                "versions",
                "nothing to copy; set 'versions' and/or 'components'",
            ));
        }
        for (field, selection) in [("components", &self.components), ("versions", &self.versions)]
        {
            if let Selection::Named(names) = selection {
                if names.is_empty() {
                    return Err(invalid(field, "empty list; use 'none' to copy nothing"));
                }
                if names.iter().any(|n| n.trim().is_empty()) {
                    return Err(invalid(field, "names must not be empty"));
                }
            }
        }

        match &self.auth {
            AuthConfig::Basic { user, password } => {
                if user.trim().is_empty() {
                    return Err(invalid("auth.user", "required for basic auth"));
                }
                if password.as_deref().map_or(true, str::is_empty) {
                    return Err(invalid(
                        "auth.password",
                        format!("required for basic auth (or set {PASSWORD_ENV})"),
                    ));
                }
            }
            AuthConfig::Token { token } => {
                if token.as_deref().map_or(true, str::is_empty) {
                    return Err(invalid(
                        "auth.token",
                        format!("required for token auth (or set {TOKEN_ENV})"),
                    ));
                }
            }
        }

        if self.timeout_secs == 0 {
            return Err(invalid("timeout_secs", "must be greater than zero"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.vercomp/config.yaml` — pure, no I/O.
pub fn default_path_at(home: &Path) -> PathBuf {
    home.join(".vercomp").join("config.yaml")
}

/// `default_path_at` convenience wrapper.
pub fn default_path() -> Result<PathBuf, ConfigError> {
    Ok(default_path_at(&home()?))
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Parse a configuration document without touching the environment.
pub fn parse(contents: &str, path: &Path) -> Result<CloneConfig, ConfigError> {
    serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load, fill secrets from the environment, and validate.
///
/// Returns `ConfigError::NotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML,
/// `ConfigError::Invalid` if a field is unusable.
pub fn load_at(path: &Path) -> Result<CloneConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut config = parse(&contents, path)?;
    config.fill_secrets(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

/// Load from `~/.vercomp/config.yaml`.
pub fn load() -> Result<CloneConfig, ConfigError> {
    load_at(&default_path()?)
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
