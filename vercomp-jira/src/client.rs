//! Jira REST v2 endpoints for project versions and components.
//!
//! ```text
//! GET  {base}/rest/api/2/project/{key}/versions | components
//! POST {base}/rest/api/2/version | component          {name, project}
//! PUT  {base}/rest/api/2/version/{id} | component/{id}  partial fields
//! GET  {base}/rest/api/2/myself
//! GET  {base}/rest/api/2/project/{key}
//! ```

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use vercomp_core::{Attributes, AuthConfig, CloneConfig, Entity, EntityKind, ProjectKey};
use vercomp_sync::RemoteCollection;

use crate::JiraError;

/// Blocking client bound to one server and one set of credentials.
pub struct JiraClient {
    agent: ureq::Agent,
    base_url: String,
    authorization: String,
}

impl JiraClient {
    pub fn new(base_url: &str, auth: &AuthConfig, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: authorization(auth),
        }
    }

    pub fn from_config(config: &CloneConfig) -> Self {
        Self::new(
            &config.base_url,
            &config.auth,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The authenticated user, as Jira describes it.
    pub fn myself(&self) -> Result<Value, JiraError> {
        self.get("myself")
    }

    /// Project metadata; a 404 means the key does not exist or is not visible.
    pub fn project(&self, key: &ProjectKey) -> Result<Value, JiraError> {
        self.get(&format!("project/{key}"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/rest/api/2/{path}", self.base_url)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, JiraError> {
        let url = self.url(path);
        tracing::debug!("GET {url}");
        let response = self
            .agent
            .get(&url)
            .set("Authorization", &self.authorization)
            .set("Accept", "application/json")
            .call()
            .map_err(|e| JiraError::from_ureq("GET", &url, e))?;
        decode("GET", &url, response)
    }

    fn send<T: DeserializeOwned>(
        &self,
        method: &'static str,
        path: &str,
        body: impl Serialize,
    ) -> Result<T, JiraError> {
        let url = self.url(path);
        tracing::debug!("{method} {url}");
        let response = self
            .agent
            .request(method, &url)
            .set("Authorization", &self.authorization)
            .set("Accept", "application/json")
            .send_json(body)
            .map_err(|e| JiraError::from_ureq(method, &url, e))?;
        decode(method, &url, response)
    }
}

fn decode<T: DeserializeOwned>(
    method: &'static str,
    url: &str,
    response: ureq::Response,
) -> Result<T, JiraError> {
    response.into_json().map_err(|e| JiraError::Decode {
        method,
        url: url.to_string(),
        source: e,
    })
}

/// `Authorization` header value for `auth`.
pub fn authorization(auth: &AuthConfig) -> String {
    match auth {
        AuthConfig::Basic { user, password } => {
            let pair = format!("{user}:{}", password.as_deref().unwrap_or_default());
            format!("Basic {}", STANDARD.encode(pair))
        }
        AuthConfig::Token { token } => {
            format!("Bearer {}", token.as_deref().unwrap_or_default())
        }
    }
}

impl RemoteCollection for JiraClient {
    type Error = JiraError;

    fn list(&self, kind: EntityKind, project: &ProjectKey) -> Result<Vec<Entity>, JiraError> {
        self.get(&format!("project/{project}/{}", kind.plural()))
    }

    fn create(
        &self,
        kind: EntityKind,
        project: &ProjectKey,
        name: &str,
    ) -> Result<Entity, JiraError> {
        self.send(
            "POST",
            kind.as_str(),
            json!({ "name": name, "project": project.as_str() }),
        )
    }

    fn update(
        &self,
        kind: EntityKind,
        id: &str,
        fields: &Attributes,
    ) -> Result<Entity, JiraError> {
        self.send("PUT", &format!("{kind}/{id}"), fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_authorization_is_base64_pair() {
        let auth = AuthConfig::Basic {
            user: "jdoe".into(),
            password: Some("hunter2".into()),
        };
        assert_eq!(authorization(&auth), "Basic amRvZTpodW50ZXIy");
    }

    #[test]
    fn token_authorization_is_bearer() {
        let auth = AuthConfig::Token {
            token: Some("pat-123".into()),
        };
        assert_eq!(authorization(&auth), "Bearer pat-123");
    }

    #[test]
    fn urls_ignore_trailing_slash() {
        let client = JiraClient::new(
            "http://localhost:8080/",
            &AuthConfig::Token { token: None },
            Duration::from_secs(1),
        );
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(
            client.url("project/SRC/versions"),
            "http://localhost:8080/rest/api/2/project/SRC/versions"
        );
    }
}
