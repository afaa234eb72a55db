//! Domain types shared by the cloner crates.
//!
//! Entities are kept as raw attribute maps exactly as the remote returns them;
//! only the handful of attributes the reconciler reasons about get accessors.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Raw attribute map of a remote entity. Iteration follows insertion order.
pub type Attributes = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A Jira project key such as `SRCPROJ`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectKey(pub String);

impl ProjectKey {
    /// An uppercase ASCII letter followed by uppercase letters, digits or `_`.
    pub fn is_well_formed(&self) -> bool {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) if first.is_ascii_uppercase() => chars
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProjectKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The two entity families a project owns and the cloner reconciles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Component,
    Version,
}

impl EntityKind {
    /// Every kind, in processing order: components before versions.
    pub fn all() -> &'static [EntityKind] {
        &[EntityKind::Component, EntityKind::Version]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Component => "component",
            EntityKind::Version => "version",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            EntityKind::Component => "components",
            EntityKind::Version => "versions",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "component" | "components" => Ok(EntityKind::Component),
            "version" | "versions" => Ok(EntityKind::Version),
            other => Err(format!(
                "unhandled entity kind '{other}'; expected: component, version"
            )),
        }
    }
}

/// Which entities of one kind should be copied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Copy nothing. Also what an absent config entry means.
    #[default]
    None,
    /// Copy every entity the source project has.
    All,
    /// Copy exactly these names; each must exist in the source project.
    Named(BTreeSet<String>),
}

impl Selection {
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Named(names.into_iter().map(Into::into).collect())
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SelectionRepr {
    Keyword(String),
    Names(Vec<String>),
}

impl<'de> Deserialize<'de> for Selection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<SelectionRepr>::deserialize(deserializer)? {
            None => Ok(Selection::None),
            Some(SelectionRepr::Keyword(word)) => match word.to_ascii_lowercase().as_str() {
                "all" => Ok(Selection::All),
                "none" => Ok(Selection::None),
                other => Err(D::Error::custom(format!(
                    "expected \"all\", \"none\" or a list of names, got \"{other}\""
                ))),
            },
            Some(SelectionRepr::Names(names)) => Ok(Selection::Named(names.into_iter().collect())),
        }
    }
}

impl Serialize for Selection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Selection::None => serializer.serialize_str("none"),
            Selection::All => serializer.serialize_str("all"),
            Selection::Named(names) => names.serialize(serializer),
        }
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A version or component as the remote reports it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity {
    pub attributes: Attributes,
}

impl Entity {
    pub fn new(attributes: Attributes) -> Self {
        Self { attributes }
    }

    /// The correlation key between source and destination. Empty if absent.
    pub fn name(&self) -> &str {
        self.attributes
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Remote identifier used for updates.
    pub fn id(&self) -> Option<&str> {
        self.attributes.get("id").and_then(Value::as_str)
    }

    pub fn self_link(&self) -> Option<&str> {
        self.attributes.get("self").and_then(Value::as_str)
    }

    /// `archived` attribute; entities without one (components) are never archived.
    pub fn is_archived(&self) -> bool {
        self.attributes
            .get("archived")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }
}

impl From<Attributes> for Entity {
    fn from(attributes: Attributes) -> Self {
        Self { attributes }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
