//! In-process [`RemoteCollection`] for tests and offline experiments.
//!
//! Holds per-project collections and records every call in order, so tests can
//! assert on exactly what a pass sent. Failures can be injected per entity name.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use serde_json::{json, Value};
use thiserror::Error;

use vercomp_core::{Attributes, Entity, EntityKind, ProjectKey};

use crate::RemoteCollection;

/// Errors raised by [`MemoryCollection`].
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("no {kind} with id {id}")]
    UnknownId { kind: EntityKind, id: String },

    #[error("injected failure for {kind} '{name}'")]
    Injected { kind: EntityKind, name: String },
}

/// One recorded accessor call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List {
        kind: EntityKind,
        project: ProjectKey,
    },
    Create {
        kind: EntityKind,
        project: ProjectKey,
        name: String,
    },
    Update {
        kind: EntityKind,
        id: String,
        fields: Attributes,
    },
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Call::List { .. })
    }
}

#[derive(Debug, Default)]
struct State {
    collections: BTreeMap<(EntityKind, String), Vec<Entity>>,
    calls: Vec<Call>,
    failing: BTreeSet<(EntityKind, String)>,
    next_id: u64,
}

/// Shared-nothing fake of a Jira server's version/component endpoints.
#[derive(Debug, Default)]
pub struct MemoryCollection {
    state: RefCell<State>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity as if the server already had it. Assigns `id` and `self` when absent.
    ///
    /// Non-object values are stored as an entity with no attributes.
    pub fn insert(&self, kind: EntityKind, project: &ProjectKey, attributes: Value) -> Entity {
        let mut state = self.state.borrow_mut();
        let mut attributes = match attributes {
            Value::Object(map) => map,
            _ => Attributes::new(),
        };
        if !attributes.contains_key("id") {
            let id = state.allocate_id();
            attributes.insert("id".into(), Value::String(id));
        }
        if !attributes.contains_key("self") {
            let id = attributes["id"].as_str().unwrap_or_default().to_string();
            attributes.insert("self".into(), Value::String(link(kind, &id)));
        }
        let entity = Entity::new(attributes);
        state
            .collections
            .entry((kind, project.0.clone()))
            .or_default()
            .push(entity.clone());
        entity
    }

    /// Make every create/update of the named entity fail.
    pub fn fail_on(&self, kind: EntityKind, name: &str) {
        self.state
            .borrow_mut()
            .failing
            .insert((kind, name.to_string()));
    }

    /// Current contents of one collection.
    pub fn entities(&self, kind: EntityKind, project: &ProjectKey) -> Vec<Entity> {
        self.state
            .borrow()
            .collections
            .get(&(kind, project.0.clone()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn find(&self, kind: EntityKind, project: &ProjectKey, name: &str) -> Option<Entity> {
        self.entities(kind, project)
            .into_iter()
            .find(|e| e.name() == name)
    }

    /// Every call so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    /// Only creates and updates.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }
}

impl State {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        (10_000 + self.next_id).to_string()
    }

    fn check_failing(&self, kind: EntityKind, name: &str) -> Result<(), MemoryError> {
        if self.failing.contains(&(kind, name.to_string())) {
            return Err(MemoryError::Injected {
                kind,
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

fn link(kind: EntityKind, id: &str) -> String {
    format!("memory://{kind}/{id}")
}

impl RemoteCollection for MemoryCollection {
    type Error = MemoryError;

    fn list(&self, kind: EntityKind, project: &ProjectKey) -> Result<Vec<Entity>, MemoryError> {
        self.state.borrow_mut().calls.push(Call::List {
            kind,
            project: project.clone(),
        });
        Ok(self.entities(kind, project))
    }

    fn create(
        &self,
        kind: EntityKind,
        project: &ProjectKey,
        name: &str,
    ) -> Result<Entity, MemoryError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Create {
            kind,
            project: project.clone(),
            name: name.to_string(),
        });
        state.check_failing(kind, name)?;

        let id = state.allocate_id();
        let attributes = match kind {
            EntityKind::Component => json!({
                "self": link(kind, &id), "id": id, "name": name, "project": project.0,
            }),
            EntityKind::Version => json!({
                "self": link(kind, &id), "id": id, "name": name,
                "archived": false, "released": false,
            }),
        };
        let entity = Entity::new(attributes.as_object().cloned().unwrap_or_default());
        state
            .collections
            .entry((kind, project.0.clone()))
            .or_default()
            .push(entity.clone());
        Ok(entity)
    }

    fn update(
        &self,
        kind: EntityKind,
        id: &str,
        fields: &Attributes,
    ) -> Result<Entity, MemoryError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Update {
            kind,
            id: id.to_string(),
            fields: fields.clone(),
        });

        let name = state
            .collections
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .flat_map(|(_, entities)| entities.iter())
            .find(|e| e.id() == Some(id))
            .map(|e| e.name().to_string())
            .ok_or_else(|| MemoryError::UnknownId {
                kind,
                id: id.to_string(),
            })?;
        state.check_failing(kind, &name)?;

        let target = state
            .collections
            .iter_mut()
            .filter(|((k, _), _)| *k == kind)
            .flat_map(|(_, entities)| entities.iter_mut())
            .find(|e| e.id() == Some(id))
            .ok_or_else(|| MemoryError::UnknownId {
                kind,
                id: id.to_string(),
            })?;
        for (field, value) in fields {
            target.attributes.insert(field.clone(), value.clone());
        }
        Ok(target.clone())
    }
}
