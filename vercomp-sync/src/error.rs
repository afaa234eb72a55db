//! Error types for vercomp-sync.

use thiserror::Error;

use vercomp_core::{EntityKind, ProjectKey};

/// Boxed accessor failure, whatever the accessor implementation.
pub type RemoteSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All errors that can arise from a reconciliation pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An explicit selection names entities the source project does not have.
    /// Raised while planning, before any mutation.
    #[error("the following {kind}s are not in {project}: {}", .missing.join(", "))]
    MissingEntities {
        kind: EntityKind,
        project: ProjectKey,
        missing: Vec<String>,
    },

    /// Listing a project's entities failed.
    #[error("failed to list {kind}s of {project}: {source}")]
    Fetch {
        kind: EntityKind,
        project: ProjectKey,
        #[source]
        source: RemoteSource,
    },

    /// A create or update call for one entity failed.
    #[error("failed to {action} {kind} '{name}' in {project}: {source}")]
    Remote {
        action: &'static str,
        kind: EntityKind,
        project: ProjectKey,
        name: String,
        #[source]
        source: RemoteSource,
    },

    /// The remote handed back an entity without an identifier, so it cannot be updated.
    #[error("{kind} '{name}' in {project} has no id")]
    MissingId {
        kind: EntityKind,
        project: ProjectKey,
        name: String,
    },
}

impl SyncError {
    pub(crate) fn remote(
        action: &'static str,
        kind: EntityKind,
        project: &ProjectKey,
        name: &str,
        source: impl Into<RemoteSource>,
    ) -> Self {
        SyncError::Remote {
            action,
            kind,
            project: project.clone(),
            name: name.to_string(),
            source: source.into(),
        }
    }
}
