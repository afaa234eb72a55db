//! The remote capability the reconciler drives.

use vercomp_core::{Attributes, Entity, EntityKind, ProjectKey};

/// Read and write access to a project's versions and components.
///
/// Calls are blocking; timeouts and transport policy belong to the implementor.
pub trait RemoteCollection {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Every entity of `kind` in `project`, in the remote's order.
    fn list(&self, kind: EntityKind, project: &ProjectKey) -> Result<Vec<Entity>, Self::Error>;

    /// Create an entity carrying only `name`, owned by `project`.
    fn create(
        &self,
        kind: EntityKind,
        project: &ProjectKey,
        name: &str,
    ) -> Result<Entity, Self::Error>;

    /// Partial update: attributes not in `fields` are left alone.
    fn update(
        &self,
        kind: EntityKind,
        id: &str,
        fields: &Attributes,
    ) -> Result<Entity, Self::Error>;
}

impl<T: RemoteCollection + ?Sized> RemoteCollection for &T {
    type Error = T::Error;

    fn list(&self, kind: EntityKind, project: &ProjectKey) -> Result<Vec<Entity>, Self::Error> {
        (**self).list(kind, project)
    }

    fn create(
        &self,
        kind: EntityKind,
        project: &ProjectKey,
        name: &str,
    ) -> Result<Entity, Self::Error> {
        (**self).create(kind, project, name)
    }

    fn update(
        &self,
        kind: EntityKind,
        id: &str,
        fields: &Attributes,
    ) -> Result<Entity, Self::Error> {
        (**self).update(kind, id, fields)
    }
}
