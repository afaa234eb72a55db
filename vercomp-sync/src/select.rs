//! Entity selection: which source entities a pass is going to copy.

use std::collections::BTreeSet;

use vercomp_core::{Entity, EntityKind, ProjectKey, Selection};

use crate::SyncError;

/// Narrow `source` (all `kind` entities of `project`) down to what `selection` asks for.
///
/// Source order is kept. An explicit selection naming anything the source does
/// not have fails the whole pass with [`SyncError::MissingEntities`].
pub fn select(
    kind: EntityKind,
    project: &ProjectKey,
    source: Vec<Entity>,
    selection: &Selection,
) -> Result<Vec<Entity>, SyncError> {
    match selection {
        Selection::None => {
            tracing::debug!("no {} to be copied, per configuration", kind.plural());
            Ok(Vec::new())
        }
        Selection::All => {
            tracing::info!(
                "copying all {} of {project}'s {}",
                source.len(),
                kind.plural()
            );
            Ok(source)
        }
        Selection::Named(wanted) => {
            let selected: Vec<Entity> = source
                .into_iter()
                .filter(|e| wanted.contains(e.name()))
                .collect();
            let found: BTreeSet<&str> = selected.iter().map(Entity::name).collect();
            let missing: Vec<String> = wanted
                .iter()
                .filter(|name| !found.contains(name.as_str()))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(SyncError::MissingEntities {
                    kind,
                    project: project.clone(),
                    missing,
                });
            }
            tracing::info!(
                "copying {} of {project}'s {}",
                selected.len(),
                kind.plural()
            );
            Ok(selected)
        }
    }
}
