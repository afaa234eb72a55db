//! Convergence of one destination entity onto its source.
//!
//! ## `converge` — per entity
//!
//! 1. Derive the effective source attributes (unarchive override, versions only).
//! 2. Existing destination twin: diff it, skip if nothing differs.
//!    No twin: create one carrying just the name.
//! 3. Build the payload from the kind's [`KindPolicy`].
//! 4. Versions whose `archived` state must flip get a call with only `archived` first.
//! 5. Send the rest of the payload.

use std::borrow::Cow;

use serde::Serialize;
use serde_json::Value;

use vercomp_core::{Attributes, Entity, EntityKind, ProjectKey};

use crate::diff::{differing_fields, field_names, FieldChange, FieldDiff};
use crate::policy::{policy, KindPolicy};
use crate::{RemoteCollection, SyncError};

// ---------------------------------------------------------------------------
// Apply result
// ---------------------------------------------------------------------------

/// Outcome of converging a single entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ApplyResult {
    /// Destination entity did not exist; it was created and filled in.
    Created {
        name: String,
        link: Option<String>,
        /// `Some(target)` when `archived` was set in a call of its own.
        archive_transition: Option<bool>,
    },
    /// Destination entity existed and differed; it was updated.
    Updated {
        name: String,
        link: Option<String>,
        fields: Vec<FieldDiff>,
        archive_transition: Option<bool>,
    },
    /// Destination entity already matches the source.
    Unchanged { name: String },
    /// Dry run: the entity *would* have been created.
    WouldCreate { name: String },
    /// Dry run: the entity *would* have been updated.
    WouldUpdate {
        name: String,
        fields: Vec<FieldDiff>,
        archive_transition: Option<bool>,
    },
}

impl ApplyResult {
    pub fn name(&self) -> &str {
        match self {
            ApplyResult::Created { name, .. }
            | ApplyResult::Updated { name, .. }
            | ApplyResult::Unchanged { name }
            | ApplyResult::WouldCreate { name }
            | ApplyResult::WouldUpdate { name, .. } => name,
        }
    }
}

/// Switches that shape a convergence without changing what "in sync" means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvergeOptions {
    /// Drive destination versions to unarchived regardless of the source.
    pub unarchive: bool,
    /// Read and diff, but never create or update.
    pub dry_run: bool,
}

// ---------------------------------------------------------------------------
// converge
// ---------------------------------------------------------------------------

/// Attributes the destination should end up with, before payload rules.
///
/// The fetched source entity is left untouched.
pub fn effective_source(kind: EntityKind, source: &Entity, unarchive: bool) -> Attributes {
    let mut wanted = source.attributes.clone();
    if unarchive && policy(kind).unarchivable {
        wanted.insert("archived".to_string(), Value::Bool(false));
    }
    wanted
}

/// Drive `dest` (the destination entity named like `source`, if any) to match `source`.
pub fn converge<R: RemoteCollection>(
    remote: &R,
    kind: EntityKind,
    dest_project: &ProjectKey,
    source: &Entity,
    dest: Option<&Entity>,
    options: ConvergeOptions,
) -> Result<ApplyResult, SyncError> {
    let name = source.name();
    let rules = policy(kind);
    let wanted = effective_source(kind, source, options.unarchive);

    let (dest, fields, created) = match dest {
        Some(existing) => {
            let fields = differing_fields(&wanted, &existing.attributes);
            if fields.is_empty() {
                tracing::debug!("{dest_project} {kind} '{name}' already exists, identically to source");
                return Ok(ApplyResult::Unchanged {
                    name: name.to_string(),
                });
            }
            log_fields(dest_project, kind, name, &fields);
            (Cow::Borrowed(existing), fields, false)
        }
        None if options.dry_run => {
            tracing::info!("[dry-run] would create {dest_project} {kind} '{name}'");
            return Ok(ApplyResult::WouldCreate {
                name: name.to_string(),
            });
        }
        None => {
            let fresh = remote
                .create(kind, dest_project, name)
                .map_err(|e| SyncError::remote("create", kind, dest_project, name, e))?;
            tracing::info!("created {dest_project} {kind} '{name}'");
            (Cow::Owned(fresh), Vec::new(), true)
        }
    };

    let mut payload = rules.payload(&wanted);
    let transition = archive_transition(rules, &dest, &payload);

    if options.dry_run {
        tracing::info!(
            "[dry-run] would update {dest_project} {kind} '{name}' ({})",
            field_names(&fields).join(", ")
        );
        return Ok(ApplyResult::WouldUpdate {
            name: name.to_string(),
            fields,
            archive_transition: transition,
        });
    }

    let id = dest.id().ok_or_else(|| SyncError::MissingId {
        kind,
        project: dest_project.clone(),
        name: name.to_string(),
    })?;

    if let Some(target) = transition {
        tracing::info!(
            "{} {dest_project} {kind} '{name}' before updating its other fields",
            if target { "archiving" } else { "unarchiving" }
        );
        let mut alone = Attributes::new();
        alone.insert("archived".to_string(), Value::Bool(target));
        remote
            .update(kind, id, &alone)
            .map_err(|e| SyncError::remote("archive", kind, dest_project, name, e))?;
        payload.shift_remove("archived");
    }

    let link = if payload.is_empty() {
        dest.self_link().map(str::to_string)
    } else {
        let updated = remote
            .update(kind, id, &payload)
            .map_err(|e| SyncError::remote("update", kind, dest_project, name, e))?;
        updated
            .self_link()
            .or_else(|| dest.self_link())
            .map(str::to_string)
    };

    if !created {
        tracing::info!(
            "updated {dest_project} {kind} '{name}' ({})",
            field_names(&fields).join(", ")
        );
    }
    tracing::info!(
        "copied {kind} '{name}' from {} -> {}",
        source.self_link().unwrap_or("<source>"),
        link.as_deref().unwrap_or("<destination>")
    );

    Ok(if created {
        ApplyResult::Created {
            name: name.to_string(),
            link,
            archive_transition: transition,
        }
    } else {
        ApplyResult::Updated {
            name: name.to_string(),
            link,
            fields,
            archive_transition: transition,
        }
    })
}

/// The `archived` value that must be sent alone, if the kind requires it and it changes.
fn archive_transition(rules: &KindPolicy, dest: &Entity, payload: &Attributes) -> Option<bool> {
    if !rules.archive_alone {
        return None;
    }
    match payload.get("archived").and_then(Value::as_bool) {
        Some(target) if target != dest.is_archived() => Some(target),
        _ => None,
    }
}

fn log_fields(project: &ProjectKey, kind: EntityKind, name: &str, fields: &[FieldDiff]) {
    for diff in fields {
        match &diff.change {
            FieldChange::Missing { .. } => {
                tracing::debug!("{project} {kind} '{name}' is missing {}", diff.field)
            }
            FieldChange::Changed { current, wanted } => tracing::debug!(
                "{project} {kind} '{name}' {} is {current}, but we want {wanted}",
                diff.field
            ),
        }
    }
    tracing::debug!(
        "{kind} '{name}' exists and differs ({}); updating",
        field_names(fields).join(", ")
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
