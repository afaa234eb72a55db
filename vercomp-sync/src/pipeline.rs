//! A full reconciliation pass: components, then versions.
//!
//! Every kind is planned (listed and selected) before anything is written, so a
//! selection naming an entity the source lacks stops the pass with no mutation.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use vercomp_core::{CloneConfig, Entity, EntityKind, ProjectKey, Selection};

use crate::apply::{converge, ApplyResult, ConvergeOptions};
use crate::{select, RemoteCollection, SyncError};

/// What to do when converging one entity fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure and carry on with the next entity.
    #[default]
    Isolate,
    /// Abort the pass on the first failure.
    FailFast,
}

/// Inputs of one pass, passed explicitly rather than read from ambient config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneRequest {
    pub source: ProjectKey,
    pub dest: ProjectKey,
    pub components: Selection,
    pub versions: Selection,
    pub unarchive: bool,
    pub failure_policy: FailurePolicy,
    pub dry_run: bool,
}

impl CloneRequest {
    pub fn new(source: impl Into<ProjectKey>, dest: impl Into<ProjectKey>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            components: Selection::None,
            versions: Selection::None,
            unarchive: false,
            failure_policy: FailurePolicy::default(),
            dry_run: false,
        }
    }

    pub fn from_config(config: &CloneConfig) -> Self {
        Self {
            source: config.source_project.clone(),
            dest: config.dest_project.clone(),
            components: config.components.clone(),
            versions: config.versions.clone(),
            unarchive: config.unarchive,
            failure_policy: FailurePolicy::default(),
            dry_run: false,
        }
    }

    pub fn selection(&self, kind: EntityKind) -> &Selection {
        match kind {
            EntityKind::Component => &self.components,
            EntityKind::Version => &self.versions,
        }
    }
}

/// One entity that could not be converged.
#[derive(Debug, Serialize)]
pub struct EntityFailure {
    pub kind: EntityKind,
    pub name: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: SyncError,
}

/// Outcome of one kind within a pass.
#[derive(Debug, Serialize)]
pub struct KindReport {
    pub kind: EntityKind,
    pub selected: usize,
    pub results: Vec<ApplyResult>,
    pub failures: Vec<EntityFailure>,
}

impl KindReport {
    fn count(&self, pred: impl Fn(&ApplyResult) -> bool) -> usize {
        self.results.iter().filter(|r| pred(r)).count()
    }

    pub fn created(&self) -> usize {
        self.count(|r| {
            matches!(
                r,
                ApplyResult::Created { .. } | ApplyResult::WouldCreate { .. }
            )
        })
    }

    pub fn updated(&self) -> usize {
        self.count(|r| {
            matches!(
                r,
                ApplyResult::Updated { .. } | ApplyResult::WouldUpdate { .. }
            )
        })
    }

    pub fn unchanged(&self) -> usize {
        self.count(|r| matches!(r, ApplyResult::Unchanged { .. }))
    }
}

/// Outcome of a whole pass.
#[derive(Debug, Serialize)]
pub struct CloneReport {
    pub source: ProjectKey,
    pub dest: ProjectKey,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub kinds: Vec<KindReport>,
}

impl CloneReport {
    pub fn kind(&self, kind: EntityKind) -> Option<&KindReport> {
        self.kinds.iter().find(|k| k.kind == kind)
    }

    pub fn failures(&self) -> impl Iterator<Item = &EntityFailure> {
        self.kinds.iter().flat_map(|k| k.failures.iter())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

struct KindPlan {
    kind: EntityKind,
    selected: Vec<Entity>,
    existing: Vec<Entity>,
}

/// Run one pass of `request` against `remote`.
///
/// Errors returned here are fatal to the pass: a bad selection, a failed
/// listing, or (under [`FailurePolicy::FailFast`]) the first entity failure.
/// Isolated entity failures are in the report instead.
pub fn run<R: RemoteCollection>(
    remote: &R,
    request: &CloneRequest,
) -> Result<CloneReport, SyncError> {
    let started_at = Utc::now();

    let mut plans = Vec::new();
    for &kind in EntityKind::all() {
        let selection = request.selection(kind);
        if selection.is_none() {
            tracing::info!("no {} to be copied, per configuration", kind.plural());
            continue;
        }
        let source = list(remote, kind, &request.source)?;
        let selected = select(kind, &request.source, source, selection)?;
        let existing = list(remote, kind, &request.dest)?;
        plans.push(KindPlan {
            kind,
            selected,
            existing,
        });
    }

    let options = ConvergeOptions {
        unarchive: request.unarchive,
        dry_run: request.dry_run,
    };
    let mut kinds = Vec::new();
    for plan in plans {
        tracing::debug!(
            "converging {} {} from {} to {}",
            plan.selected.len(),
            plan.kind.plural(),
            request.source,
            request.dest
        );
        let mut report = KindReport {
            kind: plan.kind,
            selected: plan.selected.len(),
            results: Vec::new(),
            failures: Vec::new(),
        };
        for source in &plan.selected {
            let dest = plan.existing.iter().find(|d| d.name() == source.name());
            match converge(remote, plan.kind, &request.dest, source, dest, options) {
                Ok(result) => report.results.push(result),
                Err(error) if request.failure_policy == FailurePolicy::Isolate => {
                    tracing::warn!("{error}; continuing with the next {}", plan.kind);
                    report.failures.push(EntityFailure {
                        kind: plan.kind,
                        name: source.name().to_string(),
                        error,
                    });
                }
                Err(error) => return Err(error),
            }
        }
        kinds.push(report);
    }

    Ok(CloneReport {
        source: request.source.clone(),
        dest: request.dest.clone(),
        dry_run: request.dry_run,
        started_at,
        finished_at: Utc::now(),
        kinds,
    })
}

fn list<R: RemoteCollection>(
    remote: &R,
    kind: EntityKind,
    project: &ProjectKey,
) -> Result<Vec<Entity>, SyncError> {
    remote.list(kind, project).map_err(|e| SyncError::Fetch {
        kind,
        project: project.clone(),
        source: Box::new(e),
    })
}

fn serialize_display<S: Serializer>(error: &SyncError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}
