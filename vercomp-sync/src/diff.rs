//! Field-level comparison of a source entity against its destination twin.

use serde::Serialize;
use serde_json::Value;

use vercomp_core::Attributes;

/// Attributes never compared: identity, parent project, and server-derived
/// values. A component's assignee is inherited from the project lead when
/// `assigneeType` is `PROJECT_LEAD`, so it would always mismatch across projects.
pub const IGNORABLE: [&str; 6] = [
    "id",
    "self",
    "project",
    "projectId",
    "assignee",
    "realAssignee",
];

/// How one attribute disagrees.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum FieldChange {
    /// The destination lacks the attribute entirely.
    Missing { wanted: Value },
    /// Both sides carry it with different values.
    Changed { current: Value, wanted: Value },
}

/// One differing attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDiff {
    pub field: String,
    #[serde(flatten)]
    pub change: FieldChange,
}

pub fn is_ignorable(attribute: &str) -> bool {
    IGNORABLE.contains(&attribute)
}

/// Attributes of `source` that `dest` lacks or holds a different value for,
/// in source order.
///
/// One-directional: attributes only the destination has are not reported.
/// Values compare structurally with no coercion, so `"true"` differs from `true`.
pub fn differing_fields(source: &Attributes, dest: &Attributes) -> Vec<FieldDiff> {
    source
        .iter()
        .filter(|(field, _)| !is_ignorable(field))
        .filter_map(|(field, wanted)| {
            let change = match dest.get(field) {
                None => FieldChange::Missing {
                    wanted: wanted.clone(),
                },
                Some(current) if current != wanted => FieldChange::Changed {
                    current: current.clone(),
                    wanted: wanted.clone(),
                },
                Some(_) => return None,
            };
            Some(FieldDiff {
                field: field.clone(),
                change,
            })
        })
        .collect()
}

/// Just the attribute names of a diff.
pub fn field_names(diff: &[FieldDiff]) -> Vec<String> {
    diff.iter().map(|d| d.field.clone()).collect()
}
