//! Per-kind rules for turning a source entity into an update payload.

use vercomp_core::{Attributes, EntityKind};

/// What differs between reconciling versions and reconciling components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindPolicy {
    /// Stripped from every update payload.
    pub never_sent: &'static [&'static str],
    /// `(dropped, canonical)`: when both are present only `canonical` is sent.
    pub superseded: &'static [(&'static str, &'static str)],
    /// `archived` must change in a call of its own.
    pub archive_alone: bool,
    /// The unarchive option applies to this kind.
    pub unarchivable: bool,
}

const COMPONENT: KindPolicy = KindPolicy {
    never_sent: &["id", "self", "project", "projectId"],
    superseded: &[],
    archive_alone: false,
    unarchivable: false,
};

const VERSION: KindPolicy = KindPolicy {
    never_sent: &["id", "self"],
    superseded: &[("releaseDate", "userReleaseDate"), ("startDate", "userStartDate")],
    archive_alone: true,
    unarchivable: true,
};

pub fn policy(kind: EntityKind) -> &'static KindPolicy {
    match kind {
        EntityKind::Component => &COMPONENT,
        EntityKind::Version => &VERSION,
    }
}

impl KindPolicy {
    /// The attributes to send for an entity whose effective source attributes are `source`.
    pub fn payload(&self, source: &Attributes) -> Attributes {
        let mut payload = source.clone();
        for attribute in self.never_sent {
            payload.shift_remove(*attribute);
        }
        for (dropped, canonical) in self.superseded {
            if payload.contains_key(*dropped) && payload.contains_key(*canonical) {
                payload.shift_remove(*dropped);
            }
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn attrs(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn component_payload_drops_identity_and_project() {
        let payload = policy(EntityKind::Component).payload(&attrs(json!({
            "self": "http://jira/component/1", "id": "1", "project": "SRC", "projectId": 10,
            "name": "Backend", "description": "API", "assigneeType": "PROJECT_DEFAULT",
        })));
        assert_eq!(
            Value::Object(payload),
            json!({ "name": "Backend", "description": "API", "assigneeType": "PROJECT_DEFAULT" })
        );
    }

    #[test]
    fn version_payload_prefers_user_dates() {
        let payload = policy(EntityKind::Version).payload(&attrs(json!({
            "self": "http://jira/version/1", "id": "1", "projectId": 10, "name": "1.0",
            "releaseDate": "2024-01-01", "userReleaseDate": "2024-01-01",
            "startDate": "2023-12-01", "userStartDate": "01/Dec/23",
        })));
        assert!(!payload.contains_key("releaseDate"));
        assert_eq!(payload["userReleaseDate"], json!("2024-01-01"));
        assert!(!payload.contains_key("startDate"));
        assert_eq!(payload["userStartDate"], json!("01/Dec/23"));
        assert!(payload.contains_key("projectId"));
        assert!(!payload.contains_key("id"));
        assert!(!payload.contains_key("self"));
    }

    #[test]
    fn version_payload_keeps_a_lone_date() {
        let payload = policy(EntityKind::Version).payload(&attrs(json!({
            "name": "1.0", "releaseDate": "2024-01-01",
        })));
        assert_eq!(payload["releaseDate"], json!("2024-01-01"));
    }

    #[test]
    fn only_versions_archive_alone() {
        assert!(policy(EntityKind::Version).archive_alone);
        assert!(policy(EntityKind::Version).unarchivable);
        assert!(!policy(EntityKind::Component).archive_alone);
        assert!(!policy(EntityKind::Component).unarchivable);
    }
}
