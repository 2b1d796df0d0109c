//! Append-only audit log of visibility mutations.
//!
//! Every committed change (visibility transition, grant, revoke) produces
//! exactly one event; idempotent no-ops produce none. The log is the
//! service's record of who changed what, exposed read-only to callers.

use uuid::Uuid;

use crate::primitives::{Grantee, ResourceId, UserId};
use crate::types::Visibility;

/// What a single audit event records.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AuditAction {
    VisibilityChanged { to: Visibility },
    AccessGranted { grantee: Grantee },
    AccessRevoked { grantee: Grantee },
}

/// One committed state change.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    /// Monotonic position in the log.
    pub seq: u64,
    pub resource: ResourceId,
    pub actor: UserId,
    /// Resource version after the change was applied.
    pub version: u64,
    pub action: AuditAction,
}

/// The append-only event sequence.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    events: Vec<AuditEvent>,
    next_seq: u64,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(
        &mut self,
        resource: ResourceId,
        actor: UserId,
        version: u64,
        action: AuditAction,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(AuditEvent {
            id: Uuid::new_v4(),
            seq,
            resource,
            actor,
            version,
            action,
        });
    }

    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    /// Events touching one resource, oldest first.
    pub fn for_resource<'a>(
        &'a self,
        id: &'a ResourceId,
    ) -> impl Iterator<Item = &'a AuditEvent> {
        self.events.iter().filter(move |event| &event.resource == id)
    }
}
