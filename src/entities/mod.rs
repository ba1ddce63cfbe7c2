//! Business record types driven by the shared workflow
//!
//! Each submodule declares one entity: its status set, its transition table
//! and its payload. [`EntityKind`] selects an entity at runtime from its URL
//! slug and erases the typed tables at the engine boundary.

pub mod deviation;
pub mod inventory;
pub mod overtime;
pub mod purchase_request;

use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::auth::Session;
use crate::store::Document;
use crate::workflow::{
    guard, EntityPayload, StampField, WorkflowEntity, WorkflowError, WorkflowStatus,
};

pub use deviation::{Deviation, DeviationPayload, DeviationStatus};
pub use inventory::{InventoryPosition, InventoryPositionPayload, InventoryPositionStatus};
pub use overtime::{OvertimeOrder, OvertimePayload, OvertimeStatus};
pub use purchase_request::{PurchaseRequest, PurchaseRequestPayload, PurchaseRequestStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Deviation,
    OvertimeOrder,
    PurchaseRequest,
    InventoryPosition,
}

/// Outcome of an accepted guard check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTransition {
    pub to: &'static str,
    pub stamp: Option<StampField>,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Deviation,
        EntityKind::OvertimeOrder,
        EntityKind::PurchaseRequest,
        EntityKind::InventoryPosition,
    ];

    /// Path segment used by the HTTP API
    pub fn slug(&self) -> &'static str {
        match self {
            EntityKind::Deviation => "deviations",
            EntityKind::OvertimeOrder => "overtime-orders",
            EntityKind::PurchaseRequest => "purchase-requests",
            EntityKind::InventoryPosition => "inventory-positions",
        }
    }

    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Deviation => Deviation::COLLECTION,
            EntityKind::OvertimeOrder => OvertimeOrder::COLLECTION,
            EntityKind::PurchaseRequest => PurchaseRequest::COLLECTION,
            EntityKind::InventoryPosition => InventoryPosition::COLLECTION,
        }
    }

    pub fn initial_status(&self) -> &'static str {
        match self {
            EntityKind::Deviation => Deviation::INITIAL.label(),
            EntityKind::OvertimeOrder => OvertimeOrder::INITIAL.label(),
            EntityKind::PurchaseRequest => PurchaseRequest::INITIAL.label(),
            EntityKind::InventoryPosition => InventoryPosition::INITIAL.label(),
        }
    }

    /// Every status label the entity knows
    pub fn statuses(&self) -> Vec<&'static str> {
        match self {
            EntityKind::Deviation => labels(DeviationStatus::ALL),
            EntityKind::OvertimeOrder => labels(OvertimeStatus::ALL),
            EntityKind::PurchaseRequest => labels(PurchaseRequestStatus::ALL),
            EntityKind::InventoryPosition => labels(InventoryPositionStatus::ALL),
        }
    }

    /// Whether `status` is a known label with no outgoing edges
    pub fn is_terminal(&self, status: &str) -> bool {
        match self {
            EntityKind::Deviation => terminal::<Deviation>(status),
            EntityKind::OvertimeOrder => terminal::<OvertimeOrder>(status),
            EntityKind::PurchaseRequest => terminal::<PurchaseRequest>(status),
            EntityKind::InventoryPosition => terminal::<InventoryPosition>(status),
        }
    }

    /// Parse and validate a creation payload, returning its normalized form
    pub fn validate_payload(&self, payload: Value) -> Result<Value, WorkflowError> {
        match self {
            EntityKind::Deviation => normalize::<Deviation>(payload),
            EntityKind::OvertimeOrder => normalize::<OvertimeOrder>(payload),
            EntityKind::PurchaseRequest => normalize::<PurchaseRequest>(payload),
            EntityKind::InventoryPosition => normalize::<InventoryPosition>(payload),
        }
    }

    /// Run the transition guard for this entity
    pub fn resolve_transition(
        &self,
        document: &Document,
        requested: &str,
        actor: &Session,
    ) -> Result<ResolvedTransition, WorkflowError> {
        match self {
            EntityKind::Deviation => resolve::<Deviation>(document, requested, actor),
            EntityKind::OvertimeOrder => resolve::<OvertimeOrder>(document, requested, actor),
            EntityKind::PurchaseRequest => resolve::<PurchaseRequest>(document, requested, actor),
            EntityKind::InventoryPosition => {
                resolve::<InventoryPosition>(document, requested, actor)
            }
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for EntityKind {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| WorkflowError::UnknownEntity(s.to_string()))
    }
}

fn labels<S: WorkflowStatus>(all: &[S]) -> Vec<&'static str> {
    all.iter().map(|status| status.label()).collect()
}

fn terminal<E: WorkflowEntity>(status: &str) -> bool {
    status
        .parse::<E::Status>()
        .map(E::is_terminal)
        .unwrap_or(false)
}

fn normalize<E: WorkflowEntity>(payload: Value) -> Result<Value, WorkflowError> {
    let parsed: E::Payload = serde_json::from_value(payload)
        .map_err(|e| WorkflowError::InvalidPayload(e.to_string()))?;
    parsed.validate().map_err(WorkflowError::InvalidPayload)?;
    serde_json::to_value(&parsed).map_err(|e| WorkflowError::InvalidPayload(e.to_string()))
}

fn resolve<E: WorkflowEntity>(
    document: &Document,
    requested: &str,
    actor: &Session,
) -> Result<ResolvedTransition, WorkflowError> {
    let rule = guard::check::<E>(document, requested, actor)?;
    Ok(ResolvedTransition {
        to: rule.to.label(),
        stamp: rule.stamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slugs_roundtrip() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.slug().parse::<EntityKind>().unwrap(), kind);
        }
        assert_eq!(
            "ovens".parse::<EntityKind>().unwrap_err().label(),
            "not found"
        );
    }

    #[test]
    fn test_initial_statuses() {
        assert_eq!(EntityKind::Deviation.initial_status(), "draft");
        assert_eq!(EntityKind::OvertimeOrder.initial_status(), "pending");
        assert_eq!(EntityKind::PurchaseRequest.initial_status(), "draft");
        assert_eq!(EntityKind::InventoryPosition.initial_status(), "pending");
    }

    #[test]
    fn test_collections_are_distinct() {
        let mut collections: Vec<_> = EntityKind::ALL.iter().map(|k| k.collection()).collect();
        collections.sort();
        collections.dedup();
        assert_eq!(collections.len(), EntityKind::ALL.len());
    }

    #[test]
    fn test_statuses_and_terminality() {
        assert!(EntityKind::Deviation.statuses().contains(&"in progress"));
        assert!(EntityKind::OvertimeOrder.is_terminal("accounted"));
        assert!(!EntityKind::OvertimeOrder.is_terminal("pending"));
        assert!(!EntityKind::OvertimeOrder.is_terminal("nonsense"));
    }

    #[test]
    fn test_validate_payload_rejects_malformed_input() {
        let err = EntityKind::OvertimeOrder
            .validate_payload(json!({"department": "assembly"}))
            .unwrap_err();
        assert_eq!(err.label(), "invalid payload");

        let ok = EntityKind::OvertimeOrder
            .validate_payload(json!({
                "department": "assembly",
                "workDate": "2026-10-17",
                "hours": 6.5,
                "employees": ["10234", "10877"],
                "reason": "line changeover"
            }))
            .unwrap();
        assert_eq!(ok["hours"], json!(6.5));
    }
}
