// Inventory positions: one counted line on an inventory card

use serde::{Deserialize, Serialize};

use crate::auth::roles::INVENTORY_APPROVE;
use crate::workflow::{
    EntityPayload, Requirement, StampField, TransitionRule, WorkflowEntity,
};
use crate::workflow_status;

workflow_status! {
    pub enum InventoryPositionStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Closed => "closed",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryPositionPayload {
    pub card: u32,
    pub position: u32,
    pub article_number: String,
    pub article_name: String,
    pub quantity: f64,
    pub unit: String,
    pub location: String,
    /// Work in progress
    #[serde(default)]
    pub wip: bool,
}

impl EntityPayload for InventoryPositionPayload {
    fn validate(&self) -> Result<(), String> {
        if self.position == 0 {
            return Err("positions are numbered from 1".to_string());
        }
        if self.article_number.trim().is_empty() {
            return Err("article number is required".to_string());
        }
        if !(self.quantity >= 0.0) {
            return Err("quantity must be zero or more".to_string());
        }
        Ok(())
    }
}

const INVENTORY_RULES: &[TransitionRule<InventoryPositionStatus>] = &[
    TransitionRule::stamping(
        InventoryPositionStatus::Pending,
        InventoryPositionStatus::Approved,
        Requirement::AnyRole(&[INVENTORY_APPROVE]),
        StampField::Approved,
    ),
    TransitionRule::stamping(
        InventoryPositionStatus::Pending,
        InventoryPositionStatus::Rejected,
        Requirement::AnyRole(&[INVENTORY_APPROVE]),
        StampField::Closed,
    ),
    TransitionRule::stamping(
        InventoryPositionStatus::Approved,
        InventoryPositionStatus::Closed,
        Requirement::AnyRole(&[INVENTORY_APPROVE]),
        StampField::Closed,
    ),
];

pub struct InventoryPosition;

impl WorkflowEntity for InventoryPosition {
    type Status = InventoryPositionStatus;
    type Payload = InventoryPositionPayload;

    const COLLECTION: &'static str = "inventory_positions";
    const INITIAL: InventoryPositionStatus = InventoryPositionStatus::Pending;

    fn rules() -> &'static [TransitionRule<InventoryPositionStatus>] {
        INVENTORY_RULES
    }
}
