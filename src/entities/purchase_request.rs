// Purchase requests: department manager pre-approval, plant manager approval,
// closed by purchasing once ordered

use serde::{Deserialize, Serialize};

use crate::auth::roles::{PLANT_MANAGER, PURCHASING};
use crate::workflow::{
    EntityPayload, Requirement, StampField, TransitionRule, WorkflowEntity,
};
use crate::workflow_status;

workflow_status! {
    pub enum PurchaseRequestStatus {
        Draft => "draft",
        Pending => "pending",
        PreApproved => "pre-approved",
        Approved => "approved",
        Rejected => "rejected",
        Closed => "closed",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequestPayload {
    #[serde(default)]
    pub supplier: Option<String>,
    pub currency: String,
    pub justification: String,
    pub items: Vec<PurchaseItem>,
}

impl EntityPayload for PurchaseRequestPayload {
    fn validate(&self) -> Result<(), String> {
        if self.items.is_empty() {
            return Err("at least one item is required".to_string());
        }
        if self.currency.trim().len() != 3 {
            return Err("currency must be a three-letter code".to_string());
        }
        for item in &self.items {
            if item.name.trim().is_empty() {
                return Err("item name is required".to_string());
            }
            if item.quantity == 0 {
                return Err(format!("item {:?} has zero quantity", item.name));
            }
            if !(item.unit_price >= 0.0) {
                return Err(format!("item {:?} has an invalid price", item.name));
            }
        }
        Ok(())
    }
}

const PURCHASE_REQUEST_RULES: &[TransitionRule<PurchaseRequestStatus>] = &[
    TransitionRule::new(
        PurchaseRequestStatus::Draft,
        PurchaseRequestStatus::Pending,
        Requirement::Owner,
    ),
    TransitionRule::stamping(
        PurchaseRequestStatus::Pending,
        PurchaseRequestStatus::PreApproved,
        Requirement::Manager,
        StampField::Approved,
    ),
    TransitionRule::stamping(
        PurchaseRequestStatus::Pending,
        PurchaseRequestStatus::Rejected,
        Requirement::Manager,
        StampField::Closed,
    ),
    TransitionRule::stamping(
        PurchaseRequestStatus::PreApproved,
        PurchaseRequestStatus::Approved,
        Requirement::AnyRole(&[PLANT_MANAGER]),
        StampField::Approved,
    ),
    TransitionRule::stamping(
        PurchaseRequestStatus::PreApproved,
        PurchaseRequestStatus::Rejected,
        Requirement::AnyRole(&[PLANT_MANAGER]),
        StampField::Closed,
    ),
    TransitionRule::stamping(
        PurchaseRequestStatus::Approved,
        PurchaseRequestStatus::Closed,
        Requirement::AnyRole(&[PURCHASING]),
        StampField::Closed,
    ),
];

pub struct PurchaseRequest;

impl WorkflowEntity for PurchaseRequest {
    type Status = PurchaseRequestStatus;
    type Payload = PurchaseRequestPayload;

    const COLLECTION: &'static str = "purchase_requests";
    const INITIAL: PurchaseRequestStatus = PurchaseRequestStatus::Draft;

    fn rules() -> &'static [TransitionRule<PurchaseRequestStatus>] {
        PURCHASE_REQUEST_RULES
    }
}
