// Deviations (CAPA): temporary, approved departures from a product specification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::roles::{CAPA, QUALITY};
use crate::workflow::{
    EntityPayload, Requirement, StampField, TransitionRule, WorkflowEntity,
};
use crate::workflow_status;

workflow_status! {
    pub enum DeviationStatus {
        Draft => "draft",
        Pending => "pending",
        Approved => "approved",
        InProgress => "in progress",
        Rejected => "rejected",
        Closed => "closed",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviationPayload {
    pub article_number: String,
    pub article_name: String,
    pub reason: String,
    pub area: String,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub unit: Option<String>,
    pub time_period_from: DateTime<Utc>,
    pub time_period_to: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
}

impl EntityPayload for DeviationPayload {
    fn validate(&self) -> Result<(), String> {
        if self.article_number.trim().is_empty() {
            return Err("article number is required".to_string());
        }
        if self.reason.trim().is_empty() {
            return Err("reason is required".to_string());
        }
        if self.time_period_to < self.time_period_from {
            return Err("deviation period ends before it starts".to_string());
        }
        if self.quantity.is_some() && self.unit.as_deref().map_or(true, |u| u.trim().is_empty()) {
            return Err("quantity requires a unit".to_string());
        }
        Ok(())
    }
}

const DEVIATION_RULES: &[TransitionRule<DeviationStatus>] = &[
    TransitionRule::new(
        DeviationStatus::Draft,
        DeviationStatus::Pending,
        Requirement::Owner,
    ),
    TransitionRule::stamping(
        DeviationStatus::Pending,
        DeviationStatus::Approved,
        Requirement::AnyRole(&[QUALITY]),
        StampField::Approved,
    ),
    TransitionRule::stamping(
        DeviationStatus::Pending,
        DeviationStatus::Rejected,
        Requirement::AnyRole(&[QUALITY]),
        StampField::Closed,
    ),
    TransitionRule::new(
        DeviationStatus::Approved,
        DeviationStatus::InProgress,
        Requirement::AnyRole(&[CAPA, QUALITY]),
    ),
    TransitionRule::stamping(
        DeviationStatus::Approved,
        DeviationStatus::Closed,
        Requirement::AnyRole(&[CAPA, QUALITY]),
        StampField::Closed,
    ),
    TransitionRule::stamping(
        DeviationStatus::InProgress,
        DeviationStatus::Closed,
        Requirement::AnyRole(&[CAPA, QUALITY]),
        StampField::Closed,
    ),
];

pub struct Deviation;

impl WorkflowEntity for Deviation {
    type Status = DeviationStatus;
    type Payload = DeviationPayload;

    const COLLECTION: &'static str = "deviations";
    const INITIAL: DeviationStatus = DeviationStatus::Draft;

    fn rules() -> &'static [TransitionRule<DeviationStatus>] {
        DEVIATION_RULES
    }
}
