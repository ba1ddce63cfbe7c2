// Document envelope shared by every workflow collection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workflow::StampField;

/// Drafts are private to their creator in every collection
pub const DRAFT_STATUS: &str = "draft";

/// Who did something, and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub at: DateTime<Utc>,
    pub by: String,
}

impl AuditStamp {
    pub fn now(by: &str) -> Self {
        Self {
            at: Utc::now(),
            by: by.to_string(),
        }
    }
}

/// A stored business record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    #[serde(flatten)]
    pub body: DocumentSnapshot,
}

/// Everything in a document except its identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    pub collection: String,
    pub status: String,
    pub owner: String,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited: Option<AuditStamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<AuditStamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<AuditStamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accounted_at: Option<AuditStamp>,
    pub payload: serde_json::Value,
}

impl Document {
    pub fn new(collection: &str, status: &str, owner: &str, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            body: DocumentSnapshot {
                collection: collection.to_string(),
                status: status.to_string(),
                owner: owner.to_string(),
                version: 1,
                created_at: Utc::now(),
                edited: None,
                approved_at: None,
                closed_at: None,
                accounted_at: None,
                payload,
            },
        }
    }

    pub fn collection(&self) -> &str {
        &self.body.collection
    }

    pub fn status(&self) -> &str {
        &self.body.status
    }

    pub fn owner(&self) -> &str {
        &self.body.owner
    }

    pub fn version(&self) -> u64 {
        self.body.version
    }

    pub fn is_visible_to(&self, viewer: &str) -> bool {
        self.body.status != DRAFT_STATUS || self.body.owner == viewer
    }

    /// Next version of this document after an accepted transition
    pub fn transitioned(&self, to: &str, stamp: Option<StampField>, actor: &str) -> Document {
        let mut next = self.clone();
        let audit = AuditStamp::now(actor);
        next.body.status = to.to_string();
        next.body.version += 1;
        match stamp {
            Some(StampField::Approved) => next.body.approved_at = Some(audit.clone()),
            Some(StampField::Closed) => next.body.closed_at = Some(audit.clone()),
            Some(StampField::Accounted) => next.body.accounted_at = Some(audit.clone()),
            None => {}
        }
        next.body.edited = Some(audit);
        next
    }
}

/// Archived prior version of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub entity_id: Uuid,
    pub archived_at: DateTime<Utc>,
    pub archived_by: String,
    pub snapshot: DocumentSnapshot,
}

impl HistoryEntry {
    pub fn archive(previous: &Document, actor: &str) -> Self {
        Self {
            entity_id: previous.id,
            archived_at: Utc::now(),
            archived_by: actor.to_string(),
            snapshot: previous.body.clone(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.snapshot.collection
    }
}

/// Name of the sibling collection holding a collection's history
pub fn history_collection(collection: &str) -> String {
    format!("{collection}_history")
}
