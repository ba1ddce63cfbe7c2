use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::document::Document;

/// List query parameters accepted by every collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilter {
    pub status: Option<String>,
    /// Owner email, compared in the lowercase form sessions use
    #[serde(default, deserialize_with = "normalized_owner")]
    pub owner: Option<String>,
    /// Inclusive lower bound on `createdAt`
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `createdAt`
    pub to: Option<DateTime<Utc>>,
}

fn normalize_owner(owner: &str) -> Option<String> {
    let owner = owner.trim().to_lowercase();
    (!owner.is_empty()).then_some(owner)
}

fn normalized_owner<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let owner = Option::<String>::deserialize(deserializer)?;
    Ok(owner.as_deref().and_then(normalize_owner))
}

impl ListFilter {
    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn with_owner(mut self, owner: &str) -> Self {
        self.owner = normalize_owner(owner);
        self
    }

    /// Query predicate plus the draft rule: drafts only reach their owner
    pub fn matches(&self, document: &Document, viewer: &str) -> bool {
        if !document.is_visible_to(viewer) {
            return false;
        }
        if let Some(status) = &self.status {
            if document.status() != status {
                return false;
            }
        }
        if let Some(owner) = &self.owner {
            if document.owner() != owner {
                return false;
            }
        }
        if let Some(from) = self.from {
            if document.body.created_at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if document.body.created_at > to {
                return false;
            }
        }
        true
    }

    /// Stable string form used in cache keys
    pub fn cache_key(&self) -> String {
        format!(
            "status={}&owner={}&from={}&to={}",
            self.status.as_deref().unwrap_or(""),
            self.owner.as_deref().unwrap_or(""),
            self.from.map(|t| t.to_rfc3339()).unwrap_or_default(),
            self.to.map(|t| t.to_rfc3339()).unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn doc(status: &str, owner: &str) -> Document {
        Document::new("deviations", status, owner, json!({}))
    }

    #[test]
    fn test_status_and_owner_filters() {
        let filter = ListFilter::default().with_status("pending");
        assert!(filter.matches(&doc("pending", "a@bruss.example"), "b@bruss.example"));
        assert!(!filter.matches(&doc("approved", "a@bruss.example"), "b@bruss.example"));

        let filter = ListFilter::default().with_owner("a@bruss.example");
        assert!(filter.matches(&doc("pending", "a@bruss.example"), "b@bruss.example"));
        assert!(!filter.matches(&doc("pending", "c@bruss.example"), "b@bruss.example"));
    }

    #[test]
    fn test_owner_query_is_normalized() {
        let filter: ListFilter =
            serde_json::from_value(json!({"owner": " A@Bruss.Example "})).unwrap();
        assert_eq!(filter.owner.as_deref(), Some("a@bruss.example"));
        assert!(filter.matches(&doc("pending", "a@bruss.example"), "b@bruss.example"));

        let blank: ListFilter = serde_json::from_value(json!({"owner": "  "})).unwrap();
        assert_eq!(blank.owner, None);

        let built = ListFilter::default().with_owner("A@bruss.example");
        assert_eq!(built.owner.as_deref(), Some("a@bruss.example"));
    }

    #[test]
    fn test_drafts_hidden_from_other_viewers() {
        let filter = ListFilter::default();
        let draft = doc("draft", "a@bruss.example");
        assert!(filter.matches(&draft, "a@bruss.example"));
        assert!(!filter.matches(&draft, "b@bruss.example"));
    }

    #[test]
    fn test_date_range() {
        let document = doc("pending", "a@bruss.example");
        let created = document.body.created_at;

        let inside = ListFilter {
            from: Some(created - Duration::hours(1)),
            to: Some(created + Duration::hours(1)),
            ..Default::default()
        };
        assert!(inside.matches(&document, "x@bruss.example"));

        let after = ListFilter {
            from: Some(created + Duration::seconds(1)),
            ..Default::default()
        };
        assert!(!after.matches(&document, "x@bruss.example"));
    }

    #[test]
    fn test_cache_key_distinguishes_filters() {
        let a = ListFilter::default().with_status("pending");
        let b = ListFilter::default().with_owner("pending");
        assert_ne!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key(), a.clone().cache_key());
    }
}
