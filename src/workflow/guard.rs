//! Transition guard
//!
//! Decides whether an actor may move a document to a requested status. The
//! checks run in a fixed order so callers always see the most specific
//! rejection: an unknown target label, then a missing edge, then a missing
//! permission.

use crate::auth::Session;
use crate::store::Document;

use super::errors::WorkflowError;
use super::types::{Requirement, TransitionRule, WorkflowEntity};

/// Whether `actor` satisfies `requirement` for a record owned by `owner`
pub fn satisfies(requirement: Requirement, actor: &Session, owner: &str) -> bool {
    match requirement {
        Requirement::Owner => actor.email == owner,
        Requirement::AnyRole(roles) => actor.roles.has_any(roles),
        Requirement::Manager => actor.roles.has_manager_role(),
        Requirement::OwnerOrRole(roles) => actor.email == owner || actor.roles.has_any(roles),
    }
}

/// Validate a requested transition for entity `E`, returning the matching edge
pub fn check<E: WorkflowEntity>(
    document: &Document,
    requested: &str,
    actor: &Session,
) -> Result<&'static TransitionRule<E::Status>, WorkflowError> {
    let to: E::Status = requested
        .parse()
        .map_err(|_| WorkflowError::InvalidStatus {
            collection: E::COLLECTION.to_string(),
            status: requested.to_string(),
        })?;

    // A stored label outside the status set has no outgoing edges
    let invalid_transition = || WorkflowError::InvalidTransition {
        collection: E::COLLECTION.to_string(),
        from: document.status().to_string(),
        to: requested.to_string(),
    };
    let from: E::Status = document.status().parse().map_err(|_| invalid_transition())?;
    let rule = E::rule_for(from, to).ok_or_else(invalid_transition)?;

    if !satisfies(rule.requirement, actor, document.owner()) {
        return Err(WorkflowError::Unauthorized {
            actor: actor.email.clone(),
            collection: E::COLLECTION.to_string(),
            from: document.status().to_string(),
            to: requested.to_string(),
        });
    }

    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::RoleSet;
    use crate::entities::deviation::{Deviation, DeviationStatus};
    use crate::entities::overtime::OvertimeOrder;
    use crate::workflow::StampField;
    use serde_json::json;

    fn session(email: &str, roles: &[&str]) -> Session {
        Session::new(email, RoleSet::new(roles.iter().copied())).unwrap()
    }

    fn document(collection: &str, status: &str, owner: &str) -> Document {
        Document::new(collection, status, owner, json!({}))
    }

    #[test]
    fn test_quality_approves_pending_deviation() {
        let doc = document("deviations", "pending", "author@bruss.example");
        let rule = check::<Deviation>(&doc, "approved", &session("q@bruss.example", &["quality"]))
            .unwrap();
        assert_eq!(rule.to, DeviationStatus::Approved);
        assert_eq!(rule.stamp, Some(StampField::Approved));
    }

    #[test]
    fn test_plain_user_is_unauthorized() {
        let doc = document("deviations", "pending", "author@bruss.example");
        let err = check::<Deviation>(&doc, "approved", &session("u@bruss.example", &["user"]))
            .unwrap_err();
        assert_eq!(err.label(), "unauthorized");
    }

    #[test]
    fn test_unknown_label_wins_over_permission() {
        let doc = document("deviations", "pending", "author@bruss.example");
        let err = check::<Deviation>(&doc, "archived", &session("u@bruss.example", &[]))
            .unwrap_err();
        assert_eq!(err.label(), "invalid status");
    }

    #[test]
    fn test_missing_edge_wins_over_permission() {
        let doc = document("deviations", "closed", "author@bruss.example");
        let err = check::<Deviation>(&doc, "pending", &session("u@bruss.example", &[]))
            .unwrap_err();
        assert_eq!(err.label(), "invalid transition");

        // same-status requests are not edges either
        let doc = document("deviations", "pending", "author@bruss.example");
        let err = check::<Deviation>(&doc, "pending", &session("q@bruss.example", &["quality"]))
            .unwrap_err();
        assert_eq!(err.label(), "invalid transition");
    }

    #[test]
    fn test_owner_requirement_ignores_admin() {
        let doc = document("deviations", "draft", "author@bruss.example");
        assert!(check::<Deviation>(&doc, "pending", &session("author@bruss.example", &[])).is_ok());
        let err = check::<Deviation>(&doc, "pending", &session("root@bruss.example", &["admin"]))
            .unwrap_err();
        assert_eq!(err.label(), "unauthorized");
    }

    #[test]
    fn test_manager_requirement_accepts_any_manager_role() {
        let doc = document("overtime_orders", "pending", "author@bruss.example");
        let manager = session("m@bruss.example", &["logistics-manager"]);
        assert!(check::<OvertimeOrder>(&doc, "approved", &manager).is_ok());
        let admin = session("root@bruss.example", &["admin"]);
        assert!(check::<OvertimeOrder>(&doc, "rejected", &admin).is_ok());
        let hr = session("hr@bruss.example", &["hr"]);
        assert_eq!(
            check::<OvertimeOrder>(&doc, "approved", &hr).unwrap_err().label(),
            "unauthorized"
        );
    }

    #[test]
    fn test_owner_or_role() {
        let requirement = Requirement::OwnerOrRole(&["quality"]);
        assert!(satisfies(requirement, &session("a@bruss.example", &[]), "a@bruss.example"));
        assert!(satisfies(requirement, &session("q@bruss.example", &["quality"]), "a@bruss.example"));
        assert!(!satisfies(requirement, &session("b@bruss.example", &["hr"]), "a@bruss.example"));
    }
}
