// Overtime orders: department requests for extra hours, approved by a manager
// and settled by HR

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::auth::roles::HR;
use crate::workflow::{
    EntityPayload, Requirement, StampField, TransitionRule, WorkflowEntity,
};
use crate::workflow_status;

workflow_status! {
    pub enum OvertimeStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Canceled => "canceled",
        Accounted => "accounted",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimePayload {
    pub department: String,
    pub work_date: NaiveDate,
    pub hours: f64,
    pub employees: Vec<String>,
    pub reason: String,
}

impl EntityPayload for OvertimePayload {
    fn validate(&self) -> Result<(), String> {
        if self.department.trim().is_empty() {
            return Err("department is required".to_string());
        }
        if !(self.hours > 0.0 && self.hours <= 24.0) {
            return Err("hours must be within (0, 24]".to_string());
        }
        if self.employees.is_empty() {
            return Err("at least one employee is required".to_string());
        }
        Ok(())
    }
}

const OVERTIME_RULES: &[TransitionRule<OvertimeStatus>] = &[
    TransitionRule::stamping(
        OvertimeStatus::Pending,
        OvertimeStatus::Approved,
        Requirement::Manager,
        StampField::Approved,
    ),
    TransitionRule::stamping(
        OvertimeStatus::Pending,
        OvertimeStatus::Rejected,
        Requirement::Manager,
        StampField::Closed,
    ),
    TransitionRule::stamping(
        OvertimeStatus::Pending,
        OvertimeStatus::Canceled,
        Requirement::Owner,
        StampField::Closed,
    ),
    TransitionRule::stamping(
        OvertimeStatus::Approved,
        OvertimeStatus::Accounted,
        Requirement::AnyRole(&[HR]),
        StampField::Accounted,
    ),
];

pub struct OvertimeOrder;

impl WorkflowEntity for OvertimeOrder {
    type Status = OvertimeStatus;
    type Payload = OvertimePayload;

    const COLLECTION: &'static str = "overtime_orders";
    const INITIAL: OvertimeStatus = OvertimeStatus::Pending;

    fn rules() -> &'static [TransitionRule<OvertimeStatus>] {
        OVERTIME_RULES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accounting_requires_hr() {
        let rule =
            OvertimeOrder::rule_for(OvertimeStatus::Approved, OvertimeStatus::Accounted).unwrap();
        assert_eq!(rule.requirement, Requirement::AnyRole(&[HR]));
        assert_eq!(rule.stamp, Some(StampField::Accounted));
    }

    #[test]
    fn test_terminal_statuses() {
        for status in [
            OvertimeStatus::Rejected,
            OvertimeStatus::Canceled,
            OvertimeStatus::Accounted,
        ] {
            assert!(OvertimeOrder::is_terminal(status), "{status} should be terminal");
        }
        assert!(!OvertimeOrder::is_terminal(OvertimeStatus::Approved));
    }

    #[test]
    fn test_hours_bounds() {
        let mut payload = OvertimePayload {
            department: "logistics".into(),
            work_date: NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
            hours: 8.0,
            employees: vec!["10234".into()],
            reason: "inventory".into(),
        };
        assert!(payload.validate().is_ok());

        payload.hours = 0.0;
        assert!(payload.validate().is_err());
        payload.hours = 25.0;
        assert!(payload.validate().is_err());
    }
}
