#![allow(dead_code)]

use next_bruss::{
    Document, EntityKind, MemoryStore, RoleSet, Session, WorkflowEngine, WorkflowMetrics,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub fn session(email: &str, roles: &[&str]) -> Session {
    Session::new(email, RoleSet::new(roles.iter().copied())).unwrap()
}

pub fn owner() -> Session {
    session("author@bruss.example", &["user"])
}

pub fn outsider() -> Session {
    session("someone@bruss.example", &["user"])
}

pub fn admin() -> Session {
    session("admin@bruss.example", &["admin"])
}

pub fn engine_with_store(store: Arc<MemoryStore>) -> WorkflowEngine {
    WorkflowEngine::new(
        store,
        1_000,
        Duration::from_secs(300),
        Arc::new(WorkflowMetrics::new()),
    )
}

pub fn engine() -> WorkflowEngine {
    engine_with_store(Arc::new(MemoryStore::new()))
}

/// A valid creation payload for each entity type
pub fn sample_payload(kind: EntityKind) -> Value {
    match kind {
        EntityKind::Deviation => json!({
            "articleNumber": "28067",
            "articleName": "Seal carrier",
            "reason": "Burr on flange",
            "area": "press shop",
            "quantity": 120,
            "unit": "pcs",
            "timePeriodFrom": "2026-10-01T06:00:00Z",
            "timePeriodTo": "2026-10-14T22:00:00Z"
        }),
        EntityKind::OvertimeOrder => json!({
            "department": "assembly",
            "workDate": "2026-10-17",
            "hours": 8,
            "employees": ["10234", "10877"],
            "reason": "customer call-off"
        }),
        EntityKind::PurchaseRequest => json!({
            "supplier": "Würth",
            "currency": "PLN",
            "justification": "Replacement torque wrenches",
            "items": [{"name": "Torque wrench", "quantity": 2, "unitPrice": 450.0}]
        }),
        EntityKind::InventoryPosition => json!({
            "card": 7,
            "position": 2,
            "articleNumber": "5521",
            "articleName": "Housing",
            "quantity": 40,
            "unit": "pcs",
            "location": "warehouse A"
        }),
    }
}

/// Every route from creation to a terminal status, as requested targets
pub fn terminal_paths(kind: EntityKind) -> &'static [&'static [&'static str]] {
    match kind {
        EntityKind::Deviation => &[
            &["pending", "rejected"],
            &["pending", "approved", "closed"],
            &["pending", "approved", "in progress", "closed"],
        ],
        EntityKind::OvertimeOrder => &[
            &["rejected"],
            &["canceled"],
            &["approved", "accounted"],
        ],
        EntityKind::PurchaseRequest => &[
            &["pending", "rejected"],
            &["pending", "pre-approved", "rejected"],
            &["pending", "pre-approved", "approved", "closed"],
        ],
        EntityKind::InventoryPosition => &[&["rejected"], &["approved", "closed"]],
    }
}

/// Who may request `target`: the creator submits and cancels, admin does the rest
pub fn actor_for(target: &str) -> Session {
    match target {
        "pending" | "canceled" => owner(),
        _ => admin(),
    }
}

/// Create a record and walk it along `path`
pub async fn drive_path(engine: &WorkflowEngine, kind: EntityKind, path: &[&str]) -> Document {
    let mut doc = engine
        .create(kind, &owner(), sample_payload(kind))
        .await
        .unwrap();
    for target in path {
        doc = engine
            .transition(kind, doc.id, target, &actor_for(target))
            .await
            .unwrap();
    }
    doc
}
