//! Shared status workflow
//!
//! Entities describe their statuses and allowed transitions as tables of
//! [`TransitionRule`]s. The [`guard`] validates a requested change against
//! those tables and the acting user's roles, and the [`WorkflowEngine`]
//! applies accepted changes through the document store.

pub mod engine;
pub mod errors;
pub mod guard;
pub mod types;

pub use engine::WorkflowEngine;
pub use errors::WorkflowError;
pub use types::{
    EntityPayload, Requirement, StampField, TransitionRule, UnknownStatus, WorkflowEntity,
    WorkflowStatus,
};
