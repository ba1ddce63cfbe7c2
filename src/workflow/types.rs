// Core types for the shared status workflow

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::str::FromStr;
use thiserror::Error;

/// Returned when a status label does not belong to an entity's status set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status {0:?}")]
pub struct UnknownStatus(pub String);

/// A status enum belonging to one workflow entity
pub trait WorkflowStatus:
    Copy + Eq + Debug + Display + FromStr<Err = UnknownStatus> + Send + Sync + 'static
{
    fn label(&self) -> &'static str;
}

/// Who may perform a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Only the user who created the record
    Owner,
    /// Any holder of one of these roles (admin always qualifies)
    AnyRole(&'static [&'static str]),
    /// Any `*manager` role (admin always qualifies)
    Manager,
    /// The owner, or a holder of one of these roles
    OwnerOrRole(&'static [&'static str]),
}

/// Audit field stamped with the acting user when a transition is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampField {
    Approved,
    Closed,
    Accounted,
}

/// One edge of an entity's status graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule<S> {
    pub from: S,
    pub to: S,
    pub requirement: Requirement,
    pub stamp: Option<StampField>,
}

impl<S> TransitionRule<S> {
    pub const fn new(from: S, to: S, requirement: Requirement) -> Self {
        Self {
            from,
            to,
            requirement,
            stamp: None,
        }
    }

    pub const fn stamping(from: S, to: S, requirement: Requirement, stamp: StampField) -> Self {
        Self {
            from,
            to,
            requirement,
            stamp: Some(stamp),
        }
    }
}

/// Payload validation hook for entity-specific fields
pub trait EntityPayload: Serialize + DeserializeOwned {
    fn validate(&self) -> Result<(), String>;
}

/// A business record type driven by the shared workflow
pub trait WorkflowEntity {
    type Status: WorkflowStatus;
    type Payload: EntityPayload;

    /// Document collection name, also used as the cache tag
    const COLLECTION: &'static str;
    /// Status assigned on creation
    const INITIAL: Self::Status;

    fn rules() -> &'static [TransitionRule<Self::Status>];

    /// A status with no outgoing edges is terminal
    fn is_terminal(status: Self::Status) -> bool {
        !Self::rules().iter().any(|rule| rule.from == status)
    }

    fn rule_for(
        from: Self::Status,
        to: Self::Status,
    ) -> Option<&'static TransitionRule<Self::Status>> {
        Self::rules()
            .iter()
            .find(|rule| rule.from == from && rule.to == to)
    }
}

/// Declares a status enum together with its wire labels.
///
/// Generates `Display`, `FromStr`, an `ALL` constant and the
/// [`WorkflowStatus`] implementation from one list of `Variant => "label"` pairs.
#[macro_export]
macro_rules! workflow_status {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl $crate::workflow::WorkflowStatus for $name {
            fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::workflow::WorkflowStatus::label(self))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::workflow::UnknownStatus;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err($crate::workflow::UnknownStatus(other.to_string())),
                }
            }
        }
    };
}
