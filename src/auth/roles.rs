// Role vocabulary and membership checks

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const ADMIN: &str = "admin";
pub const HR: &str = "hr";
pub const QUALITY: &str = "quality";
pub const CAPA: &str = "capa";
pub const REWORK: &str = "rework";
pub const INVENTORY_APPROVE: &str = "inventory-approve";
pub const PURCHASING: &str = "purchasing";
pub const PLANT_MANAGER: &str = "plant-manager";
pub const USER: &str = "user";

/// Fixed role names; `*manager` roles are accepted in addition to these
pub const KNOWN_ROLES: &[&str] = &[
    ADMIN,
    HR,
    QUALITY,
    CAPA,
    REWORK,
    INVENTORY_APPROVE,
    PURCHASING,
    PLANT_MANAGER,
    USER,
];

pub fn is_manager_role(role: &str) -> bool {
    role.ends_with("manager")
}

pub fn is_known_role(role: &str) -> bool {
    KNOWN_ROLES.contains(&role) || is_manager_role(role)
}

/// Normalized set of role names held by one user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            roles
                .into_iter()
                .map(|role| role.as_ref().trim().to_lowercase())
                .filter(|role| !role.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, role: &str) -> bool {
        self.0.contains(role)
    }

    pub fn is_admin(&self) -> bool {
        self.contains(ADMIN)
    }

    /// Admin satisfies every role check
    pub fn has_any(&self, roles: &[&str]) -> bool {
        self.is_admin() || roles.iter().any(|role| self.contains(role))
    }

    pub fn has_manager_role(&self) -> bool {
        self.is_admin() || self.0.iter().any(|role| is_manager_role(role))
    }

    /// Roles outside the known vocabulary
    pub fn unknown(&self) -> Vec<&str> {
        self.0
            .iter()
            .map(String::as_str)
            .filter(|role| !is_known_role(role))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for RoleSet {
    fn from(roles: Vec<String>) -> Self {
        RoleSet::new(roles)
    }
}

impl From<RoleSet> for Vec<String> {
    fn from(roles: RoleSet) -> Self {
        roles.0.into_iter().collect()
    }
}
