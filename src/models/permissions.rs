//! Role-based gating of dashboard actions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Property;

/// WordPress role of the current user
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Administrator,
    Editor,
    Author,
    Subscriber,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "administrator" | "admin" => Ok(Role::Administrator),
            "editor" => Ok(Role::Editor),
            "author" => Ok(Role::Author),
            "subscriber" => Ok(Role::Subscriber),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Actions a role may be allowed to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Create,
    Edit,
    Delete,
    BulkEdit,
    Import,
    Export,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            Capability::Create => "create properties",
            Capability::Edit => "edit properties",
            Capability::Delete => "delete properties",
            Capability::BulkEdit => "run bulk actions",
            Capability::Import => "import properties",
            Capability::Export => "export properties",
        };
        f.write_str(action)
    }
}

/// The current user's identity and role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    pub user_id: i64,
    pub role: Role,
}

impl Permissions {
    pub fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Whether the role holds the capability at all
    pub fn can(&self, capability: Capability) -> bool {
        match self.role {
            Role::Administrator | Role::Editor | Role::Author => true,
            Role::Subscriber => capability == Capability::Export,
        }
    }

    /// Whether the user may edit or delete this particular record.
    /// Authors only touch what they created.
    pub fn can_modify(&self, property: &Property) -> bool {
        match self.role {
            Role::Administrator | Role::Editor => true,
            Role::Author => property.created_by == Some(self.user_id),
            Role::Subscriber => false,
        }
    }

    /// Split identifiers into those the user may modify and those denied
    /// with a reason. `loaded` is the page the identifiers were chosen from.
    pub fn partition(&self, ids: &[i64], loaded: &[Property]) -> (Vec<i64>, Vec<(i64, String)>) {
        let mut allowed = Vec::new();
        let mut denied = Vec::new();

        for &id in ids {
            if matches!(self.role, Role::Administrator | Role::Editor) {
                allowed.push(id);
                continue;
            }
            match loaded.iter().find(|p| p.id == id) {
                Some(property) if self.can_modify(property) => allowed.push(id),
                Some(_) => denied.push((id, "permission denied".to_string())),
                None => denied.push((id, "permission denied: property not loaded".to_string())),
            }
        }

        (allowed, denied)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::new(0, Role::Administrator)
    }
}
