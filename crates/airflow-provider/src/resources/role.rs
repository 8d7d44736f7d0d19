//! `airflow_role`: a named set of permissions.

use std::collections::BTreeSet;

use airflow_client::{ActionName, ActionResource, ResourceName, Role};
use serde::{Deserialize, Serialize};

/// One granted `(action, resource)` pair, e.g. `can_read` on `DAGs`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub action: String,
    pub resource: String,
}

impl Permission {
    pub fn new(action: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            resource: resource.into(),
        }
    }
}

impl From<&Permission> for ActionResource {
    fn from(p: &Permission) -> Self {
        ActionResource {
            action: ActionName {
                name: p.action.clone(),
            },
            resource: ResourceName {
                name: p.resource.clone(),
            },
        }
    }
}

impl From<ActionResource> for Permission {
    fn from(ar: ActionResource) -> Self {
        Permission::new(ar.action.name, ar.resource.name)
    }
}

/// Desired attributes of a role. Permissions are a set: order and
/// duplicates are irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    pub name: String,
    pub actions: BTreeSet<Permission>,
}

impl RoleConfig {
    pub(crate) fn to_wire(&self) -> Role {
        Role {
            name: self.name.clone(),
            actions: self.actions.iter().map(ActionResource::from).collect(),
        }
    }
}

/// Observed attributes of a role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleState {
    pub name: String,
    pub actions: BTreeSet<Permission>,
}

impl From<Role> for RoleState {
    fn from(role: Role) -> Self {
        Self {
            name: role.name,
            actions: role.actions.into_iter().map(Permission::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_are_a_set() {
        let read = ActionResource::from(&Permission::new("can_read", "DAGs"));
        let role = Role {
            name: "ops".to_string(),
            actions: vec![read.clone(), read],
        };
        let state = RoleState::from(role);
        assert_eq!(state.actions.len(), 1);
        assert!(state.actions.contains(&Permission::new("can_read", "DAGs")));
    }

    #[test]
    fn test_config_to_wire_is_sorted() {
        let config = RoleConfig {
            name: "ops".to_string(),
            actions: BTreeSet::from([
                Permission::new("can_read", "Variables"),
                Permission::new("can_edit", "DAGs"),
            ]),
        };
        let wire = config.to_wire();
        assert_eq!(wire.actions[0].action.name, "can_edit");
        assert_eq!(wire.actions[1].resource.name, "Variables");
    }
}
