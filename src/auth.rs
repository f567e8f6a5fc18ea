use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::errors::{RegistryError, Result};
use crate::types::UserId;

/// role tags held by an acting user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// full administrative access
    Admin,
    /// legal department, authorized for sensitive status transitions
    Legal,
    /// technical override for support interventions
    Tech,
    /// business editor, may register and amend records
    Editor,
    /// read-only access
    Viewer,
}

/// operations gated by role membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ManageCollateral,
    /// sensitive transitions (contentious, realization, transfers, release, sale)
    ChangeStatus,
    LinkContract,
    ManageGuarantor,
    ManageCatalog,
    ManageContracts,
    SyncContracts,
    ViewDashboard,
}

impl Action {
    /// statically declared role set satisfying the action; membership of any
    /// one role is sufficient
    pub fn required_roles(&self) -> &'static [Role] {
        match self {
            Action::ManageCollateral => &[Role::Admin, Role::Editor],
            Action::ChangeStatus => &[Role::Legal, Role::Tech],
            Action::LinkContract => &[Role::Admin, Role::Editor],
            Action::ManageGuarantor => &[Role::Admin, Role::Editor],
            Action::ManageCatalog => &[Role::Admin],
            Action::ManageContracts => &[Role::Admin, Role::Editor],
            Action::SyncContracts => &[Role::Admin, Role::Tech],
            Action::ViewDashboard => &[
                Role::Admin,
                Role::Legal,
                Role::Tech,
                Role::Editor,
                Role::Viewer,
            ],
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Action::ManageCollateral => "manage collateral",
            Action::ChangeStatus => "change collateral status",
            Action::LinkContract => "link loan contract",
            Action::ManageGuarantor => "manage guarantor",
            Action::ManageCatalog => "manage collateral types",
            Action::ManageContracts => "manage loan contracts",
            Action::SyncContracts => "synchronize loan contracts",
            Action::ViewDashboard => "view dashboard",
        }
    }
}

/// identity and role set supplied by the session collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActingUser {
    pub id: UserId,
    pub name: String,
    pub roles: BTreeSet<Role>,
}

impl ActingUser {
    pub fn new(id: UserId, name: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            id,
            name: name.into(),
            roles: roles.into_iter().collect(),
        }
    }

    /// true when the user holds any of the given roles
    pub fn holds_any(&self, roles: &[Role]) -> bool {
        roles.iter().any(|r| self.roles.contains(r))
    }

    /// check an action against the declared role table
    pub fn authorize(&self, action: Action) -> Result<()> {
        let required = action.required_roles();
        if self.holds_any(required) {
            Ok(())
        } else {
            Err(RegistryError::Unauthorized {
                action: action.name(),
                required,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(roles: &[Role]) -> ActingUser {
        ActingUser::new(Uuid::new_v4(), "test user", roles.iter().copied())
    }

    #[test]
    fn test_legal_gate_accepts_legal_and_tech() {
        assert!(user(&[Role::Legal]).authorize(Action::ChangeStatus).is_ok());
        assert!(user(&[Role::Tech]).authorize(Action::ChangeStatus).is_ok());
        assert!(user(&[Role::Admin]).authorize(Action::ChangeStatus).is_err());
        assert!(user(&[Role::Editor]).authorize(Action::ChangeStatus).is_err());
    }

    #[test]
    fn test_editor_cannot_change_status() {
        let u = user(&[Role::Editor]);
        assert!(u.authorize(Action::ManageCollateral).is_ok());
        let err = u.authorize(Action::ChangeStatus).unwrap_err();
        assert!(matches!(err, crate::errors::RegistryError::Unauthorized { .. }));
    }

    #[test]
    fn test_everyone_sees_dashboard() {
        assert!(user(&[Role::Viewer]).authorize(Action::ViewDashboard).is_ok());
    }
}
