//! Static role → resource → action permission matrix

use crate::models::role::{Action, ResourceKind, Role};
use std::collections::HashMap;
use thiserror::Error;

/// One row of the matrix: what `role` may do to `resource`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRule {
    pub role: Role,
    pub resource: ResourceKind,
    pub actions: Vec<Action>,
}

impl PermissionRule {
    pub fn new(role: Role, resource: ResourceKind, actions: &[Action]) -> Self {
        Self {
            role,
            resource,
            actions: actions.to_vec(),
        }
    }
}

/// Matrix construction error (fatal at startup)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatrixError {
    #[error("more than one permission rule for {role} on {resource}")]
    DuplicateRule { role: Role, resource: ResourceKind },
}

/// Immutable permission table, built once and shared.
#[derive(Debug, Clone)]
pub struct PermissionMatrix {
    rules: Vec<PermissionRule>,
    index: HashMap<(Role, ResourceKind), usize>,
}

impl PermissionMatrix {
    /// Build a matrix from an ordered rule list.
    ///
    /// At most one rule may exist per `(role, resource)` pair.
    pub fn new(rules: Vec<PermissionRule>) -> Result<Self, MatrixError> {
        let mut index = HashMap::with_capacity(rules.len());

        for (position, rule) in rules.iter().enumerate() {
            if index.insert((rule.role, rule.resource), position).is_some() {
                return Err(MatrixError::DuplicateRule {
                    role: rule.role,
                    resource: rule.resource,
                });
            }
        }

        Ok(Self { rules, index })
    }

    /// The production rule set.
    pub fn standard() -> Result<Self, MatrixError> {
        Self::new(standard_rules())
    }

    /// Whether `role` may perform `action` on `resource`. Missing rules deny.
    pub fn allows(&self, role: Role, resource: ResourceKind, action: Action) -> bool {
        self.index
            .get(&(role, resource))
            .map(|&i| self.rules[i].actions.contains(&action))
            .unwrap_or(false)
    }

    pub fn rules(&self) -> &[PermissionRule] {
        &self.rules
    }
}

/// Rule set encoded by [`PermissionMatrix::standard`].
pub fn standard_rules() -> Vec<PermissionRule> {
    use Action::*;

    const FULL: &[Action] = &[Create, Read, Update, Delete, Manage];

    vec![
        // OWNER
        PermissionRule::new(Role::Owner, ResourceKind::Task, FULL),
        PermissionRule::new(Role::Owner, ResourceKind::AuditLog, &[Read, Manage]),
        PermissionRule::new(Role::Owner, ResourceKind::User, FULL),
        PermissionRule::new(Role::Owner, ResourceKind::Organization, FULL),
        // ADMIN
        PermissionRule::new(Role::Admin, ResourceKind::Task, &[Create, Read, Update, Delete]),
        PermissionRule::new(Role::Admin, ResourceKind::AuditLog, &[Read]),
        PermissionRule::new(Role::Admin, ResourceKind::User, &[Read]),
        // VIEWER
        PermissionRule::new(Role::Viewer, ResourceKind::Task, &[Read]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> PermissionMatrix {
        PermissionMatrix::standard().unwrap()
    }

    #[test]
    fn test_owner_has_every_task_action() {
        let m = matrix();
        for action in Action::ALL {
            assert!(m.allows(Role::Owner, ResourceKind::Task, action), "{action}");
        }
    }

    #[test]
    fn test_viewer_only_reads_tasks() {
        let m = matrix();
        assert!(m.allows(Role::Viewer, ResourceKind::Task, Action::Read));
        for action in [Action::Create, Action::Update, Action::Delete, Action::Manage] {
            assert!(!m.allows(Role::Viewer, ResourceKind::Task, action));
        }
    }

    #[test]
    fn test_admin_grants() {
        let m = matrix();
        assert!(m.allows(Role::Admin, ResourceKind::Task, Action::Delete));
        assert!(!m.allows(Role::Admin, ResourceKind::Task, Action::Manage));
        assert!(m.allows(Role::Admin, ResourceKind::AuditLog, Action::Read));
        assert!(!m.allows(Role::Admin, ResourceKind::AuditLog, Action::Manage));
        assert!(m.allows(Role::Admin, ResourceKind::User, Action::Read));
        assert!(!m.allows(Role::Admin, ResourceKind::User, Action::Create));
    }

    #[test]
    fn test_owner_audit_log_is_read_and_manage_only() {
        let m = matrix();
        assert!(m.allows(Role::Owner, ResourceKind::AuditLog, Action::Read));
        assert!(m.allows(Role::Owner, ResourceKind::AuditLog, Action::Manage));
        assert!(!m.allows(Role::Owner, ResourceKind::AuditLog, Action::Create));
        assert!(!m.allows(Role::Owner, ResourceKind::AuditLog, Action::Delete));
    }

    #[test]
    fn test_unlisted_pairs_deny_everything() {
        let m = matrix();
        let unlisted = [
            (Role::Admin, ResourceKind::Organization),
            (Role::Viewer, ResourceKind::Organization),
            (Role::Viewer, ResourceKind::User),
            (Role::Viewer, ResourceKind::AuditLog),
        ];

        for (role, resource) in unlisted {
            for action in Action::ALL {
                assert!(!m.allows(role, resource, action), "{role} {resource} {action}");
            }
        }
    }

    #[test]
    fn test_every_pair_without_rule_denies() {
        let m = matrix();
        for role in Role::ALL {
            for resource in ResourceKind::ALL {
                let listed = m.rules().iter().any(|r| r.role == role && r.resource == resource);
                if !listed {
                    assert!(Action::ALL.iter().all(|a| !m.allows(role, resource, *a)));
                }
            }
        }
    }

    #[test]
    fn test_manage_is_not_derived() {
        let m = PermissionMatrix::new(vec![PermissionRule::new(
            Role::Admin,
            ResourceKind::Task,
            &[Action::Manage],
        )])
        .unwrap();

        assert!(m.allows(Role::Admin, ResourceKind::Task, Action::Manage));
        assert!(!m.allows(Role::Admin, ResourceKind::Task, Action::Read));
    }

    #[test]
    fn test_duplicate_rule_is_rejected() {
        let err = PermissionMatrix::new(vec![
            PermissionRule::new(Role::Viewer, ResourceKind::Task, &[Action::Read]),
            PermissionRule::new(Role::Admin, ResourceKind::Task, &[Action::Read]),
            PermissionRule::new(Role::Viewer, ResourceKind::Task, &[Action::Update]),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            MatrixError::DuplicateRule {
                role: Role::Viewer,
                resource: ResourceKind::Task
            }
        );
    }
}
