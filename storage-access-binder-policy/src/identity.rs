//! Identity directory: the roles owned by the authentication provider.

use std::collections::BTreeSet;

use log::debug;

use crate::config::AuthDefinition;
use crate::types::{PrincipalClass, RoleKind, RoleRef};

/// Role id of the identity pool's unauthenticated role.
pub const UNAUTHENTICATED_ROLE_ID: &str = "unauthenticatedUserIamRole";
/// Role id of the identity pool's authenticated role.
pub const AUTHENTICATED_ROLE_ID: &str = "authenticatedUserIamRole";

/// Looks up the role backing a principal class.
pub trait IdentityDirectory {
    fn resolve(&self, principal: &PrincipalClass) -> Option<RoleRef>;
}

/// Roles provisioned by the auth resource: the two identity pool roles and
/// one role per user group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResource {
    guest_access: bool,
    groups: BTreeSet<String>,
}

impl AuthResource {
    pub fn new<I, S>(guest_access: bool, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            guest_access,
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_definition(definition: &AuthDefinition) -> Self {
        Self::new(definition.guest_access, definition.groups.iter().cloned())
    }
}

impl IdentityDirectory for AuthResource {
    fn resolve(&self, principal: &PrincipalClass) -> Option<RoleRef> {
        let role = match principal {
            PrincipalClass::Guest if self.guest_access => {
                Some(RoleRef::new(RoleKind::Unauthenticated, UNAUTHENTICATED_ROLE_ID))
            }
            PrincipalClass::Guest => None,
            PrincipalClass::Authenticated => {
                Some(RoleRef::new(RoleKind::Authenticated, AUTHENTICATED_ROLE_ID))
            }
            PrincipalClass::Group(name) => self
                .groups
                .contains(name)
                .then(|| RoleRef::new(RoleKind::Group, name.clone())),
        };
        if role.is_none() {
            debug!("No role provisioned for principal '{}'", principal);
        }
        role
    }
}
