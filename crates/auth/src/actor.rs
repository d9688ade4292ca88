use serde::{Deserialize, Serialize};

use stackassign_core::UserId;

use crate::roles::Role;

/// The resolved identity an operation runs as.
///
/// Construction is decoupled from transport: the API layer resolves an opaque
/// session token into an `Actor` and threads it into every service call.
/// Domain code never reaches into ambient request/session state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn customer(user_id: UserId) -> Self {
        Self::new(user_id, Role::Customer)
    }

    pub fn admin(user_id: UserId) -> Self {
        Self::new(user_id, Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Ownership check used by the policy table.
    pub fn owns(&self, owner: UserId) -> bool {
        self.user_id == owner
    }
}
