//! Capability store
//!
//! The engine only asks membership questions and requests single grants or
//! revokes; who may manage which role is decided by the engine via
//! [`Role::managed_by`]. The store is injected so hosts can back it with
//! their own registry.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use trade_types::ids::Address;

/// Capabilities recognized by the contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Manages the admin set
    SuperAdmin,
    /// Resolves trades, manages signers and configuration, pauses
    Admin,
    /// Attests to trade terms and claims off-chain
    Signer,
}

impl Role {
    /// The role whose holders may grant or revoke `self`.
    pub fn managed_by(self) -> Role {
        match self {
            Role::SuperAdmin | Role::Admin => Role::SuperAdmin,
            Role::Signer => Role::Admin,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::Signer => "SIGNER",
        };
        f.write_str(label)
    }
}

/// Membership store for capabilities.
pub trait RoleStore {
    fn has_role(&self, account: &Address, role: Role) -> bool;

    /// Add `account` to `role`. Returns `false` if it was already a member.
    fn grant(&mut self, role: Role, account: Address) -> bool;

    /// Remove `account` from `role`. Returns `false` if it was not a member.
    fn revoke(&mut self, role: Role, account: &Address) -> bool;
}

/// In-memory role store: one member set per role.
#[derive(Debug, Clone, Default)]
pub struct MemoryRoleStore {
    members: HashMap<Role, HashSet<Address>>,
}

impl MemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts holding `role`.
    pub fn member_count(&self, role: Role) -> usize {
        self.members.get(&role).map_or(0, HashSet::len)
    }
}

impl RoleStore for MemoryRoleStore {
    fn has_role(&self, account: &Address, role: Role) -> bool {
        self.members
            .get(&role)
            .map_or(false, |set| set.contains(account))
    }

    fn grant(&mut self, role: Role, account: Address) -> bool {
        self.members.entry(role).or_default().insert(account)
    }

    fn revoke(&mut self, role: Role, account: &Address) -> bool {
        self.members
            .get_mut(&role)
            .map_or(false, |set| set.remove(account))
    }
}
