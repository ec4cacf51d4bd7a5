// src/access.rs - Role registry backing the administrative surface

use stylus_sdk::{
    alloy_primitives::{Address, B256},
    alloy_sol_types::sol,
    prelude::*,
};

use crate::{MembershipError, Unauthorized};

/// Role id checked by every privileged operation. Follows the
/// AccessControl convention of the all-zero admin role.
pub const DEFAULT_ADMIN_ROLE: B256 = B256::ZERO;

sol! {
    event RoleGranted(bytes32 indexed role, address indexed account, address indexed sender);
    event RoleRevoked(bytes32 indexed role, address indexed account, address indexed sender);
}

sol_storage! {
    pub struct RoleStore {
        // role id => account => membership flag
        mapping(bytes32 => mapping(address => bool)) members;
    }
}

impl RoleStore {
    pub fn has_role(&self, role: B256, account: Address) -> bool {
        self.members.getter(role).get(account)
    }

    /// Rejects with `Unauthorized` unless `account` holds `role`.
    pub fn check(&self, role: B256, account: Address) -> Result<(), MembershipError> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(MembershipError::Unauthorized(Unauthorized {
                account,
                needed_role: role,
            }))
        }
    }

    /// Grants `role` to `account`. Idempotent; the event fires only when the
    /// grant actually changes state.
    pub fn grant(&mut self, role: B256, account: Address, sender: Address) {
        if !self.has_role(role, account) {
            self.members.setter(role).setter(account).set(true);
            log(
                self.vm(),
                RoleGranted {
                    role,
                    account,
                    sender,
                },
            );
        }
    }

    /// Removes `role` from `account`. Idempotent, mirroring `grant`.
    pub fn revoke(&mut self, role: B256, account: Address, sender: Address) {
        if self.has_role(role, account) {
            self.members.setter(role).setter(account).set(false);
            log(
                self.vm(),
                RoleRevoked {
                    role,
                    account,
                    sender,
                },
            );
        }
    }
}
