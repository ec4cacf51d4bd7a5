// src/ledger.rs - Semi-fungible unit ledger (ERC-1155 style balance store)

use alloc::string::String;
use stylus_sdk::{
    alloy_primitives::{Address, U256},
    alloy_sol_types::sol,
    prelude::*,
};

use crate::{InvalidAmount, MembershipError};

sol! {
    // Standard semi-fungible transfer notification; mints use the zero
    // address as `from`.
    event TransferSingle(
        address indexed operator,
        address indexed from,
        address indexed to,
        uint256 id,
        uint256 value
    );
}

sol_storage! {
    pub struct UnitLedger {
        // unit id => holder => quantity
        mapping(uint256 => mapping(address => uint256)) balances;
        // global metadata locator, shared by every unit id
        string metadata_uri;
    }
}

impl UnitLedger {
    pub fn balance_of(&self, account: Address, id: U256) -> U256 {
        self.balances.getter(id).get(account)
    }

    pub fn uri(&self) -> String {
        self.metadata_uri.get_string()
    }

    pub fn set_uri(&mut self, new_uri: String) {
        self.metadata_uri.set_str(&new_uri);
    }

    /// Credits one unit of `id` to `to` and emits the ledger notification.
    /// Quantities are tracked with checked arithmetic like every other
    /// balance in this crate.
    pub fn credit_unit(
        &mut self,
        operator: Address,
        to: Address,
        id: U256,
    ) -> Result<(), MembershipError> {
        let held = self.balances.getter(id).get(to);
        let new_held = held
            .checked_add(U256::from(1u8))
            .ok_or(MembershipError::InvalidAmount(InvalidAmount {}))?;

        self.balances.setter(id).setter(to).set(new_held);

        log(
            self.vm(),
            TransferSingle {
                operator,
                from: Address::ZERO,
                to,
                id,
                value: U256::from(1u8),
            },
        );

        Ok(())
    }
}
