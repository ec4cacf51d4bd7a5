// src/lib.rs - Membership Token Contract for Arbitrum Stylus
// Per-category mint pricing with ERC-20 or native payment, role-gated
// administration, and treasury routing

#![cfg_attr(all(not(feature = "export-abi"), not(test)), no_main)]
extern crate alloc;

pub mod access;
pub mod ledger;

use alloc::string::String;
use stylus_sdk::{
    alloy_primitives::{Address, B256, U256},
    alloy_sol_types::{sol, SolCall},
    prelude::*,
    stylus_core::calls::context::Call,
};

use crate::access::{DEFAULT_ADMIN_ROLE, RoleStore};
use crate::ledger::UnitLedger;

// ============================================================================
// ERROR DEFINITIONS
// ============================================================================

sol! {
    error Unauthorized(address account, bytes32 needed_role);
    error InsufficientFunds(uint256 required);
    error TransferFailed();
    error AlreadyInitialized();
    error ZeroAddress();
    error InvalidAmount();
}

#[derive(SolidityError)]
pub enum MembershipError {
    Unauthorized(Unauthorized),
    InsufficientFunds(InsufficientFunds),
    TransferFailed(TransferFailed),
    AlreadyInitialized(AlreadyInitialized),
    ZeroAddress(ZeroAddress),
    InvalidAmount(InvalidAmount),
}

// ============================================================================
// EVENT DEFINITIONS (EVM Compatible)
// ============================================================================

sol! {
    event MemberJoined(address indexed member, uint256 unit_id);
    event MintPriceUpdated(uint256 indexed category, uint256 old_value, uint256 new_value);
    event ERC20ContractUpdated(uint256 indexed category, address old_address, address new_address);
    event TreasuryAddressUpdated(uint256 indexed category, address old_address, address new_address);
}

// ============================================================================
// EXTERNAL COLLABORATORS
// ============================================================================

sol! {
    // Allowance-based pull on the configured payment token; issued as a raw
    // host call so the test VM can intercept it
    function transferFrom(address from, address to, uint256 amount) external returns (bool);
}

// ============================================================================
// STORAGE LAYOUT
// ============================================================================

sol_storage! {
    // Per-category mint configuration. A zero `erc20_contract` selects
    // native-currency payment for that category.
    pub struct CategoryConfig {
        uint256 mint_price;
        address erc20_contract;
        address treasury;
    }

    #[entrypoint]
    pub struct MembershipIssuer {
        // One-time setup guard
        bool initialized;

        // Last unit id handed out; ids start at 1 and are never reused
        uint256 unit_counter;

        // category id => mint configuration
        mapping(uint256 => CategoryConfig) categories;

        // Unit balances and metadata
        UnitLedger ledger;

        // Administrative role grants
        RoleStore access;
    }
}

// ============================================================================
// IMPLEMENTATION
// ============================================================================

#[public]
impl MembershipIssuer {
    // ========================================================================
    // INITIALIZATION
    // ========================================================================

    /// Initialize the issuer with a metadata locator and the default
    /// category's mint price, granting the administrative role to the caller.
    /// Can only be called once.
    pub fn initialize(
        &mut self,
        base_uri: String,
        default_price: U256,
    ) -> Result<(), MembershipError> {
        if self.initialized.get() {
            return Err(MembershipError::AlreadyInitialized(AlreadyInitialized {}));
        }

        let deployer = self.vm().msg_sender();
        if deployer == Address::ZERO {
            return Err(MembershipError::ZeroAddress(ZeroAddress {}));
        }

        self.ledger.set_uri(base_uri);
        self.categories.setter(U256::ZERO).mint_price.set(default_price);
        self.access.grant(DEFAULT_ADMIN_ROLE, deployer, deployer);

        self.initialized.set(true);

        Ok(())
    }

    // ========================================================================
    // METADATA
    // ========================================================================

    /// Returns the metadata locator; the same locator serves every unit id.
    pub fn uri(&self, _id: U256) -> Result<String, MembershipError> {
        Ok(self.ledger.uri())
    }

    /// Replaces the metadata locator. Administrative role required.
    pub fn set_uri(&mut self, new_uri: String) -> Result<(), MembershipError> {
        self.only_admin()?;
        self.ledger.set_uri(new_uri);
        Ok(())
    }

    // ========================================================================
    // CATEGORY CONFIGURATION
    // ========================================================================

    /// Returns the mint price for `category` in smallest payment-token units.
    pub fn mint_price(&self, category: U256) -> Result<U256, MembershipError> {
        Ok(self.categories.getter(category).mint_price.get())
    }

    /// Returns the payment token configured for `category`, or the zero
    /// address for native-currency payment.
    pub fn erc20_contract(&self, category: U256) -> Result<Address, MembershipError> {
        Ok(self.categories.getter(category).erc20_contract.get())
    }

    /// Returns the treasury receiving `category`'s mint proceeds.
    pub fn treasury_address(&self, category: U256) -> Result<Address, MembershipError> {
        Ok(self.categories.getter(category).treasury.get())
    }

    /// Overwrites the mint price for `category`. Administrative role required.
    pub fn set_mint_price(
        &mut self,
        category: U256,
        new_price: U256,
    ) -> Result<(), MembershipError> {
        self.only_admin()?;

        let old_value = self.categories.getter(category).mint_price.get();
        self.categories.setter(category).mint_price.set(new_price);

        log(
            self.vm(),
            MintPriceUpdated {
                category,
                old_value,
                new_value: new_price,
            },
        );

        Ok(())
    }

    /// Overwrites the payment token for `category`. Administrative role
    /// required. Setting the zero address switches the category to
    /// native-currency payment.
    pub fn set_erc20_contract(
        &mut self,
        category: U256,
        token: Address,
    ) -> Result<(), MembershipError> {
        self.only_admin()?;

        let old_address = self.categories.getter(category).erc20_contract.get();
        self.categories.setter(category).erc20_contract.set(token);

        log(
            self.vm(),
            ERC20ContractUpdated {
                category,
                old_address,
                new_address: token,
            },
        );

        Ok(())
    }

    /// Overwrites the treasury address for `category`. Administrative role
    /// required.
    pub fn set_treasury_address(
        &mut self,
        category: U256,
        treasury: Address,
    ) -> Result<(), MembershipError> {
        self.only_admin()?;

        let old_address = self.categories.getter(category).treasury.get();
        self.categories.setter(category).treasury.set(treasury);

        log(
            self.vm(),
            TreasuryAddressUpdated {
                category,
                old_address,
                new_address: treasury,
            },
        );

        Ok(())
    }

    // ========================================================================
    // MINTING
    // ========================================================================

    /// Mints `count` membership units of `category` to `to`, collecting
    /// payment at the price in effect at execution time. Open to anyone.
    ///
    /// Units receive sequential ids starting at one past the current counter;
    /// the id of the FIRST unit minted is returned. Payment is pulled from
    /// the caller's configured ERC-20 balance into the category treasury, or
    /// taken from the attached value when no token is configured.
    /// Overpayment in native currency is retained by the contract.
    #[payable]
    pub fn mint(
        &mut self,
        category: U256,
        to: Address,
        count: U256,
    ) -> Result<U256, MembershipError> {
        // Validate recipient address
        if to == Address::ZERO {
            return Err(MembershipError::ZeroAddress(ZeroAddress {}));
        }

        let units: u64 = count
            .try_into()
            .map_err(|_| MembershipError::InvalidAmount(InvalidAmount {}))?;
        if units == 0 {
            return Err(MembershipError::InvalidAmount(InvalidAmount {}));
        }

        // Configuration in effect at execution time
        let (price, token, treasury) = {
            let config = self.categories.getter(category);
            (
                config.mint_price.get(),
                config.erc20_contract.get(),
                config.treasury.get(),
            )
        };

        // Total price with overflow failing closed
        let total_price = price
            .checked_mul(count)
            .ok_or(MembershipError::InvalidAmount(InvalidAmount {}))?;

        let payer = self.vm().msg_sender();
        self.collect_payment(token, payer, treasury, total_price)?;

        // Allocate sequential ids, lowest first
        let first_id = self
            .unit_counter
            .get()
            .checked_add(U256::from(1u8))
            .ok_or(MembershipError::InvalidAmount(InvalidAmount {}))?;
        let last_id = first_id
            .checked_add(U256::from(units - 1))
            .ok_or(MembershipError::InvalidAmount(InvalidAmount {}))?;

        let mut id = first_id;
        loop {
            self.unit_counter.set(id);
            self.ledger.credit_unit(payer, to, id)?;

            log(
                self.vm(),
                MemberJoined {
                    member: to,
                    unit_id: id,
                },
            );

            if id == last_id {
                break;
            }
            id += U256::from(1u8);
        }

        Ok(first_id)
    }

    /// Returns the quantity of `id` held by `account`.
    pub fn balance_of(&self, account: Address, id: U256) -> Result<U256, MembershipError> {
        Ok(self.ledger.balance_of(account, id))
    }

    /// Returns the count of units ever minted, equal to the highest unit id
    /// handed out so far.
    pub fn total_minted(&self) -> Result<U256, MembershipError> {
        Ok(self.unit_counter.get())
    }

    // ========================================================================
    // TREASURY WITHDRAWAL
    // ========================================================================

    /// Transfers the contract's entire native-currency balance to the caller.
    /// Administrative role required. The balance is read and swept in one
    /// operation; a rejected outbound transfer leaves it untouched.
    pub fn withdraw(&mut self) -> Result<(), MembershipError> {
        self.only_admin()?;

        let caller = self.vm().msg_sender();
        let balance = self.vm().balance(self.vm().contract_address());

        self.vm()
            .transfer_eth(caller, balance)
            .map_err(|_| MembershipError::TransferFailed(TransferFailed {}))?;

        Ok(())
    }

    // ========================================================================
    // ROLE MANAGEMENT
    // ========================================================================

    /// Returns the administrative role id.
    pub fn default_admin_role(&self) -> Result<B256, MembershipError> {
        Ok(DEFAULT_ADMIN_ROLE)
    }

    /// Returns true if `account` holds `role`.
    pub fn has_role(&self, role: B256, account: Address) -> Result<bool, MembershipError> {
        Ok(self.access.has_role(role, account))
    }

    /// Grants `role` to `account`. Administrative role required.
    pub fn grant_role(&mut self, role: B256, account: Address) -> Result<(), MembershipError> {
        self.only_admin()?;

        let sender = self.vm().msg_sender();
        self.access.grant(role, account, sender);

        Ok(())
    }

    /// Removes `role` from `account`. Administrative role required.
    pub fn revoke_role(&mut self, role: B256, account: Address) -> Result<(), MembershipError> {
        self.only_admin()?;

        let sender = self.vm().msg_sender();
        self.access.revoke(role, account, sender);

        Ok(())
    }
}

// ============================================================================
// INTERNAL HELPERS
// ============================================================================

impl MembershipIssuer {
    /// Internal guard checking the caller for the administrative role.
    fn only_admin(&self) -> Result<(), MembershipError> {
        self.access.check(DEFAULT_ADMIN_ROLE, self.vm().msg_sender())
    }

    /// Collects `total_price` from `payer`: an allowance-based ERC-20 pull
    /// into the treasury when a token is configured, otherwise a check of the
    /// value attached to the call. A zero total skips payment entirely.
    fn collect_payment(
        &mut self,
        token: Address,
        payer: Address,
        treasury: Address,
        total_price: U256,
    ) -> Result<(), MembershipError> {
        if total_price.is_zero() {
            return Ok(());
        }

        if token == Address::ZERO {
            // Native path: overpayment is accepted and retained
            if self.vm().msg_value() < total_price {
                return Err(MembershipError::InsufficientFunds(InsufficientFunds {
                    required: total_price,
                }));
            }
            return Ok(());
        }

        // ERC-20 path: a revert and a false return both reject the mint
        let pull = transferFromCall {
            from: payer,
            to: treasury,
            amount: total_price,
        };
        let returned = self
            .vm()
            .call(&Call::new(), token, &pull.abi_encode())
            .map_err(|_| {
                MembershipError::InsufficientFunds(InsufficientFunds {
                    required: total_price,
                })
            })?;

        let paid = transferFromCall::abi_decode_returns(&returned, false)
            .map(|decoded| decoded._0)
            .unwrap_or(false);
        if !paid {
            return Err(MembershipError::InsufficientFunds(InsufficientFunds {
                required: total_price,
            }));
        }

        Ok(())
    }
}

// ============================================================================
// UNIT TESTS
// Behavioral tests run on the SDK's TestVM; the end-to-end payment scenario
// lives in tests/membership_tests.rs
// ============================================================================
