// tests/membership_tests.rs - Integration tests for the membership issuer
// Drives the full public surface end to end on the SDK test VM

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{SolCall, SolEvent, SolValue};
use stylus_sdk::testing::*;

use stylus_membership::ledger::TransferSingle;
use stylus_membership::{transferFromCall, MemberJoined, MembershipError, MembershipIssuer};

fn addr(n: u8) -> Address {
    Address::from([n; 20])
}

fn ok<T>(result: Result<T, MembershipError>) -> T {
    match result {
        Ok(value) => value,
        Err(_) => panic!("operation unexpectedly failed"),
    }
}

/// The pricing scenario from the project brief: a category priced at 1000
/// token units, a three-unit mint pulling exactly 3000 into the treasury and
/// handing out unit ids 1, 2, 3 with one ledger notification each.
#[test]
fn erc20_payment_scenario_end_to_end() {
    let vm = TestVM::default();
    let admin = vm.msg_sender();

    let mut issuer = MembershipIssuer::from(&vm);
    assert!(issuer
        .initialize("ipfs://membership/{id}.json".into(), U256::from(1000u64))
        .is_ok());

    let category = U256::ZERO;
    let token = addr(6);
    let treasury = addr(5);
    assert!(issuer.set_erc20_contract(category, token).is_ok());
    assert!(issuer.set_treasury_address(category, treasury).is_ok());

    // The issuer must pull exactly price * count from the minter into the
    // treasury via transferFrom
    let expected_pull = transferFromCall {
        from: admin,
        to: treasury,
        amount: U256::from(3000u64),
    };
    vm.mock_call(token, expected_pull.abi_encode(), Ok(true.abi_encode()));

    let logs_before = vm.get_emitted_logs().len();
    let first = ok(issuer.mint(category, admin, U256::from(3u8)));
    assert_eq!(first, U256::from(1u8));

    // Unit ids 1..=3, quantity 1 each, counter at 3
    for id in 1u8..=3 {
        assert_eq!(ok(issuer.balance_of(admin, U256::from(id))), U256::from(1u8));
    }
    assert_eq!(ok(issuer.total_minted()), U256::from(3u8));

    // Three ledger notifications with from = zero address, three joins
    let logs = vm.get_emitted_logs()[logs_before..].to_vec();
    let transfers: Vec<_> = logs
        .iter()
        .filter(|(topics, _)| topics[0] == TransferSingle::SIGNATURE_HASH)
        .collect();
    assert_eq!(transfers.len(), 3);
    for (topics, _) in &transfers {
        assert_eq!(topics[2], B256::ZERO);
        assert_eq!(topics[3], admin.into_word());
    }
    let joins = logs
        .iter()
        .filter(|(topics, _)| topics[0] == MemberJoined::SIGNATURE_HASH)
        .count();
    assert_eq!(joins, 3);
}

#[test]
fn price_change_takes_effect_for_subsequent_mints() {
    let vm = TestVM::default();
    let mut issuer = MembershipIssuer::from(&vm);
    assert!(issuer
        .initialize("ipfs://membership".into(), U256::from(1000u64))
        .is_ok());

    assert!(issuer.set_mint_price(U256::ZERO, U256::from(5000u64)).is_ok());

    // The old price no longer buys a unit
    vm.set_value(U256::from(1000u64));
    assert!(matches!(
        issuer.mint(U256::ZERO, addr(2), U256::from(1u8)),
        Err(MembershipError::InsufficientFunds(_))
    ));

    vm.set_value(U256::from(5000u64));
    assert_eq!(
        ok(issuer.mint(U256::ZERO, addr(2), U256::from(1u8))),
        U256::from(1u8)
    );
}

#[test]
fn mints_across_callers_use_distinct_increasing_ids() {
    let vm = TestVM::default();
    let mut issuer = MembershipIssuer::from(&vm);
    assert!(issuer
        .initialize("ipfs://membership".into(), U256::from(10u64))
        .is_ok());

    let mut previous = U256::ZERO;
    for n in 1u8..=4 {
        vm.set_sender(addr(n));
        vm.set_value(U256::from(10u64));
        let id = ok(issuer.mint(U256::ZERO, addr(n), U256::from(1u8)));
        assert!(id > previous);
        assert_eq!(ok(issuer.balance_of(addr(n), id)), U256::from(1u8));
        previous = id;
    }
    assert_eq!(ok(issuer.total_minted()), U256::from(4u8));
}

#[test]
fn configuration_is_isolated_per_category() {
    let vm = TestVM::default();
    let mut issuer = MembershipIssuer::from(&vm);
    assert!(issuer
        .initialize("ipfs://membership".into(), U256::from(1000u64))
        .is_ok());

    let gold = U256::from(1u8);
    let silver = U256::from(2u8);

    assert!(issuer.set_mint_price(gold, U256::from(9000u64)).is_ok());
    assert!(issuer.set_treasury_address(gold, addr(5)).is_ok());
    assert!(issuer.set_erc20_contract(gold, addr(6)).is_ok());

    assert_eq!(ok(issuer.mint_price(gold)), U256::from(9000u64));
    assert_eq!(ok(issuer.mint_price(silver)), U256::ZERO);
    assert_eq!(ok(issuer.treasury_address(silver)), Address::ZERO);
    assert_eq!(ok(issuer.erc20_contract(silver)), Address::ZERO);
    assert_eq!(ok(issuer.mint_price(U256::ZERO)), U256::from(1000u64));
}
