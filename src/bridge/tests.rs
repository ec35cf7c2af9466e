use super::*;
use crate::account::Address;
use crate::config::{BridgeConfig, TokenMetadata};
use crate::testing::{test_ledger, KeyedVerifier, TEST_KEYS};
use crate::token::MemoryToken;
use crate::TokenError;
use quickcheck::TestResult;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

const CUSTODY: Address = Address::repeat_byte(0xb0);
const ALICE: Address = Address::repeat_byte(1);
const BOB: Address = Address::repeat_byte(2);
const CAROL: Address = Address::repeat_byte(3);

type TestBridge = Bridge<Address, MemoryToken<Address>, KeyedVerifier>;

fn public_token() -> MemoryToken<Address> {
    MemoryToken::new(TokenMetadata::new("PublicToken", "PUB", 18).unwrap())
}

/// Alice owns 100 public tokens and has approved the bridge for all of them.
fn setup() -> TestBridge {
    let mut token = public_token();
    token.mint(&ALICE, 100).unwrap();
    token.approve(&ALICE, &CUSTODY, 100);
    Bridge::new(CUSTODY, test_ledger(CUSTODY), token, KeyedVerifier::new([7; 32])).unwrap()
}

fn confidential_balance(bridge: &TestBridge, account: &Address) -> Option<u128> {
    let (pk, sk) = &*TEST_KEYS;
    u128::try_decrypt_from(&bridge.ledger().balance_of(account), pk, sk).unwrap()
}

#[test]
fn new_requires_mint_capability() {
    let ledger = test_ledger(ALICE);
    let bridge = Bridge::new(CUSTODY, ledger, public_token(), KeyedVerifier::new([7; 32]));
    assert!(matches!(bridge, Err(BridgeError::NotMinter)));
}

#[test]
fn from_config_builds_empty_bridge() {
    let (pk, _) = &*TEST_KEYS;
    let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(1);
    let metadata = TokenMetadata::new("DiscreteERC20", "D20", 18).unwrap();
    let mut config = BridgeConfig::new(metadata, pk.clone());
    config.max_public_inputs = 3;
    let bridge: TestBridge = Bridge::from_config(
        CUSTODY,
        &config,
        public_token(),
        KeyedVerifier::new([7; 32]),
        &mut csprng,
    )
    .unwrap();
    assert_eq!(bridge.ledger().minter(), &CUSTODY);
    assert_eq!(bridge.ledger().metadata().symbol, "D20");
    assert_eq!(bridge.reserve(), 0);
    assert_eq!(confidential_balance(&bridge, &ALICE), Some(0));
}

#[test]
fn deposit_should_conserve_value() {
    let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(2);
    let mut bridge = setup();
    assert_eq!(bridge.account_state(&ALICE), AccountState::Unfunded);
    bridge.deposit_with_rng(&ALICE, 10, &mut csprng).unwrap();
    assert_eq!(bridge.reserve(), 10);
    assert_eq!(bridge.token().balance_of(&ALICE), 90);
    assert_eq!(bridge.token().balance_of(&CUSTODY), 10);
    assert_eq!(confidential_balance(&bridge, &ALICE), Some(10));
    assert_eq!(bridge.account_state(&ALICE), AccountState::Funded);
    assert_eq!(
        bridge.events(),
        &[BridgeEvent::Deposit {
            account: ALICE,
            amount: 10
        }]
    );
}

#[test]
fn deposit_without_allowance_changes_nothing() {
    let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(3);
    let mut bridge = setup();
    bridge.token_mut().mint(&BOB, 50).unwrap();
    assert_eq!(
        bridge.deposit_with_rng(&BOB, 10, &mut csprng),
        Err(BridgeError::AllowanceExceeded)
    );
    assert_eq!(
        bridge.deposit_with_rng(&ALICE, 101, &mut csprng),
        Err(BridgeError::AllowanceExceeded)
    );
    assert_eq!(bridge.reserve(), 0);
    assert_eq!(bridge.token().balance_of(&BOB), 50);
    assert_eq!(bridge.account_state(&BOB), AccountState::Unfunded);
    assert!(bridge.ledger().events().is_empty());
    assert!(bridge.events().is_empty());
}

#[test]
fn deposit_beyond_balance_is_a_transfer_failure() {
    let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(4);
    let mut bridge = setup();
    bridge.token_mut().approve(&ALICE, &CUSTODY, 1000);
    assert_eq!(
        bridge.deposit_with_rng(&ALICE, 101, &mut csprng),
        Err(BridgeError::TransferFailed(TokenError::InsufficientBalance))
    );
    assert_eq!(bridge.reserve(), 0);
    assert!(!bridge.ledger().is_materialized(&ALICE));
}

#[test]
fn deposit_transfer_withdraw_scenario() {
    let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(5);
    let (pk, _) = &*TEST_KEYS;
    let mut bridge = setup();

    bridge.deposit_with_rng(&ALICE, 10, &mut csprng).unwrap();
    assert_eq!(bridge.token().balance_of(&ALICE), 90);

    let three = 3u128.encode_with_rng(pk, &mut csprng).unwrap();
    bridge.transfer_encrypted(&ALICE, &BOB, &three).unwrap();
    assert_eq!(confidential_balance(&bridge, &ALICE), Some(7));
    assert_eq!(confidential_balance(&bridge, &BOB), Some(3));

    let proof = bridge.verifier().prove(&ALICE, 7, &mut csprng);
    bridge.withdraw_with_rng(&ALICE, 7, &proof, &mut csprng).unwrap();
    assert_eq!(bridge.token().balance_of(&ALICE), 97);
    assert_eq!(bridge.reserve(), 3);
    assert_eq!(bridge.token().balance_of(&CUSTODY), 3);
    assert_eq!(confidential_balance(&bridge, &ALICE), Some(0));
    assert_eq!(confidential_balance(&bridge, &BOB), Some(3));

    let events = bridge.drain_events();
    assert_eq!(
        events,
        vec![
            BridgeEvent::Deposit {
                account: ALICE,
                amount: 10
            },
            BridgeEvent::TransferEncrypted { from: ALICE, to: BOB },
            BridgeEvent::Withdraw {
                account: ALICE,
                amount: 7
            },
        ]
    );
    assert!(bridge.events().is_empty());
}

#[test]
fn account_state_follows_ledger_entry() {
    let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(12);
    let (pk, _) = &*TEST_KEYS;
    let mut bridge = setup();
    bridge.deposit_with_rng(&ALICE, 10, &mut csprng).unwrap();

    let zero = 0u128.encode_with_rng(pk, &mut csprng).unwrap();
    bridge.transfer_encrypted(&ALICE, &BOB, &zero).unwrap();
    assert_eq!(bridge.account_state(&BOB), AccountState::Funded);
    assert_eq!(bridge.token().balance_of(&BOB), 0);

    let proof = bridge.verifier().prove(&ALICE, 10, &mut csprng);
    bridge.withdraw_with_rng(&ALICE, 10, &proof, &mut csprng).unwrap();
    assert_eq!(confidential_balance(&bridge, &ALICE), Some(0));
    assert_eq!(bridge.reserve(), 0);
    assert_eq!(bridge.account_state(&ALICE), AccountState::Funded);
    assert_eq!(bridge.account_state(&CAROL), AccountState::Unfunded);
}

#[test]
fn rejected_proof_changes_nothing() {
    let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(6);
    let mut bridge = setup();
    bridge.deposit_with_rng(&ALICE, 10, &mut csprng).unwrap();
    let balance = bridge.ledger().balance_of(&ALICE);
    let ledger_events = bridge.ledger().events().len();

    let forged = KeyedVerifier::new([8; 32]).prove(&ALICE, 5, &mut csprng);
    assert_eq!(
        bridge.withdraw_with_rng(&ALICE, 5, &forged, &mut csprng),
        Err(BridgeError::ProofRejected)
    );
    assert_eq!(bridge.reserve(), 10);
    assert_eq!(bridge.token().balance_of(&ALICE), 90);
    assert_eq!(bridge.ledger().balance_of(&ALICE), balance);
    assert_eq!(bridge.ledger().events().len(), ledger_events);
    assert_eq!(bridge.events().len(), 1);
    assert!(!bridge.is_consumed(&forged));
}

#[test]
fn proof_is_bound_to_amount_and_account() {
    let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(7);
    let mut bridge = setup();
    bridge.deposit_with_rng(&ALICE, 10, &mut csprng).unwrap();
    let proof = bridge.verifier().prove(&ALICE, 5, &mut csprng);
    assert_eq!(
        bridge.withdraw_with_rng(&ALICE, 7, &proof, &mut csprng),
        Err(BridgeError::ProofRejected)
    );
    assert_eq!(
        bridge.withdraw_with_rng(&BOB, 5, &proof, &mut csprng),
        Err(BridgeError::ProofRejected)
    );
    assert_eq!(bridge.reserve(), 10);
}

#[test]
fn partial_withdrawals_each_consume_a_proof() {
    let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(8);
    let mut bridge = setup();
    bridge.deposit_with_rng(&ALICE, 10, &mut csprng).unwrap();

    let first = bridge.verifier().prove(&ALICE, 5, &mut csprng);
    bridge.withdraw_with_rng(&ALICE, 5, &first, &mut csprng).unwrap();
    assert!(bridge.is_consumed(&first));
    assert_eq!(
        bridge.withdraw_with_rng(&ALICE, 5, &first, &mut csprng),
        Err(BridgeError::ProofReplayed)
    );
    assert_eq!(bridge.reserve(), 5);

    let second = bridge.verifier().prove(&ALICE, 5, &mut csprng);
    bridge.withdraw_with_rng(&ALICE, 5, &second, &mut csprng).unwrap();
    assert_eq!(bridge.reserve(), 0);
    assert_eq!(bridge.token().balance_of(&ALICE), 100);
    assert_eq!(confidential_balance(&bridge, &ALICE), Some(0));
}

#[test]
fn malformed_proof_is_rejected_before_verification() {
    let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(9);
    let mut bridge = setup();
    bridge.deposit_with_rng(&ALICE, 10, &mut csprng).unwrap();

    let mut short = bridge.verifier().prove(&ALICE, 5, &mut csprng);
    short.public_inputs.truncate(1);
    assert_eq!(
        bridge.withdraw_with_rng(&ALICE, 5, &short, &mut csprng),
        Err(BridgeError::MalformedProof)
    );

    let extra = vec![[0u8; 32]; 7];
    let long = bridge
        .verifier()
        .prove_with_inputs(&ALICE, 5, &extra, &mut csprng);
    assert_eq!(
        bridge.withdraw_with_rng(&ALICE, 5, &long, &mut csprng),
        Err(BridgeError::MalformedProof)
    );

    let extended = bridge
        .verifier()
        .prove_with_inputs(&ALICE, 5, &extra[..2], &mut csprng);
    bridge.withdraw_with_rng(&ALICE, 5, &extended, &mut csprng).unwrap();
    assert_eq!(bridge.reserve(), 5);
}

#[test]
fn withdrawal_beyond_reserve_is_refused() {
    let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(10);
    let mut bridge = setup();
    bridge.deposit_with_rng(&ALICE, 10, &mut csprng).unwrap();
    let proof = bridge.verifier().prove(&ALICE, 11, &mut csprng);
    assert_eq!(
        bridge.withdraw_with_rng(&ALICE, 11, &proof, &mut csprng),
        Err(BridgeError::ReserveExhausted)
    );
    assert!(!bridge.is_consumed(&proof));
    assert_eq!(confidential_balance(&bridge, &ALICE), Some(10));
}

#[test]
fn failed_release_keeps_proof_and_balance() {
    let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(11);
    let mut bridge = setup();
    bridge.deposit_with_rng(&ALICE, 10, &mut csprng).unwrap();
    bridge.token_mut().transfer(&CUSTODY, &CAROL, 10).unwrap();

    let proof = bridge.verifier().prove(&ALICE, 5, &mut csprng);
    assert_eq!(
        bridge.withdraw_with_rng(&ALICE, 5, &proof, &mut csprng),
        Err(BridgeError::TransferFailed(TokenError::InsufficientBalance))
    );
    assert!(!bridge.is_consumed(&proof));
    assert_eq!(bridge.reserve(), 10);
    assert_eq!(confidential_balance(&bridge, &ALICE), Some(10));
}

#[test]
fn balance_handshake_passes_through_to_ledger() {
    let mut bridge = setup();
    bridge.request_balance(&ALICE);
    assert_eq!(bridge.ledger().pending_requests(&ALICE), 1);
    let sealed = SealedBalance {
        ephemeral: [1; 32],
        nonce: [2; 12],
        ciphertext: vec![3],
    };
    bridge.response_balance(&ALICE, sealed.clone());
    assert_eq!(bridge.ledger().pending_requests(&ALICE), 0);
    assert_eq!(bridge.ledger().latest_response(&ALICE), Some(&sealed));
}

#[quickcheck]
fn deposit_and_transfer_conserve_value(seed: u64, deposited: u8, moved: u8) -> TestResult {
    let (pk, _) = &*TEST_KEYS;
    let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(seed);
    let mut bridge = setup();
    let (deposited, moved) = (u128::from(deposited % 101), u128::from(moved % 101));
    if moved > deposited {
        return TestResult::discard();
    }
    bridge.deposit_with_rng(&ALICE, deposited, &mut csprng).unwrap();
    let delta = moved.encode_with_rng(pk, &mut csprng).unwrap();
    bridge.transfer_encrypted(&ALICE, &BOB, &delta).unwrap();
    let alice = confidential_balance(&bridge, &ALICE).unwrap();
    let bob = confidential_balance(&bridge, &BOB).unwrap();
    TestResult::from_bool(
        alice + bob == bridge.reserve()
            && bob == moved
            && bridge.token().balance_of(&ALICE) + bridge.reserve() == 100,
    )
}
