use anyhow::{anyhow, Result};
use rand_core::OsRng;

use discrete_bridge::config::{BridgeConfig, TokenMetadata};
use discrete_bridge::disclosure::{DisclosureAuthority, KeyHolder, RequesterSecretKey};
use discrete_bridge::testing::{KeyedVerifier, TEST_KEYS};
use discrete_bridge::{Address, Amount, Bridge, MemoryToken, PublicToken};

fn main() -> Result<()> {
    let mut csprng = OsRng;
    let (pk, sk) = &*TEST_KEYS;
    let custody = Address::repeat_byte(0xb0);
    let alice = Address::repeat_byte(0x01);
    let bob = Address::repeat_byte(0x02);

    let mut token = MemoryToken::new(TokenMetadata::new("PublicToken", "PUB", 18)?);
    token.mint(&alice, 100)?;
    token.approve(&alice, &custody, 100);

    let config = BridgeConfig::new(TokenMetadata::new("DiscreteERC20", "D20", 18)?, pk.clone());
    let verifier = KeyedVerifier::new([42; 32]);
    let mut bridge = Bridge::from_config(custody, &config, token, verifier, &mut csprng)?;

    bridge.deposit_with_rng(&alice, 10, &mut csprng)?;
    let delta = 3u128.encode_with_rng(pk, &mut csprng)?;
    bridge.transfer_encrypted(&alice, &bob, &delta)?;

    // Alice asks for her balance; the key holder answers off-chain.
    let alice_key = RequesterSecretKey::generate_with(&mut csprng);
    let mut holder = KeyHolder::new(pk.clone(), sk.clone());
    holder.register(alice, alice_key.to_public());
    bridge.request_balance(&alice);
    for (account, sealed) in holder.answer_pending(bridge.ledger(), &mut csprng) {
        bridge.response_balance(&account, sealed);
    }
    let sealed = bridge
        .ledger()
        .latest_response(&alice)
        .ok_or_else(|| anyhow!("balance request was not answered"))?;
    let balance: u128 = alice_key.open_amount(sealed, &alice)?;
    println!("alice holds {} confidential tokens", balance);

    let proof = bridge.verifier().prove(&alice, balance, &mut csprng);
    bridge.withdraw_with_rng(&alice, balance, &proof, &mut csprng)?;
    assert!(bridge.withdraw_with_rng(&alice, balance, &proof, &mut csprng).is_err());

    println!(
        "alice holds {} public tokens, reserve is {}",
        bridge.token().balance_of(&alice),
        bridge.reserve()
    );
    for event in bridge.events() {
        println!("{:?}", event);
    }
    Ok(())
}
