#[macro_use]
extern crate lazy_static;

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

#[macro_use]
mod macros;
pub mod account;
pub mod amount;
pub mod bridge;
pub mod config;
pub mod constants;
pub mod disclosure;
mod errors;
pub use errors::{
    BridgeError, ConfigError, DisclosureError, LedgerError, PaillierError, TokenError, WireError,
};
pub mod homomorphic;
pub mod ledger;
pub mod paillier;
#[cfg(any(test, feature = "testutils"))]
pub mod testing;
pub mod token;
pub(crate) mod utils;
pub mod verifier;

pub use account::{AccountId, Address};
pub use amount::Amount;
pub use bridge::{AccountState, Bridge, BridgeEvent};
pub use ledger::{ConfidentialLedger, LedgerEvent};
pub use paillier::{Ciphertext, PrivateKey, PublicKey, Randomizer};
pub use token::{MemoryToken, PublicToken};
pub use verifier::{ProofVerifier, WithdrawalProof};
