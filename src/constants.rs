use num::BigUint;
use num::One;

pub const LOG_TARGET: &str = "discrete_bridge";

/// Leading byte of every binary envelope produced by this crate.
pub const WIRE_VERSION: u8 = 0;

/// Public inputs a withdrawal proof must start with: account, amount.
pub const BOUND_PUBLIC_INPUTS: usize = 2;
pub const DEFAULT_MAX_PUBLIC_INPUTS: usize = 8;

/// Upper bound on token decimals accepted by the ledger metadata.
pub const MAX_DECIMALS: u8 = 18;

/// Width in bytes of a single public input or curve coordinate.
pub const WORD_SIZE: usize = 32;

pub(crate) static PROOF_DIGEST_LABEL: &[u8] = b"discrete_bridge_withdrawal_proof";
pub(crate) static DISCLOSURE_KDF_LABEL: &[u8] = b"discrete_bridge_balance_disclosure";

/// Extra bytes drawn when sampling below a bound, keeps modulo bias negligible.
pub(crate) const SAMPLING_SLACK_BYTES: usize = 16;

lazy_static! {
    pub(crate) static ref ONE: BigUint = BigUint::one();
}
