use thiserror::Error;

/// Failures of the homomorphic engine and key handling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaillierError {
    #[error("Plaintext is outside of the message space")]
    InvalidPlaintext,
    #[error("Randomizer must be nonzero, below n and coprime to n")]
    InvalidRandomizer,
    #[error("Ciphertext is not a unit modulo n^2")]
    InvalidCiphertext,
    #[error("Precomputed decryption value does not match the ciphertext")]
    InvalidSigma,
    #[error("Invalid key material: {0}")]
    InvalidKey(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Caller does not hold the mint capability")]
    NotMinter,
    #[error("Staged update does not match the current ledger state")]
    StaleUpdate,
    #[error(transparent)]
    Paillier(#[from] PaillierError),
}

/// Failures reported by the public token ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Transfer amount exceeds allowance")]
    AllowanceExceeded,
    #[error("Transfer amount exceeds balance")]
    InsufficientBalance,
    #[error("Overflow while doing arithmetic operations")]
    Overflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Public token allowance exceeded")]
    AllowanceExceeded,
    #[error("Public token transfer failed: {0}")]
    TransferFailed(TokenError),
    #[error("Withdrawal proof is malformed")]
    MalformedProof,
    #[error("Withdrawal proof rejected")]
    ProofRejected,
    #[error("Withdrawal proof has already been consumed")]
    ProofReplayed,
    #[error("Custody reserve cannot cover the withdrawal")]
    ReserveExhausted,
    #[error("Custody reserve overflow")]
    ReserveOverflow,
    #[error("Bridge does not hold the mint capability of its ledger")]
    NotMinter,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Paillier(#[from] PaillierError),
}

impl From<TokenError> for BridgeError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::AllowanceExceeded => BridgeError::AllowanceExceeded,
            other => BridgeError::TransferFailed(other),
        }
    }
}

#[derive(Error, Debug)]
pub enum DisclosureError {
    #[error(transparent)]
    Paillier(#[from] PaillierError),
    #[error("No requester key registered for this account")]
    UnknownRequester,
    #[error("Requester key is not a valid curve point")]
    MalformedKey,
    #[error("Failed to seal balance")]
    Seal,
    #[error("Failed to open sealed balance")]
    Open,
    #[error("Decrypted balance does not fit the requested amount type")]
    NotRepresentable,
}

/// Failures of the versioned binary envelope.
#[derive(Error, Debug)]
pub enum WireError {
    #[error("Underlying serialization error: {0}")]
    Underlying(#[from] bincode::Error),
    #[error("Empty or truncated input")]
    Format,
    #[error("Unsupported wire version {0}")]
    Version(u8),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Field {0} is not a valid integer")]
    Number(&'static str),
    #[error("Decimals must not be greater than 18, got {0}")]
    Decimals(u8),
    #[error("Invalid key material: {0}")]
    Key(#[from] PaillierError),
}
