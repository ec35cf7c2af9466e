//! Bridge configuration and the key file format.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_PUBLIC_INPUTS, MAX_DECIMALS};
use crate::paillier::{PrivateKey, PublicKey};
use crate::utils::from_decimal;
use crate::ConfigError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenMetadata {
    pub fn new(name: &str, symbol: &str, decimals: u8) -> Result<Self, ConfigError> {
        let metadata = TokenMetadata {
            name: name.to_owned(),
            symbol: symbol.to_owned(),
            decimals,
        };
        metadata.validate()?;
        Ok(metadata)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decimals > MAX_DECIMALS {
            return Err(ConfigError::Decimals(self.decimals));
        }
        Ok(())
    }
}

fn default_max_public_inputs() -> usize {
    DEFAULT_MAX_PUBLIC_INPUTS
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub metadata: TokenMetadata,
    pub public_key: PublicKey,
    /// Upper bound on the public inputs a withdrawal proof may carry.
    #[serde(default = "default_max_public_inputs")]
    pub max_public_inputs: usize,
}

impl BridgeConfig {
    pub fn new(metadata: TokenMetadata, public_key: PublicKey) -> Self {
        BridgeConfig {
            metadata,
            public_key,
            max_public_inputs: DEFAULT_MAX_PUBLIC_INPUTS,
        }
    }

    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let config: BridgeConfig = serde_json::from_str(s)?;
        config.metadata.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Deserialize)]
struct KeyFilePublic {
    n: String,
    g: String,
}

#[derive(Debug, Deserialize)]
struct KeyFilePrivate {
    lambda: String,
    mu: String,
}

/// Precomputed key material with decimal-string integers:
/// `{"publicKey": {"n", "g"}, "privateKey": {"lambda", "mu"}}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyFile {
    public_key: KeyFilePublic,
    private_key: Option<KeyFilePrivate>,
}

impl KeyFile {
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn public_key(&self) -> Result<PublicKey, ConfigError> {
        let n = from_decimal(&self.public_key.n).ok_or(ConfigError::Number("publicKey.n"))?;
        let g = from_decimal(&self.public_key.g).ok_or(ConfigError::Number("publicKey.g"))?;
        Ok(PublicKey::new(n, g)?)
    }

    /// The private half, if the file carries it.
    pub fn private_key(&self) -> Result<Option<PrivateKey>, ConfigError> {
        let private = match &self.private_key {
            Some(private) => private,
            None => return Ok(None),
        };
        let lambda =
            from_decimal(&private.lambda).ok_or(ConfigError::Number("privateKey.lambda"))?;
        let mu = from_decimal(&private.mu).ok_or(ConfigError::Number("privateKey.mu"))?;
        Ok(Some(PrivateKey::new(lambda, mu)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::BigUint;

    #[test]
    fn metadata_should_reject_too_many_decimals() {
        assert!(TokenMetadata::new("Discrete Token", "DCT", 18).is_ok());
        match TokenMetadata::new("Discrete Token", "DCT", 19) {
            Err(ConfigError::Decimals(19)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn key_file_should_parse_decimal_strings() {
        let json = r#"{
            "publicKey": { "n": "143", "g": "144" },
            "privateKey": { "lambda": "60", "mu": "31" }
        }"#;
        let file = KeyFile::from_json(json).unwrap();
        let pk = file.public_key().unwrap();
        assert_eq!(pk.n(), &BigUint::from(143u32));
        let sk = file.private_key().unwrap().unwrap();
        assert_eq!(sk.lambda(), &BigUint::from(60u32));
        assert_eq!(sk.mu(), &BigUint::from(31u32));
    }

    #[test]
    fn key_file_without_private_half() {
        let json = r#"{ "publicKey": { "n": "143", "g": "144" } }"#;
        let file = KeyFile::from_json(json).unwrap();
        assert!(file.private_key().unwrap().is_none());
    }

    #[test]
    fn key_file_should_report_bad_numbers() {
        let json = r#"{ "publicKey": { "n": "0x8f", "g": "144" } }"#;
        let file = KeyFile::from_json(json).unwrap();
        match file.public_key() {
            Err(ConfigError::Number("publicKey.n")) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bridge_config_should_round_trip_through_json() {
        let pk = PublicKey::new(BigUint::from(143u32), BigUint::from(144u32)).unwrap();
        let metadata = TokenMetadata::new("Discrete Token", "DCT", 18).unwrap();
        let config = BridgeConfig::new(metadata, pk);
        let json = config.to_json().unwrap();
        assert_eq!(BridgeConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn bridge_config_defaults_public_input_bound() {
        let json = r#"{
            "metadata": { "name": "Discrete Token", "symbol": "DCT", "decimals": 18 },
            "public_key": { "n": "0x8f", "g": "0x90" }
        }"#;
        let config = BridgeConfig::from_json(json).unwrap();
        assert_eq!(config.max_public_inputs, DEFAULT_MAX_PUBLIC_INPUTS);
    }
}
