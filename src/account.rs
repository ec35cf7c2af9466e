use std::fmt;
use std::hash::Hash;

use num::BigUint;
use serde::{Deserialize, Serialize};

/// Identity of a ledger participant.
///
/// Accounts have to be expressible as a proof public input so a withdrawal proof
/// can be bound to the withdrawer.
pub trait AccountId: Clone + Eq + Hash + fmt::Debug {
    fn to_public_input(&self) -> BigUint;
}

/// A 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const fn repeat_byte(b: u8) -> Self {
        Address([b; 20])
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl AccountId for Address {
    fn to_public_input(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_formats_as_hex() {
        let a = Address::repeat_byte(0xab);
        assert_eq!(format!("{}", a), format!("0x{}", "ab".repeat(20)));
    }

    #[test]
    fn public_input_is_big_endian() {
        let mut bytes = [0u8; 20];
        bytes[19] = 1;
        bytes[18] = 2;
        assert_eq!(Address(bytes).to_public_input(), BigUint::from(0x0201u32));
    }
}
