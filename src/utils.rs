use num::bigint::{BigInt, Sign};
use num::{BigUint, Integer, Num, One, Zero};
use rand_core::{CryptoRng, RngCore};

use crate::constants::{ONE, SAMPLING_SLACK_BYTES};

// Uniform-enough sample in [0, bound).
pub(crate) fn random_below<T: RngCore + CryptoRng>(bound: &BigUint, rng: &mut T) -> BigUint {
    let len = (bound.bits() + 7) / 8 + SAMPLING_SLACK_BYTES;
    let mut buf = vec![0u8; len];
    rng.fill_bytes(&mut buf);
    BigUint::from_bytes_be(&buf) % bound
}

/// Inverse of `a` modulo `m`, if it exists.
pub(crate) fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    if m.is_zero() {
        return None;
    }
    let a = BigInt::from_biguint(Sign::Plus, a % m);
    let m = BigInt::from_biguint(Sign::Plus, m.clone());
    let egcd = a.extended_gcd(&m);
    if !egcd.gcd.is_one() {
        return None;
    }
    egcd.x.mod_floor(&m).to_biguint()
}

// L(u) = (u - 1) / n, defined for u ≡ 1 (mod n).
pub(crate) fn l_function(u: &BigUint, n: &BigUint) -> Option<BigUint> {
    if u.is_zero() {
        return None;
    }
    let shifted = u - &*ONE;
    if !(&shifted % n).is_zero() {
        return None;
    }
    Some(shifted / n)
}

pub(crate) fn to_hex(x: &BigUint) -> String {
    format!("0x{}", x.to_str_radix(16))
}

pub(crate) fn to_hex_padded(x: &BigUint, width: usize) -> String {
    format!("0x{:0>width$}", x.to_str_radix(16), width = width)
}

pub(crate) fn from_hex(s: &str) -> Option<BigUint> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.is_empty() {
        return None;
    }
    BigUint::from_str_radix(digits, 16).ok()
}

pub(crate) fn from_decimal(s: &str) -> Option<BigUint> {
    BigUint::from_str_radix(s.trim(), 10).ok()
}

/// Serde adapter writing big integers as `0x`-prefixed hex strings.
pub(crate) mod hex_biguint {
    use num::BigUint;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(x: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_hex(x))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::from_hex(&s).ok_or_else(|| D::Error::custom("expected a hex encoded integer"))
    }
}
