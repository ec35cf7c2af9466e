//! Paillier key material and the value types the homomorphic engine works on.
//!
//! Keys are supplied from outside, `PrivateKey::from_primes` only derives the
//! pair from primes that already exist.

use std::fmt;

use num::{BigUint, Integer, One, Zero};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::constants::ONE;
use crate::homomorphic::SigmaClaim;
use crate::utils::{self, hex_biguint};
use crate::PaillierError;

#[derive(Serialize, Deserialize)]
struct PublicKeyRepr {
    #[serde(with = "hex_biguint")]
    n: BigUint,
    #[serde(with = "hex_biguint")]
    g: BigUint,
}

/// Paillier public key `(n, g)`. `n²` is cached since every operation reduces by it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PublicKeyRepr", into = "PublicKeyRepr")]
pub struct PublicKey {
    n: BigUint,
    g: BigUint,
    n_squared: BigUint,
}

impl PublicKey {
    pub fn new(n: BigUint, g: BigUint) -> Result<Self, PaillierError> {
        if n <= BigUint::one() || n.is_even() {
            return Err(PaillierError::InvalidKey("modulus must be odd and greater than one"));
        }
        let n_squared = &n * &n;
        if g.is_zero() || g >= n_squared || !g.gcd(&n).is_one() {
            return Err(PaillierError::InvalidKey("generator must be a unit modulo n^2"));
        }
        Ok(PublicKey { n, g, n_squared })
    }

    pub fn n(&self) -> &BigUint {
        &self.n
    }

    pub fn g(&self) -> &BigUint {
        &self.g
    }

    pub fn n_squared(&self) -> &BigUint {
        &self.n_squared
    }

    /// Number of bytes of a fixed-width ciphertext encoding.
    pub fn ciphertext_bytes(&self) -> usize {
        (self.n_squared.bits() + 7) / 8
    }

    pub(crate) fn is_unit(&self, x: &BigUint) -> bool {
        !x.is_zero() && *x < self.n_squared && x.gcd(&self.n).is_one()
    }

    pub(crate) fn check_ciphertext(&self, c: &Ciphertext) -> Result<(), PaillierError> {
        if self.is_unit(&c.0) {
            Ok(())
        } else {
            Err(PaillierError::InvalidCiphertext)
        }
    }

    pub(crate) fn check_randomizer(&self, r: &Randomizer) -> Result<(), PaillierError> {
        if !r.0.is_zero() && r.0 < self.n && r.0.gcd(&self.n).is_one() {
            Ok(())
        } else {
            Err(PaillierError::InvalidRandomizer)
        }
    }
}

impl std::convert::TryFrom<PublicKeyRepr> for PublicKey {
    type Error = PaillierError;

    fn try_from(repr: PublicKeyRepr) -> Result<Self, Self::Error> {
        PublicKey::new(repr.n, repr.g)
    }
}

impl From<PublicKey> for PublicKeyRepr {
    fn from(pk: PublicKey) -> Self {
        PublicKeyRepr { n: pk.n, g: pk.g }
    }
}

/// Paillier private key `(λ, μ)`. Held by the disclosure authority only.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateKey {
    #[serde(with = "hex_biguint")]
    lambda: BigUint,
    #[serde(with = "hex_biguint")]
    mu: BigUint,
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey { .. }")
    }
}

impl PrivateKey {
    pub fn new(lambda: BigUint, mu: BigUint) -> Self {
        PrivateKey { lambda, mu }
    }

    /// Derive the key pair with `g = n + 1` from two distinct primes.
    pub fn from_primes(p: &BigUint, q: &BigUint) -> Result<(PublicKey, PrivateKey), PaillierError> {
        if p == q || *p <= *ONE || *q <= *ONE {
            return Err(PaillierError::InvalidKey("primes must be distinct and greater than one"));
        }
        let n = p * q;
        let lambda = (p - &*ONE).lcm(&(q - &*ONE));
        if !lambda.gcd(&n).is_one() {
            return Err(PaillierError::InvalidKey("lcm(p - 1, q - 1) must be coprime to n"));
        }
        let mu = utils::mod_inverse(&lambda, &n)
            .ok_or(PaillierError::InvalidKey("lambda has no inverse modulo n"))?;
        let g = &n + &*ONE;
        let pk = PublicKey::new(n, g)?;
        Ok((pk, PrivateKey { lambda, mu }))
    }

    pub fn lambda(&self) -> &BigUint {
        &self.lambda
    }

    pub fn mu(&self) -> &BigUint {
        &self.mu
    }

    /// The expensive half of decryption, `L(c^λ mod n², n)`, meant to run off the
    /// critical path. Returns `None` when `c` is not a valid ciphertext for `pk`.
    pub fn sigma(&self, c: &Ciphertext, pk: &PublicKey) -> Option<SigmaClaim> {
        if !pk.is_unit(&c.0) {
            return None;
        }
        let u = c.0.modpow(&self.lambda, pk.n_squared());
        utils::l_function(&u, pk.n()).map(SigmaClaim::new)
    }
}

/// A Paillier ciphertext, an element of `ℤ*_{n²}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ciphertext(#[serde(with = "hex_biguint")] pub(crate) BigUint);

impl Ciphertext {
    /// Wrap a raw integer; the engine validates it on first use.
    pub fn from_value(value: BigUint) -> Self {
        Ciphertext(value)
    }

    pub fn value(&self) -> &BigUint {
        &self.0
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        utils::from_hex(s).map(Ciphertext)
    }

    /// Fixed-width hex encoding, two digits per byte of `n²`.
    pub fn to_hex(&self, pk: &PublicKey) -> String {
        utils::to_hex_padded(&self.0, pk.ciphertext_bytes() * 2)
    }
}

/// The `r` of `gᵐ·rⁿ mod n²`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Randomizer(pub(crate) BigUint);

impl Randomizer {
    pub fn from_value(value: BigUint) -> Self {
        Randomizer(value)
    }

    pub fn value(&self) -> &BigUint {
        &self.0
    }

    /// Draw a fresh randomizer in `[1, n)` coprime to `n`.
    pub fn random<T: RngCore + CryptoRng>(pk: &PublicKey, rng: &mut T) -> Self {
        loop {
            let r = utils::random_below(pk.n(), rng);
            if !r.is_zero() && r.gcd(pk.n()).is_one() {
                return Randomizer(r);
            }
        }
    }
}

impl From<u64> for Randomizer {
    fn from(r: u64) -> Self {
        Randomizer(BigUint::from(r))
    }
}
