//! Additively homomorphic arithmetic over Paillier ciphertexts.
//!
//! Every function is pure and reduces modulo `n²`. Decrypting an output gives the
//! sum, difference or product (mod `n`) of the plaintexts of the inputs.

use num::{BigUint, Zero};
use serde::{Deserialize, Serialize};

use crate::constants::ONE;
use crate::paillier::{Ciphertext, PrivateKey, PublicKey, Randomizer};
use crate::utils::hex_biguint;
use crate::PaillierError;

/// A value computed off the critical path that the hot path only has to check.
pub trait Claim<Ctx: ?Sized> {
    type Output;

    /// Returns the claimed output if it is consistent with `ctx`.
    fn check(&self, ctx: &Ctx) -> Option<Self::Output>;
}

/// Everything needed to check a [`SigmaClaim`].
pub struct DecryptionContext<'a> {
    pub ciphertext: &'a Ciphertext,
    pub public_key: &'a PublicKey,
    pub private_key: &'a PrivateKey,
}

/// Precomputed `σ = L(c^λ mod n², n)`.
///
/// The claim is checked by rebuilding `c^λ mod n²` as `σ·n + 1`, which replaces the
/// big-integer division of `L` with one multiplication and a comparison.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigmaClaim(#[serde(with = "hex_biguint")] BigUint);

impl SigmaClaim {
    pub fn new(sigma: BigUint) -> Self {
        SigmaClaim(sigma)
    }

    pub fn value(&self) -> &BigUint {
        &self.0
    }
}

impl<'a> Claim<DecryptionContext<'a>> for SigmaClaim {
    type Output = BigUint;

    fn check(&self, ctx: &DecryptionContext<'a>) -> Option<BigUint> {
        let pk = ctx.public_key;
        if self.0 >= *pk.n() || pk.check_ciphertext(ctx.ciphertext).is_err() {
            return None;
        }
        let expected = ctx
            .ciphertext
            .0
            .modpow(ctx.private_key.lambda(), pk.n_squared());
        if &self.0 * pk.n() + &*ONE == expected {
            Some(self.0.clone())
        } else {
            None
        }
    }
}

/// `gᵐ·rⁿ mod n²`.
pub fn encrypt(m: &BigUint, r: &Randomizer, pk: &PublicKey) -> Result<Ciphertext, PaillierError> {
    if m >= pk.n() {
        return Err(PaillierError::InvalidPlaintext);
    }
    pk.check_randomizer(r)?;
    let gm = pk.g().modpow(m, pk.n_squared());
    let rn = r.0.modpow(pk.n(), pk.n_squared());
    Ok(Ciphertext((gm * rn) % pk.n_squared()))
}

/// A fresh encryption of zero, `rⁿ mod n²`.
pub fn encrypt_zero(r: &Randomizer, pk: &PublicKey) -> Result<Ciphertext, PaillierError> {
    pk.check_randomizer(r)?;
    Ok(Ciphertext(r.0.modpow(pk.n(), pk.n_squared())))
}

pub fn add(c1: &Ciphertext, c2: &Ciphertext, pk: &PublicKey) -> Result<Ciphertext, PaillierError> {
    pk.check_ciphertext(c1)?;
    pk.check_ciphertext(c2)?;
    Ok(Ciphertext((&c1.0 * &c2.0) % pk.n_squared()))
}

/// `c·gᵏ mod n²`, adds a public constant.
pub fn add_const(c: &Ciphertext, k: &BigUint, pk: &PublicKey) -> Result<Ciphertext, PaillierError> {
    pk.check_ciphertext(c)?;
    let k = k % pk.n();
    let gk = pk.g().modpow(&k, pk.n_squared());
    Ok(Ciphertext((&c.0 * gk) % pk.n_squared()))
}

/// `c1·c2^(n−1) mod n²`.
pub fn sub(c1: &Ciphertext, c2: &Ciphertext, pk: &PublicKey) -> Result<Ciphertext, PaillierError> {
    pk.check_ciphertext(c1)?;
    let negated = mul_const(c2, &(pk.n() - &*ONE), pk)?;
    add(c1, &negated, pk)
}

pub fn sub_const(c: &Ciphertext, k: &BigUint, pk: &PublicKey) -> Result<Ciphertext, PaillierError> {
    let k = k % pk.n();
    let negated = if k.is_zero() { k } else { pk.n() - k };
    add_const(c, &negated, pk)
}

/// `cᵏ mod n²`, multiplies the plaintext by a public constant.
pub fn mul_const(c: &Ciphertext, k: &BigUint, pk: &PublicKey) -> Result<Ciphertext, PaillierError> {
    pk.check_ciphertext(c)?;
    Ok(Ciphertext(c.0.modpow(k, pk.n_squared())))
}

/// Same plaintext, unlinkable ciphertext.
pub fn rerandomize(
    c: &Ciphertext,
    r: &Randomizer,
    pk: &PublicKey,
) -> Result<Ciphertext, PaillierError> {
    add(c, &encrypt_zero(r, pk)?, pk)
}

/// `m = σ·μ mod n`, where `σ` was computed off-path and is only checked here.
pub fn decrypt(
    c: &Ciphertext,
    pk: &PublicKey,
    sk: &PrivateKey,
    sigma: &SigmaClaim,
) -> Result<BigUint, PaillierError> {
    let ctx = DecryptionContext {
        ciphertext: c,
        public_key: pk,
        private_key: sk,
    };
    let sigma = sigma.check(&ctx).ok_or(PaillierError::InvalidSigma)?;
    Ok((sigma * sk.mu()) % pk.n())
}

/// Computes `σ` and decrypts in one go, for callers that hold the private key anyway.
pub fn decrypt_full(
    c: &Ciphertext,
    pk: &PublicKey,
    sk: &PrivateKey,
) -> Result<BigUint, PaillierError> {
    let sigma = sk.sigma(c, pk).ok_or(PaillierError::InvalidCiphertext)?;
    decrypt(c, pk, sk, &sigma)
}
