use std::marker::Sized;

use num::BigUint;
use rand_core::{CryptoRng, RngCore};

use crate::homomorphic;
use crate::paillier::{Ciphertext, PrivateKey, PublicKey, Randomizer};
use crate::PaillierError;

/// Represents some amount of type {u8,u16,u32,u64,u128} which can be moved between
/// the plaintext integers and the plaintext ring `ℤ_n` of a Paillier key.
/// Only {u8,u16,u32,u64,u128} have implemented Amount, and only they can implement Amount.
pub trait Amount: Sized + Copy + std::fmt::Debug + private::Sealed {
    /// The bit size of the wrapped type.
    fn bit_size() -> usize;

    /// Lift the amount into the plaintext ring.
    fn to_plaintext(&self) -> BigUint;

    /// Lower a plaintext back into the amount type.
    /// Fails when the plaintext does not fit, which is also how a balance that
    /// wrapped below zero shows up.
    fn try_from_plaintext(m: &BigUint) -> Option<Self>;

    /// Encrypt the amount with the provided randomizer.
    fn encrypt_with(&self, pk: &PublicKey, r: &Randomizer) -> Result<Ciphertext, PaillierError> {
        homomorphic::encrypt(&self.to_plaintext(), r, pk)
    }

    /// Commit a public amount into the encrypted domain as
    /// `add_const(encrypt_zero(r), amount)` with a freshly drawn `r`.
    fn encode_with_rng<T: RngCore + CryptoRng>(
        &self,
        pk: &PublicKey,
        rng: &mut T,
    ) -> Result<Ciphertext, PaillierError> {
        let m = self.to_plaintext();
        if m >= *pk.n() {
            return Err(PaillierError::InvalidPlaintext);
        }
        let blank = homomorphic::encrypt_zero(&Randomizer::random(pk, rng), pk)?;
        homomorphic::add_const(&blank, &m, pk)
    }

    /// Decrypt the ciphertext with sk, and then try to convert the plaintext to an amount.
    /// Returns `Ok(None)` if the plaintext does not fit into the amount type.
    fn try_decrypt_from(
        c: &Ciphertext,
        pk: &PublicKey,
        sk: &PrivateKey,
    ) -> Result<Option<Self>, PaillierError> {
        let m = homomorphic::decrypt_full(c, pk, sk)?;
        Ok(Self::try_from_plaintext(&m))
    }
}

mod private {
    // private::Sealed is used to prevent any other types from implementing Amount.
    // See https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
    impl Sealed for u128 {}
}

macro_rules! impl_amount {
    ( $t:ty, $bit_size:expr ) => {
        impl Amount for $t {
            #[inline]
            fn bit_size() -> usize {
                $bit_size
            }

            #[inline]
            fn to_plaintext(&self) -> BigUint {
                BigUint::from_bytes_be(&self.to_be_bytes())
            }

            fn try_from_plaintext(m: &BigUint) -> Option<$t> {
                if m.bits() > $bit_size {
                    return None;
                }
                let wide = m
                    .to_bytes_be()
                    .iter()
                    .fold(0u128, |acc, b| (acc << 8) | u128::from(*b));
                Some(wide as $t)
            }
        }
    };
}

impl_amount!(u8, 8);
impl_amount!(u16, 16);
impl_amount!(u32, 32);
impl_amount!(u64, 64);
impl_amount!(u128, 128);
