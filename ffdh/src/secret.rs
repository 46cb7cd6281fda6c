//! Ephemeral Diffie-Hellman secrets and the shared secrets they produce.

use core::fmt;

use num_bigint::{BigUint, RandBigInt};
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::{DomainParameters, Error, NamedGroup, PublicKey, Result};

/// Ephemeral Diffie-Hellman secret: a private exponent `x` bound to one set
/// of [`DomainParameters`].
///
/// The exponent is never serialized. The big endian bytes are wiped when
/// the secret is dropped.
pub struct EphemeralSecret {
    exponent: Zeroizing<Vec<u8>>,
    public_key: PublicKey,
}

impl EphemeralSecret {
    /// Generate a random secret in the group described by `params`.
    ///
    /// When the subgroup order `q` is known the exponent is drawn from
    /// `[2, 2^k)` where `k` is the RFC 7919 short exponent size for the
    /// modulus (capped below `q`). Otherwise `k` is the `privateValueLength`
    /// hint (never below the short exponent size) or `bits(p) - 1`.
    pub fn random<R>(rng: &mut R, params: &DomainParameters) -> Self
    where
        R: CryptoRng + RngCore + ?Sized,
    {
        let bits = exponent_bits(params);
        let two = BigUint::from(2u8);
        let bound = BigUint::from(1u8) << bits;
        let x = rng.gen_biguint_range(&two, &bound);

        Self::from_exponent(params, &x)
    }

    fn from_exponent(params: &DomainParameters, x: &BigUint) -> Self {
        let y = params.g().modpow(x, params.p());

        Self {
            exponent: Zeroizing::new(x.to_bytes_be()),
            public_key: PublicKey::from_generated(params.clone(), y),
        }
    }

    /// Public key corresponding to this secret.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Domain parameters this secret belongs to.
    pub fn params(&self) -> &DomainParameters {
        self.public_key.params()
    }

    /// Compute `Z = y^x mod p` for the peer's public value `y`.
    ///
    /// Fails with [`Error::ParameterMismatch`] when the peer's key lives in a
    /// different group, and with [`Error::DegenerateSecret`] when `Z` is
    /// `0`, `1` or `p - 1`.
    pub fn diffie_hellman(&self, peer: &PublicKey) -> Result<SharedSecret> {
        let params = self.params();
        if !params.same_group(peer.params()) {
            return Err(Error::ParameterMismatch);
        }

        let p = params.p();
        let x = BigUint::from_bytes_be(&self.exponent);
        let z = peer.y().modpow(&x, p);

        if z <= BigUint::from(1u8) || z == p - 1u8 {
            return Err(Error::DegenerateSecret);
        }

        Ok(SharedSecret::new(&z, params.byte_len()))
    }
}

impl fmt::Debug for EphemeralSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralSecret")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Size of the private exponent in bits.
fn exponent_bits(params: &DomainParameters) -> u64 {
    let short = NamedGroup::short_exponent_bits_for(params.bits()) as u64;

    match params.subgroup_order() {
        Some(q) => short.min(q.bits() - 1),
        None => match params.private_value_length() {
            Some(l) => short.max(u64::from(l)),
            None => params.bits() as u64 - 1,
        },
    }
}

/// Shared secret value computed via Diffie-Hellman key agreement.
///
/// Encoded big endian and left-padded with zeros to the length of the
/// modulus (RFC 2631 Section 2.1.2). The bytes are wiped on drop.
///
/// This value is uniformly distributed only over the subgroup, not over
/// byte strings: feed it through a KDF before using it as a symmetric key.
#[derive(Clone)]
pub struct SharedSecret {
    secret_bytes: Zeroizing<Vec<u8>>,
}

impl SharedSecret {
    fn new(z: &BigUint, len: usize) -> Self {
        let z = Zeroizing::new(z.to_bytes_be());
        let mut secret_bytes = Zeroizing::new(vec![0u8; len]);
        secret_bytes[len - z.len()..].copy_from_slice(&z);
        Self { secret_bytes }
    }

    /// Shared secret value, serialized as bytes.
    pub fn raw_secret_bytes(&self) -> &[u8] {
        &self.secret_bytes
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret")
            .field("len", &self.secret_bytes.len())
            .finish_non_exhaustive()
    }
}
