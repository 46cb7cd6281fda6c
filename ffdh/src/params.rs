//! Diffie-Hellman domain parameters.

use core::fmt;

use num_bigint::{BigUint, RandBigInt};
use rand_core::{CryptoRng, RngCore};

use crate::{Error, NamedGroup, Result};

/// Smallest accepted modulus size in bits.
pub const MIN_MODULUS_BITS: usize = 2048;

/// Largest accepted modulus size in bits.
pub const MAX_MODULUS_BITS: usize = 8192;

/// Diffie-Hellman group description: prime modulus `p`, generator `g`,
/// and optionally the order `q` of the subgroup generated by `g` and the
/// PKCS#3 `privateValueLength` hint `l`.
///
/// Values of this type are always validated:
///
/// - `p` is odd and between [`MIN_MODULUS_BITS`] and [`MAX_MODULUS_BITS`] long
/// - `1 < g < p - 1`
/// - if present, `q` divides `p - 1`, `g^q = 1 (mod p)` and `q` is at least
///   twice as long as the short exponent for the modulus size
/// - if present, `0 < l < bits(p)`
///
/// Primality of `p` and `q` is not tested.
#[derive(Clone, Eq, PartialEq)]
pub struct DomainParameters {
    p: BigUint,
    g: BigUint,
    q: Option<BigUint>,
    private_value_length: Option<u32>,
}

impl DomainParameters {
    /// Create domain parameters from a big endian modulus and generator.
    pub fn new(p: &[u8], g: &[u8]) -> Result<Self> {
        Self::from_parts(BigUint::from_bytes_be(p), BigUint::from_bytes_be(g), None, None)
            .map_err(|reason| Error::KeyGeneration(reason.into()))
    }

    /// Parameters of a named RFC 7919 group in PKCS#3 form (no explicit `q`).
    pub fn named(group: NamedGroup) -> Self {
        Self {
            p: group.prime(),
            g: group.generator(),
            q: None,
            private_value_length: None,
        }
    }

    /// Generate fresh parameters for a `bits`-sized modulus.
    ///
    /// The modulus is the RFC 7919 safe prime of that size and the generator
    /// is a random element `h^2 mod p` of its prime order subgroup, so two
    /// independent calls produce distinct (but equally strong) groups.
    pub fn generate<R>(rng: &mut R, bits: usize) -> Result<Self>
    where
        R: CryptoRng + RngCore + ?Sized,
    {
        let group = NamedGroup::from_bits(bits).ok_or_else(|| {
            Error::KeyGeneration(format!(
                "unsupported modulus size: {bits} bits (supported: 2048, 3072, 4096, 6144, 8192)"
            ))
        })?;

        let p = group.prime();
        let one = BigUint::from(1u8);
        let two = BigUint::from(2u8);
        let p_minus_one = &p - 1u8;

        let g = loop {
            let h = rng.gen_biguint_range(&two, &p_minus_one);
            let g = h.modpow(&two, &p);
            if g != one {
                break g;
            }
        };

        Ok(Self {
            q: Some(group.order()),
            p,
            g,
            private_value_length: None,
        })
    }

    /// Attach the subgroup order `q` (big endian).
    pub fn with_order(self, q: &[u8]) -> Result<Self> {
        Self::from_parts(
            self.p,
            self.g,
            Some(BigUint::from_bytes_be(q)),
            self.private_value_length,
        )
        .map_err(|reason| Error::KeyGeneration(reason.into()))
    }

    /// Attach a PKCS#3 `privateValueLength` hint.
    pub fn with_private_value_length(self, bits: u32) -> Result<Self> {
        Self::from_parts(self.p, self.g, self.q, Some(bits))
            .map_err(|reason| Error::KeyGeneration(reason.into()))
    }

    /// Validate and assemble parameters from their components.
    pub(crate) fn from_parts(
        p: BigUint,
        g: BigUint,
        q: Option<BigUint>,
        private_value_length: Option<u32>,
    ) -> core::result::Result<Self, &'static str> {
        let bits = p.bits();
        if bits < MIN_MODULUS_BITS as u64 {
            return Err("modulus too small");
        }
        if bits > MAX_MODULUS_BITS as u64 {
            return Err("modulus too large");
        }
        if !p.bit(0) {
            return Err("modulus is even");
        }

        let one = BigUint::from(1u8);
        let p_minus_one = &p - 1u8;
        if g <= one || g >= p_minus_one {
            return Err("generator out of range");
        }

        if let Some(q) = &q {
            if *q <= one || *q >= p {
                return Err("subgroup order out of range");
            }
            if (&p_minus_one % q) != BigUint::default() {
                return Err("subgroup order does not divide p - 1");
            }
            if q.bits() < 2 * NamedGroup::short_exponent_bits_for(bits as usize) as u64 {
                return Err("subgroup order too small");
            }
            if g.modpow(q, &p) != one {
                return Err("generator is not in the declared subgroup");
            }
        }

        if let Some(l) = private_value_length {
            if l == 0 || u64::from(l) >= bits {
                return Err("private value length out of range");
            }
        }

        Ok(Self {
            p,
            g,
            q,
            private_value_length,
        })
    }

    /// Size of the modulus in bits.
    pub fn bits(&self) -> usize {
        self.p.bits() as usize
    }

    /// Size of the modulus in bytes: the length of every public value and
    /// shared secret in this group.
    pub fn byte_len(&self) -> usize {
        self.bits().div_ceil(8)
    }

    /// Big endian modulus `p`.
    pub fn prime_bytes(&self) -> Vec<u8> {
        self.p.to_bytes_be()
    }

    /// Big endian generator `g`.
    pub fn generator_bytes(&self) -> Vec<u8> {
        self.g.to_bytes_be()
    }

    /// Big endian subgroup order `q`, if it was supplied.
    pub fn order_bytes(&self) -> Option<Vec<u8>> {
        self.q.as_ref().map(BigUint::to_bytes_be)
    }

    /// PKCS#3 `privateValueLength` hint, if any.
    pub fn private_value_length(&self) -> Option<u32> {
        self.private_value_length
    }

    /// RFC 7919 group with this modulus and the standard generator, if any.
    pub fn named_group(&self) -> Option<NamedGroup> {
        NamedGroup::lookup(&self.p).filter(|group| self.g == group.generator())
    }

    /// Do `self` and `other` describe the same group?
    ///
    /// Modulus and generator must match. Subgroup orders are compared only
    /// when both sides carry one; `privateValueLength` is a key generation
    /// hint and is ignored.
    pub fn same_group(&self, other: &Self) -> bool {
        let orders_match = match (&self.q, &other.q) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        };

        self.p == other.p && self.g == other.g && orders_match
    }

    pub(crate) fn p(&self) -> &BigUint {
        &self.p
    }

    pub(crate) fn g(&self) -> &BigUint {
        &self.g
    }

    pub(crate) fn q(&self) -> Option<&BigUint> {
        self.q.as_ref()
    }

    /// Order of the subgroup generated by `g`, when it is known: either
    /// supplied explicitly, or implied by a safe-prime RFC 7919 modulus.
    pub(crate) fn subgroup_order(&self) -> Option<BigUint> {
        match &self.q {
            Some(q) => Some(q.clone()),
            None => NamedGroup::lookup(&self.p).and_then(|group| {
                let q = group.order();
                let in_subgroup = self.g == group.generator()
                    || self.g.modpow(&q, &self.p) == BigUint::from(1u8);
                in_subgroup.then_some(q)
            }),
        }
    }
}

impl fmt::Debug for DomainParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainParameters")
            .field("bits", &self.bits())
            .field("named_group", &self.named_group())
            .field("g", &format_args!("{:x}", self.g))
            .field("has_order", &self.q.is_some())
            .field("private_value_length", &self.private_value_length)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::DomainParameters;
    use crate::{Error, NamedGroup};
    use rand_core::OsRng;

    fn ffdhe2048() -> Vec<u8> {
        NamedGroup::Ffdhe2048.prime_bytes().to_vec()
    }

    #[test]
    fn named_parameters_validate() {
        let named = DomainParameters::named(NamedGroup::Ffdhe2048);
        let explicit = DomainParameters::new(&ffdhe2048(), &[2]).unwrap();
        assert_eq!(named, explicit);
        assert_eq!(explicit.named_group(), Some(NamedGroup::Ffdhe2048));
        assert!(explicit.subgroup_order().is_some());
    }

    #[test]
    fn rejects_even_modulus() {
        let mut p = ffdhe2048();
        *p.last_mut().unwrap() &= 0xfe;
        let err = DomainParameters::new(&p, &[2]).unwrap_err();
        assert!(matches!(err, Error::KeyGeneration(_)));
    }

    #[test]
    fn rejects_small_modulus() {
        let p = &NamedGroup::Ffdhe2048.prime_bytes()[..128];
        assert!(DomainParameters::new(p, &[2]).is_err());
    }

    #[test]
    fn rejects_generator_out_of_range() {
        let p = ffdhe2048();
        assert!(DomainParameters::new(&p, &[1]).is_err());
        assert!(DomainParameters::new(&p, &[0]).is_err());

        let mut p_minus_one = p.clone();
        *p_minus_one.last_mut().unwrap() -= 1;
        assert!(DomainParameters::new(&p, &p_minus_one).is_err());
        assert!(DomainParameters::new(&p, &p).is_err());
    }

    #[test]
    fn rejects_generator_outside_declared_subgroup() {
        // 2 is a quadratic residue modulo the ffdhe primes but 7 is not
        let q = NamedGroup::Ffdhe2048.order().to_bytes_be();
        let p = ffdhe2048();

        assert!(DomainParameters::new(&p, &[2])
            .unwrap()
            .with_order(&q)
            .is_ok());
        assert!(DomainParameters::new(&p, &[7])
            .unwrap()
            .with_order(&q)
            .is_err());
    }

    #[test]
    fn rejects_order_not_dividing_p_minus_one() {
        let params = DomainParameters::named(NamedGroup::Ffdhe2048);
        assert!(params.with_order(&[0x0b]).is_err());
    }

    #[test]
    fn rejects_small_subgroup_order() {
        // 2^1024 has order 2 modulo 2^2048 - 1
        let p = [0xff; 256];
        let mut g = [0u8; 129];
        g[0] = 1;

        let params = DomainParameters::new(&p, &g).unwrap();
        let err = params.clone().with_order(&[2]).unwrap_err();
        assert!(matches!(err, Error::KeyGeneration(reason) if reason.contains("too small")));

        // g^5 != 1 here, but a 5-element subgroup must fail on size alone
        assert!(params.with_order(&[5]).is_err());
    }

    #[test]
    fn private_value_length_must_be_shorter_than_modulus() {
        let params = DomainParameters::named(NamedGroup::Ffdhe2048);
        assert!(params.clone().with_private_value_length(0).is_err());
        assert!(params.clone().with_private_value_length(2048).is_err());
        let params = params.with_private_value_length(256).unwrap();
        assert_eq!(params.private_value_length(), Some(256));
    }

    #[test]
    fn generated_parameters_are_fresh() {
        let a = DomainParameters::generate(&mut OsRng, 2048).unwrap();
        let b = DomainParameters::generate(&mut OsRng, 2048).unwrap();

        assert_eq!(a.bits(), 2048);
        assert_eq!(a.prime_bytes(), b.prime_bytes());
        assert!(a.order_bytes().is_some());
        assert!(!a.same_group(&b));
        assert!(a.same_group(&a.clone()));
    }

    #[test]
    fn generate_rejects_unsupported_sizes() {
        for bits in [0, 1024, 2047, 2049, 16384] {
            let err = DomainParameters::generate(&mut OsRng, bits).unwrap_err();
            assert!(matches!(err, Error::KeyGeneration(_)), "{bits}");
        }
    }

    #[test]
    fn same_group_ignores_missing_order_and_length_hint() {
        let q = NamedGroup::Ffdhe2048.order().to_bytes_be();
        let pkcs3 = DomainParameters::named(NamedGroup::Ffdhe2048);
        let x942 = pkcs3.clone().with_order(&q).unwrap();
        let hinted = pkcs3.clone().with_private_value_length(300).unwrap();

        assert!(pkcs3.same_group(&x942));
        assert!(x942.same_group(&pkcs3));
        assert!(pkcs3.same_group(&hinted));
        assert!(!pkcs3.same_group(&DomainParameters::named(NamedGroup::Ffdhe3072)));
    }
}
