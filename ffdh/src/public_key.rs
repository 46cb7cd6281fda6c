//! Public key types and traits

#[cfg(feature = "pem")]
use core::{fmt, str::FromStr};

use der::{
    asn1::{AnyRef, BitStringRef, UintRef},
    Decode, Document, Encode, Sequence,
};
use num_bigint::BigUint;
use spki::{AlgorithmIdentifierRef, EncodePublicKey, SubjectPublicKeyInfoRef};

#[cfg(feature = "pem")]
use spki::DecodePublicKey;

use crate::{DomainParameters, Error, Result, DH_KEY_AGREEMENT_OID, DH_PUBLIC_NUMBER_OID};

/// PKCS#3 `DHParameter`.
///
/// ```text
/// DHParameter ::= SEQUENCE {
///   prime INTEGER, -- p
///   base INTEGER, -- g
///   privateValueLength INTEGER OPTIONAL }
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Sequence)]
struct DhParameter<'a> {
    prime: UintRef<'a>,
    base: UintRef<'a>,
    #[asn1(optional = "true")]
    private_value_length: Option<u32>,
}

/// ANSI X9.42 `DomainParameters` as profiled by RFC 3279 Section 2.3.3.
///
/// ```text
/// DomainParameters ::= SEQUENCE {
///   p       INTEGER, -- odd prime, p=jq +1
///   g       INTEGER, -- generator, g
///   q       INTEGER, -- factor of p-1
///   j       INTEGER OPTIONAL, -- subgroup factor
///   validationParms  ValidationParms OPTIONAL }
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Sequence)]
struct X942DomainParameters<'a> {
    p: UintRef<'a>,
    g: UintRef<'a>,
    q: UintRef<'a>,
    #[asn1(optional = "true")]
    j: Option<UintRef<'a>>,
    #[asn1(optional = "true")]
    validation_parms: Option<ValidationParms<'a>>,
}

/// ```text
/// ValidationParms ::= SEQUENCE {
///   seed             BIT STRING,
///   pgenCounter      INTEGER }
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Sequence)]
struct ValidationParms<'a> {
    seed: BitStringRef<'a>,
    pgen_counter: UintRef<'a>,
}

/// Diffie-Hellman public key: a public value `y = g^x mod p` together with
/// the [`DomainParameters`] it belongs to.
///
/// Public keys are validated when they are constructed:
///
/// - `2 <= y <= p - 2`
/// - `y^q = 1 (mod p)` whenever the subgroup order `q` is known
///
/// # SubjectPublicKeyInfo encoding
///
/// Keys whose parameters carry an explicit subgroup order are encoded with
/// the `dhpublicnumber` algorithm (ANSI X9.42, RFC 3279). All other keys use
/// PKCS#3 `dhKeyAgreement`, the form produced by the JCE and by OpenSSL for
/// "DH" keys. Both forms are accepted when decoding.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PublicKey {
    params: DomainParameters,
    y: BigUint,
}

impl PublicKey {
    /// Create a public key from domain parameters and a big endian public
    /// value, validating the value against the parameters.
    pub fn new(params: DomainParameters, y: &[u8]) -> Result<Self> {
        Self::from_parts(params, BigUint::from_bytes_be(y))
            .map_err(|_| Error::Decoding(spki::Error::KeyMalformed))
    }

    /// Validate `y` against `params`.
    pub(crate) fn from_parts(
        params: DomainParameters,
        y: BigUint,
    ) -> core::result::Result<Self, &'static str> {
        let one = BigUint::from(1u8);
        let p = params.p();

        if y <= one || y >= p - 1u8 {
            return Err("public value out of range");
        }

        if let Some(q) = params.subgroup_order() {
            if y.modpow(&q, p) != one {
                return Err("public value is not in the prime order subgroup");
            }
        }

        Ok(Self { params, y })
    }

    /// Public key computed by our own key generation; skips validation.
    pub(crate) fn from_generated(params: DomainParameters, y: BigUint) -> Self {
        Self { params, y }
    }

    /// Domain parameters of this key.
    pub fn params(&self) -> &DomainParameters {
        &self.params
    }

    /// Public value `y`, big endian and left-padded to the modulus length.
    pub fn to_bytes(&self) -> Vec<u8> {
        let len = self.params.byte_len();
        let y = self.y.to_bytes_be();
        let mut bytes = vec![0u8; len - y.len()];
        bytes.extend_from_slice(&y);
        bytes
    }

    pub(crate) fn y(&self) -> &BigUint {
        &self.y
    }
}

impl TryFrom<SubjectPublicKeyInfoRef<'_>> for PublicKey {
    type Error = spki::Error;

    fn try_from(spki: SubjectPublicKeyInfoRef<'_>) -> spki::Result<Self> {
        Self::try_from(&spki)
    }
}

impl TryFrom<&SubjectPublicKeyInfoRef<'_>> for PublicKey {
    type Error = spki::Error;

    fn try_from(spki: &SubjectPublicKeyInfoRef<'_>) -> spki::Result<Self> {
        let oid = spki.algorithm.oid;
        let parameters = spki
            .algorithm
            .parameters
            .ok_or(spki::Error::AlgorithmParametersMissing)?;

        let params = if oid == DH_KEY_AGREEMENT_OID {
            let params = parameters.decode_as::<DhParameter<'_>>()?;
            DomainParameters::from_parts(
                BigUint::from_bytes_be(params.prime.as_bytes()),
                BigUint::from_bytes_be(params.base.as_bytes()),
                None,
                params.private_value_length,
            )
        } else if oid == DH_PUBLIC_NUMBER_OID {
            let params = parameters.decode_as::<X942DomainParameters<'_>>()?;
            DomainParameters::from_parts(
                BigUint::from_bytes_be(params.p.as_bytes()),
                BigUint::from_bytes_be(params.g.as_bytes()),
                Some(BigUint::from_bytes_be(params.q.as_bytes())),
                None,
            )
        } else {
            return Err(spki::Error::OidUnknown { oid });
        };

        let params = params.map_err(|reason| {
            tracing::debug!(reason, "rejected DH domain parameters");
            spki::Error::KeyMalformed
        })?;

        let public_value = spki
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| der::Tag::BitString.value_error())?;
        let y = UintRef::from_der(public_value)?;

        Self::from_parts(params, BigUint::from_bytes_be(y.as_bytes())).map_err(|reason| {
            tracing::debug!(reason, "rejected DH public value");
            spki::Error::KeyMalformed
        })
    }
}

impl EncodePublicKey for PublicKey {
    fn to_public_key_der(&self) -> spki::Result<Document> {
        let p = self.params.p().to_bytes_be();
        let g = self.params.g().to_bytes_be();

        let (oid, params_der) = match self.params.q() {
            Some(q) => {
                let q = q.to_bytes_be();
                let params = X942DomainParameters {
                    p: UintRef::new(&p)?,
                    g: UintRef::new(&g)?,
                    q: UintRef::new(&q)?,
                    j: None,
                    validation_parms: None,
                };
                (DH_PUBLIC_NUMBER_OID, params.to_der()?)
            }
            None => {
                let params = DhParameter {
                    prime: UintRef::new(&p)?,
                    base: UintRef::new(&g)?,
                    private_value_length: self.params.private_value_length(),
                };
                (DH_KEY_AGREEMENT_OID, params.to_der()?)
            }
        };

        let y = self.y.to_bytes_be();
        let y_der = UintRef::new(&y)?.to_der()?;

        let spki = SubjectPublicKeyInfoRef {
            algorithm: AlgorithmIdentifierRef {
                oid,
                parameters: Some(AnyRef::from_der(&params_der)?),
            },
            subject_public_key: BitStringRef::from_bytes(&y_der)?,
        };

        Ok(Document::encode_msg(&spki)?)
    }
}

#[cfg(feature = "pem")]
impl FromStr for PublicKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self::from_public_key_pem(s)?)
    }
}

#[cfg(feature = "pem")]
impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pem = self
            .to_public_key_pem(Default::default())
            .map_err(|_| fmt::Error)?;
        f.write_str(&pem)
    }
}

#[cfg(test)]
mod tests {
    use super::PublicKey;
    use crate::{DomainParameters, Error, NamedGroup};
    use num_bigint::BigUint;
    use spki::{DecodePublicKey, EncodePublicKey};

    fn ffdhe2048() -> DomainParameters {
        DomainParameters::named(NamedGroup::Ffdhe2048)
    }

    #[test]
    fn rejects_public_values_out_of_range() {
        let p = NamedGroup::Ffdhe2048.prime();
        for y in [
            BigUint::from(0u8),
            BigUint::from(1u8),
            &p - 1u8,
            p.clone(),
            &p + 1u8,
        ] {
            let err = PublicKey::new(ffdhe2048(), &y.to_bytes_be()).unwrap_err();
            assert!(matches!(err, Error::Decoding(spki::Error::KeyMalformed)));
        }
    }

    #[test]
    fn rejects_public_value_outside_subgroup() {
        // 7 is a quadratic non-residue modulo ffdhe2048, so it has order 2q
        let err = PublicKey::new(ffdhe2048(), &[7]).unwrap_err();
        assert!(matches!(err, Error::Decoding(_)));

        // 4 = 2^2 is in the subgroup
        assert!(PublicKey::new(ffdhe2048(), &[4]).is_ok());
    }

    #[test]
    fn pkcs3_encoding_round_trips() {
        let key = PublicKey::new(ffdhe2048(), &[4]).unwrap();
        let der = key.to_public_key_der().unwrap();
        let decoded = PublicKey::from_public_key_der(der.as_bytes()).unwrap();

        assert_eq!(decoded, key);
        assert_eq!(decoded.params().order_bytes(), None);
        assert_eq!(decoded.to_bytes().len(), 256);
        assert_eq!(decoded.to_bytes()[255], 4);
    }

    #[test]
    fn private_value_length_survives_pkcs3_encoding() {
        let params = ffdhe2048().with_private_value_length(512).unwrap();
        let key = PublicKey::new(params, &[4]).unwrap();
        let der = key.to_public_key_der().unwrap();
        let decoded = PublicKey::from_public_key_der(der.as_bytes()).unwrap();

        assert_eq!(decoded.params().private_value_length(), Some(512));
    }

    #[test]
    fn x942_encoding_round_trips() {
        let q = NamedGroup::Ffdhe2048.order().to_bytes_be();
        let params = ffdhe2048().with_order(&q).unwrap();
        let key = PublicKey::new(params, &[16]).unwrap();
        let der = key.to_public_key_der().unwrap();
        let decoded = PublicKey::from_public_key_der(der.as_bytes()).unwrap();

        assert_eq!(decoded, key);
        assert_eq!(decoded.params().order_bytes(), Some(q));
    }

    #[test]
    fn rejects_unknown_algorithm() {
        // id-ecPublicKey with prime256v1 and a compressed point
        let der = hex_literal::hex!(
            "3039301306072a8648ce3d020106082a8648ce3d030107032200"
            "036b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296"
        );
        let err = PublicKey::from_public_key_der(&der).unwrap_err();
        assert!(matches!(err, spki::Error::OidUnknown { .. }));
    }
}
