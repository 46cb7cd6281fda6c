#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg",
    html_favicon_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg"
)]
#![forbid(unsafe_code)]
#![warn(
    clippy::mod_module_files,
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]

mod error;
mod groups;
mod params;
mod participant;
mod public_key;
mod secret;

pub use crate::{
    error::{Error, Result, State},
    groups::NamedGroup,
    params::{DomainParameters, MAX_MODULUS_BITS, MIN_MODULUS_BITS},
    participant::Participant,
    public_key::PublicKey,
    secret::{EphemeralSecret, SharedSecret},
};
pub use rand_core;
pub use spki::{self, DecodePublicKey, EncodePublicKey};

use spki::ObjectIdentifier;

/// PKCS#3 `dhKeyAgreement` algorithm identifier.
pub const DH_KEY_AGREEMENT_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.3.1");

/// ANSI X9.42 `dhpublicnumber` algorithm identifier (RFC 3279).
pub const DH_PUBLIC_NUMBER_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10046.2.1");
