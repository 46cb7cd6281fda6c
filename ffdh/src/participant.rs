//! One side of a two-party Diffie-Hellman exchange.

use rand_core::{CryptoRng, RngCore};
use spki::DecodePublicKey;
use tracing::{debug, warn};

use crate::{DomainParameters, EphemeralSecret, Error, PublicKey, Result, SharedSecret, State};

/// Progress of the agreement, holding whichever secret is live.
#[derive(Debug)]
enum Agreement {
    Uninitialized,
    Initialized(EphemeralSecret),
    PhaseComplete(SharedSecret),
}

/// A party to an unauthenticated two-party Diffie-Hellman exchange.
///
/// A participant owns its private exponent and never hands it out. The
/// exchange runs in a fixed order:
///
/// 1. generate a keypair, either in fresh parameters
///    ([`generate_keypair`][`Self::generate_keypair`]) or in the peer's
///    ([`generate_keypair_from_peer`][`Self::generate_keypair_from_peer`]);
/// 2. run the single agreement phase with the peer's public key
///    ([`phase_one`][`Self::phase_one`]);
/// 3. read the shared secret ([`shared_secret`][`Self::shared_secret`]) as
///    many times as needed.
///
/// Calls made out of order fail with [`Error::AgreementState`]. Generating a
/// new keypair restarts the exchange from step 2.
#[derive(Debug)]
pub struct Participant {
    label: String,
    public_key: Option<PublicKey>,
    agreement: Agreement,
}

impl Participant {
    /// Create a participant with no keypair. `label` only appears in log
    /// events.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            public_key: None,
            agreement: Agreement::Uninitialized,
        }
    }

    /// Label given at construction.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Current agreement state.
    pub fn state(&self) -> State {
        match self.agreement {
            Agreement::Uninitialized => State::Uninitialized,
            Agreement::Initialized(_) => State::Initialized,
            Agreement::PhaseComplete(_) => State::PhaseComplete,
        }
    }

    /// Our own public key, once a keypair has been generated.
    ///
    /// Remains available after the phase completes.
    pub fn public_key(&self) -> Option<&PublicKey> {
        self.public_key.as_ref()
    }

    /// Generate fresh domain parameters with a `bits`-sized modulus and a
    /// keypair in them.
    ///
    /// Supported sizes are 2048, 3072, 4096, 6144 and 8192 bits; anything
    /// else fails with [`Error::KeyGeneration`] and leaves the participant
    /// uninitialized.
    pub fn generate_keypair<R>(&mut self, rng: &mut R, bits: usize) -> Result<PublicKey>
    where
        R: CryptoRng + RngCore + ?Sized,
    {
        match DomainParameters::generate(rng, bits) {
            Ok(params) => Ok(self.generate_keypair_with_params(rng, &params)),
            Err(err) => {
                debug!(participant = %self.label, bits, error = %err, "DH key generation failed");
                self.public_key = None;
                self.agreement = Agreement::Uninitialized;
                Err(err)
            }
        }
    }

    /// Generate a keypair in the group used by the peer's public key.
    ///
    /// The peer's parameters were validated when its key was decoded, so
    /// this can't fail.
    pub fn generate_keypair_from_peer<R>(&mut self, rng: &mut R, peer: &PublicKey) -> PublicKey
    where
        R: CryptoRng + RngCore + ?Sized,
    {
        self.generate_keypair_with_params(rng, peer.params())
    }

    /// Generate a keypair in the given group, discarding any previous
    /// keypair or shared secret.
    pub fn generate_keypair_with_params<R>(
        &mut self,
        rng: &mut R,
        params: &DomainParameters,
    ) -> PublicKey
    where
        R: CryptoRng + RngCore + ?Sized,
    {
        let secret = EphemeralSecret::random(rng, params);
        let public_key = secret.public_key().clone();

        debug!(
            participant = %self.label,
            bits = params.bits(),
            named_group = params.named_group().map(|group| group.name()),
            "generated DH keypair"
        );

        self.public_key = Some(public_key.clone());
        self.agreement = Agreement::Initialized(secret);
        public_key
    }

    /// Decode a peer's DER `SubjectPublicKeyInfo`.
    ///
    /// Does not depend on or change the agreement state.
    pub fn decode_peer_public_key(&self, bytes: &[u8]) -> Result<PublicKey> {
        let key = PublicKey::from_public_key_der(bytes).map_err(|err| {
            debug!(participant = %self.label, error = %err, "rejected peer public key");
            Error::from(err)
        })?;

        debug!(
            participant = %self.label,
            bits = key.params().bits(),
            "decoded peer public key"
        );
        Ok(key)
    }

    /// Run the agreement phase with the peer's public key.
    ///
    /// Only one phase is allowed per keypair. On success the private
    /// exponent is erased and the shared secret becomes available.
    pub fn phase_one(&mut self, peer: &PublicKey) -> Result<()> {
        let Agreement::Initialized(secret) = &self.agreement else {
            let state = self.state();
            warn!(participant = %self.label, %state, "DH phase rejected: out of order");
            return Err(Error::AgreementState {
                operation: "phase_one",
                state,
            });
        };

        let shared = secret.diffie_hellman(peer).map_err(|err| {
            warn!(participant = %self.label, error = %err, "DH phase rejected");
            err
        })?;

        debug!(
            participant = %self.label,
            bits = peer.params().bits(),
            "DH phase complete"
        );
        self.agreement = Agreement::PhaseComplete(shared);
        Ok(())
    }

    /// Shared secret computed by [`phase_one`][`Self::phase_one`].
    ///
    /// Every call returns the same bytes.
    pub fn shared_secret(&self) -> Result<SharedSecret> {
        match &self.agreement {
            Agreement::PhaseComplete(shared) => {
                debug!(participant = %self.label, "extracted DH shared secret");
                Ok(shared.clone())
            }
            _ => Err(Error::AgreementState {
                operation: "shared_secret",
                state: self.state(),
            }),
        }
    }
}
