//! Two-party exchange tests

use ffdh::{EncodePublicKey, Error, NamedGroup, Participant, State};
use rand_core::OsRng; // requires 'getrandom' feature

/// Run a complete exchange where `alice` picks `bits`-sized parameters and
/// public keys travel as DER.
fn exchange(alice: &mut Participant, bob: &mut Participant, bits: usize) {
    let alice_der = alice
        .generate_keypair(&mut OsRng, bits)
        .unwrap()
        .to_public_key_der()
        .unwrap();

    let alice_public = bob.decode_peer_public_key(alice_der.as_bytes()).unwrap();
    let bob_der = bob
        .generate_keypair_from_peer(&mut OsRng, &alice_public)
        .to_public_key_der()
        .unwrap();
    bob.phase_one(&alice_public).unwrap();

    let bob_public = alice.decode_peer_public_key(bob_der.as_bytes()).unwrap();
    alice.phase_one(&bob_public).unwrap();
}

#[test]
fn agreement_is_symmetric() {
    let mut alice = Participant::new("alice");
    let mut bob = Participant::new("bob");
    exchange(&mut alice, &mut bob, 2048);

    let alice_shared = alice.shared_secret().unwrap();
    let bob_shared = bob.shared_secret().unwrap();
    assert_eq!(alice_shared.raw_secret_bytes(), bob_shared.raw_secret_bytes());
    assert_eq!(alice_shared.raw_secret_bytes().len(), 256);
}

#[test]
fn alice_and_bob_4096() {
    let mut alice = Participant::new("alice");
    let mut bob = Participant::new("bob");
    exchange(&mut alice, &mut bob, 4096);

    assert_eq!(alice.state(), State::PhaseComplete);
    assert_eq!(bob.state(), State::PhaseComplete);

    let alice_shared = alice.shared_secret().unwrap();
    let bob_shared = bob.shared_secret().unwrap();
    assert_eq!(alice_shared.raw_secret_bytes(), bob_shared.raw_secret_bytes());
    assert_eq!(alice_shared.raw_secret_bytes().len(), 512);
}

#[test]
fn independently_generated_parameters_are_rejected() {
    let mut alice = Participant::new("alice");
    let mut bob = Participant::new("bob");

    let alice_der = alice
        .generate_keypair(&mut OsRng, 2048)
        .unwrap()
        .to_public_key_der()
        .unwrap();
    let bob_der = bob
        .generate_keypair(&mut OsRng, 2048)
        .unwrap()
        .to_public_key_der()
        .unwrap();

    let bob_public = alice.decode_peer_public_key(bob_der.as_bytes()).unwrap();
    let alice_public = bob.decode_peer_public_key(alice_der.as_bytes()).unwrap();

    assert!(matches!(
        alice.phase_one(&bob_public),
        Err(Error::ParameterMismatch)
    ));
    assert!(matches!(
        bob.phase_one(&alice_public),
        Err(Error::ParameterMismatch)
    ));

    // neither side ever sees a secret
    assert!(alice.shared_secret().is_err());
    assert!(bob.shared_secret().is_err());
}

#[test]
fn extraction_is_repeatable() {
    let mut alice = Participant::new("alice");
    let mut bob = Participant::new("bob");
    exchange(&mut alice, &mut bob, 2048);

    let first = alice.shared_secret().unwrap();
    let second = alice.shared_secret().unwrap();
    assert_eq!(first.raw_secret_bytes(), second.raw_secret_bytes());
}

#[test]
fn extraction_before_phase_is_rejected() {
    let mut alice = Participant::new("alice");
    assert!(matches!(
        alice.shared_secret(),
        Err(Error::AgreementState {
            state: State::Uninitialized,
            ..
        })
    ));

    for group in NamedGroup::ALL {
        alice.generate_keypair(&mut OsRng, group.bits()).unwrap();
        assert!(
            matches!(
                alice.shared_secret(),
                Err(Error::AgreementState {
                    operation: "shared_secret",
                    state: State::Initialized,
                })
            ),
            "{}",
            group.name()
        );
    }
}

#[test]
fn second_phase_is_rejected() {
    let mut alice = Participant::new("alice");
    let mut bob = Participant::new("bob");
    exchange(&mut alice, &mut bob, 2048);
    let expected = alice.shared_secret().unwrap();

    let bob_public = bob.public_key().unwrap().clone();
    assert!(matches!(
        alice.phase_one(&bob_public),
        Err(Error::AgreementState {
            operation: "phase_one",
            state: State::PhaseComplete,
        })
    ));

    // the completed agreement is untouched
    assert_eq!(
        alice.shared_secret().unwrap().raw_secret_bytes(),
        expected.raw_secret_bytes()
    );
}

#[test]
fn new_keypair_restarts_agreement() {
    let mut alice = Participant::new("alice");
    let mut bob = Participant::new("bob");
    exchange(&mut alice, &mut bob, 2048);
    let first = alice.shared_secret().unwrap();

    let alice_public = alice.public_key().unwrap().clone();
    let bob_public = bob.generate_keypair_from_peer(&mut OsRng, &alice_public);
    let alice_public = alice.generate_keypair_from_peer(&mut OsRng, &bob_public);
    assert_eq!(alice.state(), State::Initialized);
    assert!(alice.shared_secret().is_err());

    alice.phase_one(&bob_public).unwrap();
    bob.phase_one(&alice_public).unwrap();

    let second = alice.shared_secret().unwrap();
    assert_eq!(second.raw_secret_bytes(), bob.shared_secret().unwrap().raw_secret_bytes());
    assert_ne!(first.raw_secret_bytes(), second.raw_secret_bytes());
}
