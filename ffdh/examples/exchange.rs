//! Alice and Bob agree on a shared secret over an in-memory "wire".
//!
//! ```text
//! cargo run --example exchange [BITS]
//! ```
//!
//! `BITS` defaults to 4096. `RUST_LOG` controls log output (default `info,ffdh=debug`).

use ffdh::{rand_core::OsRng, EncodePublicKey, Participant};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ffdh=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();

    let bits = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 4096,
    };

    let mut alice = Participant::new("alice");
    let mut bob = Participant::new("bob");

    // Alice generates parameters and a keypair, and sends her public key
    let alice_public = alice.generate_keypair(&mut OsRng, bits)?;
    let wire = alice_public.to_public_key_der()?.into_vec();
    info!(bytes = wire.len(), "alice -> bob");
    println!("{alice_public}");

    // Bob answers with a keypair in Alice's group
    let alice_public = bob.decode_peer_public_key(&wire)?;
    let bob_public = bob.generate_keypair_from_peer(&mut OsRng, &alice_public);
    let wire = bob_public.to_public_key_der()?.into_vec();
    info!(bytes = wire.len(), "bob -> alice");
    bob.phase_one(&alice_public)?;

    let bob_public = alice.decode_peer_public_key(&wire)?;
    alice.phase_one(&bob_public)?;

    let alice_shared = alice.shared_secret()?;
    let bob_shared = bob.shared_secret()?;
    if alice_shared.raw_secret_bytes() != bob_shared.raw_secret_bytes() {
        return Err("shared secrets differ".into());
    }

    // only safe to print because this is a demo
    info!(
        secret = %hex::encode(&alice_shared.raw_secret_bytes()[..16]),
        len = alice_shared.raw_secret_bytes().len(),
        "agreed on shared secret (first 16 bytes shown)"
    );

    Ok(())
}
