#![no_main]
use ffdh::{Error, Participant, State};
use libfuzzer_sys::fuzz_target;
use rand_chacha::{rand_core::SeedableRng, ChaChaRng};

fuzz_target!(|input: ([u8; 32], &[u8])| {
    let (seed, data) = input;
    let mut rng = ChaChaRng::from_seed(seed);

    let mut participant = Participant::new("fuzz");
    let Ok(peer) = participant.decode_peer_public_key(data) else {
        return;
    };

    participant.generate_keypair_from_peer(&mut rng, &peer);
    match participant.phase_one(&peer) {
        Ok(()) => {
            let shared = participant.shared_secret().unwrap();
            assert_eq!(shared.raw_secret_bytes().len(), peer.params().byte_len());
        }
        Err(Error::DegenerateSecret) => assert_eq!(participant.state(), State::Initialized),
        Err(err) => panic!("unexpected error: {err}"),
    }
});
