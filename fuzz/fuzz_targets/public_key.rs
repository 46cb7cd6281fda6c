#![no_main]
use ffdh::{DecodePublicKey, EncodePublicKey, PublicKey};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(key) = PublicKey::from_public_key_der(data) else {
        return;
    };

    // Anything we accept must survive a round trip unchanged
    let der = key.to_public_key_der().unwrap();
    let decoded = PublicKey::from_public_key_der(der.as_bytes()).unwrap();
    assert_eq!(decoded, key);
    assert_eq!(decoded.to_bytes().len(), key.params().byte_len());
});
