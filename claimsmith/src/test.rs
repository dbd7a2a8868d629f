#![allow(dead_code)]

use crate::{
    fs::MemoryFileSystem,
    jwa::{self, rsa},
    RsaSigner, RsaVerifier,
};

pub const CERT_PEM: &str = include_str!("../data/rsa/cert.pem");
pub const KEY_PEM: &str = include_str!("../data/rsa/key.pem");
pub const EC_CERT_PEM: &str = include_str!("../data/ec/cert.pem");

pub const TEST_AUDIENCE: &str = "audience";

pub fn private_key() -> rsa::PrivateKey {
    rsa::PrivateKey::from_pkcs1_pem(KEY_PEM.as_bytes()).unwrap()
}

pub fn public_key() -> rsa::PublicKey {
    rsa::PublicKey::from_certificate_pem(CERT_PEM.as_bytes()).unwrap()
}

pub fn test_fs() -> MemoryFileSystem {
    MemoryFileSystem::new()
        .with_file("cert.pem", CERT_PEM)
        .with_file("key.pem", KEY_PEM)
}

pub fn signer() -> RsaSigner {
    RsaSigner::new(private_key(), jwa::Algorithm::RS256)
}

pub fn verifier() -> RsaVerifier {
    RsaVerifier::new(public_key(), TEST_AUDIENCE)
}
