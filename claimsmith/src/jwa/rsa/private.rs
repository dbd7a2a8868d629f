use std::{fmt, path::Path, sync::Arc};

use aliri_base64::Base64Url;
use openssl::rsa::Rsa;
use ring::signature::RsaKeyPair;

use super::PublicKey;
use crate::{
    error,
    fs::{FileSystem, OsFileSystem},
    jwa, jws,
};

/// An RSA private key, along with its public key
///
/// Cloning is cheap, as the key pair itself is shared.
#[derive(Clone)]
#[must_use]
pub struct PrivateKey {
    public_key: PublicKey,
    key_pair: Arc<RsaKeyPair>,
}

impl PrivateKey {
    /// Imports an RSA key pair from a PKCS#1 PEM document
    ///
    /// # Errors
    ///
    /// The provided PEM document is not a valid RSA private key.
    pub fn from_pkcs1_pem(pem: &[u8]) -> Result<Self, error::KeyRejected> {
        let rsa = Rsa::private_key_from_pem(pem).map_err(error::key_rejected)?;
        let der = rsa.private_key_to_der().map_err(error::key_rejected)?;

        let public_key = PublicKey::from_components(
            Base64Url::from_raw(rsa.n().to_vec()),
            Base64Url::from_raw(rsa.e().to_vec()),
        )?;

        let key_pair =
            Arc::new(RsaKeyPair::from_der(&der).map_err(|e| error::key_rejected(e.to_string()))?);

        Ok(Self {
            public_key,
            key_pair,
        })
    }

    /// Reads an RSA key pair from a PKCS#1 PEM file
    ///
    /// # Errors
    ///
    /// The file cannot be read or is not a valid RSA private key.
    pub fn from_pkcs1_file(path: impl AsRef<Path>) -> Result<Self, error::KeyLoadError> {
        Self::from_pkcs1_file_with(&OsFileSystem, path)
    }

    /// Reads an RSA key pair from a PKCS#1 PEM file through `fs`
    ///
    /// # Errors
    ///
    /// The file cannot be read or is not a valid RSA private key.
    pub fn from_pkcs1_file_with<F: FileSystem>(
        fs: &F,
        path: impl AsRef<Path>,
    ) -> Result<Self, error::KeyLoadError> {
        let pem = super::read_key_file(fs, path.as_ref())?;
        Ok(Self::from_pkcs1_pem(&pem)?)
    }

    /// Provides access to the public key parameters
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl jws::Signer for PrivateKey {
    fn sign(&self, alg: jwa::Algorithm, data: &[u8]) -> Result<Vec<u8>, error::Unexpected> {
        let mut buf = vec![0; self.key_pair.public().modulus_len()];
        self.key_pair
            .sign(
                alg.signing_params(),
                &ring::rand::SystemRandom::new(),
                data,
                &mut buf,
            )
            .map_err(|e| error::unexpected(e.to_string()))?;
        Ok(buf)
    }
}
