use std::path::Path;

use aliri_base64::{Base64Url, Base64UrlRef};
use openssl::{pkey::Id, x509::X509};

use crate::{
    error,
    fs::{FileSystem, OsFileSystem},
    jwa, jws,
};

/// RSA public key components
#[derive(Debug, Clone, Eq, PartialEq)]
#[must_use]
pub struct PublicKey {
    modulus: Base64Url,
    exponent: Base64Url,
}

impl PublicKey {
    /// The public key's modulus
    pub fn modulus(&self) -> &Base64UrlRef {
        &self.modulus
    }

    /// The public key's exponent
    pub fn exponent(&self) -> &Base64UrlRef {
        &self.exponent
    }

    /// Extracts the RSA public key from a PEM-encoded X.509 certificate
    ///
    /// # Errors
    ///
    /// The PEM document is not a certificate, or the certificate does not
    /// carry an RSA key.
    pub fn from_certificate_pem(pem: &[u8]) -> Result<Self, error::KeyRejected> {
        let cert = X509::from_pem(pem).map_err(error::key_rejected)?;
        let pkey = cert.public_key().map_err(error::key_rejected)?;

        if pkey.id() != Id::RSA {
            return Err(error::key_rejected("certificate does not carry an RSA key"));
        }

        let rsa = pkey.rsa().map_err(error::key_rejected)?;

        Self::from_components(
            Base64Url::from_raw(rsa.n().to_vec()),
            Base64Url::from_raw(rsa.e().to_vec()),
        )
    }

    /// Reads a PEM-encoded X.509 certificate from a file and extracts its RSA public key
    ///
    /// # Errors
    ///
    /// The file cannot be read or does not carry an RSA certificate.
    pub fn from_certificate_file(path: impl AsRef<Path>) -> Result<Self, error::KeyLoadError> {
        Self::from_certificate_file_with(&OsFileSystem, path)
    }

    /// Reads a PEM-encoded X.509 certificate through `fs` and extracts its RSA public key
    ///
    /// # Errors
    ///
    /// The file cannot be read or does not carry an RSA certificate.
    pub fn from_certificate_file_with<F: FileSystem>(
        fs: &F,
        path: impl AsRef<Path>,
    ) -> Result<Self, error::KeyLoadError> {
        let pem = super::read_key_file(fs, path.as_ref())?;
        Ok(Self::from_certificate_pem(&pem)?)
    }

    /// Constructs a public key from the modulus and exponent
    ///
    /// # Errors
    ///
    /// The modulus is shorter than 2048 or longer than 8192 bits.
    pub fn from_components(
        modulus: impl Into<Base64Url>,
        exponent: impl Into<Base64Url>,
    ) -> Result<Self, error::KeyRejected> {
        let modulus = modulus.into();
        let exponent = exponent.into();
        if !(256..=1024).contains(&modulus.as_slice().len()) {
            return Err(error::key_rejected(
                "key modulus must be between 2048 and 8192 bits",
            ));
        }

        Ok(Self { modulus, exponent })
    }
}

impl jws::Verifier for PublicKey {
    fn verify(
        &self,
        alg: jwa::Algorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), error::SignatureMismatch> {
        let pk = ring::signature::RsaPublicKeyComponents {
            n: self.modulus.as_slice(),
            e: self.exponent.as_slice(),
        };

        pk.verify(alg.verification_params(), data, signature)
            .map_err(|_| error::signature_mismatch())
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use color_eyre::Result;

    use super::*;
    use crate::test;

    #[test]
    fn loads_rsa_certificate() -> Result<()> {
        let key = PublicKey::from_certificate_pem(test::CERT_PEM.as_bytes())?;
        assert_eq!(key.modulus().as_slice().len(), 256);
        assert_eq!(key.exponent().as_slice(), [1, 0, 1]);
        Ok(())
    }

    #[test]
    fn matches_private_key() -> Result<()> {
        let public = test::public_key();
        let private = test::private_key();
        assert_eq!(&public, private.public_key());
        Ok(())
    }

    #[test]
    fn loads_from_file_system() -> Result<()> {
        let key = PublicKey::from_certificate_file_with(&test::test_fs(), "cert.pem")?;
        assert_eq!(key, test::public_key());
        Ok(())
    }

    #[test]
    fn loads_from_disk() -> Result<()> {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/rsa/cert.pem");
        let key = PublicKey::from_certificate_file(path)?;
        assert_eq!(key, test::public_key());
        Ok(())
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = PublicKey::from_certificate_file_with(&test::test_fs(), "missing.pem").unwrap_err();
        assert_eq!(err.io_error_kind(), Some(io::ErrorKind::NotFound));
    }

    #[test]
    fn private_key_is_not_a_certificate() {
        let err = PublicKey::from_certificate_file_with(&test::test_fs(), "key.pem").unwrap_err();
        assert!(matches!(err, error::KeyLoadError::KeyRejected(_)));
    }

    #[test]
    fn rejects_non_rsa_certificate() {
        assert!(PublicKey::from_certificate_pem(test::EC_CERT_PEM.as_bytes()).is_err());
    }

    #[test]
    fn rejects_short_modulus() {
        let err = PublicKey::from_components(
            Base64Url::from_raw(vec![0xab; 128]),
            Base64Url::from_raw(vec![1, 0, 1]),
        );
        assert!(err.is_err());
    }
}
