use std::path::Path;

use crate::{
    claim::{self, Claim},
    claim_set::ClaimSet,
    clock::Timestamp,
    error,
    fs::{FileSystem, OsFileSystem},
    jwa::{self, rsa::PrivateKey},
    jwt::{Issuer, IssuerRef, Jwt},
};

/// Produces signed tokens from claims
pub trait Signer {
    /// Builds a claim set from `claims` and signs it
    ///
    /// Claims are applied in order, so a later claim overrides an earlier
    /// one with the same key.
    ///
    /// # Errors
    ///
    /// Returns an error if a claim cannot be placed into the claim set or
    /// if the token cannot be signed.
    fn sign_claims(&self, claims: Vec<Claim>) -> Result<Jwt, error::SignError>;
}

impl<T: Signer + ?Sized> Signer for &'_ T {
    #[inline]
    fn sign_claims(&self, claims: Vec<Claim>) -> Result<Jwt, error::SignError> {
        T::sign_claims(&**self, claims)
    }
}

impl<T: Signer + ?Sized> Signer for Box<T> {
    #[inline]
    fn sign_claims(&self, claims: Vec<Claim>) -> Result<Jwt, error::SignError> {
        T::sign_claims(&**self, claims)
    }
}

/// Signs tokens with an RSA private key
///
/// Every token carries the configured issuer unless the claims supply
/// their own `iss`.
#[derive(Clone, Debug)]
#[must_use]
pub struct RsaSigner {
    private_key: PrivateKey,
    issuer: Issuer,
    algorithm: jwa::Algorithm,
}

impl RsaSigner {
    /// Constructs a signer with an empty issuer
    pub fn new(private_key: PrivateKey, algorithm: jwa::Algorithm) -> Self {
        Self {
            private_key,
            issuer: Issuer::from_static(""),
            algorithm,
        }
    }

    /// Constructs a signer for an algorithm given by name
    ///
    /// ```
    /// # use claimsmith::{jwa::rsa::PrivateKey, RsaSigner};
    /// # let key = PrivateKey::from_pkcs1_pem(include_bytes!("../data/rsa/key.pem")).unwrap();
    /// let err = RsaSigner::from_algorithm_name(key, "HS256").unwrap_err();
    /// assert_eq!(err.alg(), "HS256");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if `alg` is not one of `RS256`, `RS384`, or `RS512`.
    pub fn from_algorithm_name(
        private_key: PrivateKey,
        alg: &str,
    ) -> Result<Self, error::UnknownAlgorithm> {
        let algorithm: jwa::Algorithm = alg.parse()?;
        Ok(Self::new(private_key, algorithm))
    }

    /// Reads a PKCS#1 private key from a file and constructs an RS256 signer
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be read or is not a valid RSA
    /// private key.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, error::KeyLoadError> {
        Self::from_file_with(&OsFileSystem, path)
    }

    /// Reads a PKCS#1 private key through `fs` and constructs an RS256 signer
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be read or is not a valid RSA
    /// private key.
    pub fn from_file_with<F: FileSystem>(
        fs: &F,
        path: impl AsRef<Path>,
    ) -> Result<Self, error::KeyLoadError> {
        let private_key = PrivateKey::from_pkcs1_file_with(fs, path)?;
        Ok(Self::new(private_key, jwa::Algorithm::RS256))
    }

    /// Sets the issuer placed into each token
    pub fn with_issuer(self, issuer: impl Into<Issuer>) -> Self {
        Self {
            issuer: issuer.into(),
            ..self
        }
    }

    /// Sets the signing algorithm
    pub fn with_algorithm(self, algorithm: jwa::Algorithm) -> Self {
        Self { algorithm, ..self }
    }

    /// The issuer placed into each token
    pub fn issuer(&self) -> &IssuerRef {
        &self.issuer
    }

    /// The signing algorithm
    #[must_use]
    pub fn algorithm(&self) -> jwa::Algorithm {
        self.algorithm
    }

    /// The private key used for signing
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }
}

impl Signer for RsaSigner {
    fn sign_claims(&self, claims: Vec<Claim>) -> Result<Jwt, error::SignError> {
        let claims = std::iter::once(Claim::string(claim::ISSUER, self.issuer.as_str()))
            .chain(claims);

        let set = ClaimSet::from_claims(claims)?;
        let token = Jwt::sign(&set, self.algorithm, &self.private_key)?;

        tracing::debug!(alg = %self.algorithm, jti = set.id(), "signed token");

        Ok(token)
    }
}

/// Signs a token with the usual session shape
///
/// The token carries `sub`, `aud`, the `onl` flag, and the `nbf`/`exp`
/// window.
///
/// # Errors
///
/// Returns an error if the signer fails to produce a token.
pub fn sign<S: Signer + ?Sized>(
    signer: &S,
    subject: &str,
    audience: &str,
    online: bool,
    not_before: impl Into<Timestamp>,
    expires: impl Into<Timestamp>,
) -> Result<Jwt, error::SignError> {
    signer.sign_claims(session_claims(
        subject, audience, online, not_before, expires,
    ))
}

/// Signs a token with the usual session shape, bound to a client fingerprint
///
/// As [`sign()`], with an additional `fpt` claim.
///
/// # Errors
///
/// Returns an error if the signer fails to produce a token.
pub fn sign_fingerprint<S: Signer + ?Sized>(
    signer: &S,
    subject: &str,
    audience: &str,
    fingerprint: &str,
    online: bool,
    not_before: impl Into<Timestamp>,
    expires: impl Into<Timestamp>,
) -> Result<Jwt, error::SignError> {
    let mut claims = session_claims(subject, audience, online, not_before, expires);
    claims.push(Claim::string(claim::FINGERPRINT, fingerprint));
    signer.sign_claims(claims)
}

fn session_claims(
    subject: &str,
    audience: &str,
    online: bool,
    not_before: impl Into<Timestamp>,
    expires: impl Into<Timestamp>,
) -> Vec<Claim> {
    vec![
        Claim::string(claim::SUBJECT, subject),
        Claim::string(claim::AUDIENCE, audience),
        Claim::bool(claim::ONLINE, online),
        Claim::time(claim::NOT_BEFORE, not_before),
        Claim::time(claim::EXPIRES, expires),
    ]
}
