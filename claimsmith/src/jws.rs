//! Signing and verification primitives for JSON Web Signatures (JWS)
//!
//! The specifications for this standard can be found in [RFC7515][].
//!
//! [RFC7515]: https://tools.ietf.org/html/rfc7515

use crate::{error, jwa};

/// A JWS signer
pub trait Signer {
    /// Signs the data provided using the specified algorithm
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying cryptographic operation fails.
    fn sign(&self, alg: jwa::Algorithm, data: &[u8]) -> Result<Vec<u8>, error::Unexpected>;
}

impl<T: Signer + ?Sized> Signer for &'_ T {
    #[inline]
    fn sign(&self, alg: jwa::Algorithm, data: &[u8]) -> Result<Vec<u8>, error::Unexpected> {
        T::sign(&**self, alg, data)
    }
}

/// A JWS verifier
pub trait Verifier {
    /// Verifies the data against the signature using the specified algorithm
    ///
    /// # Errors
    ///
    /// Returns an error if the signature does not match.
    fn verify(
        &self,
        alg: jwa::Algorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), error::SignatureMismatch>;
}

impl<T: Verifier + ?Sized> Verifier for &'_ T {
    #[inline]
    fn verify(
        &self,
        alg: jwa::Algorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), error::SignatureMismatch> {
        T::verify(&**self, alg, data, signature)
    }
}
