//! A typed claims layer over RSA-signed JSON Web Tokens ([RFC7519][])
//!
//! Tokens are built from an ordered list of [`Claim`]s. Registered claim
//! names (`iss`, `sub`, `aud`, `exp`, `nbf`, `iat`, `jti`, along with their
//! long-form aliases such as `subject` or `expires`) are recognized and
//! normalized, while everything else is carried as an extension claim.
//! When a key repeats, the last occurrence wins. Every signed token carries
//! a `jti`; one is generated when none is supplied.
//!
//! Verification checks the signature, then the audience, then the
//! `nbf`/`exp` window, and only then materializes a [`VerifyResult`].
//!
//! [RFC7519]: https://tools.ietf.org/html/rfc7519
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use claimsmith::{
//!     jwa::{self, Algorithm},
//!     jwt::Audience,
//!     Claim, RsaSigner, RsaVerifier, Signer, Timestamp, Verifier,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let private_key = jwa::rsa::PrivateKey::from_pkcs1_pem(
//!     include_bytes!("../data/rsa/key.pem"),
//! )?;
//! let public_key = jwa::rsa::PublicKey::from_certificate_pem(
//!     include_bytes!("../data/rsa/cert.pem"),
//! )?;
//!
//! let signer = RsaSigner::new(private_key, Algorithm::RS256).with_issuer("authority");
//! let verifier = RsaVerifier::new(public_key, Audience::from_static("my_api"));
//!
//! let now = Timestamp::now();
//! let token = signer.sign_claims(vec![
//!     Claim::string("subject", "alice"),
//!     Claim::string("audience", "my_api"),
//!     Claim::time("nbf", now.saturating_sub(Duration::from_secs(60))),
//!     Claim::time("exp", now.saturating_add(Duration::from_secs(3600))),
//!     Claim::any("roles", "admin"),
//! ])?;
//!
//! let result = verifier.verify(token.as_bytes())?;
//! assert_eq!(result.subject(), "alice");
//! assert_eq!(result.audience(), "my_api");
//! assert!(!result.id().is_empty());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

pub mod claim;
pub mod claim_set;
pub mod clock;
pub mod error;
pub mod fs;
pub mod jwa;
pub mod jws;
pub mod jwt;
mod signer;
mod verifier;

#[cfg(test)]
pub(crate) mod test;

#[doc(inline)]
pub use claim::{Claim, ClaimType, ClaimValue};
#[doc(inline)]
pub use claim_set::ClaimSet;
#[doc(inline)]
pub use clock::Timestamp;
#[doc(inline)]
pub use jwt::{Jwt, JwtRef};
pub use signer::{sign, sign_fingerprint, RsaSigner, Signer};
pub use verifier::{RsaVerifier, Verifier, VerifyResult};
