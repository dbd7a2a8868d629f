//! Common errors

#![allow(missing_copy_implementations)]

use std::{error::Error as StdError, io, path::PathBuf};

use thiserror::Error;

use crate::claim::ClaimType;

/// A claim was read through an accessor that does not match its type
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("invalid claim type: expected {expected}, found {found}")]
pub struct InvalidClaimType {
    expected: ClaimType,
    found: ClaimType,
}

impl InvalidClaimType {
    /// The type the accessor required
    #[must_use]
    pub fn expected(&self) -> ClaimType {
        self.expected
    }

    /// The actual type of the claim
    #[must_use]
    pub fn found(&self) -> ClaimType {
        self.found
    }
}

pub(crate) const fn invalid_claim_type(expected: ClaimType, found: ClaimType) -> InvalidClaimType {
    InvalidClaimType { expected, found }
}

/// A claim could not be placed into a claim set
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ClaimRejected {
    /// A registered claim was supplied with the wrong type
    #[error("invalid type for {claim}: expected {expected}, found {found}")]
    InvalidRegisteredType {
        /// The canonical name of the registered claim
        claim: &'static str,
        /// The type the registered claim requires
        expected: ClaimType,
        /// The type that was supplied
        found: ClaimType,
    },

    /// A numeric claim cannot be represented as a JSON number
    #[error("claim '{key}' is not a finite number")]
    NonFiniteNumber {
        /// The claim key
        key: String,
    },
}

impl ClaimRejected {
    /// Whether the error is due to a registered claim of the wrong type
    #[must_use]
    pub fn is_invalid_registered_type(&self) -> bool {
        matches!(self, Self::InvalidRegisteredType { .. })
    }
}

pub(crate) const fn invalid_registered_type(
    claim: &'static str,
    expected: ClaimType,
    found: ClaimType,
) -> ClaimRejected {
    ClaimRejected::InvalidRegisteredType {
        claim,
        expected,
        found,
    }
}

pub(crate) fn non_finite_number(key: impl Into<String>) -> ClaimRejected {
    ClaimRejected::NonFiniteNumber { key: key.into() }
}

/// The provided name could not be matched with supported algorithms
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("'{alg}' does not match supported algorithms")]
pub struct UnknownAlgorithm {
    alg: String,
}

impl UnknownAlgorithm {
    /// The rejected algorithm name
    #[must_use]
    pub fn alg(&self) -> &str {
        &self.alg
    }
}

#[inline]
pub(crate) fn unknown_algorithm(alg: String) -> UnknownAlgorithm {
    UnknownAlgorithm { alg }
}

/// The JWT is malformed and cannot be parsed out into header, payload, and signature sections
#[derive(Clone, Copy, Debug, Error)]
#[error("malformed JWT")]
pub struct MalformedJwt {
    _p: (),
}

pub(crate) fn malformed_jwt() -> MalformedJwt {
    MalformedJwt { _p: () }
}

/// The JWT header section is malformed
#[derive(Debug, Error)]
#[error("malformed JWT header")]
pub struct MalformedJwtHeader {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn malformed_jwt_header(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> MalformedJwtHeader {
    MalformedJwtHeader {
        source: source.into(),
    }
}

/// The JWT payload section is malformed
#[derive(Debug, Error)]
#[error("malformed JWT payload")]
pub struct MalformedJwtPayload {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn malformed_jwt_payload(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> MalformedJwtPayload {
    MalformedJwtPayload {
        source: source.into(),
    }
}

/// The JWT signature section is malformed
#[derive(Debug, Error)]
#[error("malformed JWT signature")]
pub struct MalformedJwtSignature {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn malformed_jwt_signature(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> MalformedJwtSignature {
    MalformedJwtSignature {
        source: source.into(),
    }
}

/// The signature did not match
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("signature mismatch")]
pub struct SignatureMismatch {
    _p: (),
}

pub(crate) const fn signature_mismatch() -> SignatureMismatch {
    SignatureMismatch { _p: () }
}

/// The key was rejected
#[derive(Debug, Error)]
#[error("key rejected")]
pub struct KeyRejected {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn key_rejected(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> KeyRejected {
    KeyRejected {
        source: source.into(),
    }
}

/// Unexpected error (possibly a bug)
#[derive(Debug, Error)]
#[error("unexpected error")]
pub struct Unexpected {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn unexpected(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> Unexpected {
    Unexpected {
        source: source.into(),
    }
}

/// The verified token does not name the expected audience
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("invalid token audience")]
pub struct InvalidAudience {
    _p: (),
}

pub(crate) const fn invalid_audience() -> InvalidAudience {
    InvalidAudience { _p: () }
}

/// The current time lies outside of the token's `nbf`/`exp` window
///
/// Expired and not-yet-valid tokens are not distinguished.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("token time is not valid")]
pub struct TokenTimeNotValid {
    _p: (),
}

pub(crate) const fn token_time_not_valid() -> TokenTimeNotValid {
    TokenTimeNotValid { _p: () }
}

/// An error occurring while loading key material
#[derive(Debug, Error)]
pub enum KeyLoadError {
    /// The key file could not be read
    #[error("unable to read key file '{}'", .path.display())]
    Io {
        /// The path that was read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The key material was rejected
    #[error(transparent)]
    KeyRejected(#[from] KeyRejected),
}

impl KeyLoadError {
    /// The kind of I/O error, if the key file could not be read
    #[must_use]
    pub fn io_error_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            Self::KeyRejected(_) => None,
        }
    }
}

pub(crate) fn key_file_unreadable(path: impl Into<PathBuf>, source: io::Error) -> KeyLoadError {
    KeyLoadError::Io {
        path: path.into(),
        source,
    }
}

/// An error occurring while encoding and signing a JWT
#[derive(Debug, Error)]
pub enum JwtSigningError {
    /// The JWT header was malformed and could not be serialized
    #[error(transparent)]
    MalformedJwtHeader(#[from] MalformedJwtHeader),

    /// The JWT payload was malformed and could not be serialized
    #[error(transparent)]
    MalformedJwtPayload(#[from] MalformedJwtPayload),

    /// An unexpected error
    #[error(transparent)]
    Unexpected(#[from] Unexpected),
}

/// An error occurring while decoding and verifying a JWT
#[derive(Debug, Error)]
pub enum JwtVerifyError {
    /// The JWT is malformed, without a discernible header, payload, and signature
    #[error(transparent)]
    MalformedToken(#[from] MalformedJwt),

    /// The JWT header is malformed
    #[error(transparent)]
    MalformedTokenHeader(#[from] MalformedJwtHeader),

    /// The JWT payload is malformed
    #[error(transparent)]
    MalformedTokenPayload(#[from] MalformedJwtPayload),

    /// The JWT signature is malformed
    #[error(transparent)]
    MalformedTokenSignature(#[from] MalformedJwtSignature),

    /// The JWT names an algorithm that is not accepted
    #[error(transparent)]
    UnknownAlgorithm(#[from] UnknownAlgorithm),

    /// Signature is invalid
    #[error(transparent)]
    SignatureMismatch(#[from] SignatureMismatch),
}

impl JwtVerifyError {
    /// Whether the error is due to a structurally malformed token
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedToken(_)
                | Self::MalformedTokenHeader(_)
                | Self::MalformedTokenPayload(_)
                | Self::MalformedTokenSignature(_)
        )
    }

    /// Whether the error is due to an algorithm that is not accepted
    #[must_use]
    pub fn is_unknown_alg(&self) -> bool {
        matches!(self, Self::UnknownAlgorithm(_))
    }

    /// Whether the error is due to a signature mismatch
    #[must_use]
    pub fn is_signature_mismatch(&self) -> bool {
        matches!(self, Self::SignatureMismatch(_))
    }
}

/// An error occurring while producing a signed token from claims
#[derive(Debug, Error)]
pub enum SignError {
    /// A claim could not be placed into the claim set
    #[error(transparent)]
    ClaimRejected(#[from] ClaimRejected),

    /// The token could not be encoded or signed
    #[error(transparent)]
    Signing(#[from] JwtSigningError),
}

/// An error occurring while verifying a token and recovering its claims
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The token was rejected by the codec
    #[error(transparent)]
    Token(#[from] JwtVerifyError),

    /// The token audience does not include the expected audience
    #[error(transparent)]
    InvalidAudience(#[from] InvalidAudience),

    /// The token is expired or not yet valid
    #[error(transparent)]
    TimeNotValid(#[from] TokenTimeNotValid),
}

impl VerifyError {
    /// Whether the token was rejected by the codec
    #[must_use]
    pub fn is_token_error(&self) -> bool {
        matches!(self, Self::Token(_))
    }

    /// Whether the error is due to an audience mismatch
    #[must_use]
    pub fn is_invalid_audience(&self) -> bool {
        matches!(self, Self::InvalidAudience(_))
    }

    /// Whether the error is due to the token's validity window
    #[must_use]
    pub fn is_time_not_valid(&self) -> bool {
        matches!(self, Self::TimeNotValid(_))
    }
}
