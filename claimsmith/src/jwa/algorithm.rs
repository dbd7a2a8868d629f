use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error;

/// RSA public/private key signing algorithms
///
/// Any other name, including the HMAC and elliptic curve families, is
/// rejected with [`UnknownAlgorithm`][error::UnknownAlgorithm].
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[allow(clippy::upper_case_acronyms)]
pub enum Algorithm {
    /// RSA PKCS#1 v1.5 using SHA-256
    #[default]
    RS256,
    /// RSA PKCS#1 v1.5 using SHA-384
    RS384,
    /// RSA PKCS#1 v1.5 using SHA-512
    RS512,
}

impl Algorithm {
    /// The registered name of the algorithm, as carried in the `alg` header
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
        }
    }

    pub(crate) fn verification_params(self) -> &'static ring::signature::RsaParameters {
        match self {
            Self::RS256 => &ring::signature::RSA_PKCS1_2048_8192_SHA256,
            Self::RS384 => &ring::signature::RSA_PKCS1_2048_8192_SHA384,
            Self::RS512 => &ring::signature::RSA_PKCS1_2048_8192_SHA512,
        }
    }

    pub(crate) fn signing_params(self) -> &'static dyn ring::signature::RsaEncoding {
        match self {
            Self::RS256 => &ring::signature::RSA_PKCS1_SHA256,
            Self::RS384 => &ring::signature::RSA_PKCS1_SHA384,
            Self::RS512 => &ring::signature::RSA_PKCS1_SHA512,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<&'_ str> for Algorithm {
    type Error = error::UnknownAlgorithm;

    #[inline]
    fn try_from(value: &'_ str) -> Result<Self, Self::Error> {
        match value {
            "RS256" => Ok(Self::RS256),
            "RS384" => Ok(Self::RS384),
            "RS512" => Ok(Self::RS512),
            _ => Err(error::unknown_algorithm(value.to_string())),
        }
    }
}

impl TryFrom<String> for Algorithm {
    type Error = error::UnknownAlgorithm;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = error::UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}
