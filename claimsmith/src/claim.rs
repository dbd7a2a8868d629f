//! Typed claims
//!
//! A [`Claim`] is a single key/value pair destined for a token. Claim keys
//! that name one of the IANA registered JWT claims, either by their short
//! name or by a long-form alias, are recognized case-insensitively and mapped
//! to the canonical short name by [`Claim::field()`].
//!
//! Integers are stored as floating point numbers. JSON carries a single
//! number type, so this is the form in which they come back out of a
//! verified token, and `Claim::int("n", 99)` compares equal to the decoded
//! claim.

use std::{fmt, time::SystemTime};

use serde_json::Value;

use crate::{clock::Timestamp, error};

/// The registered claim name for the JWT issuer
pub const ISSUER: &str = "iss";
/// The registered claim name for the JWT subject
pub const SUBJECT: &str = "sub";
/// The registered claim name for the JWT audience
pub const AUDIENCE: &str = "aud";
/// The registered claim name for the JWT expiry time
pub const EXPIRES: &str = "exp";
/// The registered claim name for the JWT not before time
pub const NOT_BEFORE: &str = "nbf";
/// The registered claim name for the JWT issue time
pub const ISSUED: &str = "iat";
/// The registered claim name for the JWT ID
pub const ID: &str = "jti";

/// The extension claim carrying the online flag
pub const ONLINE: &str = "onl";
/// The extension claim carrying a client fingerprint
pub const FINGERPRINT: &str = "fpt";

const REGISTERED: [(&str, &str); 7] = [
    (ISSUER, "issuer"),
    (SUBJECT, "subject"),
    (AUDIENCE, "audience"),
    (EXPIRES, "expires"),
    (NOT_BEFORE, "notbefore"),
    (ISSUED, "issued"),
    (ID, "id"),
];

/// Maps a claim key to its canonical registered claim name, if it names one
///
/// ```
/// use claimsmith::claim;
///
/// assert_eq!(claim::registered_name("Subject"), Some(claim::SUBJECT));
/// assert_eq!(claim::registered_name("NBF"), Some(claim::NOT_BEFORE));
/// assert_eq!(claim::registered_name("custom"), None);
/// ```
#[must_use]
pub fn registered_name(key: &str) -> Option<&'static str> {
    REGISTERED
        .iter()
        .find(|(short, long)| key.eq_ignore_ascii_case(short) || key.eq_ignore_ascii_case(long))
        .map(|&(short, _)| short)
}

/// The type of value carried by a claim
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum ClaimType {
    /// A UTF-8 string
    String,
    /// A boolean
    Bool,
    /// A 64-bit floating point number, also used for all integer widths
    Float,
    /// A point in time
    Time,
    /// An arbitrary JSON value, carried without further type information
    Reflect,
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Float => "float",
            Self::Time => "time",
            Self::Reflect => "reflect",
        };

        f.write_str(s)
    }
}

/// The value of a claim
#[derive(Clone, Debug, PartialEq)]
pub enum ClaimValue {
    /// A UTF-8 string
    String(String),
    /// A boolean
    Bool(bool),
    /// A number
    Float(f64),
    /// A point in time
    Time(Timestamp),
    /// An opaque JSON value
    ///
    /// Values of this kind are carried through a token as-is. Only their
    /// JSON form is preserved, so after a round trip they can be compared by
    /// display but not by the Rust type they were built from.
    Reflect(Value),
}

impl ClaimValue {
    /// The type tag for this value
    #[must_use]
    pub fn claim_type(&self) -> ClaimType {
        match self {
            Self::String(_) => ClaimType::String,
            Self::Bool(_) => ClaimType::Bool,
            Self::Float(_) => ClaimType::Float,
            Self::Time(_) => ClaimType::Time,
            Self::Reflect(_) => ClaimType::Reflect,
        }
    }
}

impl fmt::Display for ClaimValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Bool(b) => fmt::Display::fmt(b, f),
            Self::Float(n) => fmt::Display::fmt(n, f),
            Self::Time(t) => fmt::Display::fmt(&t.as_unix_secs_f64(), f),
            Self::Reflect(v) => fmt::Display::fmt(v, f),
        }
    }
}

impl From<String> for ClaimValue {
    #[inline]
    fn from(val: String) -> Self {
        Self::String(val)
    }
}

impl From<&'_ str> for ClaimValue {
    #[inline]
    fn from(val: &str) -> Self {
        Self::String(val.to_owned())
    }
}

impl From<bool> for ClaimValue {
    #[inline]
    fn from(val: bool) -> Self {
        Self::Bool(val)
    }
}

impl From<f64> for ClaimValue {
    #[inline]
    fn from(val: f64) -> Self {
        Self::Float(val)
    }
}

macro_rules! numeric_claim_values {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for ClaimValue {
                #[inline]
                fn from(val: $t) -> Self {
                    Self::Float(val as f64)
                }
            }
        )*
    };
}

numeric_claim_values!(f32, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<Timestamp> for ClaimValue {
    #[inline]
    fn from(val: Timestamp) -> Self {
        Self::Time(val)
    }
}

impl From<SystemTime> for ClaimValue {
    #[inline]
    fn from(val: SystemTime) -> Self {
        Self::Time(Timestamp::from(val))
    }
}

/// Picks the closest concrete type for a JSON value
///
/// Numbers become floats, strings and booleans keep their type, and
/// anything else (`null`, arrays and objects) is carried opaquely.
impl From<Value> for ClaimValue {
    fn from(val: Value) -> Self {
        match val {
            Value::Bool(b) => Self::Bool(b),
            Value::String(s) => Self::String(s),
            Value::Number(n) => match n.as_f64() {
                Some(f) => Self::Float(f),
                None => Self::Reflect(Value::Number(n)),
            },
            other => Self::Reflect(other),
        }
    }
}

/// A single typed claim
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct Claim {
    key: String,
    value: ClaimValue,
}

impl Claim {
    /// Constructs a claim from a key and an already typed value
    pub fn new(key: impl Into<String>, value: ClaimValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Constructs a string claim
    pub fn string(key: impl Into<String>, val: impl Into<String>) -> Self {
        Self::new(key, ClaimValue::String(val.into()))
    }

    /// Constructs a boolean claim
    pub fn bool(key: impl Into<String>, val: bool) -> Self {
        Self::new(key, ClaimValue::Bool(val))
    }

    /// Constructs a numeric claim
    pub fn float(key: impl Into<String>, val: f64) -> Self {
        Self::new(key, ClaimValue::Float(val))
    }

    /// Constructs a numeric claim from a signed integer
    ///
    /// The value is stored as a float, matching what a decoded token yields.
    pub fn int(key: impl Into<String>, val: i64) -> Self {
        Self::float(key, val as f64)
    }

    /// Constructs a numeric claim from an unsigned integer
    ///
    /// The value is stored as a float, matching what a decoded token yields.
    pub fn uint(key: impl Into<String>, val: u64) -> Self {
        Self::float(key, val as f64)
    }

    /// Constructs a time claim
    pub fn time(key: impl Into<String>, val: impl Into<Timestamp>) -> Self {
        Self::new(key, ClaimValue::Time(val.into()))
    }

    /// Constructs a claim carrying an opaque JSON value
    ///
    /// Prefer [`Claim::any()`], which keeps the concrete type for strings,
    /// booleans, numbers and times.
    pub fn reflect(key: impl Into<String>, val: impl Into<Value>) -> Self {
        Self::new(key, ClaimValue::Reflect(val.into()))
    }

    /// Constructs a claim from any value with a known claim representation
    ///
    /// ```
    /// use claimsmith::{Claim, ClaimType};
    ///
    /// assert_eq!(Claim::any("n", 99_u8), Claim::int("n", 99));
    /// assert_eq!(Claim::any("s", "foobar"), Claim::string("s", "foobar"));
    /// assert_eq!(Claim::any("v", serde_json::json!([1, 2])).claim_type(), ClaimType::Reflect);
    /// ```
    pub fn any(key: impl Into<String>, val: impl Into<ClaimValue>) -> Self {
        Self::new(key, val.into())
    }

    /// The key as supplied
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The value
    #[must_use]
    pub fn value(&self) -> &ClaimValue {
        &self.value
    }

    /// The type of the value
    #[must_use]
    pub fn claim_type(&self) -> ClaimType {
        self.value.claim_type()
    }

    /// Splits the claim into its key and value
    #[must_use]
    pub fn into_parts(self) -> (String, ClaimValue) {
        (self.key, self.value)
    }

    /// Whether the key names an IANA registered JWT claim
    #[must_use]
    pub fn is_registered(&self) -> bool {
        registered_name(&self.key).is_some()
    }

    /// The JWT field name for this claim
    ///
    /// Registered claims map to their canonical short name; all other keys
    /// are returned unchanged.
    #[must_use]
    pub fn field(&self) -> &str {
        registered_name(&self.key).unwrap_or(&self.key)
    }

    /// The string value
    ///
    /// # Errors
    ///
    /// Returns an error if the claim does not carry a string.
    pub fn as_str(&self) -> Result<&str, error::InvalidClaimType> {
        match &self.value {
            ClaimValue::String(s) => Ok(s),
            other => Err(error::invalid_claim_type(
                ClaimType::String,
                other.claim_type(),
            )),
        }
    }

    /// The boolean value
    ///
    /// # Errors
    ///
    /// Returns an error if the claim does not carry a boolean.
    pub fn as_bool(&self) -> Result<bool, error::InvalidClaimType> {
        match self.value {
            ClaimValue::Bool(b) => Ok(b),
            ref other => Err(error::invalid_claim_type(
                ClaimType::Bool,
                other.claim_type(),
            )),
        }
    }

    /// The numeric value
    ///
    /// # Errors
    ///
    /// Returns an error if the claim does not carry a number.
    pub fn as_float(&self) -> Result<f64, error::InvalidClaimType> {
        match self.value {
            ClaimValue::Float(n) => Ok(n),
            ref other => Err(error::invalid_claim_type(
                ClaimType::Float,
                other.claim_type(),
            )),
        }
    }

    /// The time value
    ///
    /// Numeric claims are read as seconds since the Unix epoch, which is how
    /// time-valued extension claims come out of a verified token.
    ///
    /// # Errors
    ///
    /// Returns an error if the claim carries neither a time nor a number.
    pub fn as_time(&self) -> Result<Timestamp, error::InvalidClaimType> {
        match self.value {
            ClaimValue::Time(t) => Ok(t),
            ClaimValue::Float(secs) => Ok(Timestamp::from_unix_secs_f64(secs)),
            ref other => Err(error::invalid_claim_type(
                ClaimType::Time,
                other.claim_type(),
            )),
        }
    }
}
