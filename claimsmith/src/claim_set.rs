//! The normalized, codec-ready set of claims carried by a token

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::{
    claim::{self, Claim, ClaimType, ClaimValue},
    clock::Timestamp,
    error,
    jwt::{Audience, AudienceRef, Audiences, Issuer, IssuerRef, Subject, SubjectRef},
};

/// Registered claims stored individually, plus an open map of extensions
///
/// Built from an ordered list of claims by [`ClaimSet::from_claims()`]. When a
/// key repeats, the last occurrence wins, except for `aud`, where repeated
/// claims accumulate in order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct ClaimSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<Issuer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<Subject>,
    #[serde(default, skip_serializing_if = "Audiences::is_empty")]
    aud: Audiences,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nbf: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iat: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jti: Option<String>,
    #[serde(flatten)]
    extensions: Map<String, Value>,
}

impl ClaimSet {
    /// Builds a claim set from an ordered sequence of claims
    ///
    /// Registered claims must carry the type their field requires: strings
    /// for `iss`, `sub`, `aud` and `jti`, times for `exp`, `nbf` and `iat`.
    /// Empty strings leave `iss`, `sub` and `jti` unset. If no `jti` results,
    /// a random UUID is assigned.
    ///
    /// # Errors
    ///
    /// Returns an error on the first claim that cannot be placed. No partial
    /// claim set is produced.
    pub fn from_claims<I>(claims: I) -> Result<Self, error::ClaimRejected>
    where
        I: IntoIterator<Item = Claim>,
    {
        let mut set = Self::default();

        for c in claims {
            set.apply(c)?;
        }

        if set.jti.is_none() {
            let id = uuid::Uuid::new_v4().to_string();
            tracing::trace!(jti = %id, "assigned generated token id");
            set.jti = Some(id);
        }

        Ok(set)
    }

    fn apply(&mut self, c: Claim) -> Result<(), error::ClaimRejected> {
        match claim::registered_name(c.key()) {
            Some(claim::ISSUER) => self.iss = non_empty(claim::ISSUER, c)?.map(Issuer::from),
            Some(claim::SUBJECT) => self.sub = non_empty(claim::SUBJECT, c)?.map(Subject::from),
            Some(claim::ID) => self.jti = non_empty(claim::ID, c)?,
            Some(claim::AUDIENCE) => {
                let aud = required_string(claim::AUDIENCE, c)?;
                self.aud.push(Audience::from(aud));
            }
            Some(claim::EXPIRES) => self.exp = Some(required_time(claim::EXPIRES, &c)?),
            Some(claim::NOT_BEFORE) => self.nbf = Some(required_time(claim::NOT_BEFORE, &c)?),
            Some(claim::ISSUED) => self.iat = Some(required_time(claim::ISSUED, &c)?),
            _ => {
                let (key, value) = c.into_parts();
                let json = extension_value(&key, value)?;
                self.extensions.insert(key, json);
            }
        }

        Ok(())
    }

    /// The `iss` claim
    #[must_use]
    pub fn issuer(&self) -> Option<&IssuerRef> {
        self.iss.as_deref()
    }

    /// The `sub` claim
    #[must_use]
    pub fn subject(&self) -> Option<&SubjectRef> {
        self.sub.as_deref()
    }

    /// The `aud` claim, in the order supplied
    pub fn audiences(&self) -> &Audiences {
        &self.aud
    }

    /// The `exp` claim
    #[must_use]
    pub fn expires(&self) -> Option<Timestamp> {
        self.exp
    }

    /// The `nbf` claim
    #[must_use]
    pub fn not_before(&self) -> Option<Timestamp> {
        self.nbf
    }

    /// The `iat` claim
    #[must_use]
    pub fn issued(&self) -> Option<Timestamp> {
        self.iat
    }

    /// The `jti` claim
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.jti.as_deref()
    }

    /// Claims outside of the registered set, keyed as supplied
    #[must_use]
    pub fn extensions(&self) -> &Map<String, Value> {
        &self.extensions
    }

    /// A single extension claim
    #[must_use]
    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }

    /// Whether `now` lies within the `nbf`/`exp` window
    ///
    /// Both bounds are inclusive. A missing bound imposes no constraint.
    #[must_use]
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        self.nbf.map_or(true, |nbf| nbf <= now) && self.exp.map_or(true, |exp| now <= exp)
    }

    /// Projects the claim set back into claims, grouped by key
    ///
    /// Registered claims are keyed by their canonical name, with one claim
    /// per audience under `aud`. Extension values come back with the closest
    /// concrete type, so numbers and times both surface as floats.
    #[must_use]
    pub fn to_claim_map(&self) -> HashMap<String, Vec<Claim>> {
        let mut map: HashMap<String, Vec<Claim>> = HashMap::new();

        let mut put = |c: Claim| map.entry(c.key().to_owned()).or_default().push(c);

        if let Some(iss) = &self.iss {
            put(Claim::string(claim::ISSUER, iss.as_str()));
        }
        if let Some(sub) = &self.sub {
            put(Claim::string(claim::SUBJECT, sub.as_str()));
        }
        for aud in self.aud.iter() {
            put(Claim::string(claim::AUDIENCE, aud.as_str()));
        }
        if let Some(exp) = self.exp {
            put(Claim::time(claim::EXPIRES, exp));
        }
        if let Some(nbf) = self.nbf {
            put(Claim::time(claim::NOT_BEFORE, nbf));
        }
        if let Some(iat) = self.iat {
            put(Claim::time(claim::ISSUED, iat));
        }
        if let Some(jti) = &self.jti {
            put(Claim::string(claim::ID, jti.as_str()));
        }

        for (k, v) in &self.extensions {
            put(Claim::any(k.as_str(), v.clone()));
        }

        map
    }
}

fn required_string(field: &'static str, c: Claim) -> Result<String, error::ClaimRejected> {
    match c.into_parts().1 {
        ClaimValue::String(s) => Ok(s),
        other => Err(error::invalid_registered_type(
            field,
            ClaimType::String,
            other.claim_type(),
        )),
    }
}

fn non_empty(field: &'static str, c: Claim) -> Result<Option<String>, error::ClaimRejected> {
    required_string(field, c).map(|s| Some(s).filter(|s| !s.is_empty()))
}

fn required_time(field: &'static str, c: &Claim) -> Result<Timestamp, error::ClaimRejected> {
    match c.value() {
        ClaimValue::Time(t) => Ok(*t),
        other => Err(error::invalid_registered_type(
            field,
            ClaimType::Time,
            other.claim_type(),
        )),
    }
}

fn extension_value(key: &str, value: ClaimValue) -> Result<Value, error::ClaimRejected> {
    let json = match value {
        ClaimValue::String(s) => Value::String(s),
        ClaimValue::Bool(b) => Value::Bool(b),
        ClaimValue::Float(n) => finite(key, n)?,
        ClaimValue::Time(t) => finite(key, t.as_unix_secs_f64())?,
        ClaimValue::Reflect(v) => v,
    };

    Ok(json)
}

fn finite(key: &str, n: f64) -> Result<Value, error::ClaimRejected> {
    Number::from_f64(n)
        .map(Value::Number)
        .ok_or_else(|| error::non_finite_number(key))
}
