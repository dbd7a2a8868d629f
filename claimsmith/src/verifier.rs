use std::{collections::HashMap, path::Path};

use crate::{
    claim::{self, Claim},
    clock::{Clock, System, Timestamp},
    error,
    fs::{FileSystem, OsFileSystem},
    jwa::rsa::PublicKey,
    jwt::{self, Audience, AudienceRef},
};

/// Verifies tokens and recovers their claims
pub trait Verifier {
    /// Verifies a token in compact serialization
    ///
    /// # Errors
    ///
    /// Returns an error if the token is malformed or improperly signed, does
    /// not name the expected audience, or is outside of its validity window.
    fn verify(&self, token: &[u8]) -> Result<VerifyResult, error::VerifyError>;
}

impl<T: Verifier + ?Sized> Verifier for &'_ T {
    #[inline]
    fn verify(&self, token: &[u8]) -> Result<VerifyResult, error::VerifyError> {
        T::verify(&**self, token)
    }
}

impl<T: Verifier + ?Sized> Verifier for Box<T> {
    #[inline]
    fn verify(&self, token: &[u8]) -> Result<VerifyResult, error::VerifyError> {
        T::verify(&**self, token)
    }
}

/// Verifies RSA-signed tokens intended for a single audience
///
/// The current time is read from `C`, which defaults to the system clock.
#[derive(Clone, Debug)]
#[must_use]
pub struct RsaVerifier<C = System> {
    public_key: PublicKey,
    audience: Audience,
    clock: C,
}

impl RsaVerifier {
    /// Constructs a verifier which accepts tokens for `audience`
    pub fn new(public_key: PublicKey, audience: impl Into<Audience>) -> Self {
        Self {
            public_key,
            audience: audience.into(),
            clock: System,
        }
    }

    /// Reads the RSA public key from an X.509 certificate file
    ///
    /// # Errors
    ///
    /// Returns an error if the certificate cannot be read or does not carry
    /// an RSA public key.
    pub fn from_file(
        audience: impl Into<Audience>,
        path: impl AsRef<Path>,
    ) -> Result<Self, error::KeyLoadError> {
        Self::from_file_with(&OsFileSystem, audience, path)
    }

    /// Reads the RSA public key from an X.509 certificate file through `fs`
    ///
    /// # Errors
    ///
    /// Returns an error if the certificate cannot be read or does not carry
    /// an RSA public key.
    pub fn from_file_with<F: FileSystem>(
        fs: &F,
        audience: impl Into<Audience>,
        path: impl AsRef<Path>,
    ) -> Result<Self, error::KeyLoadError> {
        let public_key = PublicKey::from_certificate_file_with(fs, path)?;
        Ok(Self::new(public_key, audience))
    }
}

impl<C> RsaVerifier<C> {
    /// Replaces the clock used to check the validity window
    pub fn with_clock<D: Clock>(self, clock: D) -> RsaVerifier<D> {
        RsaVerifier {
            public_key: self.public_key,
            audience: self.audience,
            clock,
        }
    }

    /// The audience tokens must name
    pub fn audience(&self) -> &AudienceRef {
        &self.audience
    }

    /// The public key used to check signatures
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

impl<C: Clock> Verifier for RsaVerifier<C> {
    fn verify(&self, token: &[u8]) -> Result<VerifyResult, error::VerifyError> {
        let now = self.clock.now();

        let claims = jwt::verify(token, &self.public_key)?;

        let audience = claims
            .audiences()
            .find(&self.audience)
            .ok_or_else(error::invalid_audience)?;

        if !claims.is_valid_at(now) {
            return Err(error::token_time_not_valid().into());
        }

        let is_online = claims
            .extension(claim::ONLINE)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);

        let fingerprint = claims
            .extension(claim::FINGERPRINT)
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_owned();

        let result = VerifyResult {
            id: claims.id().unwrap_or_default().to_owned(),
            subject: claims
                .subject()
                .map(|s| s.as_str().to_owned())
                .unwrap_or_default(),
            audience: audience.as_str().to_owned(),
            audiences: claims
                .audiences()
                .iter()
                .map(|a| a.as_str().to_owned())
                .collect(),
            fingerprint,
            is_online,
            not_before: claims.not_before(),
            expires: claims.expires(),
            claims: claims.to_claim_map(),
        };

        tracing::trace!(jti = %result.id, sub = %result.subject, "verified token");

        Ok(result)
    }
}

/// The decoded contents of a verified token
///
/// Only produced once the signature, audience and validity window have all
/// been checked. Absent string fields are empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VerifyResult {
    id: String,
    subject: String,
    audience: String,
    audiences: Vec<String>,
    fingerprint: String,
    is_online: bool,
    not_before: Option<Timestamp>,
    expires: Option<Timestamp>,
    claims: HashMap<String, Vec<Claim>>,
}

impl VerifyResult {
    /// The token ID (`jti`)
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The subject (`sub`)
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The audience that matched the verifier's configured audience
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Every audience named by the token, in order
    #[must_use]
    pub fn audiences(&self) -> &[String] {
        &self.audiences
    }

    /// The client fingerprint (`fpt`)
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// The online flag (`onl`)
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.is_online
    }

    /// The start of the validity window (`nbf`)
    #[must_use]
    pub fn not_before(&self) -> Option<Timestamp> {
        self.not_before
    }

    /// The end of the validity window (`exp`)
    #[must_use]
    pub fn expires(&self) -> Option<Timestamp> {
        self.expires
    }

    /// All claims carried by the token, grouped by key
    ///
    /// Registered claims use their canonical short names.
    #[must_use]
    pub fn claims(&self) -> &HashMap<String, Vec<Claim>> {
        &self.claims
    }

    /// The claims carried under `key`
    #[must_use]
    pub fn claim(&self, key: &str) -> &[Claim] {
        self.claims.get(key).map_or(&[], Vec::as_slice)
    }

    /// Extracts the claim map
    #[must_use]
    pub fn into_claims(self) -> HashMap<String, Vec<Claim>> {
        self.claims
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use color_eyre::Result;
    use tracing_test::traced_test;

    use super::*;
    use crate::{
        clock::TestClock, jwa, signer::Signer, test, ClaimType, RsaSigner,
    };

    const HOUR: Duration = Duration::from_secs(3600);
    const MINUTE: Duration = Duration::from_secs(60);

    fn window(now: Timestamp) -> Vec<Claim> {
        vec![
            Claim::time("nbf", now.saturating_sub(MINUTE)),
            Claim::time("exp", now.saturating_add(HOUR)),
        ]
    }

    fn with_window(now: Timestamp, claims: impl IntoIterator<Item = Claim>) -> Vec<Claim> {
        claims.into_iter().chain(window(now)).collect()
    }

    #[test]
    #[traced_test]
    fn verifies_session_token() -> Result<()> {
        let now = Timestamp::now();
        let token = crate::sign(
            &test::signer(),
            "subject",
            "audience",
            true,
            now.saturating_sub(MINUTE),
            now.saturating_add(HOUR),
        )?;

        let result = test::verifier().verify(token.as_bytes())?;

        assert_eq!(result.subject(), "subject");
        assert_eq!(result.audience(), "audience");
        assert_eq!(result.audiences(), ["audience"]);
        assert!(!result.id().is_empty());
        assert!(result.is_online());
        assert_eq!(result.fingerprint(), "");
        assert!(logs_contain("verified token"));
        Ok(())
    }

    #[test]
    fn each_algorithm_verifies() -> Result<()> {
        let now = Timestamp::now();
        for alg in [
            jwa::Algorithm::RS256,
            jwa::Algorithm::RS384,
            jwa::Algorithm::RS512,
        ] {
            let signer = test::signer().with_algorithm(alg);
            let token = crate::sign(
                &signer,
                "subject",
                "audience",
                false,
                now.saturating_sub(MINUTE),
                now.saturating_add(HOUR),
            )?;

            let result = test::verifier().verify(token.as_bytes())?;
            assert_eq!(result.subject(), "subject");
            assert!(!result.is_online());
        }
        Ok(())
    }

    #[test]
    fn fingerprint_round_trips() -> Result<()> {
        let now = Timestamp::now();
        let token = crate::sign_fingerprint(
            &test::signer(),
            "subject",
            "audience",
            "fingerprint",
            false,
            now.saturating_sub(MINUTE),
            now.saturating_add(HOUR),
        )?;

        let result = test::verifier().verify(token.as_bytes())?;
        assert_eq!(result.fingerprint(), "fingerprint");
        assert_eq!(result.claim("fpt"), [Claim::string("fpt", "fingerprint")]);
        Ok(())
    }

    #[test]
    fn ids_are_unique_per_token() -> Result<()> {
        let now = Timestamp::now();
        let claims = with_window(
            now,
            [
                Claim::string("sub", "subject"),
                Claim::string("aud", "audience"),
            ],
        );

        let a = test::verifier().verify(test::signer().sign_claims(claims.clone())?.as_bytes())?;
        let b = test::verifier().verify(test::signer().sign_claims(claims)?.as_bytes())?;

        assert_ne!(a.id(), b.id());
        assert_eq!(a.subject(), b.subject());
        assert_eq!(a.audiences(), b.audiences());
        assert_eq!(a.not_before(), b.not_before());
        assert_eq!(a.expires(), b.expires());
        Ok(())
    }

    #[test]
    fn supplied_id_is_kept() -> Result<()> {
        let now = Timestamp::now();
        let claims = with_window(
            now,
            [Claim::string("aud", "audience"), Claim::string("id", "token-1")],
        );

        let result = test::verifier().verify(test::signer().sign_claims(claims)?.as_bytes())?;
        assert_eq!(result.id(), "token-1");
        Ok(())
    }

    #[test]
    fn last_subject_wins() -> Result<()> {
        let now = Timestamp::now();
        let claims = with_window(
            now,
            [
                Claim::string("sub", "a"),
                Claim::string("aud", "audience"),
                Claim::string("sub", "b"),
            ],
        );

        let result = test::verifier().verify(test::signer().sign_claims(claims)?.as_bytes())?;
        assert_eq!(result.subject(), "b");
        assert_eq!(result.claim("sub"), [Claim::string("sub", "b")]);
        Ok(())
    }

    #[test]
    fn any_listed_audience_matches() -> Result<()> {
        let now = Timestamp::now();
        let claims = with_window(
            now,
            [
                Claim::string("aud", "audience2"),
                Claim::string("aud", "audience"),
                Claim::string("aud", "audience3"),
            ],
        );

        let result = test::verifier().verify(test::signer().sign_claims(claims)?.as_bytes())?;
        assert_eq!(result.audience(), "audience");
        assert_eq!(result.audiences(), ["audience2", "audience", "audience3"]);
        assert_eq!(
            result.claim("aud"),
            [
                Claim::string("aud", "audience2"),
                Claim::string("aud", "audience"),
                Claim::string("aud", "audience3"),
            ]
        );
        Ok(())
    }

    #[test]
    fn audience_mismatch_is_rejected() -> Result<()> {
        let now = Timestamp::now();
        let token = test::signer().sign_claims(with_window(now, [Claim::string("aud", "svcA")]))?;

        let verifier = RsaVerifier::new(test::public_key(), "svcB");
        let err = verifier.verify(token.as_bytes()).unwrap_err();
        assert!(err.is_invalid_audience());

        let verifier = RsaVerifier::new(test::public_key(), "SVCA");
        assert!(verifier.verify(token.as_bytes()).unwrap_err().is_invalid_audience());
        Ok(())
    }

    #[test]
    fn empty_audience_must_be_named() -> Result<()> {
        let now = Timestamp::now();
        let verifier = RsaVerifier::new(test::public_key(), "");

        let without = test::signer().sign_claims(window(now))?;
        assert!(verifier.verify(without.as_bytes()).unwrap_err().is_invalid_audience());

        let with_empty = test::signer().sign_claims(with_window(now, [Claim::string("aud", "")]))?;
        let result = verifier.verify(with_empty.as_bytes())?;
        assert_eq!(result.audience(), "");
        Ok(())
    }

    #[test]
    fn not_yet_valid_is_rejected() -> Result<()> {
        let now = Timestamp::now();
        let token = test::signer().sign_claims(vec![
            Claim::string("aud", "audience"),
            Claim::time("nbf", now.saturating_add(HOUR)),
            Claim::time("exp", now.saturating_add(HOUR * 2)),
        ])?;

        let err = test::verifier().verify(token.as_bytes()).unwrap_err();
        assert!(err.is_time_not_valid());
        Ok(())
    }

    #[test]
    fn expired_is_rejected() -> Result<()> {
        let now = Timestamp::now();
        let token = test::signer().sign_claims(vec![
            Claim::string("aud", "audience"),
            Claim::time("nbf", now.saturating_sub(HOUR)),
            Claim::time("exp", now.saturating_sub(MINUTE)),
        ])?;

        let err = test::verifier().verify(token.as_bytes()).unwrap_err();
        assert!(err.is_time_not_valid());
        Ok(())
    }

    #[test]
    fn inverted_window_is_rejected() -> Result<()> {
        let now = Timestamp::now();
        let token = test::signer().sign_claims(vec![
            Claim::string("aud", "audience"),
            Claim::time("nbf", now.saturating_add(MINUTE)),
            Claim::time("exp", now.saturating_sub(MINUTE)),
        ])?;

        let err = test::verifier().verify(token.as_bytes()).unwrap_err();
        assert!(err.is_time_not_valid());
        Ok(())
    }

    #[test]
    fn missing_window_is_unbounded() -> Result<()> {
        let token = test::signer().sign_claims(vec![Claim::string("aud", "audience")])?;

        let result = test::verifier().verify(token.as_bytes())?;
        assert_eq!(result.not_before(), None);
        assert_eq!(result.expires(), None);
        Ok(())
    }

    #[test]
    fn window_follows_injected_clock() -> Result<()> {
        let nbf = Timestamp::from_unix_secs(1_000);
        let exp = Timestamp::from_unix_secs(2_000);
        let token = test::signer().sign_claims(vec![
            Claim::string("aud", "audience"),
            Claim::time("nbf", nbf),
            Claim::time("exp", exp),
        ])?;

        let mut clock = TestClock::new(Timestamp::from_unix_secs(999));
        let early = test::verifier().with_clock(clock);
        assert!(early.verify(token.as_bytes()).unwrap_err().is_time_not_valid());

        clock.set(nbf);
        let result = test::verifier().with_clock(clock).verify(token.as_bytes())?;
        assert_eq!(result.not_before(), Some(nbf));
        assert_eq!(result.expires(), Some(exp));

        clock.advance(Duration::from_secs(1_001));
        let late = test::verifier().with_clock(clock);
        assert!(late.verify(token.as_bytes()).unwrap_err().is_time_not_valid());
        Ok(())
    }

    #[test]
    fn audience_is_checked_before_time() -> Result<()> {
        let now = Timestamp::now();
        let token = test::signer().sign_claims(vec![
            Claim::string("aud", "elsewhere"),
            Claim::time("exp", now.saturating_sub(HOUR)),
        ])?;

        let err = test::verifier().verify(token.as_bytes()).unwrap_err();
        assert!(err.is_invalid_audience());
        Ok(())
    }

    #[test]
    fn custom_claims_round_trip() -> Result<()> {
        let now = Timestamp::now();
        let seen = SystemTime::now();
        let claims = with_window(
            now,
            [
                Claim::string("aud", "audience"),
                Claim::any("custom", 99),
                Claim::any("name", "foobar"),
                Claim::any("seen", seen),
                Claim::any("flag", true),
                Claim::reflect("roles", serde_json::json!(["admin", "ops"])),
            ],
        );

        let result = test::verifier().verify(test::signer().sign_claims(claims)?.as_bytes())?;

        assert_eq!(result.claim("custom"), [Claim::int("custom", 99)]);
        assert_eq!(result.claim("name"), [Claim::string("name", "foobar")]);
        assert_eq!(result.claim("flag"), [Claim::bool("flag", true)]);

        let roles = &result.claim("roles")[0];
        assert_eq!(roles.claim_type(), ClaimType::Reflect);
        assert_eq!(roles.value().to_string(), r#"["admin","ops"]"#);

        let seen_back = result.claim("seen")[0].as_time()?;
        assert!(seen_back.abs_diff(Timestamp::from(seen)) < Duration::from_secs(1));
        Ok(())
    }

    #[test]
    fn registered_claims_are_mapped() -> Result<()> {
        let now = Timestamp::now();
        let issued = now.saturating_sub(Duration::from_millis(1500));
        let claims = with_window(
            now,
            [
                Claim::string("Subject", "subject"),
                Claim::string("audience", "audience"),
                Claim::time("issued", issued),
            ],
        );

        let signer = test::signer().with_issuer("authority");
        let result = test::verifier().verify(signer.sign_claims(claims)?.as_bytes())?;

        assert_eq!(result.claim("iss"), [Claim::string("iss", "authority")]);
        assert_eq!(result.claim("sub"), [Claim::string("sub", "subject")]);
        assert_eq!(result.claim("jti").len(), 1);
        assert!(result.claim("Subject").is_empty());

        let iat = result.claim("iat")[0].as_time()?;
        assert!(iat.abs_diff(issued) < Duration::from_millis(1));

        let nbf = result.claim("nbf")[0].as_time()?;
        assert_eq!(Some(nbf), result.not_before());
        Ok(())
    }

    #[test]
    fn online_flag_of_wrong_type_reads_false() -> Result<()> {
        let now = Timestamp::now();
        let claims = with_window(
            now,
            [
                Claim::string("aud", "audience"),
                Claim::string("onl", "yes"),
                Claim::int("fpt", 7),
            ],
        );

        let result = test::verifier().verify(test::signer().sign_claims(claims)?.as_bytes())?;
        assert!(!result.is_online());
        assert_eq!(result.fingerprint(), "");
        Ok(())
    }

    #[test]
    fn codec_errors_surface() {
        let verifier = test::verifier();

        for garbage in [
            "garbage",
            "Z2FyYmFnZQ==.Z2FyYmFnZQ==.Z2FyYmFnZQ==",
            "e30=.e30=.e30=",
            concat!(
                "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.",
                "eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IkpvaG4gRG9lIiwiaWF0IjoxNTE2MjM5MDIyfQ.",
                "SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c"
            ),
        ] {
            let err = verifier.verify(garbage.as_bytes()).unwrap_err();
            assert!(err.is_token_error(), "{garbage}: {err}");
        }
    }

    #[test]
    fn loads_from_file_system() -> Result<()> {
        let verifier = RsaVerifier::from_file_with(&test::test_fs(), "audience", "cert.pem")?;
        assert_eq!(verifier.audience().as_str(), "audience");

        let err = RsaVerifier::from_file_with(&test::test_fs(), "audience", "nope.pem").unwrap_err();
        assert_eq!(err.io_error_kind(), Some(std::io::ErrorKind::NotFound));
        Ok(())
    }

    #[test]
    fn file_signer_and_verifier_interoperate() -> Result<()> {
        let dir = env!("CARGO_MANIFEST_DIR");
        let signer = RsaSigner::from_file(format!("{dir}/data/rsa/key.pem"))?;
        let verifier = RsaVerifier::from_file("audience", format!("{dir}/data/rsa/cert.pem"))?;

        let now = Timestamp::now();
        let token = signer.sign_claims(with_window(now, [Claim::string("aud", "audience")]))?;
        verifier.verify(token.as_bytes())?;
        Ok(())
    }

    #[test]
    fn boxed_verifier_is_usable() -> Result<()> {
        let now = Timestamp::now();
        let verifier: Box<dyn Verifier> = Box::new(test::verifier());
        let token = test::signer().sign_claims(with_window(now, [Claim::string("aud", "audience")]))?;
        verifier.verify(token.as_bytes())?;
        Ok(())
    }

    #[test]
    fn zero_result_is_empty() {
        let result = VerifyResult::default();
        assert_eq!(result.id(), "");
        assert!(!result.is_online());
        assert!(result.claims().is_empty());
        assert!(result.claim("sub").is_empty());
    }
}
