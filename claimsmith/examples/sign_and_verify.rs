use std::{path::PathBuf, time::Duration};

use clap::Parser;
use claimsmith::{jwt, Claim, RsaSigner, RsaVerifier, Signer, Timestamp, Verifier};

#[derive(Debug, Parser)]
struct Opts {
    /// The PKCS#1 PEM file holding the RSA private key
    #[arg(short, long, env, default_value = "data/rsa/key.pem")]
    key: PathBuf,

    /// The PEM file holding the X.509 certificate for the key
    #[arg(short, long, env, default_value = "data/rsa/cert.pem")]
    cert: PathBuf,

    /// The audience to issue the token for
    #[arg(short, long, env, default_value = "my_api")]
    audience: jwt::Audience,

    /// The subject of the token
    #[arg(short, long, env, default_value = "example-user")]
    subject: String,

    /// The signing algorithm
    #[arg(long, env, default_value = "RS256")]
    alg: claimsmith::jwa::Algorithm,

    /// How long the token remains valid, in seconds
    #[arg(long, env, default_value_t = 300)]
    lifetime: u64,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();

    let signer = RsaSigner::from_file(&opts.key)?
        .with_issuer("claimsmith-example")
        .with_algorithm(opts.alg);
    let verifier = RsaVerifier::from_file(opts.audience.clone(), &opts.cert)?;

    let now = Timestamp::now();
    let token = signer.sign_claims(vec![
        Claim::string("subject", opts.subject),
        Claim::string("audience", opts.audience.as_str()),
        Claim::time("nbf", now),
        Claim::time("exp", now.saturating_add(Duration::from_secs(opts.lifetime))),
        Claim::any("onl", true),
        Claim::any("roles", serde_json::json!(["reader"])),
    ])?;

    println!("Token: {:#}", token);

    let result = verifier.verify(token.as_bytes())?;

    println!("Subject:  {}", result.subject());
    println!("Audience: {}", result.audience());
    println!("ID:       {}", result.id());
    println!("Online:   {}", result.is_online());

    let mut keys: Vec<_> = result.claims().keys().collect();
    keys.sort();
    for key in keys {
        for claim in result.claim(key) {
            println!("  {} = {}", claim.key(), claim.value());
        }
    }

    Ok(())
}
