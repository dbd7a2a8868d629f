//! The JSON Web Algorithms (JWA) accepted for signing and verification
//!
//! Only the RSASSA-PKCS1-v1_5 family from [RFC7518][] is supported.
//!
//! [RFC7518]: https://tools.ietf.org/html/rfc7518

pub mod rsa;

mod algorithm;

pub use algorithm::Algorithm;
