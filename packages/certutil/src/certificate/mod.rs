//! X.509 certificate inspection
//!
//! Issued and CA certificates are read back with `x509-cert` so their
//! subject, issuer, validity window and extensions can be checked after
//! signing and printed by `certutil inspect`.

pub mod parser;
pub mod types;

pub use parser::{parse_certificate_from_der, parse_certificate_from_pem};
pub use types::ParsedCertificate;
