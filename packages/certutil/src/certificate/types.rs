//! Parsed certificate representation

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, SystemTime};

use sha2::{Digest, Sha256};

const SECONDS_PER_DAY: u64 = 86_400;

/// Fields read back from an X.509 certificate
#[derive(Debug, Clone)]
pub struct ParsedCertificate {
    /// Subject attributes keyed by short name (`CN`, `O`, ...)
    pub subject: HashMap<String, String>,
    /// Issuer attributes keyed by short name
    pub issuer: HashMap<String, String>,
    /// Subject in encoding order, e.g. `C=US, CN=localhost`
    pub subject_dn: String,
    /// Issuer in encoding order
    pub issuer_dn: String,
    /// DER encoding of the subject name
    pub subject_der: Vec<u8>,
    /// DER encoding of the issuer name
    pub issuer_der: Vec<u8>,
    /// Serial number content octets
    pub serial_number: Vec<u8>,
    /// Start of the validity window
    pub not_before: SystemTime,
    /// End of the validity window
    pub not_after: SystemTime,
    /// Whether a basicConstraints extension is present
    pub has_basic_constraints: bool,
    /// basicConstraints CA flag
    pub is_ca: bool,
    /// keyUsage flags by OpenSSL name
    pub key_usage: Vec<String>,
    /// extendedKeyUsage purposes by OpenSSL name, unknown ones as dotted OIDs
    pub extended_key_usage: Vec<String>,
    /// DNS subject alternative names
    pub san_dns_names: Vec<String>,
    /// IP subject alternative names
    pub san_ip_addresses: Vec<IpAddr>,
    /// Public key algorithm (`RSA`, `ECDSA`, ...)
    pub key_algorithm: String,
    /// Public key size in bits when known
    pub key_size: Option<u32>,
    /// subjectPublicKey bit string contents
    pub public_key: Vec<u8>,
    /// Full certificate DER
    pub der: Vec<u8>,
}

impl ParsedCertificate {
    /// Serial number as uppercase hex, without the DER sign octet
    pub fn serial_hex(&self) -> String {
        let start = self
            .serial_number
            .iter()
            .position(|&b| b != 0)
            .unwrap_or(self.serial_number.len().saturating_sub(1));
        hex::encode_upper(&self.serial_number[start..])
    }

    /// Length of the validity window
    pub fn validity_period(&self) -> Duration {
        self.not_after
            .duration_since(self.not_before)
            .unwrap_or(Duration::ZERO)
    }

    /// Whole days in the validity window
    pub fn validity_days(&self) -> u64 {
        self.validity_period().as_secs() / SECONDS_PER_DAY
    }

    /// Whether `now` falls inside the validity window
    pub fn is_valid_at(&self, now: SystemTime) -> bool {
        now >= self.not_before && now <= self.not_after
    }

    /// Whether the certificate is currently valid
    pub fn is_valid_now(&self) -> bool {
        self.is_valid_at(SystemTime::now())
    }

    /// Whether `other` is the issuer of this certificate by name
    ///
    /// Names match when their encodings are identical or, failing that, when
    /// they render to the same attribute sequence.
    pub fn is_issued_by(&self, other: &ParsedCertificate) -> bool {
        self.issuer_der == other.subject_der || self.issuer_dn == other.subject_dn
    }

    /// Whether subject and issuer are the same name
    pub fn is_self_issued(&self) -> bool {
        self.subject_der == self.issuer_der
    }

    /// SHA-256 fingerprint as colon-separated uppercase hex
    pub fn fingerprint_sha256(&self) -> String {
        Sha256::digest(&self.der)
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(":")
    }
}
