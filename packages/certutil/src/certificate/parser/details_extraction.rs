//! Extension, validity and key information extraction
//!
//! Covers `BasicConstraints`, `KeyUsage`, `ExtendedKeyUsage` and Subject
//! Alternative Names, plus the public key algorithm and size.

use std::net::IpAddr;

use const_oid::AssociatedOid;
use const_oid::db::rfc5912::{ID_EC_PUBLIC_KEY, RSA_ENCRYPTION};
use const_oid::db::rfc8410::{ID_ED_25519, ID_ED_448, ID_X_25519, ID_X_448};
use der::Decode;
use rsa::RsaPublicKey;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::traits::PublicKeyParts;
use x509_cert::Certificate as X509Certificate;
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::pkix::{BasicConstraints, ExtendedKeyUsage, KeyUsage, SubjectAltName};

use crate::error::{CertError, Result};

/// Extension-derived fields of a certificate
#[derive(Debug, Default)]
pub struct CertificateDetails {
    /// basicConstraints present
    pub has_basic_constraints: bool,
    /// basicConstraints CA flag
    pub is_ca: bool,
    /// keyUsage flag names
    pub key_usage: Vec<String>,
    /// extendedKeyUsage purpose names
    pub extended_key_usage: Vec<String>,
    /// DNS SAN entries
    pub san_dns_names: Vec<String>,
    /// IP SAN entries
    pub san_ip_addresses: Vec<IpAddr>,
}

/// Decode the extensions this crate reports on
///
/// # Errors
///
/// Returns `CertificateParsing` if a recognised extension is malformed.
pub fn extract_certificate_details(cert: &X509Certificate) -> Result<CertificateDetails> {
    let mut details = CertificateDetails::default();
    let Some(extensions) = &cert.tbs_certificate.extensions else {
        return Ok(details);
    };

    for ext in extensions {
        let value = ext.extn_value.as_bytes();

        if ext.extn_id == BasicConstraints::OID {
            let bc = BasicConstraints::from_der(value)
                .map_err(|e| CertError::parsing(format!("Invalid basicConstraints: {e}")))?;
            details.has_basic_constraints = true;
            details.is_ca = bc.ca;
        } else if ext.extn_id == KeyUsage::OID {
            let ku = KeyUsage::from_der(value)
                .map_err(|e| CertError::parsing(format!("Invalid keyUsage: {e}")))?;
            details.key_usage = key_usage_names(&ku);
        } else if ext.extn_id == ExtendedKeyUsage::OID {
            let eku = ExtendedKeyUsage::from_der(value)
                .map_err(|e| CertError::parsing(format!("Invalid extendedKeyUsage: {e}")))?;
            details.extended_key_usage = eku
                .0
                .iter()
                .map(|oid| extended_key_usage_name(&oid.to_string()))
                .collect();
        } else if ext.extn_id == SubjectAltName::OID {
            let san = SubjectAltName::from_der(value)
                .map_err(|e| CertError::parsing(format!("Invalid subjectAltName: {e}")))?;
            for name in &san.0 {
                match name {
                    GeneralName::DnsName(dns) => details.san_dns_names.push(dns.to_string()),
                    GeneralName::IpAddress(ip) => {
                        if let Some(addr) = ip_from_octets(ip.as_bytes()) {
                            details.san_ip_addresses.push(addr);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(details)
}

fn key_usage_names(ku: &KeyUsage) -> Vec<String> {
    let flags = [
        (ku.digital_signature(), "digitalSignature"),
        (ku.non_repudiation(), "nonRepudiation"),
        (ku.key_encipherment(), "keyEncipherment"),
        (ku.data_encipherment(), "dataEncipherment"),
        (ku.key_agreement(), "keyAgreement"),
        (ku.key_cert_sign(), "keyCertSign"),
        (ku.crl_sign(), "cRLSign"),
        (ku.encipher_only(), "encipherOnly"),
        (ku.decipher_only(), "decipherOnly"),
    ];
    flags
        .into_iter()
        .filter(|(set, _)| *set)
        .map(|(_, name)| name.to_string())
        .collect()
}

fn extended_key_usage_name(oid: &str) -> String {
    match oid {
        "1.3.6.1.5.5.7.3.1" => "serverAuth".to_string(),
        "1.3.6.1.5.5.7.3.2" => "clientAuth".to_string(),
        "1.3.6.1.5.5.7.3.3" => "codeSigning".to_string(),
        "1.3.6.1.5.5.7.3.4" => "emailProtection".to_string(),
        "1.3.6.1.5.5.7.3.8" => "timeStamping".to_string(),
        "1.3.6.1.5.5.7.3.9" => "OCSPSigning".to_string(),
        "2.5.29.37.0" => "anyExtendedKeyUsage".to_string(),
        other => other.to_string(),
    }
}

fn ip_from_octets(bytes: &[u8]) -> Option<IpAddr> {
    match bytes.len() {
        4 => <[u8; 4]>::try_from(bytes).ok().map(IpAddr::from),
        16 => <[u8; 16]>::try_from(bytes).ok().map(IpAddr::from),
        _ => None,
    }
}

/// Key algorithm name and size in bits
pub fn extract_key_info(cert: &X509Certificate) -> (String, Option<u32>) {
    let spki = &cert.tbs_certificate.subject_public_key_info;
    let oid = spki.algorithm.oid;

    if oid == RSA_ENCRYPTION {
        let size = match RsaPublicKey::from_pkcs1_der(spki.subject_public_key.raw_bytes()) {
            Ok(key) => u32::try_from(key.size() * 8).ok(),
            Err(e) => {
                tracing::warn!("Failed to decode RSA public key: {}", e);
                None
            }
        };
        return ("RSA".to_string(), size);
    }

    let (name, size) = if oid == ID_EC_PUBLIC_KEY {
        ("ECDSA", None)
    } else if oid == ID_ED_25519 {
        ("Ed25519", Some(256))
    } else if oid == ID_ED_448 {
        ("Ed448", Some(448))
    } else if oid == ID_X_25519 {
        ("X25519", Some(256))
    } else if oid == ID_X_448 {
        ("X448", Some(448))
    } else {
        ("Unknown", None)
    };
    (name.to_string(), size)
}
