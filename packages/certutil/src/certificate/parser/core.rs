//! Core certificate parsing operations

use der::{Decode, Encode};
use x509_cert::Certificate as X509Certificate;

use crate::certificate::types::ParsedCertificate;
use crate::error::{CertError, Result};

use super::details_extraction::{extract_certificate_details, extract_key_info};
use super::name_extraction::{extract_name_attributes, render_name};

/// Parse the first certificate in PEM data
///
/// # Errors
///
/// Returns `CertificateParsing` if the data holds no certificate or the
/// certificate is not valid X.509.
pub fn parse_certificate_from_pem(pem_data: &str) -> Result<ParsedCertificate> {
    let mut cursor = std::io::Cursor::new(pem_data.as_bytes());
    let cert_der = rustls_pemfile::certs(&mut cursor)
        .next()
        .ok_or_else(|| CertError::parsing("No certificate in PEM data"))?
        .map_err(|e| CertError::parsing(format!("Failed to parse PEM: {e}")))?;

    parse_certificate_from_der(cert_der.as_ref())
}

/// Parse a DER-encoded certificate
///
/// # Errors
///
/// Returns `CertificateParsing` if the bytes are not a valid certificate.
pub fn parse_certificate_from_der(der_bytes: &[u8]) -> Result<ParsedCertificate> {
    let cert = X509Certificate::from_der(der_bytes)
        .map_err(|e| CertError::parsing(format!("X.509 parsing failed: {e}")))?;
    let tbs = &cert.tbs_certificate;

    let subject = extract_name_attributes(&tbs.subject);
    let issuer = extract_name_attributes(&tbs.issuer);

    let subject_der = tbs
        .subject
        .to_der()
        .map_err(|e| CertError::parsing(format!("Failed to encode subject: {e}")))?;
    let issuer_der = tbs
        .issuer
        .to_der()
        .map_err(|e| CertError::parsing(format!("Failed to encode issuer: {e}")))?;

    let details = extract_certificate_details(&cert)?;
    let (key_algorithm, key_size) = extract_key_info(&cert);

    Ok(ParsedCertificate {
        subject_dn: render_name(&tbs.subject),
        issuer_dn: render_name(&tbs.issuer),
        subject,
        issuer,
        subject_der,
        issuer_der,
        serial_number: tbs.serial_number.as_bytes().to_vec(),
        not_before: tbs.validity.not_before.to_system_time(),
        not_after: tbs.validity.not_after.to_system_time(),
        has_basic_constraints: details.has_basic_constraints,
        is_ca: details.is_ca,
        key_usage: details.key_usage,
        extended_key_usage: details.extended_key_usage,
        san_dns_names: details.san_dns_names,
        san_ip_addresses: details.san_ip_addresses,
        key_algorithm,
        key_size,
        public_key: tbs
            .subject_public_key_info
            .subject_public_key
            .raw_bytes()
            .to_vec(),
        der: der_bytes.to_vec(),
    })
}
