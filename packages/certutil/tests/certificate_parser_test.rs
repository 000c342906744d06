//! Tests for reading certificates back

use std::time::Duration;

use certutil::{CertError, parse_certificate_from_der, parse_certificate_from_pem};
use rcgen::{
    CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose, IsCa, KeyPair,
    KeyUsagePurpose, SanType,
};

fn sample_certificate() -> rcgen::Certificate {
    let mut params = CertificateParams::default();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::OrganizationName, "Example Brooklyn Company");
    dn.push(DnType::CommonName, "parser.test");
    params.distinguished_name = dn;
    params.is_ca = IsCa::ExplicitNoCa;
    params.key_usages = vec![KeyUsagePurpose::DigitalSignature];
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
    params.subject_alt_names = vec![
        SanType::DnsName("parser.test".to_string().try_into().expect("DNS")),
        SanType::IpAddress("10.0.0.1".parse().expect("IP")),
    ];
    params.serial_number = Some(rcgen::SerialNumber::from(vec![0x80, 0x01]));

    let key = KeyPair::generate().expect("EC key");
    params.self_signed(&key).expect("self-signed")
}

#[test]
fn test_parse_extensions_and_names() {
    let cert = sample_certificate();
    let parsed = parse_certificate_from_pem(&cert.pem()).expect("should parse");

    assert_eq!(parsed.subject_dn, "O=Example Brooklyn Company, CN=parser.test");
    assert_eq!(parsed.subject.get("CN").map(String::as_str), Some("parser.test"));
    assert!(parsed.is_self_issued());
    assert!(parsed.has_basic_constraints);
    assert!(!parsed.is_ca);
    assert_eq!(parsed.key_usage, vec!["digitalSignature"]);
    assert_eq!(parsed.extended_key_usage, vec!["serverAuth"]);
    assert_eq!(parsed.san_dns_names, vec!["parser.test".to_string()]);
    assert_eq!(parsed.san_ip_addresses.len(), 1);
    assert_eq!(parsed.key_algorithm, "ECDSA");
    assert_eq!(parsed.serial_hex(), "8001");
    assert_eq!(parsed.der, cert.der().to_vec());
}

#[test]
fn test_pem_and_der_agree() {
    let cert = sample_certificate();
    let from_pem = parse_certificate_from_pem(&cert.pem()).expect("pem");
    let from_der = parse_certificate_from_der(cert.der()).expect("der");

    assert_eq!(from_pem.fingerprint_sha256(), from_der.fingerprint_sha256());
    assert_eq!(from_pem.fingerprint_sha256().len(), 32 * 3 - 1);
    assert!(from_pem.validity_period() > Duration::ZERO);
}

#[test]
fn test_parse_rejects_non_certificates() {
    assert!(matches!(
        parse_certificate_from_pem("no pem here"),
        Err(CertError::CertificateParsing(_))
    ));
    assert!(matches!(
        parse_certificate_from_der(&[0x30, 0x03, 0x02, 0x01, 0x01]),
        Err(CertError::CertificateParsing(_))
    ));
}
