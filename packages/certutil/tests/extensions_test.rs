//! Tests for the extension file parser

mod common;

use certutil::extensions::BasicConstraintsSpec;
use certutil::{CertError, ExtensionProfile};
use rcgen::{
    CertificateParams, ExtendedKeyUsagePurpose, IsCa, KeyUsagePurpose, SanType,
};

fn dns(name: &str) -> SanType {
    SanType::DnsName(name.to_string().try_into().expect("valid DNS name"))
}

fn error_line(result: certutil::Result<ExtensionProfile>) -> usize {
    match result {
        Err(CertError::ExtensionFile { line, .. }) => line,
        other => panic!("expected an extension file error, got {other:?}"),
    }
}

#[test]
fn test_default_extension_file() {
    let profile = ExtensionProfile::parse(common::DEFAULT_EXTENSIONS)
        .expect("bundled extension file should parse");

    assert_eq!(
        profile.basic_constraints,
        Some(BasicConstraintsSpec::EndEntity)
    );
    assert!(profile.authority_key_identifier);
    assert_eq!(
        profile.key_usages,
        vec![
            KeyUsagePurpose::DigitalSignature,
            KeyUsagePurpose::ContentCommitment,
            KeyUsagePurpose::KeyEncipherment,
            KeyUsagePurpose::DataEncipherment,
        ]
    );
    assert!(profile.extended_key_usages.is_empty());
    assert_eq!(
        profile.subject_alt_names,
        vec![
            dns("localhost"),
            SanType::IpAddress("127.0.0.1".parse().expect("valid IP")),
        ]
    );
    assert_eq!(
        profile.criticality_overrides,
        vec!["basicConstraints".to_string(), "keyUsage".to_string()]
    );
}

#[test]
fn test_criticality_follows_emitted_extensions() {
    let text = "\
basicConstraints = critical, CA:FALSE
keyUsage = critical, digitalSignature
extendedKeyUsage = serverAuth
subjectAltName = DNS:localhost
";
    let profile = ExtensionProfile::parse(text).expect("should parse");
    assert!(profile.criticality_overrides.is_empty());

    let text = "\
extendedKeyUsage = critical, serverAuth
subjectAltName = critical, DNS:localhost
";
    let profile = ExtensionProfile::parse(text).expect("should parse");
    assert_eq!(
        profile.criticality_overrides,
        vec!["extendedKeyUsage".to_string(), "subjectAltName".to_string()]
    );
    assert_eq!(profile.subject_alt_names, vec![dns("localhost")]);
}

#[test]
fn test_inline_subject_alt_names_and_eku() {
    let text = "\
basicConstraints = critical, CA:FALSE
extendedKeyUsage = serverAuth, clientAuth, 1.3.6.1.5.5.7.3.17
subjectAltName = DNS:localhost, DNS:dev.local, IP:::1, email:ops@example.com
";
    let profile = ExtensionProfile::parse(text).expect("should parse");

    assert_eq!(
        profile.extended_key_usages,
        vec![
            ExtendedKeyUsagePurpose::ServerAuth,
            ExtendedKeyUsagePurpose::ClientAuth,
            ExtendedKeyUsagePurpose::Other(vec![1, 3, 6, 1, 5, 5, 7, 3, 17]),
        ]
    );
    assert_eq!(profile.subject_alt_names.len(), 4);
    assert_eq!(profile.subject_alt_names[1], dns("dev.local"));
    assert_eq!(
        profile.subject_alt_names[2],
        SanType::IpAddress("::1".parse().expect("valid IP"))
    );
    assert!(!profile.authority_key_identifier);
}

#[test]
fn test_comments_and_unknown_extensions_are_skipped() {
    let text = "\
# leaf profile
; another comment
basicConstraints = CA:FALSE   # trailing comment
nsComment = \"generated\"
crlDistributionPoints = URI:http://example.com/crl
";
    let profile = ExtensionProfile::parse(text).expect("unknown extensions are skipped");
    assert_eq!(
        profile.basic_constraints,
        Some(BasicConstraintsSpec::EndEntity)
    );
    assert!(profile.subject_alt_names.is_empty());
}

#[test]
fn test_ca_with_path_length() {
    let profile = ExtensionProfile::parse("basicConstraints = critical,CA:TRUE,pathlen:1\n")
        .expect("should parse");
    assert_eq!(
        profile.basic_constraints,
        Some(BasicConstraintsSpec::Authority { path_len: Some(1) })
    );
}

#[test]
fn test_empty_file_yields_empty_profile() {
    let profile = ExtensionProfile::parse("\n# nothing here\n").expect("should parse");
    assert_eq!(profile, ExtensionProfile::default());
}

#[test]
fn test_errors_report_line_numbers() {
    assert_eq!(
        error_line(ExtensionProfile::parse(
            "basicConstraints = CA:FALSE\nsubjectAltName = @missing\n"
        )),
        2
    );
    assert_eq!(
        error_line(ExtensionProfile::parse("\n\nkeyUsage = digitalSignature, signEverything\n")),
        3
    );
    assert_eq!(
        error_line(ExtensionProfile::parse("basicConstraints = CA:MAYBE\n")),
        1
    );
    assert_eq!(
        error_line(ExtensionProfile::parse("basicConstraints = CA:FALSE,pathlen:0\n")),
        1
    );
    assert_eq!(
        error_line(ExtensionProfile::parse("keyUsage\n")),
        1
    );
    assert_eq!(
        error_line(ExtensionProfile::parse(
            "keyUsage = digitalSignature\nkeyUsage = keyEncipherment\n"
        )),
        2
    );
}

#[test]
fn test_unknown_san_type_in_section() {
    let text = "\
subjectAltName = @alt_names

[alt_names]
DNS.1 = localhost
RID.1 = 1.2.3.4
";
    assert_eq!(error_line(ExtensionProfile::parse(text)), 5);
}

#[test]
fn test_invalid_ip_address() {
    assert_eq!(
        error_line(ExtensionProfile::parse("subjectAltName = IP:300.0.0.1\n")),
        1
    );
}

#[test]
fn test_apply_replaces_extension_fields() {
    let profile = ExtensionProfile::parse(common::DEFAULT_EXTENSIONS).expect("should parse");

    let mut params = CertificateParams::default();
    params.is_ca = IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::CodeSigning];
    params.subject_alt_names = vec![dns("attacker.example")];

    profile.apply(&mut params);

    assert!(matches!(params.is_ca, IsCa::ExplicitNoCa));
    assert!(params.extended_key_usages.is_empty());
    assert_eq!(params.subject_alt_names, profile.subject_alt_names);
    assert!(params.use_authority_key_identifier_extension);
}
