//! Tests for subject rendering and `-subj` parsing

use certutil::{CertError, Subject};

const LEAF_SUBJ: &str = "/C=US/ST=New York/L=Brooklyn/O=Example Brooklyn Company/CN=localhost";

#[test]
fn test_default_subject_is_the_leaf_subject() {
    let subject = Subject::default();

    assert_eq!(subject.to_string(), LEAF_SUBJ);
    assert_eq!(
        subject.one_line(),
        "C=US, ST=New York, L=Brooklyn, O=Example Brooklyn Company, CN=localhost"
    );
    assert_eq!(
        subject.attributes().first(),
        Some(&("C", "US")),
        "country is encoded first"
    );
    assert_eq!(subject.attributes().last(), Some(&("CN", "localhost")));
}

#[test]
fn test_parse_subj_notation() {
    let parsed: Subject = LEAF_SUBJ.parse().expect("should parse");
    assert_eq!(parsed, Subject::default());
}

#[test]
fn test_escaped_slash_round_trips() {
    let subject = Subject {
        organizational_unit: Some("R/D".to_string()),
        ..Subject::common_name("build.local")
    };
    let rendered = subject.to_string();
    assert_eq!(rendered, "/OU=R\\/D/CN=build.local");

    let parsed: Subject = rendered.parse().expect("should parse");
    assert_eq!(parsed, subject);
}

#[test]
fn test_parse_errors() {
    for bad in [
        "C=US/CN=localhost",
        "/C=US/CN",
        "/C=US/=x/CN=localhost",
        "/C=/CN=localhost",
        "/C=US/XX=1/CN=localhost",
        "/C=US/O=Example",
    ] {
        let result = bad.parse::<Subject>();
        assert!(
            matches!(result, Err(CertError::Subject(_))),
            "'{bad}' should be rejected, got {result:?}"
        );
    }
}

#[test]
fn test_distinguished_name_contains_every_attribute() {
    let dn = Subject::default().to_distinguished_name();
    assert!(dn.get(&rcgen::DnType::CommonName).is_some());
    assert!(dn.get(&rcgen::DnType::OrganizationName).is_some());
    assert!(dn.get(&rcgen::DnType::OrganizationalUnitName).is_none());
}
