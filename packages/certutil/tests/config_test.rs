//! Tests for issuance configuration

use std::path::PathBuf;

use certutil::issuance::MAX_VALIDITY_DAYS;
use certutil::{CertError, IssuanceConfig, SerialSource};

#[test]
fn test_defaults_match_classic_layout() {
    let config = IssuanceConfig::default();

    assert_eq!(config.output_dir, PathBuf::from("."));
    assert_eq!(config.name, "localhost");
    assert_eq!(config.ca_certificate, PathBuf::from("rootCA.pem"));
    assert_eq!(config.ca_private_key, PathBuf::from("rootCA.key"));
    assert_eq!(config.extensions_file, PathBuf::from("v3.ext"));
    assert_eq!(config.validity_days, 1024);
    assert!(config.create_serial_file);

    assert_eq!(config.key_path(), PathBuf::from("./localhost.key"));
    assert_eq!(config.csr_path(), PathBuf::from("./localhost.csr"));
    assert_eq!(config.cert_path(), PathBuf::from("./localhost.pem"));
    assert_eq!(config.serial_path(), Some(PathBuf::from("rootCA.srl")));
}

#[test]
fn test_partial_json_fills_defaults() {
    let config: IssuanceConfig =
        serde_json::from_str(r#"{ "output_dir": "certs", "validity_days": 30 }"#)
            .expect("should deserialize");

    assert_eq!(config.output_dir, PathBuf::from("certs"));
    assert_eq!(config.validity_days, 30);
    assert_eq!(config.name, "localhost");
    assert_eq!(config.cert_path(), PathBuf::from("certs/localhost.pem"));
}

#[test]
fn test_validation() {
    let zero_days = IssuanceConfig {
        validity_days: 0,
        ..IssuanceConfig::default()
    };
    assert!(matches!(zero_days.validate(), Err(CertError::Config(_))));

    for name in ["", "  ", "../escape", "a/b", ".."] {
        let config = IssuanceConfig {
            name: name.to_string(),
            ..IssuanceConfig::default()
        };
        assert!(
            matches!(config.validate(), Err(CertError::Config(_))),
            "name '{name}' should be rejected"
        );
    }

    assert!(IssuanceConfig::default().validate().is_ok());
}

#[test]
fn test_validation_bounds_validity_days() {
    let at_limit = IssuanceConfig {
        validity_days: MAX_VALIDITY_DAYS,
        ..IssuanceConfig::default()
    };
    assert!(at_limit.validate().is_ok());

    for days in [MAX_VALIDITY_DAYS + 1, 3_000_000, u32::MAX] {
        let config = IssuanceConfig {
            validity_days: days,
            ..IssuanceConfig::default()
        };
        assert!(
            matches!(config.validate(), Err(CertError::Config(_))),
            "{days} days should be rejected"
        );
    }
}

#[test]
fn test_serial_file_settings() {
    let explicit = IssuanceConfig {
        serial_file: Some(PathBuf::from("state/serial")),
        ..IssuanceConfig::default()
    };
    assert_eq!(explicit.serial_path(), Some(PathBuf::from("state/serial")));

    let disabled = IssuanceConfig {
        create_serial_file: false,
        ..explicit
    };
    assert_eq!(disabled.serial_path(), None);
    assert_eq!(disabled.signing_request().serial, SerialSource::Random);
}

#[test]
fn test_signing_request_uses_config_paths() {
    let config = IssuanceConfig {
        output_dir: PathBuf::from("out"),
        name: "dev".to_string(),
        validity_days: 90,
        ..IssuanceConfig::default()
    };
    let request = config.signing_request();

    assert_eq!(request.csr, PathBuf::from("out/dev.csr"));
    assert_eq!(request.output, PathBuf::from("out/dev.pem"));
    assert_eq!(request.ca_certificate, PathBuf::from("rootCA.pem"));
    assert_eq!(request.validity_days, 90);
}

#[tokio::test]
async fn test_from_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("certutil.json");
    std::fs::write(&path, r#"{ "name": "api", "create_serial_file": false }"#).expect("write");

    let config = IssuanceConfig::from_file(&path).await.expect("should load");
    assert_eq!(config.name, "api");
    assert!(!config.create_serial_file);

    std::fs::write(&path, r#"{ "validity_days": 0 }"#).expect("write");
    assert!(matches!(
        IssuanceConfig::from_file(&path).await,
        Err(CertError::Config(_))
    ));

    std::fs::write(&path, "{ not json").expect("write");
    assert!(matches!(
        IssuanceConfig::from_file(&path).await,
        Err(CertError::Serialization(_))
    ));
}
