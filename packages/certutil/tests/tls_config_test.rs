//! Tests for loading issued material the way the TLS server does

use certutil::tls_config::{load_certs, load_private_key, server_config};
use certutil::{CertError, RsaKey};

#[tokio::test]
async fn test_key_file_must_hold_one_pkcs1_key() {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let key = RsaKey::generate().await.expect("key");
    let pem = key.to_pkcs1_pem().expect("pkcs1");

    let single = dir.path().join("single.key");
    std::fs::write(&single, &pem).expect("write");
    load_private_key(&single).expect("one PKCS#1 key loads");

    let double = dir.path().join("double.key");
    std::fs::write(&double, format!("{pem}{pem}")).expect("write");
    assert!(matches!(load_private_key(&double), Err(CertError::Tls(_))));

    let pkcs8 = dir.path().join("pkcs8.key");
    std::fs::write(&pkcs8, rcgen::KeyPair::generate().expect("EC key").serialize_pem())
        .expect("write");
    assert!(matches!(load_private_key(&pkcs8), Err(CertError::Tls(_))));
}

#[test]
fn test_certificate_file_must_not_be_empty() {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("empty.pem");
    std::fs::write(&path, "").expect("write");

    assert!(matches!(load_certs(&path), Err(CertError::Tls(_))));
    assert!(matches!(
        load_certs(&dir.path().join("missing.pem")),
        Err(CertError::Io(_))
    ));
}

#[tokio::test]
async fn test_server_config_accepts_generated_pair() {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let created = certutil::AuthorityBuilder::new("root")
        .path(dir.path())
        .create()
        .await
        .expect("root CA");

    let cert = &created.files_created[1].path;
    server_config(cert, &dir.path().join("rootCA.key")).expect("matching pair loads");

    assert!(matches!(
        server_config(cert, &dir.path().join("missing.key")),
        Err(CertError::Io(_))
    ));
}
