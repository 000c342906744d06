//! TLS loadability of issued certificates
//!
//! The issued key and certificate are consumed by a rustls server that reads
//! the certificate chain and exactly one PKCS#1 RSA key. These helpers load
//! them the same way so a bad artifact is caught at issuance time.

use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use rustls::client::WebPkiServerVerifier;
use rustls::client::danger::ServerCertVerifier;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use rustls::{RootCertStore, ServerConfig};

use crate::error::{CertError, Result};

fn provider() -> Arc<CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

/// Read every certificate in a PEM file
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds no certificate.
pub fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let file = std::fs::File::open(path)?;
    let certs = rustls_pemfile::certs(&mut BufReader::new(file))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| CertError::Tls(format!("{}: {e}", path.display())))?;
    if certs.is_empty() {
        return Err(CertError::Tls(format!(
            "{}: no certificates found",
            path.display()
        )));
    }
    Ok(certs)
}

/// Read the single PKCS#1 RSA private key from a PEM file
///
/// # Errors
///
/// Returns an error unless the file holds exactly one `RSA PRIVATE KEY`.
pub fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>> {
    let file = std::fs::File::open(path)?;
    let mut keys = rustls_pemfile::rsa_private_keys(&mut BufReader::new(file))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| CertError::Tls(format!("{}: {e}", path.display())))?;
    if keys.len() != 1 {
        return Err(CertError::Tls(format!(
            "{}: expected a single RSA private key, found {}",
            path.display(),
            keys.len()
        )));
    }
    let key = keys.remove(0);
    Ok(PrivateKeyDer::Pkcs1(key))
}

/// Server configuration serving the issued certificate, without client auth
///
/// # Errors
///
/// Returns `Tls` if the files cannot be loaded or rustls rejects the
/// certificate and key pair.
pub fn server_config(cert_path: &Path, key_path: &Path) -> Result<ServerConfig> {
    let certs = load_certs(cert_path)?;
    let key = load_private_key(key_path)?;

    let config = ServerConfig::builder_with_provider(provider())
        .with_safe_default_protocol_versions()
        .map_err(|e| CertError::Tls(e.to_string()))?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| CertError::Tls(e.to_string()))?;
    Ok(config)
}

/// Verify the certificate chains to `ca_path` and is valid for `server_name`
///
/// # Errors
///
/// Returns `Tls` if path building, name matching or validity checks fail.
pub fn verify_server_certificate(
    cert_path: &Path,
    ca_path: &Path,
    server_name: &str,
) -> Result<()> {
    let mut roots = RootCertStore::empty();
    for ca in load_certs(ca_path)? {
        roots
            .add(ca)
            .map_err(|e| CertError::Tls(format!("{}: {e}", ca_path.display())))?;
    }

    let verifier = WebPkiServerVerifier::builder_with_provider(Arc::new(roots), provider())
        .build()
        .map_err(|e| CertError::Tls(e.to_string()))?;

    let mut chain = load_certs(cert_path)?;
    let end_entity = chain.remove(0);
    let name = ServerName::try_from(server_name.to_string())
        .map_err(|e| CertError::Tls(format!("invalid server name '{server_name}': {e}")))?;

    verifier
        .verify_server_cert(&end_entity, &chain, &name, &[], UnixTime::now())
        .map_err(|e| CertError::Tls(e.to_string()))?;
    Ok(())
}
