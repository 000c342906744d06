//! Key and signing request generation steps

use std::path::Path;

use rcgen::{CertificateParams, CertificateSigningRequestParams};

use crate::error::{CertError, Result};
use crate::issuance::file_ops::save_artifact;
use crate::key::RsaKey;
use crate::responses::{FileType, GeneratedFile};
use crate::subject::Subject;

/// Generate a 2048-bit RSA key and write it as PKCS#1 PEM
///
/// # Errors
///
/// Returns an error if key generation, encoding or the write fails.
pub async fn generate_private_key(path: &Path) -> Result<GeneratedFile> {
    let key = RsaKey::generate().await?;
    let pem = key.to_pkcs1_pem()?;
    save_artifact(path, pem.as_bytes(), FileType::PrivateKey).await
}

/// Build a PKCS#10 request for the leaf subject, signed with the key at `key_path`
///
/// # Errors
///
/// Returns an error if the key cannot be loaded or the request cannot be
/// serialized or written.
pub async fn create_signing_request(key_path: &Path, csr_path: &Path) -> Result<GeneratedFile> {
    let key = RsaKey::load(key_path).await?;
    let pem = signing_request_pem(&key, &Subject::default())?;
    save_artifact(csr_path, pem.as_bytes(), FileType::SigningRequest).await
}

/// PEM-encoded request for `subject` signed with `key`
///
/// # Errors
///
/// Returns `SigningRequest` if rcgen cannot serialize the request.
pub fn signing_request_pem(key: &RsaKey, subject: &Subject) -> Result<String> {
    let key_pair = key.signing_key()?;

    let mut params = CertificateParams::default();
    params.distinguished_name = subject.to_distinguished_name();

    let csr = params
        .serialize_request(&key_pair)
        .map_err(|e| CertError::SigningRequest(format!("Failed to build request: {e}")))?;
    csr.pem()
        .map_err(|e| CertError::SigningRequest(format!("Failed to encode request: {e}")))
}

/// Read a request from disk
///
/// rcgen verifies the request's self-signature while parsing.
///
/// # Errors
///
/// Returns `SigningRequest` if the file is not a valid, correctly signed
/// PKCS#10 request.
pub async fn load_signing_request(path: &Path) -> Result<CertificateSigningRequestParams> {
    let pem = tokio::fs::read_to_string(path).await?;
    CertificateSigningRequestParams::from_pem(&pem).map_err(|e| {
        CertError::SigningRequest(format!("{}: {e}", path.display()))
    })
}
