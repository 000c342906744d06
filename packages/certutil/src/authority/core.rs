//! Core certificate authority domain types and logic

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use rcgen::{Issuer, KeyPair};
use serde::Serialize;

use crate::certificate::{ParsedCertificate, parse_certificate_from_pem};
use crate::error::{CertError, Result};
use crate::key::RsaKey;

/// Validated certificate authority with its signing key
#[derive(Debug, Clone)]
pub struct CertificateAuthority {
    /// Display name
    pub name: String,
    /// CA certificate (PEM)
    pub certificate_pem: String,
    /// CA private key (PEM)
    pub private_key_pem: Option<String>,
    /// Fields read from the certificate
    pub metadata: CaMetadata,
}

/// Summary of a CA certificate, serialized by `init-ca --json`
#[derive(Debug, Clone, Serialize)]
pub struct CaMetadata {
    /// Subject DN
    pub subject: String,
    /// Issuer DN, equal to the subject for a root
    pub issuer: String,
    /// Serial number in hex
    pub serial_number: String,
    /// Start of the validity window
    pub valid_from: SystemTime,
    /// End of the validity window
    pub valid_until: SystemTime,
    /// Public key algorithm
    pub key_algorithm: String,
    /// Public key size in bits, where known
    pub key_size: Option<u32>,
    /// When this value was built
    pub created_at: SystemTime,
    /// Where the CA material came from
    pub source: CaSource,
}

/// Origin of CA material
#[derive(Debug, Clone, Serialize)]
pub enum CaSource {
    /// Certificate and key files on disk
    Filesystem {
        /// Certificate path
        certificate: PathBuf,
        /// Private key path
        private_key: PathBuf,
    },
}

impl CertificateAuthority {
    /// Build a CA from PEM material after validating it
    ///
    /// `origin` names the certificate in errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the certificate does not parse, is outside its
    /// validity window, is marked as a non-CA, or the key is not the RSA key
    /// matching the certificate.
    pub fn from_pem(
        name: &str,
        certificate_pem: String,
        private_key_pem: String,
        source: CaSource,
        origin: &Path,
    ) -> Result<Self> {
        let parsed = parse_certificate_from_pem(&certificate_pem)?;
        let key = RsaKey::from_pem(&private_key_pem)?;
        validate_authority(&parsed, &key, origin)?;

        Ok(Self {
            name: name.to_string(),
            certificate_pem,
            private_key_pem: Some(private_key_pem),
            metadata: CaMetadata {
                subject: parsed.subject_dn.clone(),
                issuer: parsed.issuer_dn.clone(),
                serial_number: parsed.serial_hex(),
                valid_from: parsed.not_before,
                valid_until: parsed.not_after,
                key_algorithm: parsed.key_algorithm.clone(),
                key_size: parsed.key_size,
                created_at: SystemTime::now(),
                source,
            },
        })
    }

    /// Check if the certificate authority is currently valid
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let now = SystemTime::now();
        now >= self.metadata.valid_from && now <= self.metadata.valid_until
    }

    /// Get duration until expiry
    ///
    /// # Errors
    ///
    /// Returns `CertificateExpired` if the authority has already expired.
    pub fn expires_in(&self) -> Result<Duration> {
        let now = SystemTime::now();
        self.metadata.valid_until.duration_since(now).map_err(|_| {
            CertError::CertificateExpired("Certificate authority has expired".to_string())
        })
    }

    /// Path of the CA certificate file
    pub fn certificate_path(&self) -> &Path {
        match &self.metadata.source {
            CaSource::Filesystem { certificate, .. } => certificate,
        }
    }

    /// Parse the CA certificate
    ///
    /// # Errors
    ///
    /// Returns `CertificateParsing` if the stored PEM is not a certificate.
    pub fn certificate(&self) -> Result<ParsedCertificate> {
        parse_certificate_from_pem(&self.certificate_pem)
    }

    /// The CA's RSA private key
    ///
    /// # Errors
    ///
    /// Returns an error if the authority carries no key or the key is invalid.
    pub fn private_key(&self) -> Result<RsaKey> {
        let pem = self
            .private_key_pem
            .as_deref()
            .ok_or_else(|| CertError::key_format("Certificate authority has no private key"))?;
        RsaKey::from_pem(pem)
    }

    /// rcgen issuer for signing leaf certificates
    ///
    /// The issuer name and key identifier are taken from the CA certificate.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be converted or rcgen rejects the
    /// certificate.
    pub fn issuer(&self) -> Result<Issuer<'static, KeyPair>> {
        let signing_key = self.private_key()?.signing_key()?;
        Ok(Issuer::from_ca_cert_pem(&self.certificate_pem, signing_key)?)
    }
}

/// Checks a CA certificate and key before anything is signed with them
pub(crate) fn validate_authority(
    cert: &ParsedCertificate,
    key: &RsaKey,
    origin: &Path,
) -> Result<()> {
    let now = SystemTime::now();
    if now < cert.not_before {
        return Err(CertError::CertificateValidation(format!(
            "CA certificate {} is not yet valid",
            origin.display()
        )));
    }
    if now > cert.not_after {
        return Err(CertError::CertificateExpired(format!(
            "CA certificate {} expired",
            origin.display()
        )));
    }

    if !cert.has_basic_constraints {
        tracing::warn!(
            "CA certificate {} has no basicConstraints extension, accepting it as a CA",
            origin.display()
        );
    } else if !cert.is_ca {
        return Err(CertError::NotACertificateAuthority(cert.subject_dn.clone()));
    }

    if !cert.key_usage.is_empty() && !cert.key_usage.iter().any(|u| u == "keyCertSign") {
        tracing::warn!(
            "CA certificate {} does not assert keyCertSign",
            origin.display()
        );
    }

    if cert.key_algorithm != "RSA" {
        return Err(CertError::UnsupportedKey(format!(
            "CA certificate uses {} keys, expected RSA",
            cert.key_algorithm
        )));
    }
    if key.public_key_pkcs1_der()? != cert.public_key {
        return Err(CertError::KeyMismatch(origin.to_path_buf()));
    }

    Ok(())
}

/// Builder for certificate authority operations
#[derive(Debug, Clone)]
pub struct AuthorityBuilder {
    name: String,
}

impl AuthorityBuilder {
    /// Start a builder for the authority called `name`
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// Work with a filesystem-based certificate authority in `path`
    #[must_use]
    pub fn path<P: AsRef<Path>>(self, path: P) -> super::filesystem::AuthorityFilesystemBuilder {
        super::filesystem::AuthorityFilesystemBuilder::new(self.name, path.as_ref().to_path_buf())
    }
}
