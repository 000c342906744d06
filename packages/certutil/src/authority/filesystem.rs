//! Filesystem certificate authority operations
//!
//! Loading validates the CA before it is used. Creation writes a self-signed
//! RSA root suitable for signing the leaf certificate.

use std::path::{Path, PathBuf};

use certutil_common::LoggingTransformer;
use rcgen::{BasicConstraints, CertificateParams, IsCa, KeyUsagePurpose};

use super::core::{CaSource, CertificateAuthority};
use crate::error::{CertError, Result};
use crate::key::RsaKey;
use crate::issuance::file_ops::save_artifact;
use crate::issuance::signing::validity_window;
use crate::responses::{AuthorityCreated, FileType};
use crate::serial::Serial;
use crate::subject::Subject;

/// Default root CA certificate file name
pub const DEFAULT_CA_CERTIFICATE: &str = "rootCA.pem";
/// Default root CA private key file name
pub const DEFAULT_CA_KEY: &str = "rootCA.key";

const DEFAULT_CA_VALIDITY_DAYS: u32 = 1024;

impl CertificateAuthority {
    /// Load and validate a CA from a certificate and key file
    ///
    /// # Errors
    ///
    /// Returns `CaFilesMissing` listing every missing file, `Io` if a path
    /// cannot be checked or read, or the validation error described on
    /// [`CertificateAuthority::from_pem`].
    pub async fn load(certificate: &Path, private_key: &Path) -> Result<Self> {
        let mut missing = Vec::new();
        for path in [certificate, private_key] {
            if !tokio::fs::try_exists(path).await? {
                missing.push(path.to_path_buf());
            }
        }
        if !missing.is_empty() {
            return Err(CertError::CaFilesMissing { missing });
        }

        let cert_pem = tokio::fs::read_to_string(certificate).await?;
        let key_pem = tokio::fs::read_to_string(private_key).await?;

        let name = certificate
            .file_stem()
            .map_or_else(|| "ca".to_string(), |s| s.to_string_lossy().into_owned());
        let authority = Self::from_pem(
            &name,
            cert_pem,
            key_pem,
            CaSource::Filesystem {
                certificate: certificate.to_path_buf(),
                private_key: private_key.to_path_buf(),
            },
            certificate,
        )?;

        tracing::debug!(
            "Loaded certificate authority '{}' from {}",
            authority.metadata.subject,
            certificate.display()
        );
        Ok(authority)
    }
}

/// Builder for filesystem certificate authority operations
#[derive(Debug, Clone)]
pub struct AuthorityFilesystemBuilder {
    name: String,
    path: PathBuf,
    common_name: Option<String>,
    valid_for_days: u32,
    overwrite: bool,
}

impl AuthorityFilesystemBuilder {
    pub(super) fn new(name: String, path: PathBuf) -> Self {
        Self {
            name,
            path,
            common_name: None,
            valid_for_days: DEFAULT_CA_VALIDITY_DAYS,
            overwrite: false,
        }
    }

    /// Set common name for certificate authority creation
    #[must_use]
    pub fn common_name(self, cn: &str) -> Self {
        Self {
            common_name: Some(cn.to_string()),
            ..self
        }
    }

    /// Set validity period in days for certificate authority creation
    #[must_use]
    pub fn valid_for_days(self, days: u32) -> Self {
        Self {
            valid_for_days: days,
            ..self
        }
    }

    /// Replace existing CA files instead of refusing to create
    #[must_use]
    pub fn overwrite(self, overwrite: bool) -> Self {
        Self { overwrite, ..self }
    }

    /// Certificate path inside the CA directory
    pub fn certificate_path(&self) -> PathBuf {
        self.path.join(DEFAULT_CA_CERTIFICATE)
    }

    /// Private key path inside the CA directory
    pub fn private_key_path(&self) -> PathBuf {
        self.path.join(DEFAULT_CA_KEY)
    }

    /// Create a new self-signed root certificate authority
    ///
    /// # Errors
    ///
    /// Returns an error if CA files already exist and overwriting is off,
    /// key generation or signing fails, or the files cannot be written.
    pub async fn create(self) -> Result<AuthorityCreated> {
        let cert_path = self.certificate_path();
        let key_path = self.private_key_path();
        if !self.overwrite {
            for path in [&cert_path, &key_path] {
                if tokio::fs::try_exists(path).await? {
                    return Err(CertError::Io(std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        format!("{} already exists", path.display()),
                    )));
                }
            }
        }

        let (not_before, not_after) = validity_window(self.valid_for_days)?;
        let key = RsaKey::generate().await?;
        let key_pair = key.signing_key()?;

        let common_name = self.common_name.clone().unwrap_or_else(|| self.name.clone());
        let mut params = CertificateParams::default();
        params.distinguished_name =
            Subject::common_name(common_name.clone()).to_distinguished_name();
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages = vec![
            KeyUsagePurpose::KeyCertSign,
            KeyUsagePurpose::CrlSign,
            KeyUsagePurpose::DigitalSignature,
        ];
        params.serial_number = Some((&Serial::random()).into());

        params.not_before = not_before;
        params.not_after = not_after;

        let cert = params.self_signed(&key_pair)?;
        let cert_pem = cert.pem();
        let key_pem = key.to_pkcs1_pem()?;

        let files_created = vec![
            save_artifact(&key_path, key_pem.as_bytes(), FileType::PrivateKey).await?,
            save_artifact(&cert_path, cert_pem.as_bytes(), FileType::Certificate).await?,
        ];

        LoggingTransformer::log_issued_certificate(
            &format!("CN={common_name}"),
            "self-signed",
            cert.der().as_ref(),
        );

        let authority = CertificateAuthority::from_pem(
            &self.name,
            cert_pem,
            key_pem,
            CaSource::Filesystem {
                certificate: cert_path.clone(),
                private_key: key_path,
            },
            &cert_path,
        )?;

        Ok(AuthorityCreated {
            authority,
            files_created,
        })
    }

    /// Load the certificate authority stored in this directory
    ///
    /// # Errors
    ///
    /// See [`CertificateAuthority::load`].
    pub async fn load(self) -> Result<CertificateAuthority> {
        let authority =
            CertificateAuthority::load(&self.certificate_path(), &self.private_key_path()).await?;
        Ok(CertificateAuthority {
            name: self.name,
            ..authority
        })
    }
}
