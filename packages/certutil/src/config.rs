//! Issuance configuration
//!
//! Every field has a default matching the classic `cert_util` layout:
//! `rootCA.pem`, `rootCA.key` and `v3.ext` in the working directory and
//! `localhost.{key,csr,pem}` written next to them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::authority::{DEFAULT_CA_CERTIFICATE, DEFAULT_CA_KEY};
use crate::error::{CertError, Result};
use crate::issuance::signing::{
    DEFAULT_VALIDITY_DAYS, SerialSource, SigningRequest, check_validity_days,
};
use crate::serial::SerialFile;

/// Paths and settings for one issuance run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceConfig {
    /// Directory receiving the key, request and certificate
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// File stem of the artifacts
    #[serde(default = "default_name")]
    pub name: String,
    /// Root CA certificate (PEM)
    #[serde(default = "default_ca_certificate")]
    pub ca_certificate: PathBuf,
    /// Root CA private key (PEM)
    #[serde(default = "default_ca_private_key")]
    pub ca_private_key: PathBuf,
    /// OpenSSL-style X.509 v3 extension file
    #[serde(default = "default_extensions_file")]
    pub extensions_file: PathBuf,
    /// Certificate validity in days
    #[serde(default = "default_validity_days")]
    pub validity_days: u32,
    /// Serial file path; defaults to the CA certificate with `.srl`
    #[serde(default)]
    pub serial_file: Option<PathBuf>,
    /// Keep serials in a file (false issues random serials)
    #[serde(default = "default_create_serial_file")]
    pub create_serial_file: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_name() -> String {
    "localhost".to_string()
}

fn default_ca_certificate() -> PathBuf {
    PathBuf::from(DEFAULT_CA_CERTIFICATE)
}

fn default_ca_private_key() -> PathBuf {
    PathBuf::from(DEFAULT_CA_KEY)
}

fn default_extensions_file() -> PathBuf {
    PathBuf::from("v3.ext")
}

fn default_validity_days() -> u32 {
    DEFAULT_VALIDITY_DAYS
}

fn default_create_serial_file() -> bool {
    true
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            name: default_name(),
            ca_certificate: default_ca_certificate(),
            ca_private_key: default_ca_private_key(),
            extensions_file: default_extensions_file(),
            validity_days: default_validity_days(),
            serial_file: None,
            create_serial_file: default_create_serial_file(),
        }
    }
}

impl IssuanceConfig {
    /// Load a JSON configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON or
    /// fails validation.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        tracing::debug!("Loaded issuance configuration from {}", path.display());
        Ok(config)
    }

    /// Check field constraints
    ///
    /// # Errors
    ///
    /// Returns `Config` if `validity_days` is zero or above
    /// [`MAX_VALIDITY_DAYS`](crate::issuance::MAX_VALIDITY_DAYS), or `name` is empty or contains a path separator.
    pub fn validate(&self) -> Result<()> {
        check_validity_days(self.validity_days)?;
        if self.name.trim().is_empty() {
            return Err(CertError::Config("name must not be empty".to_string()));
        }
        if self.name.contains(['/', '\\']) || self.name == "." || self.name == ".." {
            return Err(CertError::Config(format!(
                "name '{}' must be a plain file stem",
                self.name
            )));
        }
        Ok(())
    }

    fn artifact(&self, extension: &str) -> PathBuf {
        self.output_dir.join(format!("{}.{extension}", self.name))
    }

    /// Private key output path
    pub fn key_path(&self) -> PathBuf {
        self.artifact("key")
    }

    /// Signing request output path
    pub fn csr_path(&self) -> PathBuf {
        self.artifact("csr")
    }

    /// Certificate output path
    pub fn cert_path(&self) -> PathBuf {
        self.artifact("pem")
    }

    /// Serial file in use, if any
    pub fn serial_path(&self) -> Option<PathBuf> {
        if !self.create_serial_file {
            return None;
        }
        let path = match &self.serial_file {
            Some(path) => path.clone(),
            None => SerialFile::for_ca_certificate(&self.ca_certificate)
                .path()
                .to_path_buf(),
        };
        Some(path)
    }

    /// Signing inputs for this configuration
    pub fn signing_request(&self) -> SigningRequest {
        let serial = match self.serial_path() {
            Some(path) => SerialSource::File(SerialFile::new(path)),
            None => SerialSource::Random,
        };
        SigningRequest::new(
            self.csr_path(),
            &self.ca_certificate,
            &self.ca_private_key,
            &self.extensions_file,
            self.cert_path(),
        )
        .validity_days(self.validity_days)
        .serial(serial)
    }
}
