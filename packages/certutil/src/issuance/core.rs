//! Issuance builder and the three-step sequence

use std::path::Path;
use std::time::Instant;

use certutil_common::LoggingTransformer;

use crate::config::IssuanceConfig;
use crate::error::Result;
use crate::responses::IssuanceReport;

use super::signing::sign_request;
use super::steps::{create_signing_request, generate_private_key};

/// A configured issuance run
#[derive(Debug, Clone)]
pub struct Issuance {
    config: IssuanceConfig,
}

impl Issuance {
    /// Start configuring an issuance run
    #[must_use]
    pub fn builder() -> IssuanceBuilder {
        IssuanceBuilder::default()
    }

    /// Configuration of this run
    pub fn config(&self) -> &IssuanceConfig {
        &self.config
    }

    /// Generate the key, build the request and have the CA sign it
    ///
    /// Each step reads its predecessor's file from disk. The first failure
    /// stops the sequence; files from completed steps are left in place.
    ///
    /// # Errors
    ///
    /// Returns the error of the first step that fails.
    pub async fn run(self) -> Result<IssuanceReport> {
        let config = self.config;
        let started = Instant::now();
        tracing::info!(
            "Issuing '{}' into {} with CA {}",
            config.name,
            config.output_dir.display(),
            config.ca_certificate.display()
        );

        let result = run_steps(&config).await;
        LoggingTransformer::log_performance_metric("issuance", started.elapsed(), result.is_ok());
        if let Err(e) = &result {
            tracing::error!("Issuance of '{}' stopped: {}", config.name, e);
        }
        result
    }
}

async fn run_steps(config: &IssuanceConfig) -> Result<IssuanceReport> {
    let key_path = config.key_path();
    let csr_path = config.csr_path();

    let mut files_created = Vec::with_capacity(4);

    tracing::info!("Step 1/3: generating private key");
    files_created.push(generate_private_key(&key_path).await?);

    tracing::info!("Step 2/3: creating signing request");
    files_created.push(create_signing_request(&key_path, &csr_path).await?);

    tracing::info!("Step 3/3: signing request with {}", config.ca_certificate.display());
    let signed = sign_request(config.signing_request()).await?;
    files_created.push(signed.certificate_file);
    files_created.extend(signed.serial_file);

    Ok(IssuanceReport {
        files_created,
        certificate: signed.certificate,
    })
}

/// Builder for an issuance run
///
/// Starts from [`IssuanceConfig::default`]; individual setters override a
/// loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct IssuanceBuilder {
    config: IssuanceConfig,
}

impl IssuanceBuilder {
    /// Replace the whole configuration
    #[must_use]
    pub fn config(self, config: IssuanceConfig) -> Self {
        Self { config }
    }

    /// Directory receiving the artifacts
    #[must_use]
    pub fn output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.config.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// File stem of the artifacts
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.config.name = name.to_string();
        self
    }

    /// CA certificate and private key paths
    #[must_use]
    pub fn authority<P: AsRef<Path>, K: AsRef<Path>>(mut self, certificate: P, key: K) -> Self {
        self.config.ca_certificate = certificate.as_ref().to_path_buf();
        self.config.ca_private_key = key.as_ref().to_path_buf();
        self
    }

    /// Extension file path
    #[must_use]
    pub fn extensions_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.extensions_file = path.as_ref().to_path_buf();
        self
    }

    /// Validity period in days
    #[must_use]
    pub fn validity_days(mut self, days: u32) -> Self {
        self.config.validity_days = days;
        self
    }

    /// Explicit serial file path
    #[must_use]
    pub fn serial_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.serial_file = Some(path.as_ref().to_path_buf());
        self.config.create_serial_file = true;
        self
    }

    /// Issue a random serial without a serial file
    #[must_use]
    pub fn random_serial(mut self) -> Self {
        self.config.create_serial_file = false;
        self
    }

    /// Validate and finish
    ///
    /// # Errors
    ///
    /// Returns `Config` if the configuration is invalid.
    pub fn build(self) -> Result<Issuance> {
        self.config.validate()?;
        Ok(Issuance {
            config: self.config,
        })
    }
}
