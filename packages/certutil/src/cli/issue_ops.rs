//! Issuance commands: `issue`, `genkey`, `csr` and `sign`

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::json;

use super::commands::SerialArgs;
use crate::config::IssuanceConfig;
use crate::issuance::{
    Issuance, SerialSource, SigningRequest, create_signing_request, generate_private_key,
    sign_request,
};
use crate::responses::GeneratedFile;
use crate::serial::SerialFile;

/// Flags of `certutil issue` that override the configuration file
#[derive(Debug, Clone)]
pub struct IssueOverrides {
    /// `--output-dir`
    pub output_dir: Option<PathBuf>,
    /// `--name`
    pub name: Option<String>,
    /// `--ca-cert`
    pub ca_cert: Option<PathBuf>,
    /// `--ca-key`
    pub ca_key: Option<PathBuf>,
    /// `--extfile`
    pub extfile: Option<PathBuf>,
    /// `--days`
    pub days: Option<u32>,
    /// `--serial-file` / `--no-serial-file`
    pub serial: SerialArgs,
}

impl IssueOverrides {
    /// Apply the flags that were given on top of `config`
    pub fn apply(self, mut config: IssuanceConfig) -> IssuanceConfig {
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(name) = self.name {
            config.name = name;
        }
        if let Some(cert) = self.ca_cert {
            config.ca_certificate = cert;
        }
        if let Some(key) = self.ca_key {
            config.ca_private_key = key;
        }
        if let Some(extfile) = self.extfile {
            config.extensions_file = extfile;
        }
        if let Some(days) = self.days {
            config.validity_days = days;
        }
        if let Some(serial_file) = self.serial.serial_file {
            config.serial_file = Some(serial_file);
            config.create_serial_file = true;
        }
        if self.serial.no_serial_file {
            config.create_serial_file = false;
        }
        config
    }
}

fn print_files(operation: &str, files: &[GeneratedFile], use_json: bool) {
    if use_json {
        println!(
            "{}",
            json!({
                "success": true,
                "operation": operation,
                "files_created": files,
            })
        );
    } else {
        for file in files {
            println!(
                "Wrote {} {} ({} bytes)",
                file.file_type.label(),
                file.path.display(),
                file.size_bytes
            );
        }
    }
}

/// Run the full issuance sequence
///
/// # Errors
///
/// Returns an error if the configuration is invalid or any step fails.
pub async fn handle_issue(
    config_path: Option<&Path>,
    overrides: IssueOverrides,
    use_json: bool,
) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => IssuanceConfig::from_file(path)
            .await
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => IssuanceConfig::default(),
    };
    let config = overrides.apply(config);

    let report = Issuance::builder()
        .config(config)
        .build()
        .context("Invalid issuance configuration")?
        .run()
        .await
        .context("Certificate issuance failed")?;

    print_files("issue", &report.files_created, use_json);
    if !use_json {
        println!(
            "Issued {} (serial {}) by {}, valid {} days until {}",
            report.certificate.subject_dn,
            report.certificate.serial_hex(),
            report.certificate.issuer_dn,
            report.certificate.validity_days(),
            super::inspect_ops::format_time(report.certificate.not_after)
        );
    }
    Ok(())
}

/// Generate a private key
///
/// # Errors
///
/// Returns an error if key generation or the write fails.
pub async fn handle_genkey(out: &Path, use_json: bool) -> anyhow::Result<()> {
    let file = generate_private_key(out)
        .await
        .with_context(|| format!("Failed to generate private key {}", out.display()))?;
    print_files("genkey", &[file], use_json);
    Ok(())
}

/// Create a signing request
///
/// # Errors
///
/// Returns an error if the key cannot be read or the request written.
pub async fn handle_csr(key: &Path, out: &Path, use_json: bool) -> anyhow::Result<()> {
    let file = create_signing_request(key, out)
        .await
        .with_context(|| format!("Failed to create signing request from {}", key.display()))?;
    print_files("csr", &[file], use_json);
    Ok(())
}

/// Signing inputs from `certutil sign` flags
pub fn signing_request(
    csr: PathBuf,
    ca_cert: PathBuf,
    ca_key: PathBuf,
    extfile: PathBuf,
    out: PathBuf,
    days: u32,
    serial: SerialArgs,
) -> SigningRequest {
    let source = if serial.no_serial_file {
        SerialSource::Random
    } else {
        match serial.serial_file {
            Some(path) => SerialSource::File(SerialFile::new(path)),
            None => SerialSource::File(SerialFile::for_ca_certificate(&ca_cert)),
        }
    };
    SigningRequest::new(csr, ca_cert, ca_key, extfile, out)
        .validity_days(days)
        .serial(source)
}

/// Sign a request with the CA
///
/// # Errors
///
/// Returns an error if the CA, extension file or request is invalid or the
/// certificate cannot be written.
pub async fn handle_sign(request: SigningRequest, use_json: bool) -> anyhow::Result<()> {
    let csr = request.csr.clone();
    let signed = sign_request(request)
        .await
        .with_context(|| format!("Failed to sign {}", csr.display()))?;

    let mut files = vec![signed.certificate_file];
    files.extend(signed.serial_file);
    print_files("sign", &files, use_json);
    Ok(())
}
