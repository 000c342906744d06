//! Issuance error types for detailed error handling

use std::path::PathBuf;

/// Errors raised while generating keys, requests and certificates
#[derive(Debug, thiserror::Error)]
pub enum CertError {
    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// RSA key generation failed
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),
    /// Key PEM or DER could not be decoded
    #[error("Invalid key format: {0}")]
    KeyFormat(String),
    /// Key is valid but not a usable unencrypted RSA key
    #[error("Unsupported key: {0}")]
    UnsupportedKey(String),
    /// Malformed distinguished name
    #[error("Invalid subject: {0}")]
    Subject(String),
    /// Request could not be built, parsed or verified
    #[error("Certificate signing request invalid: {0}")]
    SigningRequest(String),
    /// Certificate could not be parsed
    #[error("Certificate parsing failed: {0}")]
    CertificateParsing(String),
    /// Certificate failed a validity check
    #[error("Certificate validation failed: {0}")]
    CertificateValidation(String),
    /// Certificate is past its notAfter date
    #[error("Certificate expired: {0}")]
    CertificateExpired(String),
    /// CA certificate or key file does not exist
    #[error("CA files not found: {}", .missing.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "))]
    CaFilesMissing {
        /// Every path that was not found
        missing: Vec<PathBuf>,
    },
    /// Certificate carries basicConstraints CA:FALSE
    #[error("Certificate is not a certificate authority: {0}")]
    NotACertificateAuthority(String),
    /// CA key is not the key of the CA certificate
    #[error("CA private key does not match CA certificate {0}")]
    KeyMismatch(PathBuf),
    /// Extension file problem at a 1-based line
    #[error("Extension file error at line {line}: {message}")]
    ExtensionFile {
        /// 1-based line number
        line: usize,
        /// What is wrong with the line
        message: String,
    },
    /// Serial number or serial file is invalid
    #[error("Serial number error: {0}")]
    Serial(String),
    /// rcgen rejected the parameters or key
    #[error("Signing failed: {0}")]
    Signing(#[from] rcgen::Error),
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
    /// JSON configuration could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Artifacts could not be loaded by rustls
    #[error("TLS configuration failed: {0}")]
    Tls(String),
}

impl CertError {
    /// Create an `ExtensionFile` error for the given 1-based line
    pub fn extension(line: usize, message: impl Into<String>) -> Self {
        Self::ExtensionFile {
            line,
            message: message.into(),
        }
    }

    /// Create a `KeyFormat` error
    pub fn key_format(msg: impl Into<String>) -> Self {
        Self::KeyFormat(msg.into())
    }

    /// Create a `CertificateParsing` error
    pub fn parsing(msg: impl Into<String>) -> Self {
        Self::CertificateParsing(msg.into())
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CertError>;
