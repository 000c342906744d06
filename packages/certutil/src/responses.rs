//! Results reported by issuance operations

use std::path::PathBuf;

use serde::Serialize;

use crate::authority::CertificateAuthority;
use crate::certificate::ParsedCertificate;

/// Kind of artifact written to disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileType {
    /// RSA private key (PKCS#1 PEM)
    PrivateKey,
    /// PKCS#10 certificate signing request
    SigningRequest,
    /// Signed X.509 certificate
    Certificate,
    /// CA serial number file
    Serial,
}

impl FileType {
    /// Human readable label used in reports
    pub fn label(self) -> &'static str {
        match self {
            FileType::PrivateKey => "private key",
            FileType::SigningRequest => "signing request",
            FileType::Certificate => "certificate",
            FileType::Serial => "serial",
        }
    }
}

/// An artifact written by an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    /// Where the file was written
    pub path: PathBuf,
    /// What the file holds
    pub file_type: FileType,
    /// Bytes written
    pub size_bytes: u64,
}

/// Outcome of signing one request
#[derive(Debug, Clone)]
pub struct SignedCertificate {
    /// The certificate file
    pub certificate_file: GeneratedFile,
    /// The updated serial file, if one is in use
    pub serial_file: Option<GeneratedFile>,
    /// The certificate as read back from disk
    pub certificate: ParsedCertificate,
}

/// Outcome of a complete issuance run
#[derive(Debug, Clone)]
pub struct IssuanceReport {
    /// Files in the order they were written
    pub files_created: Vec<GeneratedFile>,
    /// The issued leaf certificate as read back from disk
    pub certificate: ParsedCertificate,
}

impl IssuanceReport {
    /// First created file of the given type
    pub fn file(&self, file_type: FileType) -> Option<&GeneratedFile> {
        self.files_created.iter().find(|f| f.file_type == file_type)
    }
}

/// Outcome of root CA creation
#[derive(Debug, Clone)]
pub struct AuthorityCreated {
    /// The new, validated authority
    pub authority: CertificateAuthority,
    /// Key then certificate
    pub files_created: Vec<GeneratedFile>,
}
