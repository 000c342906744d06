//! Certificate signing operations
//!
//! Signs a PKCS#10 request with the CA the way `openssl x509 -req` does:
//! the subject and public key come from the request, every extension comes
//! from the extension file, and the issuer is the CA certificate's subject.

use std::path::PathBuf;

use certutil_common::LoggingTransformer;
use time::OffsetDateTime;

use crate::authority::CertificateAuthority;
use crate::certificate::parse_certificate_from_pem;
use crate::error::{CertError, Result};
use crate::extensions::ExtensionProfile;
use crate::issuance::file_ops::save_artifact;
use crate::issuance::steps::load_signing_request;
use crate::responses::{FileType, SignedCertificate};
use crate::serial::{Serial, SerialFile};

/// Default leaf validity in days
pub const DEFAULT_VALIDITY_DAYS: u32 = 1024;

/// Longest accepted validity, one hundred years
pub const MAX_VALIDITY_DAYS: u32 = 36_525;

/// Where the certificate serial number comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialSource {
    /// Next value from a serial file, written back after issuance
    File(SerialFile),
    /// A fresh random serial, nothing is written
    Random,
}

/// Inputs for signing one request
#[derive(Debug, Clone)]
pub struct SigningRequest {
    /// PKCS#10 request to sign
    pub csr: PathBuf,
    /// Root CA certificate (PEM)
    pub ca_certificate: PathBuf,
    /// Root CA private key (PEM)
    pub ca_private_key: PathBuf,
    /// OpenSSL-style extension file
    pub extensions_file: PathBuf,
    /// Where the signed certificate is written
    pub output: PathBuf,
    /// Validity period in days
    pub validity_days: u32,
    /// Serial number source
    pub serial: SerialSource,
}

impl SigningRequest {
    /// Request with the default validity and a serial file next to the CA
    pub fn new(
        csr: impl Into<PathBuf>,
        ca_certificate: impl Into<PathBuf>,
        ca_private_key: impl Into<PathBuf>,
        extensions_file: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        let ca_certificate = ca_certificate.into();
        Self {
            csr: csr.into(),
            serial: SerialSource::File(SerialFile::for_ca_certificate(&ca_certificate)),
            ca_certificate,
            ca_private_key: ca_private_key.into(),
            extensions_file: extensions_file.into(),
            output: output.into(),
            validity_days: DEFAULT_VALIDITY_DAYS,
        }
    }

    /// Set the validity period in days
    #[must_use]
    pub fn validity_days(self, validity_days: u32) -> Self {
        Self {
            validity_days,
            ..self
        }
    }

    /// Set the serial number source
    #[must_use]
    pub fn serial(self, serial: SerialSource) -> Self {
        Self { serial, ..self }
    }
}

/// Validity window starting now, truncated to whole seconds
///
/// # Errors
///
/// Returns `Config` if `days` is zero, above [`MAX_VALIDITY_DAYS`] or the
/// end date is not representable.
pub(crate) fn validity_window(days: u32) -> Result<(OffsetDateTime, OffsetDateTime)> {
    check_validity_days(days)?;
    let not_before = OffsetDateTime::now_utc()
        .replace_nanosecond(0)
        .map_err(|e| CertError::Config(format!("invalid system time: {e}")))?;
    let not_after = not_before
        .checked_add(time::Duration::days(i64::from(days)))
        .ok_or_else(|| CertError::Config(format!("validity of {days} days is out of range")))?;
    Ok((not_before, not_after))
}

/// Reject validity periods outside `1..=MAX_VALIDITY_DAYS`
///
/// # Errors
///
/// Returns `Config` for zero or an overlong period.
pub fn check_validity_days(days: u32) -> Result<()> {
    if days == 0 {
        return Err(CertError::Config(
            "validity must be at least one day".to_string(),
        ));
    }
    if days > MAX_VALIDITY_DAYS {
        return Err(CertError::Config(format!(
            "validity of {days} days exceeds the maximum of {MAX_VALIDITY_DAYS}"
        )));
    }
    Ok(())
}

/// Sign a request with the CA and write the certificate
///
/// The CA is validated and the extension file parsed before the request is
/// read. The certificate is written atomically; the serial file is only
/// updated once the certificate is on disk.
///
/// # Errors
///
/// Returns the first failure: missing or invalid CA material, a malformed
/// extension file, an invalid request, a signing failure or an I/O error.
/// No certificate file exists after an error.
pub async fn sign_request(request: SigningRequest) -> Result<SignedCertificate> {
    let authority =
        CertificateAuthority::load(&request.ca_certificate, &request.ca_private_key).await?;
    let profile = ExtensionProfile::load(&request.extensions_file).await?;
    let mut csr = load_signing_request(&request.csr).await?;

    let serial = match &request.serial {
        SerialSource::File(file) => file.next_serial().await?,
        SerialSource::Random => Serial::random(),
    };
    let (not_before, not_after) = validity_window(request.validity_days)?;

    profile.apply(&mut csr.params);
    csr.params.custom_extensions.clear();
    csr.params.serial_number = Some((&serial).into());
    csr.params.not_before = not_before;
    csr.params.not_after = not_after;

    let issuer = authority.issuer()?;
    let cert = csr.signed_by(&issuer)?;

    let certificate_file =
        save_artifact(&request.output, cert.pem().as_bytes(), FileType::Certificate).await?;

    let serial_file = match &request.serial {
        SerialSource::File(file) => Some(file.commit(&serial).await?),
        SerialSource::Random => None,
    };

    let written = tokio::fs::read_to_string(&request.output).await?;
    let certificate = parse_certificate_from_pem(&written)?;
    LoggingTransformer::log_issued_certificate(
        &certificate.subject_dn,
        &certificate.issuer_dn,
        &certificate.der,
    );

    Ok(SignedCertificate {
        certificate_file,
        serial_file,
        certificate,
    })
}
