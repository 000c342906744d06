//! RSA private key generation and loading
//!
//! Leaf keys are always 2048-bit RSA and are stored as PKCS#1 PEM
//! (`RSA PRIVATE KEY`), the form the consuming TLS server reads. Loading also
//! accepts unencrypted PKCS#8 so externally produced CA keys work.

use std::path::Path;
use std::time::Instant;

use certutil_common::LoggingTransformer;
use rand::rngs::OsRng;
use rcgen::KeyPair;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding};
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use rustls::pki_types::PrivatePkcs8KeyDer;

use crate::error::{CertError, Result};

/// Modulus size of every generated leaf key
pub const LEAF_KEY_BITS: usize = 2048;

const PKCS1_TAG: &str = "RSA PRIVATE KEY";
const PKCS8_TAG: &str = "PRIVATE KEY";
const ENCRYPTED_PKCS8_TAG: &str = "ENCRYPTED PRIVATE KEY";

/// RSA private key used for requests and signing
#[derive(Clone)]
pub struct RsaKey {
    inner: RsaPrivateKey,
}

impl std::fmt::Debug for RsaKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaKey").field("bits", &self.bits()).finish()
    }
}

impl RsaKey {
    /// Generate a fresh leaf key on the blocking pool
    ///
    /// # Errors
    ///
    /// Returns an error if the RNG fails or the blocking task is cancelled.
    pub async fn generate() -> Result<Self> {
        tokio::task::spawn_blocking(|| Self::generate_with_bits(LEAF_KEY_BITS))
            .await
            .map_err(|e| CertError::KeyGeneration(format!("key generation task failed: {e}")))?
    }

    pub(crate) fn generate_with_bits(bits: usize) -> Result<Self> {
        let started = Instant::now();
        let result = RsaPrivateKey::new(&mut OsRng, bits);
        LoggingTransformer::log_performance_metric(
            &format!("rsa-{bits} generation"),
            started.elapsed(),
            result.is_ok(),
        );

        let inner = result.map_err(|e| {
            LoggingTransformer::log_crypto_error("rsa key generation", &e);
            CertError::KeyGeneration(format!("RSA key generation failed: {e}"))
        })?;
        Ok(Self { inner })
    }

    /// Parse an unencrypted PKCS#1 or PKCS#8 RSA private key from PEM
    ///
    /// # Errors
    ///
    /// Returns an error if no private key block is present, the key is
    /// encrypted, or the key is not RSA.
    pub fn from_pem(pem_data: &str) -> Result<Self> {
        let blocks = pem::parse_many(pem_data)
            .map_err(|e| CertError::key_format(format!("Failed to parse PEM: {e}")))?;

        let block = blocks
            .iter()
            .find(|b| b.tag().ends_with(PKCS8_TAG))
            .ok_or_else(|| CertError::key_format("No private key in PEM data"))?;

        let inner = match block.tag() {
            PKCS1_TAG => RsaPrivateKey::from_pkcs1_der(block.contents())
                .map_err(|e| CertError::key_format(format!("Invalid PKCS#1 key: {e}")))?,
            PKCS8_TAG => RsaPrivateKey::from_pkcs8_der(block.contents()).map_err(|e| {
                CertError::UnsupportedKey(format!("PKCS#8 key is not a usable RSA key: {e}"))
            })?,
            ENCRYPTED_PKCS8_TAG => {
                return Err(CertError::UnsupportedKey(
                    "encrypted private keys are not supported".to_string(),
                ));
            }
            other => {
                return Err(CertError::UnsupportedKey(format!(
                    "'{other}' keys are not supported, expected RSA"
                )));
            }
        };
        Ok(Self { inner })
    }

    /// Read and parse a private key file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not hold an RSA key.
    pub async fn load(path: &Path) -> Result<Self> {
        let pem_data = tokio::fs::read_to_string(path).await?;
        let key = Self::from_pem(&pem_data)?;
        tracing::debug!("Loaded {}-bit RSA key from {}", key.bits(), path.display());
        Ok(key)
    }

    /// Encode as PKCS#1 PEM with LF line endings
    ///
    /// # Errors
    ///
    /// Returns an error if DER encoding fails.
    pub fn to_pkcs1_pem(&self) -> Result<String> {
        let pem = self
            .inner
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| CertError::key_format(format!("Private key encoding failed: {e}")))?;
        Ok(pem.as_str().to_owned())
    }

    /// DER-encoded PKCS#1 `RSAPublicKey`, as carried in a certificate's SPKI
    ///
    /// # Errors
    ///
    /// Returns an error if DER encoding fails.
    pub fn public_key_pkcs1_der(&self) -> Result<Vec<u8>> {
        let public = RsaPublicKey::from(&self.inner);
        let der = public
            .to_pkcs1_der()
            .map_err(|e| CertError::key_format(format!("Public key encoding failed: {e}")))?;
        Ok(der.as_bytes().to_vec())
    }

    /// rcgen signing key using `sha256WithRSAEncryption`
    ///
    /// # Errors
    ///
    /// Returns an error if PKCS#8 encoding fails or rcgen rejects the key.
    pub fn signing_key(&self) -> Result<KeyPair> {
        let pkcs8 = self
            .inner
            .to_pkcs8_der()
            .map_err(|e| CertError::key_format(format!("PKCS#8 encoding failed: {e}")))?;
        let der = PrivatePkcs8KeyDer::from(pkcs8.as_bytes());
        Ok(KeyPair::from_pkcs8_der_and_sign_algo(
            &der,
            &rcgen::PKCS_RSA_SHA256,
        )?)
    }

    /// Modulus size in bits
    pub fn bits(&self) -> usize {
        self.inner.size() * 8
    }
}
