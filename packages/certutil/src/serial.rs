//! CA serial number file
//!
//! Compatible with OpenSSL's `-CAserial` / `-CAcreateserial`: the file holds
//! the serial of the most recently issued certificate as hex followed by a
//! newline. A missing file starts from a random 128-bit serial.

use std::fmt;
use std::path::{Path, PathBuf};

use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::{CertError, Result};
use crate::issuance::file_ops::save_artifact;
use crate::responses::{FileType, GeneratedFile};

/// Largest DER-encoded serial number permitted for a certificate
pub const MAX_SERIAL_OCTETS: usize = 20;

const RANDOM_SERIAL_OCTETS: usize = 16;

/// A positive certificate serial number, stored as big-endian magnitude
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Serial(Vec<u8>);

impl Serial {
    /// Random positive 128-bit serial
    pub fn random() -> Self {
        let mut bytes = [0u8; RANDOM_SERIAL_OCTETS];
        OsRng.fill_bytes(&mut bytes);
        bytes[0] &= 0x7f;
        if bytes[0] == 0 {
            bytes[0] = 0x01;
        }
        Self(bytes.to_vec())
    }

    /// Build from big-endian bytes, dropping leading zero octets
    ///
    /// # Errors
    ///
    /// Returns `Serial` if the value is zero or its DER encoding would exceed
    /// twenty octets.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let start = bytes.iter().position(|&b| b != 0).ok_or_else(|| {
            CertError::Serial("serial number must be positive".to_string())
        })?;
        let serial = Self(bytes[start..].to_vec());
        if serial.encoded_len() > MAX_SERIAL_OCTETS {
            return Err(CertError::Serial(format!(
                "serial number {serial} is longer than {MAX_SERIAL_OCTETS} octets"
            )));
        }
        Ok(serial)
    }

    /// Parse hex as written by OpenSSL, e.g. `3F1A` or `0x3f1a`
    ///
    /// # Errors
    ///
    /// Returns `Serial` for empty, non-hex or out of range input.
    pub fn from_hex(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.is_empty() {
            return Err(CertError::Serial("serial number is empty".to_string()));
        }

        let padded = if digits.len() % 2 == 1 {
            format!("0{digits}")
        } else {
            digits.to_string()
        };
        let bytes = hex::decode(&padded)
            .map_err(|e| CertError::Serial(format!("invalid serial '{digits}': {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// The next serial in sequence
    ///
    /// # Errors
    ///
    /// Returns `Serial` if the incremented value no longer fits.
    pub fn next(&self) -> Result<Self> {
        let mut bytes = self.0.clone();
        let mut carry = true;
        for byte in bytes.iter_mut().rev() {
            let (sum, overflow) = byte.overflowing_add(1);
            *byte = sum;
            if !overflow {
                carry = false;
                break;
            }
        }
        if carry {
            bytes.insert(0, 0x01);
        }
        Self::from_bytes(&bytes)
    }

    /// Big-endian magnitude without leading zeros
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the DER INTEGER contents, including a sign octet if needed
    pub fn encoded_len(&self) -> usize {
        match self.0.first() {
            Some(b) if b & 0x80 != 0 => self.0.len() + 1,
            _ => self.0.len(),
        }
    }

    /// Uppercase hex with an even number of digits
    pub fn to_hex(&self) -> String {
        hex::encode_upper(&self.0)
    }
}

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<&Serial> for rcgen::SerialNumber {
    fn from(serial: &Serial) -> Self {
        rcgen::SerialNumber::from(serial.0.clone())
    }
}

/// Serial number store next to the CA certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialFile {
    path: PathBuf,
}

impl SerialFile {
    /// Use an explicit serial file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default serial file for a CA certificate: same path, `.srl` extension
    pub fn for_ca_certificate(ca_certificate: &Path) -> Self {
        Self::new(ca_certificate.with_extension("srl"))
    }

    /// Location of the serial file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serial to use for the next certificate
    ///
    /// Does not modify the file; call [`SerialFile::commit`] once the
    /// certificate has been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn next_serial(&self) -> Result<Serial> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let line = contents.lines().next().unwrap_or_default();
                let current = Serial::from_hex(line).map_err(|e| {
                    CertError::Serial(format!("{}: {e}", self.path.display()))
                })?;
                current.next()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    "Serial file {} not found, starting from a random serial",
                    self.path.display()
                );
                Ok(Serial::random())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Record `serial` as the most recently issued serial
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn commit(&self, serial: &Serial) -> Result<GeneratedFile> {
        let contents = format!("{}\n", serial.to_hex());
        save_artifact(&self.path, contents.as_bytes(), FileType::Serial).await
    }
}
