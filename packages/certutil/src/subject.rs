//! Leaf certificate subject
//!
//! The issued leaf always carries the same distinguished name. The type still
//! round-trips the OpenSSL `-subj` notation so requests produced elsewhere can
//! be described and compared.

use std::fmt;
use std::str::FromStr;

use rcgen::{DistinguishedName, DnType};
use serde::{Deserialize, Serialize};

use crate::error::CertError;

/// Distinguished name of a certificate subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Country (C)
    pub country: Option<String>,
    /// State or province (ST)
    pub state: Option<String>,
    /// Locality (L)
    pub locality: Option<String>,
    /// Organization (O)
    pub organization: Option<String>,
    /// Organizational unit (OU)
    pub organizational_unit: Option<String>,
    /// Common name (CN)
    pub common_name: String,
}

impl Default for Subject {
    /// The fixed subject of every issued leaf certificate
    fn default() -> Self {
        Self {
            country: Some("US".to_string()),
            state: Some("New York".to_string()),
            locality: Some("Brooklyn".to_string()),
            organization: Some("Example Brooklyn Company".to_string()),
            organizational_unit: None,
            common_name: "localhost".to_string(),
        }
    }
}

impl Subject {
    /// Subject with only a common name
    pub fn common_name(cn: impl Into<String>) -> Self {
        Self {
            country: None,
            state: None,
            locality: None,
            organization: None,
            organizational_unit: None,
            common_name: cn.into(),
        }
    }

    /// Attributes in issuance order, as `(short name, value)` pairs
    pub fn attributes(&self) -> Vec<(&'static str, &str)> {
        let mut attrs = Vec::with_capacity(6);
        let optional = [
            ("C", &self.country),
            ("ST", &self.state),
            ("L", &self.locality),
            ("O", &self.organization),
            ("OU", &self.organizational_unit),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                attrs.push((name, value.as_str()));
            }
        }
        attrs.push(("CN", self.common_name.as_str()));
        attrs
    }

    /// Comma-separated form, e.g. `C=US, ST=New York, CN=localhost`
    pub fn one_line(&self) -> String {
        self.attributes()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Build the rcgen distinguished name in issuance order
    pub fn to_distinguished_name(&self) -> DistinguishedName {
        let mut dn = DistinguishedName::new();
        for (name, value) in self.attributes() {
            let ty = match name {
                "C" => DnType::CountryName,
                "ST" => DnType::StateOrProvinceName,
                "L" => DnType::LocalityName,
                "O" => DnType::OrganizationName,
                "OU" => DnType::OrganizationalUnitName,
                _ => DnType::CommonName,
            };
            dn.push(ty, value);
        }
        dn
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), CertError> {
        let slot = match key {
            "C" => &mut self.country,
            "ST" => &mut self.state,
            "L" => &mut self.locality,
            "O" => &mut self.organization,
            "OU" => &mut self.organizational_unit,
            "CN" => {
                self.common_name = value;
                return Ok(());
            }
            other => {
                return Err(CertError::Subject(format!(
                    "unknown attribute type '{other}'"
                )));
            }
        };
        *slot = Some(value);
        Ok(())
    }
}

impl fmt::Display for Subject {
    /// OpenSSL `-subj` notation, with `/` inside values escaped
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.attributes() {
            write!(f, "/{name}={}", value.replace('/', "\\/"))?;
        }
        Ok(())
    }
}

impl FromStr for Subject {
    type Err = CertError;

    /// Parse OpenSSL `-subj` notation such as `/C=US/ST=New York/CN=localhost`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix('/')
            .ok_or_else(|| CertError::Subject("subject must start with '/'".to_string()))?;

        let mut subject = Subject::common_name(String::new());
        let mut seen_cn = false;

        for component in split_unescaped(body) {
            let (key, value) = component.split_once('=').ok_or_else(|| {
                CertError::Subject(format!("component '{component}' is missing '='"))
            })?;
            let key = key.trim();
            if key.is_empty() || value.is_empty() {
                return Err(CertError::Subject(format!(
                    "component '{component}' has an empty name or value"
                )));
            }
            seen_cn |= key == "CN";
            subject.set(key, value.to_string())?;
        }

        if !seen_cn || subject.common_name.is_empty() {
            return Err(CertError::Subject("subject has no CN".to_string()));
        }
        Ok(subject)
    }
}

/// Split on `/` while honouring `\/` escapes
fn split_unescaped(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '/' => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}
