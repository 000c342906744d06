//! X.509 v3 extension files
//!
//! Parses the subset of OpenSSL's `x509v3_config` format that leaf issuance
//! needs: the unnamed top section lists the extensions, named sections hold
//! `subjectAltName = @section` entries.
//!
//! ```text
//! authorityKeyIdentifier=keyid,issuer
//! basicConstraints=CA:FALSE
//! keyUsage = digitalSignature, keyEncipherment
//! subjectAltName = @alt_names
//!
//! [alt_names]
//! DNS.1 = localhost
//! ```

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;

use rcgen::{
    BasicConstraints, CertificateParams, ExtendedKeyUsagePurpose, IsCa, KeyUsagePurpose, SanType,
};

use crate::error::{CertError, Result};

/// Basic constraints requested by an extension file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicConstraintsSpec {
    /// `CA:FALSE`, emitted explicitly
    EndEntity,
    /// `CA:TRUE` with an optional `pathlen`
    Authority {
        /// Maximum number of intermediate CAs below this one
        path_len: Option<u8>,
    },
}

/// Extensions to place on an issued certificate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionProfile {
    /// `basicConstraints`, omitted from the certificate when `None`
    pub basic_constraints: Option<BasicConstraintsSpec>,
    /// `keyUsage` flags
    pub key_usages: Vec<KeyUsagePurpose>,
    /// `extendedKeyUsage` purposes
    pub extended_key_usages: Vec<ExtendedKeyUsagePurpose>,
    /// `subjectAltName` entries in file order
    pub subject_alt_names: Vec<SanType>,
    /// Emit `authorityKeyIdentifier`
    pub authority_key_identifier: bool,
    /// Extensions whose `critical` marking the issued certificate overrides
    pub criticality_overrides: Vec<String>,
}

#[derive(Debug)]
struct Entry {
    line: usize,
    key: String,
    value: String,
}

impl ExtensionProfile {
    /// Read and parse an extension file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails to parse.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        let profile = Self::parse(&text)?;
        tracing::debug!(
            "Loaded extension profile from {} ({} SAN entries)",
            path.display(),
            profile.subject_alt_names.len()
        );
        Ok(profile)
    }

    /// Parse extension file text
    ///
    /// Criticality is fixed by the signer: `basicConstraints` and `keyUsage`
    /// are always critical, `extendedKeyUsage` and `subjectAltName` never
    /// are. Where the file asks otherwise the extension is listed in
    /// `criticality_overrides` and a warning is logged.
    ///
    /// # Errors
    ///
    /// Returns `CertError::ExtensionFile` naming the offending line for
    /// malformed lines, unknown flags, unknown SAN types and references to
    /// missing sections. Unknown extension names are skipped with a warning.
    pub fn parse(text: &str) -> Result<Self> {
        let sections = split_sections(text)?;
        let mut profile = Self::default();
        let mut seen: Vec<&str> = Vec::new();

        let Some(top) = sections.get("") else {
            return Ok(profile);
        };

        for entry in top {
            if seen.contains(&entry.key.as_str()) {
                return Err(CertError::extension(
                    entry.line,
                    format!("duplicate extension '{}'", entry.key),
                ));
            }
            seen.push(entry.key.as_str());
            check_criticality(entry, &mut profile.criticality_overrides);

            match entry.key.as_str() {
                "basicConstraints" => {
                    profile.basic_constraints = Some(parse_basic_constraints(entry)?);
                }
                "keyUsage" => {
                    profile.key_usages = flags(&entry.value)
                        .map(|flag| parse_key_usage(entry.line, flag))
                        .collect::<Result<_>>()?;
                }
                "extendedKeyUsage" => {
                    profile.extended_key_usages = flags(&entry.value)
                        .map(|flag| parse_extended_key_usage(entry.line, flag))
                        .collect::<Result<_>>()?;
                }
                "subjectAltName" => {
                    profile.subject_alt_names = parse_subject_alt_names(entry, &sections)?;
                }
                "authorityKeyIdentifier" => {
                    for flag in flags(&entry.value) {
                        match flag.split(':').next().unwrap_or(flag) {
                            "keyid" | "issuer" => {}
                            other => {
                                return Err(CertError::extension(
                                    entry.line,
                                    format!("unknown authorityKeyIdentifier option '{other}'"),
                                ));
                            }
                        }
                    }
                    profile.authority_key_identifier = true;
                }
                "subjectKeyIdentifier" => {
                    if entry.value.trim() != "hash" {
                        tracing::warn!(
                            "Line {}: subjectKeyIdentifier '{}' ignored, the identifier is always derived from the key hash",
                            entry.line,
                            entry.value
                        );
                    }
                }
                other => {
                    tracing::warn!("Line {}: skipping unsupported extension '{other}'", entry.line);
                }
            }
        }

        Ok(profile)
    }

    /// Replace the extension fields of `params` with this profile
    pub fn apply(&self, params: &mut CertificateParams) {
        params.is_ca = match self.basic_constraints {
            None => IsCa::NoCa,
            Some(BasicConstraintsSpec::EndEntity) => IsCa::ExplicitNoCa,
            Some(BasicConstraintsSpec::Authority { path_len: None }) => {
                IsCa::Ca(BasicConstraints::Unconstrained)
            }
            Some(BasicConstraintsSpec::Authority { path_len: Some(n) }) => {
                IsCa::Ca(BasicConstraints::Constrained(n))
            }
        };
        params.key_usages = self.key_usages.clone();
        params.extended_key_usages = self.extended_key_usages.clone();
        params.subject_alt_names = self.subject_alt_names.clone();
        params.use_authority_key_identifier_extension = self.authority_key_identifier;
    }
}

/// Group `key = value` lines by section; the unnamed top section is `""`
fn split_sections(text: &str) -> Result<HashMap<String, Vec<Entry>>> {
    let mut sections: HashMap<String, Vec<Entry>> = HashMap::new();
    let mut current = String::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or_else(|| CertError::extension(line_no, "unterminated section header"))?
                .trim();
            if name.is_empty() {
                return Err(CertError::extension(line_no, "empty section name"));
            }
            current = name.to_string();
            sections.entry(current.clone()).or_default();
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| CertError::extension(line_no, format!("expected 'name = value', got '{line}'")))?;
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            return Err(CertError::extension(line_no, "empty name or value"));
        }

        sections.entry(current.clone()).or_default().push(Entry {
            line: line_no,
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    Ok(sections)
}

/// Record and warn about a `critical` marking that will not be honoured
fn check_criticality(entry: &Entry, overrides: &mut Vec<String>) {
    let emitted_critical = match entry.key.as_str() {
        "basicConstraints" | "keyUsage" => true,
        "extendedKeyUsage" | "subjectAltName" => false,
        _ => return,
    };
    let requested_critical = entry.value.split(',').any(|f| f.trim() == "critical");
    if requested_critical != emitted_critical {
        tracing::warn!(
            "Line {}: {} will be emitted as {}",
            entry.line,
            entry.key,
            if emitted_critical { "critical" } else { "non-critical" }
        );
        overrides.push(entry.key.clone());
    }
}

/// Comma-separated flags with the leading `critical` marker dropped
fn flags(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty() && *f != "critical")
}

fn parse_basic_constraints(entry: &Entry) -> Result<BasicConstraintsSpec> {
    let mut is_ca = None;
    let mut path_len = None;

    for flag in flags(&entry.value) {
        let (name, value) = flag.split_once(':').ok_or_else(|| {
            CertError::extension(entry.line, format!("malformed basicConstraints value '{flag}'"))
        })?;
        match name.trim() {
            "CA" => {
                is_ca = Some(match value.trim().to_ascii_uppercase().as_str() {
                    "TRUE" => true,
                    "FALSE" => false,
                    other => {
                        return Err(CertError::extension(
                            entry.line,
                            format!("CA must be TRUE or FALSE, got '{other}'"),
                        ));
                    }
                });
            }
            "pathlen" => {
                let n = value.trim().parse::<u8>().map_err(|_| {
                    CertError::extension(entry.line, format!("invalid pathlen '{}'", value.trim()))
                })?;
                path_len = Some(n);
            }
            other => {
                return Err(CertError::extension(
                    entry.line,
                    format!("unknown basicConstraints field '{other}'"),
                ));
            }
        }
    }

    match (is_ca, path_len) {
        (Some(true), path_len) => Ok(BasicConstraintsSpec::Authority { path_len }),
        (Some(false), None) => Ok(BasicConstraintsSpec::EndEntity),
        (Some(false), Some(_)) => Err(CertError::extension(
            entry.line,
            "pathlen is only allowed with CA:TRUE",
        )),
        (None, _) => Err(CertError::extension(entry.line, "basicConstraints requires CA:TRUE or CA:FALSE")),
    }
}

fn parse_key_usage(line: usize, flag: &str) -> Result<KeyUsagePurpose> {
    Ok(match flag {
        "digitalSignature" => KeyUsagePurpose::DigitalSignature,
        "nonRepudiation" | "contentCommitment" => KeyUsagePurpose::ContentCommitment,
        "keyEncipherment" => KeyUsagePurpose::KeyEncipherment,
        "dataEncipherment" => KeyUsagePurpose::DataEncipherment,
        "keyAgreement" => KeyUsagePurpose::KeyAgreement,
        "keyCertSign" => KeyUsagePurpose::KeyCertSign,
        "cRLSign" => KeyUsagePurpose::CrlSign,
        "encipherOnly" => KeyUsagePurpose::EncipherOnly,
        "decipherOnly" => KeyUsagePurpose::DecipherOnly,
        other => {
            return Err(CertError::extension(line, format!("unknown keyUsage '{other}'")));
        }
    })
}

fn parse_extended_key_usage(line: usize, flag: &str) -> Result<ExtendedKeyUsagePurpose> {
    Ok(match flag {
        "serverAuth" => ExtendedKeyUsagePurpose::ServerAuth,
        "clientAuth" => ExtendedKeyUsagePurpose::ClientAuth,
        "codeSigning" => ExtendedKeyUsagePurpose::CodeSigning,
        "emailProtection" => ExtendedKeyUsagePurpose::EmailProtection,
        "timeStamping" => ExtendedKeyUsagePurpose::TimeStamping,
        "OCSPSigning" => ExtendedKeyUsagePurpose::OcspSigning,
        "anyExtendedKeyUsage" => ExtendedKeyUsagePurpose::Any,
        dotted if dotted.contains('.') => {
            let arcs = dotted
                .split('.')
                .map(str::parse::<u64>)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|_| {
                    CertError::extension(line, format!("invalid extendedKeyUsage OID '{dotted}'"))
                })?;
            ExtendedKeyUsagePurpose::Other(arcs)
        }
        other => {
            return Err(CertError::extension(
                line,
                format!("unknown extendedKeyUsage '{other}'"),
            ));
        }
    })
}

fn parse_subject_alt_names(
    entry: &Entry,
    sections: &HashMap<String, Vec<Entry>>,
) -> Result<Vec<SanType>> {
    let mut names = Vec::new();

    for flag in flags(&entry.value) {
        if let Some(section_name) = flag.strip_prefix('@') {
            let section = sections.get(section_name.trim()).ok_or_else(|| {
                CertError::extension(
                    entry.line,
                    format!("subjectAltName refers to missing section '{section_name}'"),
                )
            })?;
            for item in section {
                // DNS.1 = localhost
                let kind = item.key.split('.').next().unwrap_or(&item.key);
                names.push(san_entry(item.line, kind, &item.value)?);
            }
        } else {
            let (kind, value) = flag.split_once(':').ok_or_else(|| {
                CertError::extension(entry.line, format!("malformed subjectAltName entry '{flag}'"))
            })?;
            names.push(san_entry(entry.line, kind.trim(), value.trim())?);
        }
    }

    Ok(names)
}

fn san_entry(line: usize, kind: &str, value: &str) -> Result<SanType> {
    let invalid =
        |e: rcgen::Error| CertError::extension(line, format!("invalid {kind} name '{value}': {e}"));

    Ok(match kind {
        "DNS" => SanType::DnsName(value.to_string().try_into().map_err(invalid)?),
        "IP" => SanType::IpAddress(value.parse::<IpAddr>().map_err(|e| {
            CertError::extension(line, format!("invalid IP address '{value}': {e}"))
        })?),
        "email" => SanType::Rfc822Name(value.to_string().try_into().map_err(invalid)?),
        "URI" => SanType::URI(value.to_string().try_into().map_err(invalid)?),
        other => {
            return Err(CertError::extension(
                line,
                format!("unsupported subjectAltName type '{other}'"),
            ));
        }
    })
}
