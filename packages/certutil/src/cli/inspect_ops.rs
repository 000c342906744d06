//! Certificate inspection command

use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, bail};
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::certificate::{ParsedCertificate, parse_certificate_from_pem};

/// RFC 3339 rendering of a certificate time
pub fn format_time(t: SystemTime) -> String {
    OffsetDateTime::from(t)
        .format(&Rfc3339)
        .unwrap_or_else(|_| format!("{t:?}"))
}

async fn read_certificate(path: &Path) -> anyhow::Result<ParsedCertificate> {
    let pem = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_certificate_from_pem(&pem).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_certificate(cert: &ParsedCertificate) {
    println!("Subject:      {}", cert.subject_dn);
    println!("Issuer:       {}", cert.issuer_dn);
    println!("Serial:       {}", cert.serial_hex());
    println!("Not before:   {}", format_time(cert.not_before));
    println!(
        "Not after:    {} ({} days)",
        format_time(cert.not_after),
        cert.validity_days()
    );
    println!("CA:           {}", cert.is_ca);
    if !cert.key_usage.is_empty() {
        println!("Key usage:    {}", cert.key_usage.join(", "));
    }
    if !cert.extended_key_usage.is_empty() {
        println!("Ext key use:  {}", cert.extended_key_usage.join(", "));
    }
    let sans: Vec<String> = cert
        .san_dns_names
        .iter()
        .map(|d| format!("DNS:{d}"))
        .chain(cert.san_ip_addresses.iter().map(|ip| format!("IP:{ip}")))
        .collect();
    if !sans.is_empty() {
        println!("Alt names:    {}", sans.join(", "));
    }
    match cert.key_size {
        Some(bits) => println!("Public key:   {} {bits} bit", cert.key_algorithm),
        None => println!("Public key:   {}", cert.key_algorithm),
    }
    println!("SHA-256:      {}", cert.fingerprint_sha256());
}

/// Print a certificate, optionally checking it against its CA
///
/// # Errors
///
/// Returns an error if a file cannot be parsed or the certificate was not
/// issued by `ca`.
pub async fn handle_inspect(
    certificate: &Path,
    ca: Option<&Path>,
    use_json: bool,
) -> anyhow::Result<()> {
    let cert = read_certificate(certificate).await?;
    let issued_by_ca = match ca {
        Some(ca_path) => Some(cert.is_issued_by(&read_certificate(ca_path).await?)),
        None => None,
    };

    if use_json {
        println!(
            "{}",
            json!({
                "success": issued_by_ca.unwrap_or(true),
                "operation": "inspect",
                "subject": cert.subject_dn,
                "issuer": cert.issuer_dn,
                "serial_number": cert.serial_hex(),
                "not_before": format_time(cert.not_before),
                "not_after": format_time(cert.not_after),
                "validity_days": cert.validity_days(),
                "is_ca": cert.is_ca,
                "key_usage": cert.key_usage,
                "extended_key_usage": cert.extended_key_usage,
                "san_dns_names": cert.san_dns_names,
                "san_ip_addresses": cert.san_ip_addresses,
                "key_algorithm": cert.key_algorithm,
                "key_size": cert.key_size,
                "fingerprint_sha256": cert.fingerprint_sha256(),
                "issued_by_ca": issued_by_ca,
            })
        );
    } else {
        print_certificate(&cert);
        if let Some(ok) = issued_by_ca {
            println!("Issued by CA: {}", if ok { "yes" } else { "no" });
        }
    }

    if issued_by_ca == Some(false) {
        bail!(
            "{} was not issued by the given CA (issuer: {})",
            certificate.display(),
            cert.issuer_dn
        );
    }
    Ok(())
}
