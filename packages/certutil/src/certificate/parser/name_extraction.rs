//! Certificate name attribute extraction operations
//!
//! Values are decoded from the ASN.1 string types issuers use in practice.

use der::asn1::{Ia5StringRef, PrintableStringRef, Utf8StringRef};
use std::collections::HashMap;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::Name;

const OID_CN: &str = "2.5.4.3";
const OID_O: &str = "2.5.4.10";
const OID_OU: &str = "2.5.4.11";
const OID_C: &str = "2.5.4.6";
const OID_ST: &str = "2.5.4.8";
const OID_L: &str = "2.5.4.7";
const OID_EMAIL: &str = "1.2.840.113549.1.9.1";

/// Short attribute name for an OID, if it is one we render by name
fn short_name(oid: &str) -> Option<&'static str> {
    match oid {
        OID_CN => Some("CN"),
        OID_O => Some("O"),
        OID_OU => Some("OU"),
        OID_C => Some("C"),
        OID_ST => Some("ST"),
        OID_L => Some("L"),
        OID_EMAIL => Some("emailAddress"),
        _ => None,
    }
}

fn attribute_value(atv: &AttributeTypeAndValue) -> Option<String> {
    if let Ok(ps) = PrintableStringRef::try_from(&atv.value) {
        Some(ps.to_string())
    } else if let Ok(utf8s) = Utf8StringRef::try_from(&atv.value) {
        Some(utf8s.to_string())
    } else if let Ok(ia5s) = Ia5StringRef::try_from(&atv.value) {
        Some(ia5s.to_string())
    } else {
        None
    }
}

/// Map of short attribute name to value
///
/// Attributes without a short name are skipped. For repeated attributes the
/// last value wins.
pub fn extract_name_attributes(name: &Name) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    for rdn in &name.0 {
        for atv in rdn.0.iter() {
            let oid = atv.oid.to_string();
            if let (Some(key), Some(value)) = (short_name(&oid), attribute_value(atv)) {
                attrs.insert(key.to_string(), value);
            }
        }
    }
    attrs
}

/// Render a name in encoding order, e.g. `C=US, ST=New York, CN=localhost`
///
/// Unknown attribute types are shown by dotted OID.
pub fn render_name(name: &Name) -> String {
    let mut parts = Vec::new();
    for rdn in &name.0 {
        for atv in rdn.0.iter() {
            let oid = atv.oid.to_string();
            let key = short_name(&oid).map_or_else(|| oid.clone(), str::to_string);
            let value = attribute_value(atv).unwrap_or_else(|| "<binary>".to_string());
            parts.push(format!("{key}={value}"));
        }
    }
    parts.join(", ")
}
