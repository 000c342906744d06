//! Certificate parsing implementation module
//!
//! - `core`: entry points from PEM or DER
//! - `name_extraction`: distinguished name attributes and rendering
//! - `details_extraction`: extensions, validity and key information

pub mod core;
pub mod details_extraction;
pub mod name_extraction;

pub use self::core::{parse_certificate_from_der, parse_certificate_from_pem};
