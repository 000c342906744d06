//! Leaf certificate issuance
//!
//! - `core`: the issuance builder and step sequence
//! - `steps`: private key and signing request generation
//! - `signing`: signing a request with the CA
//! - `file_ops`: atomic artifact writes

pub mod core;
pub mod file_ops;
pub mod signing;
pub mod steps;

pub use self::core::{Issuance, IssuanceBuilder};
pub use signing::{
    DEFAULT_VALIDITY_DAYS, MAX_VALIDITY_DAYS, SerialSource, SigningRequest, sign_request,
};
pub use steps::{create_signing_request, generate_private_key};
