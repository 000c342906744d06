//! Certificate authority loading and creation
//!
//! - `core`: the `CertificateAuthority` domain object and its validation
//! - `filesystem`: reading a CA from disk and creating a new root CA

pub mod core;
pub mod filesystem;

pub use self::core::{AuthorityBuilder, CaMetadata, CaSource, CertificateAuthority};
pub use filesystem::{AuthorityFilesystemBuilder, DEFAULT_CA_CERTIFICATE, DEFAULT_CA_KEY};
