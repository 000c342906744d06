//! Local certificate issuance
//!
//! Issues an RSA leaf certificate for `localhost` signed by a local root CA,
//! in three ordered steps that each read the previous step's file:
//!
//! 1. generate a 2048-bit RSA key (`localhost.key`, PKCS#1 PEM)
//! 2. create a PKCS#10 request for the fixed subject (`localhost.csr`)
//! 3. sign it with the root CA using an OpenSSL-style extension file
//!    (`localhost.pem`, valid for 1024 days)
//!
//! ```no_run
//! # async fn issue() -> certutil::Result<()> {
//! let report = certutil::Issuance::builder()
//!     .output_dir("out")
//!     .authority("rootCA.pem", "rootCA.key")
//!     .extensions_file("v3.ext")
//!     .build()?
//!     .run()
//!     .await?;
//! println!("issued {}", report.certificate.subject_dn);
//! # Ok(())
//! # }
//! ```

pub mod authority;
pub mod certificate;
pub mod cli;
pub mod config;
pub mod error;
pub mod extensions;
pub mod issuance;
pub mod key;
pub mod responses;
pub mod serial;
pub mod subject;
pub mod tls_config;

pub use authority::{AuthorityBuilder, CaMetadata, CaSource, CertificateAuthority};
pub use certificate::{ParsedCertificate, parse_certificate_from_der, parse_certificate_from_pem};
pub use config::IssuanceConfig;
pub use error::{CertError, Result};
pub use extensions::ExtensionProfile;
pub use issuance::{
    Issuance, IssuanceBuilder, SerialSource, SigningRequest, create_signing_request,
    generate_private_key, sign_request,
};
pub use key::{LEAF_KEY_BITS, RsaKey};
pub use responses::{AuthorityCreated, FileType, GeneratedFile, IssuanceReport, SignedCertificate};
pub use serial::{Serial, SerialFile};
pub use subject::Subject;
