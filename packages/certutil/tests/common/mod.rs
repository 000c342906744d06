//! Shared fixtures for certutil integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use certutil::{AuthorityBuilder, AuthorityCreated, IssuanceConfig};
use certutil_common::LoggingTransformer;

/// Extension file shipped with the crate
pub const DEFAULT_EXTENSIONS: &str = include_str!("../../assets/v3.ext");

pub const ROOT_COMMON_NAME: &str = "Test Root CA";

/// Create a root CA in `dir/ca`
pub async fn create_root_ca(dir: &Path) -> AuthorityCreated {
    LoggingTransformer::init_test();
    AuthorityBuilder::new("test-root")
        .path(dir.join("ca"))
        .common_name(ROOT_COMMON_NAME)
        .create()
        .await
        .expect("Failed to create root CA")
}

/// Write the default extension file into `dir`
pub fn write_extensions(dir: &Path) -> PathBuf {
    let path = dir.join("v3.ext");
    std::fs::write(&path, DEFAULT_EXTENSIONS).expect("Failed to write extension file");
    path
}

/// Configuration issuing into `dir/out` with the CA from [`create_root_ca`]
pub fn config_for(dir: &Path) -> IssuanceConfig {
    IssuanceConfig {
        output_dir: dir.join("out"),
        ca_certificate: dir.join("ca").join("rootCA.pem"),
        ca_private_key: dir.join("ca").join("rootCA.key"),
        extensions_file: dir.join("v3.ext"),
        ..IssuanceConfig::default()
    }
}
