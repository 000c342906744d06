//! CLI command definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::issuance::DEFAULT_VALIDITY_DAYS;

/// Top-level command line
#[derive(Parser)]
#[command(name = "certutil")]
#[command(about = "Issue a localhost certificate signed by a local root CA")]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Operation to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Serial number handling shared by `issue` and `sign`
#[derive(Clone, Debug, Args)]
pub struct SerialArgs {
    /// Serial file to read and update (default: CA certificate path with .srl)
    #[arg(long, conflicts_with = "no_serial_file")]
    pub serial_file: Option<PathBuf>,

    /// Issue a random serial and do not read or write a serial file
    #[arg(long)]
    pub no_serial_file: bool,
}

/// Subcommands
#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Run the full issuance sequence
    ///
    /// Generates <name>.key, creates <name>.csr for the fixed subject
    /// C=US, ST=New York, L=Brooklyn, O=Example Brooklyn Company, CN=localhost
    /// and signs it with the root CA into <name>.pem. Each step only runs once
    /// the previous artifact exists; the first failure stops the sequence.
    ///
    /// Values come from the optional JSON --config file; flags override them.
    ///
    /// Example usage:
    ///   certutil issue
    ///   certutil issue --ca-cert ca/rootCA.pem --ca-key ca/rootCA.key --output-dir out
    Issue {
        /// JSON configuration file
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Directory for the generated artifacts (default: .)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// File stem of the generated artifacts (default: localhost)
        #[arg(long)]
        name: Option<String>,

        /// Root CA certificate (default: rootCA.pem)
        #[arg(long)]
        ca_cert: Option<PathBuf>,

        /// Root CA private key (default: rootCA.key)
        #[arg(long)]
        ca_key: Option<PathBuf>,

        /// X.509 v3 extension file (default: v3.ext)
        #[arg(long)]
        extfile: Option<PathBuf>,

        /// Certificate validity in days (default: 1024)
        #[arg(long)]
        days: Option<u32>,

        #[command(flatten)]
        serial: SerialArgs,
    },

    /// Generate a 2048-bit RSA private key (PKCS#1 PEM)
    Genkey {
        /// Output key file
        #[arg(long, default_value = "localhost.key")]
        out: PathBuf,
    },

    /// Create a signing request for the fixed localhost subject
    Csr {
        /// Private key to sign the request with
        #[arg(long, default_value = "localhost.key")]
        key: PathBuf,

        /// Output request file
        #[arg(long, default_value = "localhost.csr")]
        out: PathBuf,
    },

    /// Sign a request with the root CA
    Sign {
        /// Signing request to sign
        #[arg(long, default_value = "localhost.csr")]
        csr: PathBuf,

        /// Root CA certificate
        #[arg(long, default_value = "rootCA.pem")]
        ca_cert: PathBuf,

        /// Root CA private key
        #[arg(long, default_value = "rootCA.key")]
        ca_key: PathBuf,

        /// X.509 v3 extension file
        #[arg(long, default_value = "v3.ext")]
        extfile: PathBuf,

        /// Output certificate file
        #[arg(long, default_value = "localhost.pem")]
        out: PathBuf,

        /// Certificate validity in days
        #[arg(long, default_value_t = DEFAULT_VALIDITY_DAYS)]
        days: u32,

        #[command(flatten)]
        serial: SerialArgs,
    },

    /// Create a self-signed root CA (rootCA.key and rootCA.pem)
    ///
    /// Example usage:
    ///   certutil init-ca --dir ca --cn "Local Development Root"
    InitCa {
        /// Directory receiving rootCA.key and rootCA.pem
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Common name of the root (default: "certutil Root CA")
        #[arg(long)]
        cn: Option<String>,

        /// Validity in days
        #[arg(long, default_value_t = DEFAULT_VALIDITY_DAYS)]
        days: u32,

        /// Replace existing CA files
        #[arg(long)]
        force: bool,
    },

    /// Print the contents of a certificate
    ///
    /// With --ca, also checks that the certificate was issued by that CA.
    Inspect {
        /// Certificate file (PEM)
        #[arg(default_value = "localhost.pem")]
        certificate: PathBuf,

        /// CA certificate expected to be the issuer
        #[arg(long)]
        ca: Option<PathBuf>,
    },
}
