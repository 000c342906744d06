//! CLI module for command-line interface functionality

pub mod authority_ops;
pub mod commands;
pub mod inspect_ops;
pub mod issue_ops;

pub use commands::{Cli, Commands, SerialArgs};

/// Process the CLI command
///
/// # Errors
///
/// Returns the failing operation's error with context for display.
pub async fn process_command(command: Commands, use_json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Issue {
            config,
            output_dir,
            name,
            ca_cert,
            ca_key,
            extfile,
            days,
            serial,
        } => {
            let overrides = issue_ops::IssueOverrides {
                output_dir,
                name,
                ca_cert,
                ca_key,
                extfile,
                days,
                serial,
            };
            issue_ops::handle_issue(config.as_deref(), overrides, use_json).await
        }
        Commands::Genkey { out } => issue_ops::handle_genkey(&out, use_json).await,
        Commands::Csr { key, out } => issue_ops::handle_csr(&key, &out, use_json).await,
        Commands::Sign {
            csr,
            ca_cert,
            ca_key,
            extfile,
            out,
            days,
            serial,
        } => {
            let request =
                issue_ops::signing_request(csr, ca_cert, ca_key, extfile, out, days, serial);
            issue_ops::handle_sign(request, use_json).await
        }
        Commands::InitCa {
            dir,
            cn,
            days,
            force,
        } => authority_ops::handle_init_ca(&dir, cn.as_deref(), days, force, use_json).await,
        Commands::Inspect { certificate, ca } => {
            inspect_ops::handle_inspect(&certificate, ca.as_deref(), use_json).await
        }
    }
}
