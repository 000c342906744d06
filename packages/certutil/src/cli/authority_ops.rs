//! Root CA creation command

use std::path::Path;

use anyhow::Context;
use serde_json::json;

use crate::authority::AuthorityBuilder;

const DEFAULT_ROOT_COMMON_NAME: &str = "certutil Root CA";

/// Create `rootCA.key` and `rootCA.pem` in `dir`
///
/// # Errors
///
/// Returns an error if the files exist and `force` is not set, or creation
/// fails.
pub async fn handle_init_ca(
    dir: &Path,
    common_name: Option<&str>,
    days: u32,
    force: bool,
    use_json: bool,
) -> anyhow::Result<()> {
    let created = AuthorityBuilder::new("root")
        .path(dir)
        .common_name(common_name.unwrap_or(DEFAULT_ROOT_COMMON_NAME))
        .valid_for_days(days)
        .overwrite(force)
        .create()
        .await
        .with_context(|| format!("Failed to create root CA in {}", dir.display()))?;

    let metadata = &created.authority.metadata;
    if use_json {
        println!(
            "{}",
            json!({
                "success": true,
                "operation": "init-ca",
                "authority": metadata,
                "files_created": created.files_created,
            })
        );
    } else {
        for file in &created.files_created {
            println!("Wrote {} {}", file.file_type.label(), file.path.display());
        }
        println!(
            "Root CA {} valid until {}",
            metadata.subject,
            super::inspect_ops::format_time(metadata.valid_until)
        );
    }
    Ok(())
}
