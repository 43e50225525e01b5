use anyhow::Result;

use super::context::CliContext;

pub fn cmd_info(ctx: &CliContext) -> Result<()> {
    let config = ctx.config();

    println!("selfheal {}", env!("CARGO_PKG_VERSION"));
    println!("Build Date: {}", env!("BUILD_DATE", "unknown"));
    println!("Git Commit: {}", env!("GIT_HASH", "unknown"));
    println!();
    println!("Config:      {}", ctx.config_path().display());
    println!("Catalog:     {}", config.catalog_path.display());
    println!("Pending:     {}", config.pending_path.display());
    println!(
        "Diagnostics: {} ({})",
        config.diagnostics_dir.display(),
        if config.capture_diagnostics {
            "enabled"
        } else {
            "disabled"
        }
    );
    Ok(())
}
