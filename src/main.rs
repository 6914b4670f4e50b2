//! Localization CLI operating on a portal snapshot file.
//!
//! Usage:
//!   tab-localization show <tabId>                 # Print the localization view as JSON
//!   tab-localization apply <view.json>            # Write an edited view back
//!   tab-localization make-neutral <tabId>
//!   tab-localization make-translatable <tabId>
//!   tab-localization add-missing <tabId>
//!   tab-localization notify <tabId> [comment]
//!   tab-localization restore-module <tabModuleId>
//!   tab-localization delete-module <tabModuleId>
//!
//! Optional environment variables:
//! - SNAPSHOT_PATH (defaults to data/portal.json)
//! - SITE_URL (defaults to http://localhost)
//! - ADMIN_TAB_ID, ADMINISTRATOR_ID, PORTAL_ID

use anyhow::{bail, Context, Result};
use tab_localization::config::Config;
use tab_localization::localization::PagesView;
use tab_localization::memory::MemoryPortal;
use tab_localization::service::{ActionResult, ServiceError};
use tracing::info;

fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tab_localization=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let settings = config.portal_settings();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        bail!("Usage: tab-localization <command> [args]");
    };

    let portal = MemoryPortal::load(&config.snapshot_path)?;
    let service = portal.service(&settings);
    info!(
        "Loaded portal {} from {}",
        settings.portal_id,
        config.snapshot_path.display()
    );

    let result = match command.as_str() {
        "show" => {
            let view = service.tab_localization(id_arg(&args, 1)?).map_err(failure)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
            return Ok(());
        }
        "apply" => {
            let path = args.get(1).context("Missing view file")?;
            let content =
                std::fs::read_to_string(path).context(format!("Failed to read {}", path))?;
            let view: PagesView =
                serde_json::from_str(&content).context("Failed to parse localization view")?;
            service.update_tab_localization(&view)
        }
        "make-neutral" => service.make_page_neutral(id_arg(&args, 1)?),
        "make-translatable" => service.make_page_translatable(id_arg(&args, 1)?),
        "add-missing" => service.add_missing_languages(id_arg(&args, 1)?),
        "notify" => {
            let comment = args.get(2).map(String::as_str).unwrap_or_default();
            service.notify_translators(id_arg(&args, 1)?, comment)
        }
        "restore-module" => service.restore_module(id_arg(&args, 1)?),
        "delete-module" => service.delete_module(id_arg(&args, 1)?),
        other => bail!("Unknown command: {}", other),
    };

    let result: ActionResult = result.map_err(failure)?;
    portal.save(&config.snapshot_path)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn id_arg(args: &[String], index: usize) -> Result<i32> {
    let raw = args.get(index).context("Missing id argument")?;
    raw.parse()
        .context(format!("'{}' is not a valid id", raw))
}

fn failure(err: ServiceError) -> anyhow::Error {
    anyhow::anyhow!("{} ({})", err, err.error_code())
}
