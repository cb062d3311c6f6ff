//! CLI command implementations

use crate::{output, progress, ConfigAction, OutputFormat};
use anyhow::{anyhow, Result};
use console::style;
use modelgrab_core::{ClientConfig, LicenseFilter, ModelGrab, RunConfig};
use modelgrab_types::{CatalogEntry, Settings};
use std::path::Path;

// ============================================================================
// Download Commands
// ============================================================================

/// Run the full pipeline and print the final tally
pub async fn download(config: RunConfig) -> Result<()> {
    let mut core = ModelGrab::new();
    let reporter = progress::spawn_reporter(core.subscribe());

    let result = core.run(&config).await;

    // Closing the channel lets the reporter drain and exit.
    drop(core);
    reporter.await?;

    let summary = result?;
    if summary.total > 0 {
        output::print_summary(&summary, &config.licenses);
    }

    Ok(())
}

// ============================================================================
// Catalog Commands
// ============================================================================

pub async fn list_models(
    settings: &Settings,
    username: &str,
    token: Option<String>,
    licenses: Vec<String>,
    format: OutputFormat,
) -> Result<()> {
    let filter = if licenses.is_empty() {
        LicenseFilter::new(&settings.licenses)
    } else {
        LicenseFilter::new(licenses)
    };
    let client = ClientConfig::from_settings(settings, token);

    let mut core = ModelGrab::new();
    let reporter = match format {
        OutputFormat::Human => Some(progress::spawn_reporter(core.subscribe())),
        OutputFormat::Json | OutputFormat::Table => None,
    };

    let result = core.fetch_catalog(client, username).await;

    drop(core);
    if let Some(reporter) = reporter {
        reporter.await?;
    }

    let entries = result?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Table => {
            use tabled::{Table, Tabled};

            #[derive(Tabled)]
            struct ModelRow {
                uid: String,
                name: String,
                license: String,
                downloadable: String,
                allowed: String,
            }

            let rows: Vec<ModelRow> = entries
                .iter()
                .map(|e| ModelRow {
                    uid: e.uid.clone(),
                    name: truncate(&e.name, 40),
                    license: e.license_label().to_string(),
                    downloadable: yes_no(e.is_downloadable),
                    allowed: yes_no(filter.matches(e.license_label())),
                })
                .collect();

            println!("{}", Table::new(rows));
        }
        OutputFormat::Human => {
            if entries.is_empty() {
                return Ok(());
            }

            println!();
            for entry in &entries {
                print_entry(entry, &filter);
            }

            let allowed = entries
                .iter()
                .filter(|e| e.is_downloadable && filter.matches(e.license_label()))
                .count();
            println!();
            println!(
                "{} of {} model(s) would be downloaded (licenses: {})",
                style(allowed).bold(),
                entries.len(),
                filter
            );
        }
    }

    Ok(())
}

fn print_entry(entry: &CatalogEntry, filter: &LicenseFilter) {
    let allowed = filter.matches(entry.license_label());
    let icon = match (allowed, entry.is_downloadable) {
        (true, true) => style("✓").green(),
        (true, false) => style("✗").red(),
        (false, _) => style("○").dim(),
    };

    println!(
        "{} {} {} [{}]{}",
        icon,
        style(&entry.name).bold(),
        style(&entry.uid).dim(),
        entry.license_label(),
        if entry.is_downloadable {
            ""
        } else {
            " (not downloadable)"
        }
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max - 3).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}

// ============================================================================
// Config Commands
// ============================================================================

pub async fn config_action(
    settings: &Settings,
    settings_path: Option<&Path>,
    action: Option<ConfigAction>,
) -> Result<()> {
    match action {
        None | Some(ConfigAction::Show { json: false }) => {
            println!("modelgrab configuration:");
            println!();
            println!("  API base URL: {}", settings.api_base_url);
            println!("  Page size: {}", settings.page_size);
            println!("  Delay between pages: {}ms", settings.page_delay_ms);
            println!("  Delay between models: {}ms", settings.item_delay_ms);
            println!("  Delay after existing file: {}ms", settings.existing_delay_ms);
            println!("  Resolve timeout: {}s", settings.resolve_timeout_secs);
            println!("  Transfer timeout: {}s", settings.transfer_timeout_secs);
            println!("  User agent: {}", settings.user_agent);
            println!(
                "  Default output directory: {}",
                settings.default_output_dir.display()
            );
            println!(
                "  Allowed licenses: {}",
                LicenseFilter::new(&settings.licenses)
            );
        }

        Some(ConfigAction::Show { json: true }) => {
            println!("{}", serde_json::to_string_pretty(settings)?);
        }

        Some(ConfigAction::Path) => match settings_path {
            Some(path) => println!("{}", path.display()),
            None => return Err(anyhow!("No config directory available on this platform")),
        },

        Some(ConfigAction::Reset) => {
            use dialoguer::Confirm;

            let path =
                settings_path.ok_or_else(|| anyhow!("No config directory available on this platform"))?;

            let confirmed = Confirm::new()
                .with_prompt(format!("Write default settings to {}?", path.display()))
                .default(false)
                .interact()?;

            if confirmed {
                modelgrab_core::save_settings(path, &Settings::default()).await?;
                println!("{} Settings reset to defaults", style("✓").green().bold());
            }
        }
    }

    Ok(())
}
