use colored::Colorize;

use crate::cli::LogArgs;
use crate::error::Result;
use crate::render::delimiter;
use crate::settings::{load_settings, save_settings, settings_path, shellexpand_path};

/// Write the settings file, keeping what is there and applying the options given.
pub fn run(
    logs: &LogArgs,
    fields: Option<&str>,
    sep: Option<char>,
    width: Option<usize>,
    currency: Option<&str>,
) -> Result<()> {
    let mut settings = load_settings();

    if !logs.logs.is_empty() {
        settings.log_files = logs
            .logs
            .iter()
            .map(|p| shellexpand_path(&p.to_string_lossy()))
            .collect();
    }
    if let Some(fields) = fields {
        settings.default_fields = fields.to_string();
    }
    if let Some(sep) = sep {
        delimiter(sep)?;
        settings.csv_separator = sep;
    }
    if width.is_some() {
        settings.output_width = width;
    }
    if let Some(currency) = currency {
        settings.format.currency = currency.to_string();
    }

    save_settings(&settings)?;
    println!("{} {}", "Settings written to".green(), settings_path().display());
    for log in &settings.log_files {
        println!("  log {log}");
    }
    Ok(())
}
