use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_store, LogArgs};
use crate::error::Result;
use crate::settings::load_settings;

pub fn run(logs: &LogArgs) -> Result<()> {
    let settings = load_settings();
    let store = open_store(logs, &settings)?;

    let mut table = Table::new();
    table.set_header(vec![
        "Log",
        "Source",
        "Format",
        "Transactions",
        "First",
        "Last",
        "Sum",
        "Currency",
    ]);
    for log in store.logs() {
        for set in &log.sets {
            let mut set = set.clone();
            set.compute_summary();
            table.add_row(vec![
                Cell::new(log.path().display()),
                Cell::new(set.source.filename.as_deref().unwrap_or("?")),
                Cell::new(set.source.format.as_deref().unwrap_or("")),
                Cell::new(set.transactions.len()),
                Cell::new(set.summary.date_first.as_deref().unwrap_or("")),
                Cell::new(set.summary.date_last.as_deref().unwrap_or("")),
                Cell::new(set.summary.value_diff.as_deref().unwrap_or("")),
                Cell::new(
                    set.source
                        .currency
                        .as_deref()
                        .unwrap_or(settings.format.currency.as_str()),
                ),
            ]);
        }
    }
    println!("{}\n{table}", store.to_string().bold());
    Ok(())
}
