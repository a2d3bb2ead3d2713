use colored::Colorize;

use crate::cli::{open_store, select, LogArgs, SelectArgs};
use crate::error::{FinmanError, Result};
use crate::fmt::plural;
use crate::render::{delimiter, parse_columns, render, render_delimited};
use crate::settings::load_settings;

pub fn run(
    logs: &LogArgs,
    args: &SelectArgs,
    fields: Option<&str>,
    csv: bool,
    sep: Option<char>,
    numbered: bool,
    width: Option<usize>,
) -> Result<()> {
    let settings = load_settings();
    let store = open_store(logs, &settings)?;
    let (selector, range) = select(&store, args);
    let rows = selector.subset(&store, range.as_ref());

    let columns = parse_columns(fields.unwrap_or(&settings.default_fields), store.known_fields());
    if columns.is_empty() {
        return Err(FinmanError::Other("No valid fields to show".to_string()));
    }

    if csv {
        let sep = sep.unwrap_or(settings.csv_separator);
        let sep = delimiter(sep)?;
        for line in render_delimited(&rows, &columns, sep, numbered)? {
            println!("{line}");
        }
        return Ok(());
    }

    for line in render(&rows, &columns, numbered, width.or(settings.output_width)) {
        println!("{line}");
    }
    let shown = rows.len();
    let summary = if shown == selector.len() {
        format!("{shown} {}", plural("transaction", shown))
    } else {
        format!("{shown} of {} {}", selector.len(), plural("transaction", selector.len()))
    };
    println!("{}", summary.dimmed());
    Ok(())
}
