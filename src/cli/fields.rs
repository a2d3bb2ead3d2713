use comfy_table::{Cell, Table};

use crate::cli::{open_store, LogArgs};
use crate::error::Result;
use crate::fields::{heading, PSEUDO_FIELDS};
use crate::settings::load_settings;
use crate::store::Store;

fn kind(store: &Store, field: &str) -> &'static str {
    if PSEUDO_FIELDS.contains(&field) {
        "pseudo"
    } else if store.transactions().any(|(_, t)| t.columns.contains_key(field)) {
        "column"
    } else {
        "annotation"
    }
}

pub fn run(logs: &LogArgs) -> Result<()> {
    let store = open_store(logs, &load_settings())?;

    let mut table = Table::new();
    table.set_header(vec!["Field", "Heading", "Kind"]);
    for field in store.known_fields() {
        table.add_row(vec![
            Cell::new(field),
            Cell::new(heading(field)),
            Cell::new(kind(&store, field)),
        ]);
    }
    println!("Fields\n{table}");
    Ok(())
}
