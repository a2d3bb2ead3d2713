use colored::Colorize;

use crate::cli::{open_store, selected_positions, LogArgs, SelectArgs};
use crate::error::Result;
use crate::fmt::plural;
use crate::selector::Selector;
use crate::settings::load_settings;
use crate::store::Store;

/// Apply `change` to every selected transaction, then save what changed.
fn annotate<F>(logs: &LogArgs, args: &SelectArgs, verb: &str, mut change: F) -> Result<()>
where
    F: FnMut(&Selector, &mut Store, usize) -> Result<bool>,
{
    let mut store = open_store(logs, &load_settings())?;
    let (selector, positions) = selected_positions(&store, args);

    let mut changed = 0;
    for position in &positions {
        if change(&selector, &mut store, *position)? {
            changed += 1;
        }
    }
    let written = store.save()?;

    let message = format!(
        "{verb} {changed} of {} {}; {written} {} saved",
        positions.len(),
        plural("transaction", positions.len()),
        plural("log", written)
    );
    if changed > 0 {
        println!("{}", message.green());
    } else {
        println!("{message}");
    }
    Ok(())
}

pub fn categorize(logs: &LogArgs, args: &SelectArgs, category: &str, auto: bool) -> Result<()> {
    annotate(logs, args, "Categorized", |sel, store, pos| {
        sel.set_category(store, pos, category, auto)
    })
}

pub fn uncategorize(logs: &LogArgs, args: &SelectArgs) -> Result<()> {
    annotate(logs, args, "Uncategorized", |sel, store, pos| sel.clear_category(store, pos))
}

pub fn remark(logs: &LogArgs, args: &SelectArgs, remark: &str) -> Result<()> {
    annotate(logs, args, "Remarked", |sel, store, pos| sel.set_remark(store, pos, remark))
}
