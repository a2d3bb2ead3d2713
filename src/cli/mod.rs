pub mod annotate;
pub mod fields;
pub mod init;
pub mod sets;
pub mod show;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::{FinmanError, Result};
use crate::range::RangeSpec;
use crate::selector::Selector;
use crate::settings::Settings;
use crate::store::Store;

#[derive(Parser)]
#[command(name = "finman", about = "Query and annotate a ledger of bank transactions.")]
pub struct Cli {
    /// Print debug diagnostics (FINMAN_LOG overrides)
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct LogArgs {
    /// Ledger log file; repeat for several (default: log_files from settings)
    #[arg(long = "log", value_name = "FILE")]
    pub logs: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Filter, e.g. 'details=~rent|date>=2024-01-01'
    #[arg(long, short, default_value = "")]
    pub filter: String,
    /// Positions within the filtered result, e.g. '3,5-9,14-'
    #[arg(long, short)]
    pub range: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or update the settings file.
    Init {
        #[command(flatten)]
        logs: LogArgs,
        /// Default columns for show
        #[arg(long)]
        fields: Option<String>,
        /// Default separator for show --csv
        #[arg(long)]
        sep: Option<char>,
        /// Default line width cap for tables
        #[arg(long)]
        width: Option<usize>,
        /// Currency assumed when a set does not name one
        #[arg(long)]
        currency: Option<String>,
    },
    /// Print transactions as a table or as delimited text.
    Show {
        #[command(flatten)]
        logs: LogArgs,
        #[command(flatten)]
        select: SelectArgs,
        /// Columns, e.g. 'date|det:40|value' (default: default_fields from settings)
        #[arg(long)]
        fields: Option<String>,
        /// Delimited output instead of a table
        #[arg(long)]
        csv: bool,
        /// Separator for --csv (default: csv_separator from settings)
        #[arg(long)]
        sep: Option<char>,
        /// Leave out the position column
        #[arg(long = "no-index")]
        no_index: bool,
        /// Cut table lines to this many characters
        #[arg(long)]
        width: Option<usize>,
    },
    /// List the field names usable in filters and column specs.
    Fields {
        #[command(flatten)]
        logs: LogArgs,
    },
    /// Summarize logs and their transaction sets.
    Sets {
        #[command(flatten)]
        logs: LogArgs,
    },
    /// Set the category of the selected transactions and save.
    Categorize {
        #[command(flatten)]
        logs: LogArgs,
        #[command(flatten)]
        select: SelectArgs,
        /// Category to assign
        category: String,
        /// Mark the category as assigned by a rule
        #[arg(long)]
        auto: bool,
    },
    /// Remove the category of the selected transactions and save.
    Uncategorize {
        #[command(flatten)]
        logs: LogArgs,
        #[command(flatten)]
        select: SelectArgs,
    },
    /// Set the remark of the selected transactions and save.
    Remark {
        #[command(flatten)]
        logs: LogArgs,
        #[command(flatten)]
        select: SelectArgs,
        /// Remark text; empty clears it
        remark: String,
    },
}

/// Load the logs named on the command line, or those from the settings.
pub(crate) fn open_store(args: &LogArgs, settings: &Settings) -> Result<Store> {
    let paths = if args.logs.is_empty() {
        settings.log_paths()
    } else {
        args.logs.clone()
    };
    if paths.is_empty() {
        return Err(FinmanError::Other(
            "No log files; pass --log or set log_files in the settings".to_string(),
        ));
    }
    Store::load(&paths)
}

/// Run the query and parse the range against its result.
pub(crate) fn select(store: &Store, args: &SelectArgs) -> (Selector, Option<RangeSpec>) {
    let selector = Selector::query(store, &args.filter);
    let range = args.range.as_deref().map(|r| selector.range(r));
    (selector, range)
}

/// Positions of the selected rows, in order.
pub(crate) fn selected_positions(store: &Store, args: &SelectArgs) -> (Selector, Vec<usize>) {
    let (selector, range) = select(store, args);
    let positions = selector
        .subset(store, range.as_ref())
        .iter()
        .map(|row| row.position)
        .collect();
    (selector, positions)
}
