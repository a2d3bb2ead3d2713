use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use finman::cli::{self, Cli, Commands};

const LOG_ENV: &str = "FINMAN_LOG";

fn init_tracing(verbose: bool) {
    let default = if verbose { "finman=debug" } else { "finman=warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init {
            logs,
            fields,
            sep,
            width,
            currency,
        } => cli::init::run(&logs, fields.as_deref(), sep, width, currency.as_deref()),
        Commands::Show {
            logs,
            select,
            fields,
            csv,
            sep,
            no_index,
            width,
        } => cli::show::run(&logs, &select, fields.as_deref(), csv, sep, !no_index, width),
        Commands::Fields { logs } => cli::fields::run(&logs),
        Commands::Sets { logs } => cli::sets::run(&logs),
        Commands::Categorize {
            logs,
            select,
            category,
            auto,
        } => cli::annotate::categorize(&logs, &select, &category, auto),
        Commands::Uncategorize { logs, select } => cli::annotate::uncategorize(&logs, &select),
        Commands::Remark {
            logs,
            select,
            remark,
        } => cli::annotate::remark(&logs, &select, &remark),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
