//! A personal ledger of bank transactions kept as JSON-lines logs: load,
//! query, subset, annotate and print.

pub mod cli;
pub mod codec;
pub mod error;
pub mod fields;
pub mod filter;
pub mod fmt;
pub mod models;
pub mod range;
pub mod render;
pub mod selector;
pub mod settings;
pub mod store;

#[cfg(test)]
mod testdata;
