use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::codec;
use crate::error::{FinmanError, Result};
use crate::fields::PSEUDO_FIELDS;
use crate::fmt::plural;
use crate::models::{modified_str, Transaction, TransactionSet};

/// One persisted log file.
#[derive(Debug, Clone)]
pub struct Log {
    path: PathBuf,
    pub sets: Vec<TransactionSet>,
}

impl Log {
    /// Read and parse a log. Any format error fails the whole file.
    pub fn load(path: &Path, id_prefix: Option<usize>) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| FinmanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let sets = codec::parse(&text, &path.display().to_string(), id_prefix)?;
        let log = Self {
            path: path.to_path_buf(),
            sets,
        };
        info!(file = %path.display(), sets = log.sets.len(), transactions = log.transaction_count(), "loaded log");
        Ok(log)
    }

    pub fn new(path: impl Into<PathBuf>, sets: Vec<TransactionSet>) -> Self {
        Self {
            path: path.into(),
            sets,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_modified(&self) -> bool {
        self.sets.iter().any(TransactionSet::is_modified)
    }

    pub fn transaction_count(&self) -> usize {
        self.sets.iter().map(|s| s.transactions.len()).sum()
    }

    /// Rewrite the whole file if anything changed. Returns whether it wrote.
    ///
    /// The text goes to a sibling temporary file first and is renamed over the
    /// log; modified flags are cleared only after that succeeded.
    pub fn save(&mut self) -> Result<bool> {
        if !self.is_modified() {
            debug!(file = %self.path.display(), "log unmodified; not saving");
            return Ok(false);
        }
        let text = codec::serialize(&self.sets)?;
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "log".to_string());
        let tmp = self.path.with_file_name(format!(".{file_name}.tmp"));
        let write_err = |source| FinmanError::Write {
            path: self.path.clone(),
            source,
        };
        std::fs::write(&tmp, text).map_err(write_err)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            if let Err(cleanup) = std::fs::remove_file(&tmp) {
                warn!(file = %tmp.display(), error = %cleanup, "could not remove temporary file");
            }
            return Err(write_err(e));
        }

        for txn in self.sets.iter_mut().flat_map(|s| s.transactions.iter_mut()) {
            txn.clear_modified();
        }
        info!(file = %self.path.display(), "saved log");
        Ok(true)
    }
}

impl fmt::Display for Log {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sets = self.sets.len();
        let trns = self.transaction_count();
        write!(
            f,
            "log {} ({}): {sets} transaction {}, {trns} {}",
            self.path.display(),
            modified_str(self.is_modified()),
            plural("set", sets),
            plural("transaction", trns)
        )
    }
}

/// Address of a transaction inside a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxnKey {
    pub log: usize,
    pub set: usize,
    pub index: usize,
}

/// All loaded logs, addressed as one universe of transactions.
#[derive(Debug, Clone, Default)]
pub struct Store {
    logs: Vec<Log>,
    known_fields: BTreeSet<String>,
}

impl Store {
    /// Load every log. With more than one file, identifiers carry the file's
    /// 1-based position as prefix.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let multiple = paths.len() > 1;
        let logs = paths
            .iter()
            .enumerate()
            .map(|(idx, path)| Log::load(path.as_ref(), multiple.then_some(idx + 1)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_logs(logs))
    }

    pub fn from_logs(logs: Vec<Log>) -> Self {
        let mut store = Self {
            logs,
            known_fields: BTreeSet::new(),
        };
        store.known_fields = store.collect_field_names();
        store
    }

    fn collect_field_names(&self) -> BTreeSet<String> {
        let mut fields: BTreeSet<String> = PSEUDO_FIELDS.iter().map(|f| f.to_string()).collect();
        for (_, txn) in self.transactions() {
            fields.extend(txn.columns.keys().cloned());
            fields.extend(txn.notes.keys().map(str::to_string));
        }
        fields
    }

    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    /// Every field name seen in any loaded transaction.
    pub fn known_fields(&self) -> &BTreeSet<String> {
        &self.known_fields
    }

    pub fn is_modified(&self) -> bool {
        self.logs.iter().any(Log::is_modified)
    }

    /// Save all modified logs. Returns how many files were written.
    pub fn save(&mut self) -> Result<usize> {
        let mut written = 0;
        for log in &mut self.logs {
            if log.save()? {
                written += 1;
            }
        }
        Ok(written)
    }

    /// All transactions in file order.
    pub fn transactions(&self) -> impl Iterator<Item = (TxnKey, &Transaction)> {
        self.logs.iter().enumerate().flat_map(|(l, log)| {
            log.sets.iter().enumerate().flat_map(move |(s, set)| {
                set.transactions.iter().enumerate().map(move |(index, txn)| {
                    (TxnKey { log: l, set: s, index }, txn)
                })
            })
        })
    }

    pub fn get(&self, key: TxnKey) -> Option<&Transaction> {
        self.logs
            .get(key.log)?
            .sets
            .get(key.set)?
            .transactions
            .get(key.index)
    }

    pub(crate) fn get_mut(&mut self, key: TxnKey) -> Option<&mut Transaction> {
        self.logs
            .get_mut(key.log)?
            .sets
            .get_mut(key.set)?
            .transactions
            .get_mut(key.index)
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.logs.len();
        let names: Vec<String> = self.logs.iter().map(|l| l.path.display().to_string()).collect();
        write!(
            f,
            "{n} {} ({}): {}",
            plural("log", n),
            modified_str(self.is_modified()),
            names.join(", ")
        )
    }
}
