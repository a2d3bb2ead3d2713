use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::{FinmanError, Result};
use crate::fmt::{
    format_value, normalize_date, normalize_value, parse_value, plural, sum_values, FormatConfig,
};

pub const COL_DATE: &str = "date";
pub const COL_VALUE: &str = "value";

pub const NOTE_CATEGORY: &str = "category";
pub const NOTE_CATEGORY_AUTO: &str = "category_auto";
pub const NOTE_REMARK: &str = "remark";

const IMPORT_ID_LEN: usize = 12;

/// Process-scoped identity of a transaction.
///
/// Parsed transactions are named after their line in the log (`17`, or `2-17`
/// when several logs are loaded); imported ones after a hash of their raw CSV
/// line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TxnId {
    Line { file: Option<usize>, line: usize },
    Hash(String),
}

impl Default for TxnId {
    fn default() -> Self {
        Self::Line { file: None, line: 0 }
    }
}

impl TxnId {
    pub fn for_line(file: Option<usize>, line: usize) -> Self {
        Self::Line { file, line }
    }

    pub fn for_raw_line(raw: &str) -> Self {
        let digest = hex::encode(Sha256::digest(raw.as_bytes()));
        Self::Hash(digest[..IMPORT_ID_LEN].to_string())
    }

    /// `(file prefix, line)` for line-based identifiers.
    pub fn ordinal(&self) -> Option<(Option<usize>, usize)> {
        match self {
            Self::Line { file, line } => Some((*file, *line)),
            Self::Hash(_) => None,
        }
    }
}

/// Parse a line-based identifier as written by a user, such as `17` or `2-17`.
pub fn id_ordinal(id: &str) -> Option<(Option<usize>, usize)> {
    match id.split_once('-') {
        Some((file, line)) => Some((Some(file.trim().parse().ok()?), line.trim().parse().ok()?)),
        None => Some((None, id.trim().parse().ok()?)),
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line { file: Some(file), line } => write!(f, "{file}-{line}"),
            Self::Line { file: None, line } => write!(f, "{line}"),
            Self::Hash(hash) => f.write_str(hash),
        }
    }
}

/// User annotations of a transaction. Unknown keys are kept as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default)]
    pub category: String,
    /// `None` while no category was ever set.
    #[serde(default)]
    pub category_auto: Option<bool>,
    #[serde(default)]
    pub remark: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Annotations {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let fixed: [&str; 3] = [NOTE_CATEGORY, NOTE_CATEGORY_AUTO, NOTE_REMARK];
        fixed
            .into_iter()
            .chain(self.extra.keys().map(String::as_str))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(skip)]
    pub(crate) id: TxnId,
    #[serde(skip)]
    pub(crate) modified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_line: Option<u64>,
    /// Columns as converted from the bank export; never altered.
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
    #[serde(default)]
    pub notes: Annotations,
    /// Top-level keys this crate does not know; written back unchanged.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.source_line == other.source_line
            && self.columns == other.columns
            && self.notes == other.notes
            && self.extra == other.extra
    }
}

impl Transaction {
    /// Build a transaction from one converted CSV line.
    ///
    /// `date` and `value` are normalized with `config`; both must be present.
    pub fn imported(
        raw_line: &str,
        source_line: u64,
        mut columns: BTreeMap<String, String>,
        config: &FormatConfig,
    ) -> Result<Self> {
        let raw_date = columns
            .get(COL_DATE)
            .ok_or_else(|| FinmanError::Other(format!("line {source_line}: no '{COL_DATE}' column")))?;
        let date = normalize_date(raw_date, config).ok_or_else(|| {
            FinmanError::Other(format!("line {source_line}: cannot convert date '{raw_date}'"))
        })?;
        let raw_value = columns
            .get(COL_VALUE)
            .ok_or_else(|| FinmanError::Other(format!("line {source_line}: no '{COL_VALUE}' column")))?;
        let value = normalize_value(raw_value, config).ok_or_else(|| {
            FinmanError::Other(format!("line {source_line}: cannot convert value '{raw_value}'"))
        })?;
        columns.insert(COL_DATE.to_string(), date);
        columns.insert(COL_VALUE.to_string(), value);

        Ok(Self {
            id: TxnId::for_raw_line(raw_line),
            modified: false,
            source_line: Some(source_line),
            columns,
            notes: Annotations::default(),
            extra: BTreeMap::new(),
        })
    }

    pub fn id(&self) -> &TxnId {
        &self.id
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn date(&self) -> Option<&str> {
        self.columns.get(COL_DATE).map(String::as_str)
    }

    pub fn value(&self) -> Option<rust_decimal::Decimal> {
        self.columns.get(COL_VALUE).and_then(|v| parse_value(v))
    }

    pub(crate) fn set_category(&mut self, category: &str, auto: bool) -> bool {
        if self.notes.category == category {
            return false;
        }
        self.notes.category = category.to_string();
        self.notes.category_auto = Some(auto);
        self.modified = true;
        true
    }

    pub(crate) fn clear_category(&mut self) -> bool {
        if self.notes.category.is_empty() {
            return false;
        }
        self.notes.category.clear();
        self.notes.category_auto = None;
        self.modified = true;
        true
    }

    pub(crate) fn set_remark(&mut self, remark: &str) -> bool {
        if self.notes.remark == remark {
            return false;
        }
        self.notes.remark = remark.to_string();
        self.modified = true;
        true
    }

    pub(crate) fn clear_modified(&mut self) {
        self.modified = false;
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transaction #{} ({})", self.id, modified_str(self.modified))
    }
}

/// Where a block of transactions came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    #[serde(default)]
    pub conversion_date: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    /// Source column name to ledger field name.
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
    #[serde(default)]
    pub num_lines: Option<u64>,
    #[serde(default)]
    pub num_trns: Option<u64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SourceDescriptor {
    /// Describe a bank export about to be converted.
    pub fn for_file(
        path: &Path,
        format: &str,
        columns: BTreeMap<String, String>,
        config: &FormatConfig,
    ) -> Result<Self> {
        let data = std::fs::read(path).map_err(|source| FinmanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let num_lines = String::from_utf8_lossy(&data).lines().count() as u64;

        Ok(Self {
            conversion_date: Some(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
            filename: path.file_name().map(|n| n.to_string_lossy().to_string()),
            filesize: Some(data.len() as u64),
            sha256: Some(hex::encode(Sha256::digest(&data))),
            format: Some(format.to_string()),
            currency: Some(config.currency.clone()),
            columns,
            num_lines: Some(num_lines),
            num_trns: None,
            extra: BTreeMap::new(),
        })
    }
}

/// Summary header of a transaction set. Descriptive only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetSummary {
    #[serde(default)]
    pub date_start: Option<String>,
    #[serde(default)]
    pub date_end: Option<String>,
    #[serde(default)]
    pub date_first: Option<String>,
    #[serde(default)]
    pub date_last: Option<String>,
    #[serde(default)]
    pub value_start: Option<String>,
    #[serde(default)]
    pub value_end: Option<String>,
    #[serde(default)]
    pub value_diff: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionSet {
    pub source: SourceDescriptor,
    pub summary: SetSummary,
    pub transactions: Vec<Transaction>,
}

impl TransactionSet {
    pub fn is_modified(&self) -> bool {
        self.transactions.iter().any(Transaction::is_modified)
    }

    /// Fill the computed part of the summary from the transactions.
    pub fn compute_summary(&mut self) {
        let dates: Vec<&str> = self.transactions.iter().filter_map(Transaction::date).collect();
        self.summary.date_first = dates.iter().min().map(|d| d.to_string());
        self.summary.date_last = dates.iter().max().map(|d| d.to_string());
        let diff = sum_values(self.transactions.iter().filter_map(Transaction::value));
        if diff.is_none() {
            warn!(
                set = self.source.filename.as_deref().unwrap_or("?"),
                "sum of values out of range"
            );
        }
        self.summary.value_diff = diff.map(format_value);
    }
}

impl fmt::Display for TransactionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.transactions.len();
        write!(
            f,
            "set {} ({}): {n} {}",
            self.source.filename.as_deref().unwrap_or("?"),
            modified_str(self.is_modified()),
            plural("transaction", n)
        )
    }
}

pub(crate) fn modified_str(modified: bool) -> &'static str {
    if modified {
        "modified"
    } else {
        "unmodified"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn txn(date: &str, value: &str) -> Transaction {
        let mut t = Transaction::default();
        t.columns.insert(COL_DATE.to_string(), date.to_string());
        t.columns.insert(COL_VALUE.to_string(), value.to_string());
        t
    }

    #[test]
    fn test_txn_id_ordinal() {
        assert_eq!(TxnId::for_line(None, 17).ordinal(), Some((None, 17)));
        assert_eq!(TxnId::for_line(Some(2), 5).ordinal(), Some((Some(2), 5)));
        assert_eq!(TxnId::for_line(Some(2), 5).to_string(), "2-5");
        assert_eq!(TxnId::for_line(None, 17).to_string(), "17");
        assert_eq!(TxnId::for_raw_line("10.07.1972;Transfer;100,78").ordinal(), None);
    }

    #[test]
    fn test_all_digit_hash_is_not_a_line_id() {
        let id = TxnId::for_raw_line("01.02.2020;x;3,00");
        assert_eq!(id.to_string(), "725260882409");
        assert_eq!(id.ordinal(), None);
        assert!(matches!(id, TxnId::Hash(_)));
    }

    #[test]
    fn test_raw_line_id_is_stable_and_truncated() {
        let a = TxnId::for_raw_line("10.07.1972;Transfer;100,78");
        let b = TxnId::for_raw_line("10.07.1972;Transfer;100,78");
        let c = TxnId::for_raw_line("11.07.1972;Transfer;100,78");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string().len(), 12);
    }

    #[test]
    fn test_set_remark_only_flags_real_change() {
        let mut t = txn("1972-07-10", "+1.00");
        assert!(!t.set_remark(""));
        assert!(!t.is_modified());
        assert!(t.set_remark("rent"));
        assert!(t.is_modified());
        assert!(!t.set_remark("rent"));
    }

    #[test]
    fn test_set_and_clear_category() {
        let mut t = txn("1972-07-10", "+1.00");
        assert!(t.set_category("food", true));
        assert_eq!(t.notes.category_auto, Some(true));
        t.clear_modified();
        assert!(!t.set_category("food", false));
        assert!(!t.is_modified());
        assert!(t.clear_category());
        assert_eq!(t.notes.category_auto, None);
        assert!(!t.clear_category());
    }

    #[test]
    fn test_equality_ignores_volatile_state() {
        let mut a = txn("1972-07-10", "+1.00");
        let b = txn("1972-07-10", "+1.00");
        a.id = TxnId::for_line(Some(1), 3);
        a.modified = true;
        assert_eq!(a, b);
    }

    #[test]
    fn test_volatile_fields_are_not_serialized() {
        let mut t = txn("1972-07-10", "+1.00");
        t.id = TxnId::for_line(None, 3);
        t.modified = true;
        let json = serde_json::to_value(&t).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("id"));
        assert!(!obj.contains_key("modified"));
        assert!(obj.contains_key("columns"));
        assert!(obj.contains_key("notes"));
    }

    #[test]
    fn test_custom_annotations_round_trip() {
        let json = r#"{"category":"x","category_auto":false,"remark":"","receipt":"r-17"}"#;
        let notes: Annotations = serde_json::from_str(json).unwrap();
        assert_eq!(notes.extra.get("receipt"), Some(&Value::from("r-17")));
        let back: Annotations = serde_json::from_value(serde_json::to_value(&notes).unwrap()).unwrap();
        assert_eq!(back, notes);
    }

    #[test]
    fn test_imported_normalizes_date_and_value() {
        let mut columns = BTreeMap::new();
        columns.insert("date".to_string(), "10.07.1972".to_string());
        columns.insert("value".to_string(), "1.100,78".to_string());
        columns.insert("details".to_string(), "Transfer".to_string());
        let t = Transaction::imported("10.07.1972;Transfer;1.100,78", 4, columns, &FormatConfig::default())
            .unwrap();
        assert_eq!(t.date(), Some("1972-07-10"));
        assert_eq!(t.columns["value"], "+1100.78");
        assert_eq!(t.columns["details"], "Transfer");
        assert_eq!(t.id().to_string().len(), 12);
        assert!(!t.is_modified());
    }

    #[test]
    fn test_imported_requires_value() {
        let mut columns = BTreeMap::new();
        columns.insert("date".to_string(), "10.07.1972".to_string());
        let err = Transaction::imported("x", 4, columns, &FormatConfig::default()).unwrap_err();
        assert!(err.to_string().contains("no 'value' column"));
    }

    #[test]
    fn test_compute_summary() {
        let mut set = TransactionSet {
            transactions: vec![
                txn("1972-07-20", "+200.78"),
                txn("1972-07-10", "-100.50"),
                txn("1972-07-30", "+0.02"),
            ],
            ..Default::default()
        };
        set.compute_summary();
        assert_eq!(set.summary.date_first.as_deref(), Some("1972-07-10"));
        assert_eq!(set.summary.date_last.as_deref(), Some("1972-07-30"));
        assert_eq!(set.summary.value_diff.as_deref(), Some("+100.30"));
        assert_eq!(set.transactions[0].value(), Some(dec!(200.78)));
    }

    #[test]
    fn test_compute_summary_overflow() {
        let mut set = TransactionSet {
            transactions: vec![
                txn("1972-07-20", "+79228162514264337593543950335"),
                txn("1972-07-10", "+1.00"),
            ],
            ..Default::default()
        };
        set.compute_summary();
        assert_eq!(set.summary.date_first.as_deref(), Some("1972-07-10"));
        assert_eq!(set.summary.value_diff, None);
    }

    #[test]
    fn test_source_descriptor_for_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        std::fs::write(&path, "Datum;Betrag\n10.07.1972;1,00\n").unwrap();
        let desc = SourceDescriptor::for_file(&path, "bank", BTreeMap::new(), &FormatConfig::default())
            .unwrap();
        assert_eq!(desc.filename.as_deref(), Some("export.csv"));
        assert_eq!(desc.filesize, Some(29));
        assert_eq!(desc.num_lines, Some(2));
        assert_eq!(desc.currency.as_deref(), Some("EUR"));
        assert_eq!(desc.sha256.as_ref().map(String::len), Some(64));
    }

    #[test]
    fn test_set_display() {
        let set = TransactionSet {
            source: SourceDescriptor {
                filename: Some("test1b.csv".to_string()),
                ..Default::default()
            },
            transactions: vec![txn("1972-08-05", "+100.55")],
            ..Default::default()
        };
        assert_eq!(set.to_string(), "set test1b.csv (unmodified): 1 transaction");
    }
}
