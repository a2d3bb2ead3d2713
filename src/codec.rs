use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::{FinmanError, Result};
use crate::models::{
    SetSummary, SourceDescriptor, Transaction, TransactionSet, TxnId, COL_DATE, COL_VALUE,
    NOTE_CATEGORY, NOTE_CATEGORY_AUTO, NOTE_REMARK,
};

const TYPE_KEY: &str = "type";

/// Record kinds of a log, named by the `type` key of each line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordKind {
    SourceDescriptor,
    SetSummary,
    Transaction,
}

impl RecordKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "SourceDescriptor" => Some(Self::SourceDescriptor),
            "SetSummary" => Some(Self::SetSummary),
            "Transaction" => Some(Self::Transaction),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::SourceDescriptor => "SourceDescriptor",
            Self::SetSummary => "SetSummary",
            Self::Transaction => "Transaction",
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum RecordRef<'a> {
    SourceDescriptor(&'a SourceDescriptor),
    SetSummary(&'a SetSummary),
    Transaction(&'a Transaction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    ExpectSource,
    ExpectSummary,
    ExpectTransactionOrSource,
}

/// Parse the text of a log into its transaction sets.
///
/// `name` is only used in diagnostics. `id_prefix` is prepended to each
/// transaction's line number when several logs are loaded together.
pub fn parse(text: &str, name: &str, id_prefix: Option<usize>) -> Result<Vec<TransactionSet>> {
    let format_err = |line: usize, message: String| FinmanError::Format {
        file: name.to_string(),
        line,
        message,
    };

    let mut sets = Vec::new();
    let mut current: Option<TransactionSet> = None;
    let mut state = ReadState::ExpectSource;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let value: Value =
            serde_json::from_str(raw).map_err(|e| format_err(line, format!("invalid JSON: {e}")))?;
        let Value::Object(mut map) = value else {
            return Err(format_err(line, "record is not a JSON object".to_string()));
        };
        let tag = match map.remove(TYPE_KEY) {
            Some(Value::String(tag)) => tag,
            _ => return Err(format_err(line, format!("record has no '{TYPE_KEY}' key"))),
        };
        let Some(kind) = RecordKind::from_tag(&tag) else {
            warn!(file = name, line, kind = %tag, "unknown record type; ignoring");
            continue;
        };

        if state == ReadState::ExpectTransactionOrSource && kind == RecordKind::SourceDescriptor {
            sets.extend(current.take().map(finish_set));
            state = ReadState::ExpectSource;
        }

        let expected = match state {
            ReadState::ExpectSource => RecordKind::SourceDescriptor,
            ReadState::ExpectSummary => RecordKind::SetSummary,
            ReadState::ExpectTransactionOrSource => RecordKind::Transaction,
        };
        if kind != expected {
            return Err(format_err(
                line,
                format!("expected record '{}', found '{}'", expected.name(), kind.name()),
            ));
        }

        if state == ReadState::ExpectSource {
            let source: SourceDescriptor = decode(map, line, &format_err)?;
            current = Some(TransactionSet {
                source,
                ..Default::default()
            });
            state = ReadState::ExpectSummary;
            continue;
        }

        let Some(set) = current.as_mut() else {
            return Err(format_err(line, "record outside of a transaction set".to_string()));
        };
        if state == ReadState::ExpectSummary {
            set.summary = decode(map, line, &format_err)?;
            state = ReadState::ExpectTransactionOrSource;
        } else {
            check_fields(&map, name, line);
            let mut txn: Transaction = decode(map, line, &format_err)?;
            txn.id = TxnId::for_line(id_prefix, line);
            set.transactions.push(txn);
        }
    }

    match state {
        ReadState::ExpectSummary => {
            let line = text.lines().count();
            Err(format_err(line, "missing record 'SetSummary' at end of input".to_string()))
        }
        _ => {
            sets.extend(current.take().map(finish_set));
            Ok(sets)
        }
    }
}

fn decode<T, F>(map: Map<String, Value>, line: usize, format_err: &F) -> Result<T>
where
    T: serde::de::DeserializeOwned,
    F: Fn(usize, String) -> FinmanError,
{
    serde_json::from_value(Value::Object(map)).map_err(|e| format_err(line, format!("malformed record: {e}")))
}

fn finish_set(mut set: TransactionSet) -> TransactionSet {
    set.source.num_trns = Some(set.transactions.len() as u64);
    set
}

fn check_fields(map: &Map<String, Value>, name: &str, line: usize) {
    if !map.contains_key("source_line") {
        info!(file = name, line, "transaction has no field 'source_line'");
    }
    match map.get("columns").and_then(Value::as_object) {
        Some(columns) => {
            for field in [COL_DATE, COL_VALUE] {
                if !columns.contains_key(field) {
                    warn!(file = name, line, "transaction has no field 'columns.{field}'");
                }
            }
        }
        None => warn!(file = name, line, "transaction has no field 'columns'"),
    }
    match map.get("notes").and_then(Value::as_object) {
        Some(notes) => {
            for field in [NOTE_CATEGORY, NOTE_CATEGORY_AUTO, NOTE_REMARK] {
                if !notes.contains_key(field) {
                    warn!(file = name, line, "transaction has no field 'notes.{field}'");
                }
            }
        }
        None => warn!(file = name, line, "transaction has no field 'notes'"),
    }
}

/// Serialize transaction sets: one JSON record per line, a blank line after
/// each set.
pub fn serialize(sets: &[TransactionSet]) -> Result<String> {
    let mut out = String::new();
    for set in sets {
        push_record(&mut out, &RecordRef::SourceDescriptor(&set.source))?;
        push_record(&mut out, &RecordRef::SetSummary(&set.summary))?;
        for txn in &set.transactions {
            push_record(&mut out, &RecordRef::Transaction(txn))?;
        }
        out.push('\n');
    }
    Ok(out)
}

fn push_record(out: &mut String, record: &RecordRef<'_>) -> Result<()> {
    out.push_str(&serde_json::to_string(record)?);
    out.push('\n');
    Ok(())
}
