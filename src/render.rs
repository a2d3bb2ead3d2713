//! Aligned and delimited output of transaction rows.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::error::{FinmanError, Result};
use crate::fields::{self, FieldSource, FieldValue, FIELD_IDX};
use crate::fmt::{format_value, parse_value, sum_values};
use crate::models::COL_VALUE;

const SEPARATOR_FIELDS: char = '|';
const SEPARATOR_WIDTH: char = ':';
const SEPARATOR_DATA: &str = " │ ";
const SEPARATOR_HEADER: &str = "─┼─";
const FILLER: char = '─';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub field: String,
    pub heading: String,
    /// Cells longer than this are cut.
    pub max_width: Option<usize>,
}

impl Column {
    pub fn new(field: &str, max_width: Option<usize>) -> Self {
        Self {
            field: field.to_string(),
            heading: fields::heading(field).to_string(),
            max_width,
        }
    }

    fn right_aligned(&self) -> bool {
        self.field == COL_VALUE || self.field == FIELD_IDX
    }
}

/// Parse a column spec such as `date|det:40|value`.
///
/// Names are resolved against `known`; columns that do not resolve are
/// dropped with a warning, widths that are not integers are ignored.
pub fn parse_columns(spec: &str, known: &BTreeSet<String>) -> Vec<Column> {
    let mut columns = Vec::new();
    for part in spec.split(SEPARATOR_FIELDS) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (name, width) = match part.split_once(SEPARATOR_WIDTH) {
            Some((name, width)) => (name.trim(), Some(width.trim())),
            None => (part, None),
        };
        let field = match fields::resolve(name, known) {
            Ok(field) => field,
            Err(e) => {
                warn!("{e}; column dropped");
                continue;
            }
        };
        let max_width = width.and_then(|w| match w.parse() {
            Ok(n) => Some(n),
            Err(_) => {
                warn!(field = %field, width = w, "column width is not an integer; ignored");
                None
            }
        });
        columns.push(Column::new(&field, max_width));
    }
    columns
}

fn with_index(columns: &[Column], numbered: bool) -> Vec<Column> {
    let mut all = Vec::with_capacity(columns.len() + 1);
    if numbered {
        all.push(Column::new(FIELD_IDX, None));
    }
    all.extend(columns.iter().cloned());
    all
}

fn cell(value: FieldValue) -> String {
    match value {
        FieldValue::Text(s) => s,
        FieldValue::Id(id) => id.to_string(),
        FieldValue::Flag(true) => "*".to_string(),
        FieldValue::Flag(false) => String::new(),
    }
}

fn cut(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

struct Layout {
    widths: Vec<usize>,
    right: Vec<bool>,
    output_width: Option<usize>,
}

impl Layout {
    fn line(&self, values: &[String]) -> String {
        let cells: Vec<String> = values
            .iter()
            .zip(self.widths.iter().zip(&self.right))
            .map(|(value, (&width, &right))| {
                let value = cut(value, width);
                if right {
                    format!("{value:>width$}")
                } else {
                    format!("{value:<width$}")
                }
            })
            .collect();
        self.limit(cells.join(SEPARATOR_DATA))
    }

    fn separator(&self) -> String {
        let fillers: Vec<String> = self
            .widths
            .iter()
            .map(|&w| FILLER.to_string().repeat(w))
            .collect();
        self.limit(fillers.join(SEPARATOR_HEADER))
    }

    fn limit(&self, line: String) -> String {
        match self.output_width {
            Some(max) if line.chars().count() > max => cut(&line, max),
            _ => line,
        }
    }
}

/// Render rows as an aligned table.
///
/// With a `value` column the rows' values are summed exactly and shown
/// beneath the data. The heading line closes the table as well.
pub fn render<R: FieldSource>(
    rows: &[R],
    columns: &[Column],
    numbered: bool,
    output_width: Option<usize>,
) -> Vec<String> {
    let columns = with_index(columns, numbered);
    let headings: Vec<String> = columns.iter().map(|c| c.heading.clone()).collect();
    let data: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|c| cell(row.field(&c.field))).collect())
        .collect();

    let value_col = columns.iter().position(|c| c.field == COL_VALUE);
    let sum_row = value_col.map(|idx| {
        let total = sum_values(data.iter().filter_map(|cells| {
            let parsed = parse_value(&cells[idx]);
            if parsed.is_none() && !cells[idx].is_empty() {
                debug!(value = %cells[idx], "value not summed");
            }
            parsed
        }));
        let mut cells = vec![String::new(); columns.len()];
        match total {
            Some(total) => cells[idx] = format_value(total),
            None => warn!(rows = data.len(), "sum of values out of range; footer left blank"),
        }
        cells
    });

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let widest = std::iter::once(&headings)
                .chain(data.iter())
                .chain(sum_row.iter())
                .map(|cells| cells[i].chars().count())
                .max()
                .unwrap_or(0);
            col.max_width.map_or(widest, |cap| widest.min(cap))
        })
        .collect();
    let layout = Layout {
        widths,
        right: columns.iter().map(Column::right_aligned).collect(),
        output_width,
    };

    let mut lines = Vec::with_capacity(data.len() + 5);
    lines.push(layout.line(&headings));
    lines.push(layout.separator());
    lines.extend(data.iter().map(|cells| layout.line(cells)));
    lines.push(layout.separator());
    if let Some(cells) = &sum_row {
        lines.push(layout.line(cells));
    }
    lines.push(layout.line(&headings));
    lines
}

/// Render rows as delimited text: one heading record, then one record per row.
/// Nothing is padded, cut or summed. A record holding a quoted line break
/// stays one entry.
pub fn render_delimited<R: FieldSource>(
    rows: &[R],
    columns: &[Column],
    separator: u8,
    numbered: bool,
) -> Result<Vec<String>> {
    let columns = with_index(columns, numbered);
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(separator)
        .terminator(csv::Terminator::Any(b'\n'));

    let mut records = Vec::with_capacity(rows.len() + 1);
    records.push(delimited_record(
        &builder,
        columns.iter().map(|c| c.heading.clone()),
    )?);
    for row in rows {
        records.push(delimited_record(
            &builder,
            columns.iter().map(|c| cell(row.field(&c.field))),
        )?);
    }
    Ok(records)
}

fn delimited_record(
    builder: &csv::WriterBuilder,
    cells: impl Iterator<Item = String>,
) -> Result<String> {
    let mut wtr = builder.from_writer(Vec::new());
    wtr.write_record(cells)?;
    let bytes = wtr
        .into_inner()
        .map_err(|e| FinmanError::Other(format!("CSV output: {e}")))?;
    let mut text =
        String::from_utf8(bytes).map_err(|e| FinmanError::Other(format!("CSV output: {e}")))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Field separator for delimited output; the csv writer takes one ASCII byte.
pub fn delimiter(sep: char) -> Result<u8> {
    if sep.is_ascii() {
        Ok(sep as u8)
    } else {
        Err(FinmanError::Other(format!(
            "separator '{sep}' is not a single ASCII character"
        )))
    }
}
