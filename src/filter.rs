//! Filter expressions such as `details=~rent|date>=2005-07-01|value<0`.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::error::{FinmanError, Result};
use crate::fields::{self, FieldSource, FieldValue, FIELD_ID, FIELD_IDX, FIELD_SOURCE_LINE};
use crate::fmt::parse_value;
use crate::models::{id_ordinal, COL_DATE, COL_VALUE};

const SEPARATOR_COND: char = '|';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Le,
    Ge,
    Lt,
    Gt,
    /// Case-insensitive substring test, written `=~`.
    Contains,
    Eq,
}

impl Operator {
    /// Two-character operators come before their one-character prefixes.
    const PARSE_ORDER: [Operator; 6] = [
        Operator::Le,
        Operator::Ge,
        Operator::Lt,
        Operator::Gt,
        Operator::Contains,
        Operator::Eq,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Contains => "=~",
            Self::Eq => "=",
        }
    }

    fn accepts(&self, ord: Ordering) -> bool {
        match self {
            Self::Le => ord != Ordering::Greater,
            Self::Ge => ord != Ordering::Less,
            Self::Lt => ord == Ordering::Less,
            Self::Gt => ord == Ordering::Greater,
            Self::Eq => ord == Ordering::Equal,
            Self::Contains => false,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contains => f.write_str("contains"),
            other => f.write_str(other.token()),
        }
    }
}

/// Comparison value, converted once when the filter is compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Text(String),
    Position(usize),
    Amount(Decimal),
    /// A line-based transaction identifier, with or without file prefix.
    Id { file: Option<usize>, line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub op: Operator,
    pub value: Operand,
}

impl Condition {
    fn matches(&self, row: &impl FieldSource) -> bool {
        let subject = row.field(&self.field);
        if self.op == Operator::Contains {
            let Operand::Text(needle) = &self.value else {
                return false;
            };
            return subject.to_string().to_uppercase().contains(needle.as_str());
        }

        match compare(&subject, &self.value) {
            Some(ord) => self.op.accepts(ord),
            None => {
                debug!(field = %self.field, value = %subject, "field value not comparable");
                false
            }
        }
    }
}

fn compare(subject: &FieldValue, value: &Operand) -> Option<Ordering> {
    let text = subject.to_string();
    match value {
        Operand::Text(v) => Some(text.as_str().cmp(v.as_str())),
        Operand::Position(n) => text.trim().parse::<usize>().ok().map(|s| s.cmp(n)),
        Operand::Amount(d) => parse_value(&text).map(|s| s.cmp(d)),
        Operand::Id { file, line } => {
            let FieldValue::Id(id) = subject else {
                return None;
            };
            let (subject_file, subject_line) = id.ordinal()?;
            match file {
                None => Some(subject_line.cmp(line)),
                Some(f) => Some((subject_file.unwrap_or(0), subject_line).cmp(&(*f, *line))),
            }
        }
    }
}

/// A compiled filter: all conditions must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Compile a `|`-separated filter expression against the known fields.
    ///
    /// Invalid conditions are dropped with a warning; the rest still applies.
    pub fn compile(expr: &str, known: &BTreeSet<String>) -> Self {
        let mut conditions = Vec::new();
        for cond in expr.split(SEPARATOR_COND) {
            if cond.trim().is_empty() {
                continue;
            }
            match compile_condition(cond, known) {
                Ok(c) => conditions.push(c),
                Err(e) => warn!("{e}; ignoring"),
            }
        }
        Self { conditions }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// True when every condition holds; the empty filter matches everything.
    pub fn matches(&self, row: &impl FieldSource) -> bool {
        self.conditions.iter().all(|c| c.matches(row))
    }
}

fn compile_condition(cond: &str, known: &BTreeSet<String>) -> Result<Condition> {
    let invalid = |reason: String| FinmanError::InvalidCondition {
        condition: cond.to_string(),
        reason,
    };

    let Some((op, pos)) = Operator::PARSE_ORDER
        .iter()
        .find_map(|op| cond.find(op.token()).map(|p| (*op, p)))
    else {
        return Err(invalid("no valid operator".to_string()));
    };

    let field = cond[..pos].trim();
    let value = cond[pos + op.token().len()..].trim();
    if field.is_empty() {
        return Err(invalid("no field".to_string()));
    }
    if value.is_empty() {
        return Err(invalid("no value".to_string()));
    }
    let field = fields::resolve(field, known)?;
    let value = unquote(value);

    if op == Operator::Contains {
        if fields::is_numeric(&field) {
            return Err(invalid(format!("operator '{op}' on numeric field '{field}'")));
        }
        return Ok(Condition {
            field,
            op,
            value: Operand::Text(value.to_uppercase()),
        });
    }

    if !fields::is_numeric(&field) && field != COL_DATE {
        info!(field = %field, op = %op, "unusual condition: ordering on a text field");
    }

    let value = match field.as_str() {
        FIELD_ID => match id_ordinal(value) {
            Some((file, line)) => Operand::Id { file, line },
            None => return Err(invalid(format!("'{value}' is not a transaction id"))),
        },
        FIELD_IDX | FIELD_SOURCE_LINE => match value.parse() {
            Ok(n) => Operand::Position(n),
            Err(_) => return Err(invalid(format!("'{value}' is not a position"))),
        },
        COL_VALUE => match parse_value(value) {
            Some(d) => Operand::Amount(d),
            None => return Err(invalid(format!("'{value}' is not an amount"))),
        },
        _ => Operand::Text(value.to_string()),
    };
    Ok(Condition { field, op, value })
}

/// Strip one pair of matching single or double quotes.
pub fn unquote(s: &str) -> &str {
    if s.len() >= 2 {
        for q in ['"', '\''] {
            if let Some(inner) = s.strip_prefix(q).and_then(|r| r.strip_suffix(q)) {
                return inner;
            }
        }
    }
    s
}
