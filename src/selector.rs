//! Filtered, positionally indexed views over a [`Store`].

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{FinmanError, Result};
use crate::fields::{
    FieldSource, FieldValue, FIELD_CAT_ALT, FIELD_ID, FIELD_IDX, FIELD_MODIFIED, FIELD_SOURCE_LINE,
};
use crate::filter::Filter;
use crate::models::{Transaction, NOTE_CATEGORY, NOTE_CATEGORY_AUTO, NOTE_REMARK};
use crate::range::RangeSpec;
use crate::store::{Store, TxnKey};

/// One transaction as seen through a view.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    /// 1-based position in the view.
    pub position: usize,
    pub key: TxnKey,
    pub txn: &'a Transaction,
    pub alt_category: Option<&'a str>,
}

impl FieldSource for Row<'_> {
    fn field(&self, name: &str) -> FieldValue {
        match name {
            FIELD_ID => return FieldValue::Id(self.txn.id().clone()),
            FIELD_IDX => return FieldValue::text(self.position.to_string()),
            FIELD_MODIFIED => return FieldValue::Flag(self.txn.is_modified()),
            FIELD_CAT_ALT => return FieldValue::text(self.alt_category.unwrap_or_default()),
            FIELD_SOURCE_LINE => {
                return FieldValue::text(self.txn.source_line.map(|l| l.to_string()).unwrap_or_default())
            }
            _ => {}
        }
        if let Some(v) = self.txn.columns.get(name) {
            return FieldValue::text(v.as_str());
        }

        let notes = &self.txn.notes;
        match name {
            NOTE_CATEGORY => FieldValue::text(notes.category.as_str()),
            NOTE_CATEGORY_AUTO => {
                FieldValue::text(notes.category_auto.map(|b| b.to_string()).unwrap_or_default())
            }
            NOTE_REMARK => FieldValue::text(notes.remark.as_str()),
            _ => match notes.extra.get(name) {
                Some(Value::String(s)) => FieldValue::text(s.as_str()),
                Some(Value::Null) => FieldValue::text(""),
                Some(other) => FieldValue::text(other.to_string()),
                None => {
                    info!(field = name, id = %self.txn.id(), "transaction has no such field");
                    FieldValue::text("")
                }
            },
        }
    }
}

/// The result of a query: matching transactions in file order, numbered
/// from 1. Positions are local to this view; scratch categories live in the
/// view as well, never on the transactions.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    filter: String,
    keys: Vec<TxnKey>,
    alt_categories: HashMap<TxnKey, String>,
}

impl Selector {
    /// Every transaction of the store matching `expr`.
    ///
    /// `_idx` conditions refer to the position in the whole store.
    pub fn query(store: &Store, expr: &str) -> Self {
        let filter = Filter::compile(expr, store.known_fields());
        let keys: Vec<TxnKey> = store
            .transactions()
            .enumerate()
            .filter(|&(i, (key, txn))| {
                filter.matches(&Row {
                    position: i + 1,
                    key,
                    txn,
                    alt_category: None,
                })
            })
            .map(|(_, (key, _))| key)
            .collect();
        debug!(filter = expr, matched = keys.len(), "query");
        Self {
            filter: expr.trim().to_string(),
            keys,
            alt_categories: HashMap::new(),
        }
    }

    /// Narrow this view with another filter and renumber it.
    ///
    /// `_idx` conditions refer to the positions of the current view.
    pub fn refine(&mut self, store: &Store, expr: &str) {
        let filter = Filter::compile(expr, store.known_fields());
        let kept: Vec<TxnKey> = self
            .rows(store)
            .into_iter()
            .filter(|row| filter.matches(row))
            .map(|row| row.key)
            .collect();
        self.alt_categories.retain(|key, _| kept.contains(key));
        self.keys = kept;

        let expr = expr.trim();
        if !expr.is_empty() {
            self.filter = if self.filter.is_empty() {
                expr.to_string()
            } else {
                format!("{}|{expr}", self.filter)
            };
        }
        debug!(filter = %self.filter, matched = self.keys.len(), "refined");
    }

    /// The combined filter expression this view was built from.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Parse a range string against the size of this view.
    pub fn range(&self, spec: &str) -> RangeSpec {
        RangeSpec::parse(spec, self.len())
    }

    /// Every row of the view.
    pub fn rows<'a>(&'a self, store: &'a Store) -> Vec<Row<'a>> {
        self.subset(store, None)
    }

    /// Rows whose position lies in `range`; all rows without one.
    pub fn subset<'a>(&'a self, store: &'a Store, range: Option<&RangeSpec>) -> Vec<Row<'a>> {
        self.keys
            .iter()
            .enumerate()
            .map(|(i, key)| (i + 1, *key))
            .filter(|(position, _)| range.map_or(true, |r| r.contains(*position)))
            .filter_map(|(position, key)| {
                Some(Row {
                    position,
                    key,
                    txn: store.get(key)?,
                    alt_category: self.alt_categories.get(&key).map(String::as_str),
                })
            })
            .collect()
    }

    fn key_at(&self, position: usize) -> Result<TxnKey> {
        position
            .checked_sub(1)
            .and_then(|i| self.keys.get(i))
            .copied()
            .ok_or(FinmanError::NoSuchPosition(position))
    }

    fn txn_at<'s>(&self, store: &'s mut Store, position: usize) -> Result<&'s mut Transaction> {
        let key = self.key_at(position)?;
        store
            .get_mut(key)
            .ok_or(FinmanError::NoSuchPosition(position))
    }

    /// Remember a proposed category for the row at `position`. Shown as the
    /// `_cat_alt` field; never saved.
    pub fn set_alt_category(&mut self, position: usize, category: &str) -> Result<()> {
        let key = self.key_at(position)?;
        if category.is_empty() {
            self.alt_categories.remove(&key);
        } else {
            self.alt_categories.insert(key, category.to_string());
        }
        Ok(())
    }

    pub fn alt_category(&self, position: usize) -> Option<&str> {
        let key = self.key_at(position).ok()?;
        self.alt_categories.get(&key).map(String::as_str)
    }

    /// Returns whether the transaction changed.
    pub fn set_category(&self, store: &mut Store, position: usize, category: &str, auto: bool) -> Result<bool> {
        let txn = self.txn_at(store, position)?;
        let changed = txn.set_category(category, auto);
        if changed {
            debug!(id = %txn.id(), category, auto, "category set");
        }
        Ok(changed)
    }

    pub fn clear_category(&self, store: &mut Store, position: usize) -> Result<bool> {
        let txn = self.txn_at(store, position)?;
        let changed = txn.clear_category();
        if changed {
            debug!(id = %txn.id(), "category cleared");
        }
        Ok(changed)
    }

    pub fn set_remark(&self, store: &mut Store, position: usize, remark: &str) -> Result<bool> {
        let txn = self.txn_at(store, position)?;
        let changed = txn.set_remark(remark);
        if changed {
            debug!(id = %txn.id(), remark, "remark set");
        }
        Ok(changed)
    }
}
