//! Items backing the check combo widget
//!
//! An item is a (label, value, tooltip) triple. Dynamic input (JSON arrays,
//! SQL result rows) is validated into an [`ItemSpec`] before it reaches the
//! widget, so malformed shapes are rejected at the call boundary.

use super::query::CellValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Value carried by an item, returned by the widget's selection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemValue {
    Integer(i64),
    Text(String),
}

impl fmt::Display for ItemValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemValue::Integer(i) => write!(f, "{}", i),
            ItemValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ItemValue {
    fn from(value: i64) -> Self {
        ItemValue::Integer(value)
    }
}

impl From<&str> for ItemValue {
    fn from(value: &str) -> Self {
        ItemValue::Text(value.to_string())
    }
}

impl From<String> for ItemValue {
    fn from(value: String) -> Self {
        ItemValue::Text(value)
    }
}

/// One selectable entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub label: String,
    pub value: ItemValue,
    pub tooltip: Option<String>,
}

/// Accepted shapes for bulk-adding items
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSpec {
    /// Value defaults to the label
    Label(String),
    LabelValue(String, ItemValue),
    LabelValueTooltip(String, ItemValue, String),
}

impl From<&str> for ItemSpec {
    fn from(label: &str) -> Self {
        ItemSpec::Label(label.to_string())
    }
}

impl<V: Into<ItemValue>> From<(&str, V)> for ItemSpec {
    fn from((label, value): (&str, V)) -> Self {
        ItemSpec::LabelValue(label.to_string(), value.into())
    }
}

impl<V: Into<ItemValue>> From<(&str, V, &str)> for ItemSpec {
    fn from((label, value, tooltip): (&str, V, &str)) -> Self {
        ItemSpec::LabelValueTooltip(label.to_string(), value.into(), tooltip.to_string())
    }
}

/// Rejected item shape
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ItemShapeError {
    #[error("expected a label or a (label, value) / (label, value, tooltip) tuple, got a tuple of {arity} element(s)")]
    Arity { arity: usize },

    #[error("expected a label or a tuple, got {found}")]
    NotAnItem { found: String },

    #[error("item label must be text, got {found}")]
    Label { found: String },

    #[error("item {index}: {cause}")]
    AtIndex {
        index: usize,
        cause: Box<ItemShapeError>,
    },
}

impl ItemShapeError {
    /// Attach the position of the offending element in a bulk input
    pub fn at(self, index: usize) -> Self {
        ItemShapeError::AtIndex {
            index,
            cause: Box::new(self),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn json_label(value: &Value) -> Result<String, ItemShapeError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(ItemShapeError::Label {
            found: json_kind(other).to_string(),
        }),
    }
}

/// A JSON null value means "default to the label"
fn json_value(value: &Value, label: &str) -> ItemValue {
    match value {
        Value::Null => ItemValue::Text(label.to_string()),
        Value::String(s) => ItemValue::Text(s.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => ItemValue::Integer(i),
            None => ItemValue::Text(n.to_string()),
        },
        other => ItemValue::Text(other.to_string()),
    }
}

impl TryFrom<&Value> for ItemSpec {
    type Error = ItemShapeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(label) => Ok(ItemSpec::Label(label.clone())),
            Value::Array(parts) => match parts.as_slice() {
                [label, value] => {
                    let label = json_label(label)?;
                    let value = json_value(value, &label);
                    Ok(ItemSpec::LabelValue(label, value))
                }
                [label, value, tooltip] => {
                    let label = json_label(label)?;
                    let value = json_value(value, &label);
                    match tooltip {
                        Value::Null => Ok(ItemSpec::LabelValue(label, value)),
                        Value::String(t) => Ok(ItemSpec::LabelValueTooltip(label, value, t.clone())),
                        other => Ok(ItemSpec::LabelValueTooltip(label, value, other.to_string())),
                    }
                }
                _ => Err(ItemShapeError::Arity { arity: parts.len() }),
            },
            other => Err(ItemShapeError::NotAnItem {
                found: json_kind(other).to_string(),
            }),
        }
    }
}

fn cell_label(cell: &CellValue) -> Result<String, ItemShapeError> {
    match cell {
        CellValue::Null => Err(ItemShapeError::Label {
            found: "NULL".to_string(),
        }),
        CellValue::Blob(_) => Err(ItemShapeError::Label {
            found: "a blob".to_string(),
        }),
        other => Ok(other.to_string()),
    }
}

fn cell_value(cell: &CellValue, label: &str) -> ItemValue {
    match cell {
        CellValue::Null => ItemValue::Text(label.to_string()),
        CellValue::Integer(i) => ItemValue::Integer(*i),
        other => ItemValue::Text(other.to_string()),
    }
}

/// A result row: one column is a label, two add a value, three add a tooltip
impl TryFrom<Vec<CellValue>> for ItemSpec {
    type Error = ItemShapeError;

    fn try_from(row: Vec<CellValue>) -> Result<Self, Self::Error> {
        match row.as_slice() {
            [label] => Ok(ItemSpec::Label(cell_label(label)?)),
            [label, value] => {
                let label = cell_label(label)?;
                let value = cell_value(value, &label);
                Ok(ItemSpec::LabelValue(label, value))
            }
            [label, value, tooltip] => {
                let label = cell_label(label)?;
                let value = cell_value(value, &label);
                if tooltip.is_null() {
                    Ok(ItemSpec::LabelValue(label, value))
                } else {
                    Ok(ItemSpec::LabelValueTooltip(label, value, tooltip.to_string()))
                }
            }
            _ => Err(ItemShapeError::Arity { arity: row.len() }),
        }
    }
}
