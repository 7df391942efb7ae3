//! Cell stringification for preview rows.
//!
//! The same formatter is used for display and for row filtering, so a row
//! matches a query exactly when the query appears in one of its displayed cells.

use std::fmt::Write as _;

use chrono::{
    DateTime,
    format::{Item, StrftimeItems},
};
use serde_json::Value;

use crate::{Result, error::PortalError};

/// Converts json cell values into display strings.
///
/// - `null` becomes the empty string
/// - strings are shown as-is, unless a date format is set and the string is an
///   RFC 3339 timestamp, in which case it is reformatted with that
///   [chrono strftime](https://docs.rs/chrono/latest/chrono/format/strftime/index.html) format
/// - booleans and numbers use their natural form
/// - arrays and objects use compact json
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellFormatter {
    date_format: Option<String>,
}

impl CellFormatter {
    /// Formatter that reformats RFC 3339 timestamps with `date_format`
    pub fn with_date_format(date_format: impl Into<String>) -> Self {
        Self {
            date_format: Some(date_format.into()),
        }
    }

    /// Like [`with_date_format`](Self::with_date_format), rejecting formats chrono cannot render.
    ///
    /// # Errors
    /// - [`PortalError::Validation`] if `date_format` contains an invalid specifier
    pub fn try_with_date_format(date_format: impl Into<String>) -> Result<Self> {
        let date_format = date_format.into();
        if StrftimeItems::new(&date_format).any(|item| matches!(item, Item::Error)) {
            return Err(PortalError::Validation {
                message: format!("invalid date format '{date_format}'"),
            });
        }
        Ok(Self::with_date_format(date_format))
    }

    pub fn date_format(&self) -> Option<&str> {
        self.date_format.as_deref()
    }

    pub fn format(&self, value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(text) => self.format_text(text),
            Value::Bool(flag) => flag.to_string(),
            Value::Number(number) => number.to_string(),
            Value::Array(_) | Value::Object(_) => {
                serde_json::to_string(value).unwrap_or_default()
            }
        }
    }

    fn format_text(&self, text: &str) -> String {
        if let Some(fmt) = self.date_format.as_deref()
            && let Ok(timestamp) = DateTime::parse_from_rfc3339(text)
        {
            // an unrenderable format leaves the text unchanged
            let mut out = String::new();
            if write!(out, "{}", timestamp.format(fmt)).is_ok() {
                return out;
            }
        }
        text.to_string()
    }
}
