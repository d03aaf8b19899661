// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loosely-typed ingestion values and per-[`DataType`] coercion.
//!
//! Adapters emit [`AttributeValue`]s straight from upstream payloads. Only
//! [`TypedValue`]s, produced by [`coerce`], are allowed into persistence.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::types::DataType;

/// A value as it arrived from an external source.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    /// A date in whatever textual form the source uses.
    Date(String),
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Text(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Number(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Number(v as f64)
    }
}

impl From<u32> for AttributeValue {
    fn from(v: u32) -> Self {
        AttributeValue::Number(f64::from(v))
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Boolean(v)
    }
}

/// A value that has been checked against its attribute's declared type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    String(String),
    Text(String),
    Number(f64),
    Boolean(bool),
    Date(NaiveDate),
}

impl TypedValue {
    pub fn data_type(&self) -> DataType {
        match self {
            TypedValue::String(_) => DataType::String,
            TypedValue::Text(_) => DataType::Text,
            TypedValue::Number(_) => DataType::Number,
            TypedValue::Boolean(_) => DataType::Boolean,
            TypedValue::Date(_) => DataType::Date,
        }
    }

    /// Column encoding used by the storage layer.
    pub fn to_storage(&self) -> String {
        match self {
            TypedValue::String(s) | TypedValue::Text(s) => s.clone(),
            TypedValue::Number(n) => format_number(*n),
            TypedValue::Boolean(b) => b.to_string(),
            TypedValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    /// Decode a stored column back into a typed value.
    pub fn from_storage(data_type: DataType, raw: &str) -> Result<Self, CoercionError> {
        coerce(&AttributeValue::Text(raw.to_string()), data_type)
    }
}

/// Why a loose value could not be coerced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    #[error("value is empty")]
    Empty,
    #[error("`{0}` is not a number")]
    NotANumber(String),
    #[error("number is not finite")]
    NotFinite,
    #[error("`{0}` is not a boolean")]
    NotABoolean(String),
    #[error("`{0}` is not a date")]
    NotADate(String),
    #[error("cannot convert {from} to {to}")]
    Incompatible { from: &'static str, to: DataType },
}

/// Coerce a loose upstream value to `data_type`.
pub fn coerce(value: &AttributeValue, data_type: DataType) -> Result<TypedValue, CoercionError> {
    match data_type {
        DataType::String => as_text(value).map(TypedValue::String),
        DataType::Text => as_text(value).map(TypedValue::Text),
        DataType::Number => as_number(value).map(TypedValue::Number),
        DataType::Boolean => as_boolean(value).map(TypedValue::Boolean),
        DataType::Date => as_date(value).map(TypedValue::Date),
    }
}

fn as_text(value: &AttributeValue) -> Result<String, CoercionError> {
    let text = match value {
        AttributeValue::Text(s) | AttributeValue::Date(s) => s.trim().to_string(),
        AttributeValue::Number(n) if n.is_finite() => format_number(*n),
        AttributeValue::Number(_) => return Err(CoercionError::NotFinite),
        AttributeValue::Boolean(b) => b.to_string(),
    };
    if text.is_empty() {
        return Err(CoercionError::Empty);
    }
    Ok(text)
}

fn as_number(value: &AttributeValue) -> Result<f64, CoercionError> {
    let n = match value {
        AttributeValue::Number(n) => *n,
        AttributeValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Err(CoercionError::Empty);
            }
            s.parse::<f64>()
                .map_err(|_| CoercionError::NotANumber(s.to_string()))?
        }
        AttributeValue::Boolean(_) => {
            return Err(CoercionError::Incompatible {
                from: "boolean",
                to: DataType::Number,
            });
        }
        AttributeValue::Date(_) => {
            return Err(CoercionError::Incompatible {
                from: "date",
                to: DataType::Number,
            });
        }
    };
    if !n.is_finite() {
        return Err(CoercionError::NotFinite);
    }
    Ok(n)
}

fn as_boolean(value: &AttributeValue) -> Result<bool, CoercionError> {
    match value {
        AttributeValue::Boolean(b) => Ok(*b),
        AttributeValue::Number(n) if *n == 0.0 => Ok(false),
        AttributeValue::Number(n) if *n == 1.0 => Ok(true),
        AttributeValue::Number(n) => Err(CoercionError::NotABoolean(format_number(*n))),
        AttributeValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" => Err(CoercionError::Empty),
            "true" | "yes" | "y" | "1" => Ok(true),
            "false" | "no" | "n" | "0" => Ok(false),
            _ => Err(CoercionError::NotABoolean(s.clone())),
        },
        AttributeValue::Date(_) => Err(CoercionError::Incompatible {
            from: "date",
            to: DataType::Boolean,
        }),
    }
}

fn as_date(value: &AttributeValue) -> Result<NaiveDate, CoercionError> {
    match value {
        AttributeValue::Text(s) | AttributeValue::Date(s) => parse_date(s),
        AttributeValue::Number(n) if n.fract() == 0.0 && (1.0..=9999.0).contains(n) => {
            NaiveDate::from_ymd_opt(*n as i32, 1, 1)
                .ok_or_else(|| CoercionError::NotADate(format_number(*n)))
        }
        AttributeValue::Number(n) => Err(CoercionError::NotADate(format_number(*n))),
        AttributeValue::Boolean(_) => Err(CoercionError::Incompatible {
            from: "boolean",
            to: DataType::Date,
        }),
    }
}

/// Accepts full dates, year-month, and bare years (which sources use for
/// partially known publication dates). Partial dates resolve to the first day.
fn parse_date(raw: &str) -> Result<NaiveDate, CoercionError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(CoercionError::Empty);
    }
    let date_part = s.split('T').next().unwrap_or(s);
    if let Ok(d) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        return Ok(d);
    }
    let parts: Vec<&str> = date_part.split('-').collect();
    let parsed = match parts.as_slice() {
        [year, month] => year
            .parse::<i32>()
            .ok()
            .zip(month.parse::<u32>().ok())
            .and_then(|(y, m)| NaiveDate::from_ymd_opt(y, m, 1)),
        [year] if year.len() == 4 => year
            .parse::<i32>()
            .ok()
            .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)),
        _ => None,
    };
    parsed.ok_or_else(|| CoercionError::NotADate(s.to_string()))
}

/// Integers render without a fractional part.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
