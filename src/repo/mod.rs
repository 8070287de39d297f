// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Row-level access to every table. Functions take a plain `&Connection`, so a
//! `rusqlite::Transaction` can be passed wherever several writes must land together.

pub mod crm;
pub mod projects;
pub mod records;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::CrmError;

pub(crate) fn col_date(v: Option<String>, field: &str) -> Result<Option<NaiveDate>> {
    match v {
        Some(s) if !s.trim().is_empty() => {
            let d = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .with_context(|| format!("Invalid {} '{}' in store", field, s))?;
            Ok(Some(d))
        }
        _ => Ok(None),
    }
}

pub(crate) fn col_req_date(s: String, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid {} '{}' in store", field, s))
}

pub(crate) fn col_datetime(v: Option<String>, field: &str) -> Result<Option<NaiveDateTime>> {
    match v {
        Some(s) if !s.trim().is_empty() => {
            let d = NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S")
                .with_context(|| format!("Invalid {} '{}' in store", field, s))?;
            Ok(Some(d))
        }
        _ => Ok(None),
    }
}

pub(crate) fn col_decimal(s: String, field: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid {} '{}' in store", field, s))
}

pub(crate) fn col_enum<T: FromStr<Err = CrmError>>(s: String) -> Result<T> {
    Ok(s.parse::<T>()?)
}

pub(crate) fn date_col(d: Option<NaiveDate>) -> Option<String> {
    d.map(|d| d.to_string())
}

pub(crate) fn datetime_col(d: Option<NaiveDateTime>) -> Option<String> {
    d.map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
}
