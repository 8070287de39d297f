// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::get_base_currency;
use crate::error::CrmError;
use crate::models::Currency;
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use std::str::FromStr;

const UA: &str = concat!("dealclip/", env!("CARGO_PKG_VERSION"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

pub fn http_client(timeout_secs: u64) -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

pub fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_opt_date(s: Option<&String>) -> Result<Option<NaiveDate>> {
    s.map(|v| parse_date(v)).transpose()
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    let s = s.trim();
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Money amounts entered by users must not be negative.
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    if d < Decimal::ZERO {
        return Err(CrmError::validation(format!("amount must not be negative, got {}", d)).into());
    }
    Ok(d)
}

pub fn parse_enum<T: FromStr<Err = CrmError>>(s: &str) -> Result<T> {
    Ok(s.parse::<T>()?)
}

pub fn required<'a>(sub: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    let v = sub
        .get_one::<String>(name)
        .map(|s| s.trim())
        .unwrap_or_default();
    if v.is_empty() {
        return Err(CrmError::validation(format!("'{}' is required", name)).into());
    }
    Ok(v)
}

pub fn optional(sub: &clap::ArgMatches, name: &str) -> Option<String> {
    sub.get_one::<String>(name)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

pub fn validate_email(email: &str) -> Result<(), CrmError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(CrmError::validation(format!("'{}' is not an email address", email)))
    }
}

pub fn fmt_money(d: &Decimal, ccy: Currency) -> String {
    format!("{} {:.2}", ccy, d.round_dp(2))
}

pub fn fmt_opt_date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.to_string()).unwrap_or_default()
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

fn id_by_name(conn: &Connection, table: &str, entity: &'static str, name: &str) -> Result<i64> {
    let name = name.trim();
    let id: Option<i64> = conn
        .query_row(
            &format!("SELECT id FROM {} WHERE name=?1", table),
            params![name],
            |r| r.get(0),
        )
        .optional()?;
    id.ok_or_else(|| CrmError::not_found(entity, name).into())
}

pub fn id_for_client(conn: &Connection, name: &str) -> Result<i64> {
    id_by_name(conn, "clients", "Client", name)
}

pub fn id_for_lead(conn: &Connection, name: &str) -> Result<i64> {
    id_by_name(conn, "leads", "Lead", name)
}

pub fn id_for_project(conn: &Connection, name: &str) -> Result<i64> {
    id_by_name(conn, "projects", "Project", name)
}

/// Parses a numeric id argument, trimming whitespace.
pub fn parse_id(s: &str) -> Result<i64> {
    let s = s.trim();
    s.parse::<i64>()
        .with_context(|| format!("Invalid id '{}'", s))
}

/// Convert an amount from 'from_ccy' to 'to_ccy' using the closest on-or-before rate.
/// We store base->quote rates. If pair not found directly, we attempt via the base currency hub.
pub fn fx_convert(
    conn: &Connection,
    date: NaiveDate,
    amount: Decimal,
    from_ccy: Currency,
    to_ccy: Currency,
) -> Result<Decimal> {
    if from_ccy == to_ccy {
        return Ok(amount);
    }
    let hub = get_base_currency(conn)?;

    fn find_rate(
        conn: &Connection,
        date: NaiveDate,
        base: Currency,
        quote: Currency,
    ) -> Result<Option<Decimal>> {
        let mut stmt = conn.prepare_cached(
            "SELECT rate FROM fx_rates WHERE base=?1 AND quote=?2 AND date<=?3 ORDER BY date DESC LIMIT 1",
        )?;
        let r: Option<String> = stmt
            .query_row(
                params![base.as_str(), quote.as_str(), date.to_string()],
                |r| r.get(0),
            )
            .optional()?;
        match r {
            Some(s) => {
                let d = s
                    .parse::<Decimal>()
                    .with_context(|| format!("Invalid rate '{}' for {}/{}", s, base, quote))?;
                Ok(Some(d))
            }
            None => Ok(None),
        }
    }

    if to_ccy == hub {
        if let Some(r) = find_rate(conn, date, hub, from_ccy)? {
            if r.is_zero() {
                return Ok(amount);
            }
            return Ok(amount / r);
        }
    } else if from_ccy == hub {
        if let Some(r) = find_rate(conn, date, hub, to_ccy)? {
            return Ok(amount * r);
        }
    } else {
        let base_amt = fx_convert(conn, date, amount, from_ccy, hub)?;
        return fx_convert(conn, date, base_amt, hub, to_ccy);
    }

    // Try reciprocal last
    if let Some(r) = find_rate(conn, date, to_ccy, from_ccy)? {
        if r.is_zero() {
            return Ok(amount);
        }
        return Ok(amount / r);
    }

    log::warn!("no {}/{} rate on or before {}; using amount unconverted", from_ccy, to_ccy, date);
    Ok(amount)
}

pub fn has_fx_rate(conn: &Connection, date: NaiveDate, base: Currency, quote: Currency) -> Result<bool> {
    let ok: Option<i32> = conn
        .query_row(
            "SELECT 1 FROM fx_rates WHERE ((base=?1 AND quote=?2) OR (base=?2 AND quote=?1)) AND date<=?3 LIMIT 1",
            params![base.as_str(), quote.as_str(), date.to_string()],
            |r| r.get(0),
        )
        .optional()?;
    Ok(ok.is_some())
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Dashboard reads degrade to an empty list instead of failing the view.
pub fn or_empty<T>(res: Result<Vec<T>>, what: &str) -> Vec<T> {
    match res {
        Ok(v) => v,
        Err(err) => {
            log::warn!("failed to load {}: {:#}", what, err);
            Vec::new()
        }
    }
}
