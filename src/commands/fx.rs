// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{Settings, get_base_currency, set_base_currency};
use crate::error::CrmError;
use crate::models::Currency;
use crate::utils::{
    fx_convert, http_client, maybe_print_json, optional, parse_date, parse_decimal, parse_enum,
    pretty_table, required, today,
};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set-base", sub)) => {
            let ccy: Currency = parse_enum(required(sub, "currency")?)?;
            set_base_currency(conn, ccy)?;
            println!("Base currency set to {}", ccy);
        }
        Some(("rate", sub)) => {
            let date = parse_date(required(sub, "date")?)?;
            let base: Currency = parse_enum(required(sub, "base")?)?;
            let quote: Currency = parse_enum(required(sub, "quote")?)?;
            let rate = parse_decimal(required(sub, "rate")?)?;
            set_rate(conn, date, base, quote, rate)?;
            println!("{} 1 {} = {} {}", date, base, rate, quote);
        }
        Some(("fetch", sub)) => {
            let days: usize = *sub.get_one::<usize>("days").unwrap_or(&120);
            fetch_rates(conn, days)?;
        }
        Some(("list", sub)) => list_rates(conn, sub)?,
        Some(("convert", sub)) => convert_amount(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Stores `1 base = rate quote` for a day, replacing any earlier entry.
pub fn set_rate(
    conn: &Connection,
    date: NaiveDate,
    base: Currency,
    quote: Currency,
    rate: Decimal,
) -> Result<()> {
    if base == quote {
        return Err(CrmError::validation("base and quote must differ").into());
    }
    if rate <= Decimal::ZERO {
        return Err(CrmError::validation(format!("rate must be positive, got {}", rate)).into());
    }
    conn.execute(
        "INSERT INTO fx_rates(date, base, quote, rate) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(date, base, quote) DO UPDATE SET rate=excluded.rate",
        params![date.to_string(), base.as_str(), quote.as_str(), rate.to_string()],
    )?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct Series {
    rates: HashMap<String, HashMap<String, f64>>,
    #[serde(rename = "base")]
    _base: String,
}

fn fetch_rates(conn: &Connection, days: usize) -> Result<()> {
    let settings = Settings::load(conn)?;
    let base = settings.base_currency;
    let end = today();
    let start = end - chrono::Duration::days(days as i64);
    let targets: Vec<&str> = Currency::ALL
        .iter()
        .filter(|c| **c != base)
        .map(|c| c.as_str())
        .collect();
    let to_param = targets.join(",");
    let url = format!("https://api.frankfurter.dev/{start}..{end}?from={base}&to={to_param}");
    log::debug!("fetching {}", url);
    let client = http_client(settings.http_timeout_secs)?;
    let resp = client.get(url).send()?.error_for_status()?;
    let s: Series = resp.json()?;
    let mut n = 0usize;
    for (date, mp) in s.rates {
        for (quote, rate) in mp {
            n += conn.execute(
                "INSERT OR IGNORE INTO fx_rates(date, base, quote, rate) VALUES (?1, ?2, ?3, ?4)",
                params![date, base.as_str(), quote, rate.to_string()],
            )?;
        }
    }
    log::info!("stored {} fx rates", n);
    println!("FX rates fetched via Frankfurter (ECB): {} new.", n);
    Ok(())
}

#[derive(Debug, Serialize)]
struct RateRow {
    date: NaiveDate,
    base: Currency,
    quote: Currency,
    rate: Decimal,
}

fn load_rates(conn: &Connection, currency: Option<Currency>, limit: usize) -> Result<Vec<RateRow>> {
    let mut stmt = conn.prepare(
        "SELECT date, base, quote, rate FROM fx_rates \
         WHERE ?1 IS NULL OR base=?1 OR quote=?1 \
         ORDER BY date DESC, base, quote LIMIT ?2",
    )?;
    let mut rows = stmt.query(params![currency.map(|c| c.as_str()), limit as i64])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(RateRow {
            date: parse_date(&r.get::<_, String>(0)?)?,
            base: parse_enum(&r.get::<_, String>(1)?)?,
            quote: parse_enum(&r.get::<_, String>(2)?)?,
            rate: parse_decimal(&r.get::<_, String>(3)?)?,
        });
    }
    Ok(out)
}

fn list_rates(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let currency = optional(sub, "currency")
        .map(|c| parse_enum::<Currency>(&c))
        .transpose()?;
    let limit = *sub.get_one::<usize>("limit").unwrap_or(&50);
    let rates = load_rates(conn, currency, limit)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rates)? {
        return Ok(());
    }
    let base = get_base_currency(conn)?;
    let rows = rates
        .iter()
        .map(|r| {
            vec![
                r.date.to_string(),
                r.base.to_string(),
                r.quote.to_string(),
                r.rate.to_string(),
            ]
        })
        .collect();
    println!("Base currency: {}", base);
    println!("{}", pretty_table(&["Date", "Base", "Quote", "Rate"], rows));
    Ok(())
}

fn convert_amount(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(required(sub, "date")?)?;
    let amount = parse_decimal(required(sub, "amount")?)?;
    let from: Currency = parse_enum(required(sub, "from")?)?;
    let to: Currency = parse_enum(required(sub, "to")?)?;
    let res = fx_convert(conn, date, amount, from, to)?;
    println!("{} {} -> {:.4} {}", amount, from, res, to);
    Ok(())
}
