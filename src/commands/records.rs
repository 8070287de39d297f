// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Argument handling shared by `expense` and `income`.

use crate::config::get_base_currency;
use crate::filters::RecordFilter;
use crate::models::{Frequency, OwnerKind, RecurringRecord};
use crate::recurring::monthly_equivalent;
use crate::utils::{
    fmt_money, fmt_opt_date, id_for_project, maybe_print_json, optional, parse_amount, parse_enum,
    parse_opt_date, pretty_table, required,
};
use anyhow::Result;
use rusqlite::Connection;

/// Builds a record from the common `add` flags. The owner is decided by the caller.
pub fn record_from_args<K: OwnerKind>(
    conn: &Connection,
    sub: &clap::ArgMatches,
    owner: K,
) -> Result<RecurringRecord<K>> {
    let frequency: Frequency = parse_enum(required(sub, "frequency")?)?;
    let mut rec = RecurringRecord::new(
        required(sub, "name")?,
        parse_amount(required(sub, "amount")?)?,
        frequency,
        owner,
    );
    rec.currency = match optional(sub, "currency") {
        Some(c) => parse_enum(&c)?,
        None => get_base_currency(conn)?,
    };
    if let Some(s) = optional(sub, "status") {
        rec.status = parse_enum(&s)?;
    }
    rec.category = optional(sub, "category");
    rec.start_date = parse_opt_date(sub.get_one::<String>("start"))?;
    rec.end_date = parse_opt_date(sub.get_one::<String>("end"))?;
    rec.payment_date = parse_opt_date(sub.get_one::<String>("payment-date"))?;
    rec.renewal_date = parse_opt_date(sub.get_one::<String>("renewal"))?;
    rec.notes = optional(sub, "notes");
    Ok(rec)
}

/// Filter from the common `list` flags; `client_id` comes from the caller.
pub fn filter_from_args(
    conn: &Connection,
    sub: &clap::ArgMatches,
    client_id: Option<i64>,
) -> Result<RecordFilter> {
    Ok(RecordFilter {
        status: optional(sub, "status").map(|s| parse_enum(&s)).transpose()?,
        frequency: optional(sub, "frequency").map(|s| parse_enum(&s)).transpose()?,
        currency: optional(sub, "currency").map(|s| parse_enum(&s)).transpose()?,
        client_id,
        project_id: optional(sub, "project")
            .map(|n| id_for_project(conn, &n))
            .transpose()?,
        general_only: sub.get_flag("general"),
        category: optional(sub, "category"),
        search: optional(sub, "search"),
        active_on: parse_opt_date(sub.get_one::<String>("active-on"))?,
    })
}

pub fn print_records<K: OwnerKind>(
    sub: &clap::ArgMatches,
    records: &[&RecurringRecord<K>],
) -> Result<()> {
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &records)? {
        return Ok(());
    }
    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.name.clone(),
                r.category.clone().unwrap_or_default(),
                fmt_money(&r.amount, r.currency),
                r.frequency.to_string(),
                format!("{:.2}", monthly_equivalent(r.amount, r.frequency).round_dp(2)),
                r.status.to_string(),
                fmt_opt_date(r.start_date),
                fmt_opt_date(r.end_date),
                fmt_opt_date(r.renewal_date),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &[
                "ID", "Name", "Category", "Amount", "Frequency", "Monthly", "Status", "Start",
                "End", "Renews"
            ],
            rows
        )
    );
    Ok(())
}
