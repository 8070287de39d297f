// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::CrmError;
use crate::models::{ClientCost, ClientRevenue, Company, OwnerKind, RecurringRecord};
use crate::repo::{crm, records};
use crate::utils::{fmt_opt_date, required};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("records", sub)) => export_records(conn, sub),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Json,
}

fn export_records(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = match required(sub, "format")?.to_lowercase().as_str() {
        "csv" => Format::Csv,
        "json" => Format::Json,
        other => {
            return Err(CrmError::UnknownVariant {
                kind: "export format",
                value: other.to_string(),
            }
            .into());
        }
    };
    let kind = required(sub, "kind")?;
    let out = required(sub, "out")?;

    let n = match kind {
        "company-expenses" => write_records(&records::load_records::<Company>(conn)?, fmt, out)?,
        "client-expenses" => write_records(&records::load_records::<ClientCost>(conn)?, fmt, out)?,
        "income" => write_records(&records::load_records::<ClientRevenue>(conn)?, fmt, out)?,
        "leads" => write_leads(conn, fmt, out)?,
        other => {
            return Err(CrmError::UnknownVariant {
                kind: "export kind",
                value: other.to_string(),
            }
            .into());
        }
    };
    println!("Exported {} {} to {}", n, kind, out);
    Ok(())
}

const RECORD_HEADER: [&str; 14] = [
    "id",
    "name",
    "category",
    "amount",
    "currency",
    "frequency",
    "status",
    "start_date",
    "end_date",
    "payment_date",
    "renewal_date",
    "client_id",
    "project_id",
    "notes",
];

fn opt_id(id: Option<i64>) -> String {
    id.map(|v| v.to_string()).unwrap_or_default()
}

fn write_records<K: OwnerKind>(items: &[RecurringRecord<K>], fmt: Format, out: &str) -> Result<usize> {
    match fmt {
        Format::Csv => {
            let mut wtr =
                csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
            wtr.write_record(RECORD_HEADER)?;
            for r in items {
                wtr.write_record([
                    r.id.to_string(),
                    r.name.clone(),
                    r.category.clone().unwrap_or_default(),
                    r.amount.to_string(),
                    r.currency.to_string(),
                    r.frequency.to_string(),
                    r.status.to_string(),
                    fmt_opt_date(r.start_date),
                    fmt_opt_date(r.end_date),
                    fmt_opt_date(r.payment_date),
                    fmt_opt_date(r.renewal_date),
                    opt_id(r.owner.client_id()),
                    opt_id(r.owner.project_id()),
                    r.notes.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        Format::Json => {
            std::fs::write(out, serde_json::to_string_pretty(items)?)
                .with_context(|| format!("Write {}", out))?;
        }
    }
    Ok(items.len())
}

fn write_leads(conn: &Connection, fmt: Format, out: &str) -> Result<usize> {
    let leads = crm::load_leads(conn)?;
    match fmt {
        Format::Csv => {
            let mut wtr =
                csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
            wtr.write_record([
                "id",
                "name",
                "company",
                "email",
                "phone",
                "source",
                "status",
                "value",
                "currency",
                "contact_count",
                "last_contact_date",
                "next_follow_up",
            ])?;
            for l in &leads {
                wtr.write_record([
                    l.id.to_string(),
                    l.name.clone(),
                    l.company.clone().unwrap_or_default(),
                    l.email.clone().unwrap_or_default(),
                    l.phone.clone().unwrap_or_default(),
                    l.source.clone().unwrap_or_default(),
                    l.status.to_string(),
                    l.value.map(|v| v.to_string()).unwrap_or_default(),
                    l.currency.to_string(),
                    l.contact_count.to_string(),
                    fmt_opt_date(l.last_contact_date),
                    fmt_opt_date(l.next_follow_up),
                ])?;
            }
            wtr.flush()?;
        }
        Format::Json => {
            std::fs::write(out, serde_json::to_string_pretty(&leads)?)
                .with_context(|| format!("Write {}", out))?;
        }
    }
    Ok(leads.len())
}
