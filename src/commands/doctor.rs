// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::get_base_currency;
use crate::lifecycle::validate_milestone;
use crate::models::{
    ActivityStatus, ClientCost, ClientRevenue, Company, Currency, OwnerKind, PaymentType,
    RecurringRecord,
};
use crate::repo::{crm, projects, records};
use crate::utils::{has_fx_rate, pretty_table, today};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub code: &'static str,
    pub detail: String,
}

fn issue(code: &'static str, detail: String) -> Issue {
    Issue { code, detail }
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows: Vec<Vec<String>> = check(conn, today())?
        .into_iter()
        .map(|i| vec![i.code.to_string(), i.detail])
        .collect();
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

fn inverted_windows<K: OwnerKind>(items: &[RecurringRecord<K>], out: &mut Vec<Issue>) {
    for r in items {
        if let (Some(start), Some(end)) = (r.start_date, r.end_date) {
            if end < start {
                out.push(issue(
                    "end_before_start",
                    format!("{} {} '{}': {} < {}", K::LABEL, r.id, r.name, end, start),
                ));
            }
        }
    }
}

fn currencies<K: OwnerKind>(items: &[RecurringRecord<K>], seen: &mut BTreeSet<Currency>) {
    seen.extend(items.iter().map(|r| r.currency));
}

/// Runs every consistency check against the stored data.
pub fn check(conn: &Connection, today: NaiveDate) -> Result<Vec<Issue>> {
    let mut out = Vec::new();

    // Milestone rows and their projects.
    let all_projects = projects::load_projects(conn)?;
    let milestones = projects::load_milestones(conn, None)?;
    for m in &milestones {
        if let Err(err) = validate_milestone(m) {
            out.push(issue("milestone_invariant", err.to_string()));
        }
    }
    for p in all_projects
        .iter()
        .filter(|p| p.payment_type == Some(PaymentType::Milestone))
    {
        let own: Vec<_> = milestones.iter().filter(|m| m.project_id == p.id).collect();
        if own.is_empty() {
            continue;
        }
        let sum: Decimal = own.iter().map(|m| m.amount).sum();
        if sum != p.total_amount {
            out.push(issue(
                "milestone_sum_mismatch",
                format!("project '{}': milestones {} vs total {}", p.name, sum, p.total_amount),
            ));
        }
    }
    for p in &all_projects {
        if let (Some(start), Some(end)) = (p.start_date, p.end_date) {
            if end < start {
                out.push(issue(
                    "end_before_start",
                    format!("project '{}': {} < {}", p.name, end, start),
                ));
            }
        }
    }

    let company = records::load_records::<Company>(conn)?;
    let client_exp = records::load_records::<ClientCost>(conn)?;
    let income = records::load_records::<ClientRevenue>(conn)?;
    inverted_windows(&company, &mut out);
    inverted_windows(&client_exp, &mut out);
    inverted_windows(&income, &mut out);

    // Raw rows: the listing path would have promoted these already.
    for a in crm::load_activities(conn)? {
        if a.status == ActivityStatus::Pending && a.scheduled_date < today {
            out.push(issue(
                "stale_pending_activity",
                format!("activity {} '{}' was due {}", a.id, a.title, a.scheduled_date),
            ));
        }
    }

    let base = get_base_currency(conn)?;
    let mut seen = BTreeSet::new();
    currencies(&company, &mut seen);
    currencies(&client_exp, &mut seen);
    currencies(&income, &mut seen);
    seen.extend(all_projects.iter().map(|p| p.currency));
    seen.extend(projects::load_invoices(conn)?.iter().map(|i| i.currency));
    seen.extend(crm::load_leads(conn)?.iter().map(|l| l.currency));
    for ccy in seen.into_iter().filter(|c| *c != base) {
        if !has_fx_rate(conn, today, base, ccy)? {
            out.push(issue("missing_fx", format!("{}/{} on or before {}", base, ccy, today)));
        }
    }
    Ok(out)
}
