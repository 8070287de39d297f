// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::get_base_currency;
use crate::models::{
    ActivityStatus, ClientCost, ClientRevenue, Company, Currency, InvoiceStatus, LeadStatus,
    OwnerKind, ProjectStatus, RecurringRecord,
};
use crate::recurring::{RecurringSummary, Totals, milestones_outstanding, summarize_with};
use crate::repo::{crm, projects, records};
use crate::utils::{
    fx_convert, id_for_client, maybe_print_json, optional, or_empty, parse_enum, parse_opt_date,
    pretty_table, today,
};
use crate::workflow;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("recurring", sub)) => recurring(conn, sub)?,
        Some(("dashboard", sub)) => dashboard_cmd(conn, sub)?,
        Some(("pipeline", sub)) => pipeline_cmd(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Summarises records after converting every amount into `target` at the
/// reference date.
pub fn summarize_in<'a, K: OwnerKind>(
    conn: &Connection,
    records: &'a [RecurringRecord<K>],
    reference: NaiveDate,
    target: Currency,
) -> Result<RecurringSummary<'a, K>> {
    summarize_with(records, reference, |rec, amount| {
        fx_convert(conn, reference, amount, rec.currency, target)
            .with_context(|| format!("Convert '{}' to {}", rec.name, target))
    })
}

fn reference_and_target(conn: &Connection, sub: &clap::ArgMatches) -> Result<(NaiveDate, Currency)> {
    let reference = parse_opt_date(sub.get_one::<String>("date"))?.unwrap_or_else(today);
    let target = match optional(sub, "currency") {
        Some(c) => parse_enum::<Currency>(&c)?,
        None => get_base_currency(conn)?,
    };
    Ok((reference, target))
}

#[derive(Debug, Serialize)]
struct RecurringRow {
    id: i64,
    name: String,
    frequency: String,
    amount: String,
    currency: Currency,
    monthly: String,
    bucket: &'static str,
}

#[derive(Debug, Serialize)]
struct RecurringReport {
    currency: Currency,
    reference: NaiveDate,
    rows: Vec<RecurringRow>,
    totals: Totals,
}

fn build_recurring<K: OwnerKind>(
    conn: &Connection,
    records: &[RecurringRecord<K>],
    reference: NaiveDate,
    target: Currency,
) -> Result<RecurringReport> {
    let summary = summarize_in(conn, records, reference, target)?;
    let mut rows = Vec::new();
    for (bucket, list) in [("active", &summary.active), ("one_time", &summary.one_time)] {
        for r in list.iter() {
            rows.push(RecurringRow {
                id: r.id,
                name: r.name.clone(),
                frequency: r.frequency.to_string(),
                amount: format!("{:.2}", r.amount),
                currency: r.currency,
                monthly: format!(
                    "{:.2}",
                    crate::recurring::monthly_equivalent(r.amount, r.frequency)
                ),
                bucket,
            });
        }
    }
    Ok(RecurringReport {
        currency: target,
        reference,
        rows,
        totals: summary.totals,
    })
}

fn recurring(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let (reference, target) = reference_and_target(conn, sub)?;
    let client_id = optional(sub, "client")
        .map(|name| id_for_client(conn, &name))
        .transpose()?;
    let scope = optional(sub, "scope").unwrap_or_else(|| "company".to_string());

    let report = match scope.as_str() {
        "company" => build_recurring(conn, &records::load_records::<Company>(conn)?, reference, target)?,
        "client-expenses" => {
            let recs = match client_id {
                Some(id) => records::load_client_records::<ClientCost>(conn, id)?,
                None => records::load_records::<ClientCost>(conn)?,
            };
            build_recurring(conn, &recs, reference, target)?
        }
        "income" => {
            let recs = match client_id {
                Some(id) => records::load_client_records::<ClientRevenue>(conn, id)?,
                None => records::load_records::<ClientRevenue>(conn)?,
            };
            build_recurring(conn, &recs, reference, target)?
        }
        other => {
            return Err(crate::error::CrmError::UnknownVariant {
                kind: "report scope",
                value: other.to_string(),
            }
            .into());
        }
    };

    if maybe_print_json(json_flag, jsonl_flag, &report)? {
        return Ok(());
    }
    let rows = report
        .rows
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.name.clone(),
                r.frequency.clone(),
                format!("{} {}", r.currency, r.amount),
                r.monthly.clone(),
                r.bucket.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["ID", "Name", "Frequency", "Amount", "Monthly", "Bucket"], rows)
    );
    println!(
        "{} on {}: monthly {:.2}, annual {:.2}, one-time this month {:.2}",
        report.currency,
        report.reference,
        report.totals.monthly,
        report.totals.annual,
        report.totals.one_time
    );
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub currency: Currency,
    pub reference: NaiveDate,
    pub company_expenses: Totals,
    pub client_expenses: Totals,
    pub income: Totals,
    /// Recurring income minus all recurring expenses, per month.
    pub net_monthly: Decimal,
    pub open_leads: usize,
    pub pipeline_value: Decimal,
    pub overdue_activities: usize,
    pub due_today: usize,
    pub active_projects: usize,
    pub milestones_outstanding: Decimal,
    pub invoices_outstanding: Decimal,
}

/// Builds the overview. Individual collections that fail to load are logged
/// and treated as empty so the rest of the view still renders.
pub fn dashboard(conn: &Connection, reference: NaiveDate, target: Currency) -> Result<Dashboard> {
    let company = or_empty(records::load_records::<Company>(conn), "company expenses");
    let client_exp = or_empty(records::load_records::<ClientCost>(conn), "client expenses");
    let income = or_empty(records::load_records::<ClientRevenue>(conn), "client income");
    let leads = or_empty(crm::load_leads(conn), "leads");
    let activities = or_empty(workflow::load_activities(conn, today()), "activities");
    let all_projects = or_empty(projects::load_projects(conn), "projects");
    let milestones = or_empty(projects::load_milestones(conn, None), "milestones");
    let invoices = or_empty(projects::load_invoices(conn), "invoices");

    let company_expenses = summarize_in(conn, &company, reference, target)?.totals;
    let client_expenses = summarize_in(conn, &client_exp, reference, target)?.totals;
    let income_totals = summarize_in(conn, &income, reference, target)?.totals;

    let open: Vec<_> = leads.iter().filter(|l| !l.status.is_closed()).collect();
    let mut pipeline_value = Decimal::ZERO;
    for l in &open {
        if let Some(v) = l.value {
            pipeline_value += fx_convert(conn, reference, v, l.currency, target)?;
        }
    }

    let mut invoices_outstanding = Decimal::ZERO;
    for inv in invoices
        .iter()
        .filter(|i| matches!(i.status, InvoiceStatus::Pending | InvoiceStatus::Overdue))
    {
        invoices_outstanding += fx_convert(conn, reference, inv.amount, inv.currency, target)?;
    }

    let mut outstanding = Decimal::ZERO;
    for p in &all_projects {
        let own: Vec<_> = milestones
            .iter()
            .filter(|m| m.project_id == p.id)
            .cloned()
            .collect();
        let open_amount = milestones_outstanding(&own);
        if !open_amount.is_zero() {
            outstanding += fx_convert(conn, reference, open_amount, p.currency, target)?;
        }
    }

    Ok(Dashboard {
        currency: target,
        reference,
        net_monthly: income_totals.monthly - company_expenses.monthly - client_expenses.monthly,
        company_expenses,
        client_expenses,
        income: income_totals,
        open_leads: open.len(),
        pipeline_value,
        overdue_activities: activities
            .iter()
            .filter(|a| a.status == ActivityStatus::Overdue)
            .count(),
        due_today: activities
            .iter()
            .filter(|a| {
                a.scheduled_date == reference
                    && matches!(a.status, ActivityStatus::Pending | ActivityStatus::Rescheduled)
            })
            .count(),
        active_projects: all_projects
            .iter()
            .filter(|p| p.status == ProjectStatus::Active)
            .count(),
        milestones_outstanding: outstanding,
        invoices_outstanding,
    })
}

fn dashboard_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let (reference, target) = reference_and_target(conn, sub)?;
    let d = dashboard(conn, reference, target)?;
    if maybe_print_json(json_flag, jsonl_flag, &d)? {
        return Ok(());
    }
    let money = |v: Decimal| format!("{:.2}", v.round_dp(2));
    let rows = vec![
        vec!["Company expenses / month".into(), money(d.company_expenses.monthly)],
        vec!["Company expenses / year".into(), money(d.company_expenses.annual)],
        vec!["Client expenses / month".into(), money(d.client_expenses.monthly)],
        vec!["Income / month".into(), money(d.income.monthly)],
        vec!["Income / year".into(), money(d.income.annual)],
        vec!["One-time income this month".into(), money(d.income.one_time)],
        vec!["Net / month".into(), money(d.net_monthly)],
        vec!["Open leads".into(), d.open_leads.to_string()],
        vec!["Pipeline value".into(), money(d.pipeline_value)],
        vec!["Overdue activities".into(), d.overdue_activities.to_string()],
        vec!["Due today".into(), d.due_today.to_string()],
        vec!["Active projects".into(), d.active_projects.to_string()],
        vec!["Milestones outstanding".into(), money(d.milestones_outstanding)],
        vec!["Invoices outstanding".into(), money(d.invoices_outstanding)],
    ];
    println!(
        "{}",
        pretty_table(&[&format!("{} ({})", d.reference, d.currency), "Value"], rows)
    );
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct PipelineStage {
    pub status: LeadStatus,
    pub count: usize,
    pub value: Decimal,
}

/// Lead counts and estimated value per stage, in the base currency.
pub fn pipeline(conn: &Connection, reference: NaiveDate) -> Result<Vec<PipelineStage>> {
    let base = get_base_currency(conn)?;
    let leads = or_empty(crm::load_leads(conn), "leads");
    let mut out = Vec::new();
    for status in LeadStatus::ALL {
        let mut stage = PipelineStage {
            status: *status,
            count: 0,
            value: Decimal::ZERO,
        };
        for l in leads.iter().filter(|l| l.status == *status) {
            stage.count += 1;
            if let Some(v) = l.value {
                stage.value += fx_convert(conn, reference, v, l.currency, base)?;
            }
        }
        out.push(stage);
    }
    Ok(out)
}

fn pipeline_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let stages = pipeline(conn, today())?;
    if !maybe_print_json(json_flag, jsonl_flag, &stages)? {
        let base = get_base_currency(conn)?;
        let rows = stages
            .iter()
            .map(|s| {
                vec![
                    s.status.to_string(),
                    s.count.to_string(),
                    format!("{:.2}", s.value.round_dp(2)),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Stage", "Leads", &format!("Value ({})", base)], rows)
        );
    }
    Ok(())
}
