// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::reports::summarize_in;
use crate::config::get_base_currency;
use crate::models::{Client, ClientCost, ClientRevenue, Currency};
use crate::recurring::{Totals, partition_by_project, project_balance};
use crate::repo::{crm, projects, records};
use crate::utils::{
    fmt_opt_date, id_for_client, maybe_print_json, optional, parse_enum, parse_opt_date,
    pretty_table, required, today, validate_email,
};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("rm", sub)) => {
            let name = required(sub, "name")?;
            let id = id_for_client(conn, name)?;
            crm::delete_client(conn, id)?;
            println!("Removed client '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required(sub, "name")?.to_string();
    let email = optional(sub, "email");
    if let Some(ref e) = email {
        validate_email(e)?;
    }
    let client = Client {
        name,
        company: optional(sub, "company"),
        email,
        phone: optional(sub, "phone"),
        address: optional(sub, "address"),
        notes: optional(sub, "notes"),
        ..Client::default()
    };
    let id = crm::insert_client(conn, &client)?;
    println!("Added client '{}' (id {})", client.name, id);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let needle = optional(sub, "search").map(|s| s.to_lowercase());
    let clients: Vec<Client> = crm::load_clients(conn)?
        .into_iter()
        .filter(|c| {
            needle.as_ref().is_none_or(|n| {
                c.name.to_lowercase().contains(n)
                    || c.company.as_deref().is_some_and(|v| v.to_lowercase().contains(n))
                    || c.email.as_deref().is_some_and(|v| v.to_lowercase().contains(n))
            })
        })
        .collect();
    if !maybe_print_json(json_flag, jsonl_flag, &clients)? {
        let rows = clients
            .iter()
            .map(|c| {
                vec![
                    c.name.clone(),
                    c.company.clone().unwrap_or_default(),
                    c.email.clone().unwrap_or_default(),
                    c.phone.clone().unwrap_or_default(),
                    c.contact_count.to_string(),
                    fmt_opt_date(c.last_contact_date),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Name", "Company", "Email", "Phone", "Contacts", "Last contact"],
                rows
            )
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct BucketRow {
    pub bucket: String,
    pub expenses: Totals,
    pub income: Totals,
}

#[derive(Debug, Serialize)]
pub struct ProjectRow {
    pub name: String,
    pub status: String,
    pub payment_type: String,
    pub total: String,
    pub paid: String,
    pub remaining: String,
}

#[derive(Debug, Serialize)]
pub struct ClientReport {
    pub client: Client,
    pub currency: Currency,
    pub buckets: Vec<BucketRow>,
    pub projects: Vec<ProjectRow>,
}

pub fn client_report(
    conn: &Connection,
    client_id: i64,
    reference: chrono::NaiveDate,
    target: Currency,
) -> Result<ClientReport> {
    let client = crm::get_client(conn, client_id)?;
    let expenses = records::load_client_records::<ClientCost>(conn, client_id)?;
    let income = records::load_client_records::<ClientRevenue>(conn, client_id)?;
    let client_projects: Vec<_> = projects::load_projects(conn)?
        .into_iter()
        .filter(|p| p.client_id == client_id)
        .collect();
    let milestones = projects::load_milestones(conn, None)?;

    let exp_parts = partition_by_project(&expenses);
    let inc_parts = partition_by_project(&income);

    let mut buckets = Vec::new();
    let general_exp: Vec<_> = exp_parts.general.iter().map(|r| (*r).clone()).collect();
    let general_inc: Vec<_> = inc_parts.general.iter().map(|r| (*r).clone()).collect();
    buckets.push(BucketRow {
        bucket: "(general)".into(),
        expenses: summarize_in(conn, &general_exp, reference, target)?.totals,
        income: summarize_in(conn, &general_inc, reference, target)?.totals,
    });
    for p in &client_projects {
        let exp: Vec<_> = exp_parts
            .per_project
            .get(&p.id)
            .map(|v| v.iter().map(|r| (*r).clone()).collect())
            .unwrap_or_default();
        let inc: Vec<_> = inc_parts
            .per_project
            .get(&p.id)
            .map(|v| v.iter().map(|r| (*r).clone()).collect())
            .unwrap_or_default();
        buckets.push(BucketRow {
            bucket: p.name.clone(),
            expenses: summarize_in(conn, &exp, reference, target)?.totals,
            income: summarize_in(conn, &inc, reference, target)?.totals,
        });
    }

    let projects_out = client_projects
        .iter()
        .map(|p| {
            let bal = project_balance(p, &milestones);
            ProjectRow {
                name: p.name.clone(),
                status: p.status.to_string(),
                payment_type: p.payment_type.map(|t| t.to_string()).unwrap_or_default(),
                total: format!("{:.2}", bal.total),
                paid: format!("{:.2}", bal.paid),
                remaining: format!("{:.2}", bal.remaining),
            }
        })
        .collect();

    Ok(ClientReport {
        client,
        currency: target,
        buckets,
        projects: projects_out,
    })
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let client_id = id_for_client(conn, required(sub, "name")?)?;
    let reference = parse_opt_date(sub.get_one::<String>("date"))?.unwrap_or_else(today);
    let target = match optional(sub, "currency") {
        Some(c) => parse_enum::<Currency>(&c)?,
        None => get_base_currency(conn)?,
    };
    let report = client_report(conn, client_id, reference, target)?;
    if maybe_print_json(json_flag, jsonl_flag, &report)? {
        return Ok(());
    }

    let c = &report.client;
    println!(
        "{} {} <{}> contacts: {} last: {}",
        c.name,
        c.company.as_deref().unwrap_or(""),
        c.email.as_deref().unwrap_or(""),
        c.contact_count,
        fmt_opt_date(c.last_contact_date)
    );
    let rows = report
        .buckets
        .iter()
        .map(|b| {
            vec![
                b.bucket.clone(),
                format!("{:.2}", b.expenses.monthly),
                format!("{:.2}", b.expenses.annual),
                format!("{:.2}", b.income.monthly),
                format!("{:.2}", b.income.annual),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &[
                &format!("Bucket ({})", report.currency),
                "Expense/mo",
                "Expense/yr",
                "Income/mo",
                "Income/yr",
            ],
            rows
        )
    );
    let rows = report
        .projects
        .iter()
        .map(|p| {
            vec![
                p.name.clone(),
                p.status.clone(),
                p.payment_type.clone(),
                p.total.clone(),
                p.paid.clone(),
                p.remaining.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Project", "Status", "Payment", "Total", "Paid", "Remaining"],
            rows
        )
    );
    Ok(())
}
