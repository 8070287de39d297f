// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::get_base_currency;
use crate::joins::{join_by_foreign_key, name_of};
use crate::models::{Currency, PaymentType, Project, ProjectStatus};
use crate::recurring::project_balance;
use crate::repo::{crm, projects};
use crate::utils::{
    fmt_money, fmt_opt_date, id_for_client, id_for_project, maybe_print_json, optional,
    parse_amount, parse_enum, parse_opt_date, pretty_table, required, today,
};
use crate::workflow::{self, ProjectSave};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("status", sub)) => {
            let id = id_for_project(conn, required(sub, "name")?)?;
            let status: ProjectStatus = parse_enum(required(sub, "status")?)?;
            let saved = workflow::set_project_status(conn, id, status, today())?;
            report_save(&saved);
        }
        Some(("pay", sub)) => {
            let id = id_for_project(conn, required(sub, "name")?)?;
            let amount = parse_amount(required(sub, "amount")?)?;
            let p = workflow::record_project_payment(conn, id, amount)?;
            println!(
                "'{}' paid {} of {}",
                p.name,
                fmt_money(&p.paid_amount, p.currency),
                fmt_money(&p.total_amount, p.currency)
            );
        }
        Some(("show", sub)) => show(conn, sub)?,
        Some(("rm", sub)) => {
            let name = required(sub, "name")?;
            projects::delete_project(conn, id_for_project(conn, name)?)?;
            println!("Removed project '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

fn report_save(saved: &ProjectSave) {
    println!("Saved project '{}' ({})", saved.project.name, saved.project.status);
    if let Some(id) = saved.posted_income {
        println!("Posted completion income (id {})", id);
    }
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let client_id = id_for_client(conn, required(sub, "client")?)?;
    let currency: Currency = match optional(sub, "currency") {
        Some(c) => parse_enum(&c)?,
        None => get_base_currency(conn)?,
    };
    let project = Project {
        id: 0,
        client_id,
        name: required(sub, "name")?.to_string(),
        status: optional(sub, "status")
            .map(|s| parse_enum(&s))
            .transpose()?
            .unwrap_or(ProjectStatus::Planned),
        total_amount: optional(sub, "total")
            .map(|v| parse_amount(&v))
            .transpose()?
            .unwrap_or(Decimal::ZERO),
        currency,
        payment_type: optional(sub, "payment-type")
            .map(|s| parse_enum::<PaymentType>(&s))
            .transpose()?,
        paid_amount: Decimal::ZERO,
        start_date: parse_opt_date(sub.get_one::<String>("start"))?,
        end_date: parse_opt_date(sub.get_one::<String>("end"))?,
    };
    let saved = workflow::create_project(conn, project, today())?;
    report_save(&saved);
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_for_project(conn, required(sub, "name")?)?;
    let mut p = projects::get_project(conn, id)?;
    if let Some(name) = optional(sub, "rename") {
        p.name = name;
    }
    if let Some(v) = optional(sub, "total") {
        p.total_amount = parse_amount(&v)?;
    }
    if let Some(c) = optional(sub, "currency") {
        p.currency = parse_enum(&c)?;
    }
    if let Some(t) = optional(sub, "payment-type") {
        p.payment_type = Some(parse_enum(&t)?);
    }
    if let Some(s) = optional(sub, "status") {
        p.status = parse_enum(&s)?;
    }
    if let Some(d) = parse_opt_date(sub.get_one::<String>("start"))? {
        p.start_date = Some(d);
    }
    if let Some(d) = parse_opt_date(sub.get_one::<String>("end"))? {
        p.end_date = Some(d);
    }
    let saved = workflow::save_project(conn, p, today())?;
    report_save(&saved);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let client_id = optional(sub, "client")
        .map(|n| id_for_client(conn, &n))
        .transpose()?;
    let status: Option<ProjectStatus> = optional(sub, "status").map(|s| parse_enum(&s)).transpose()?;
    let all: Vec<Project> = projects::load_projects(conn)?
        .into_iter()
        .filter(|p| client_id.is_none_or(|id| p.client_id == id))
        .filter(|p| status.is_none_or(|s| p.status == s))
        .collect();
    if maybe_print_json(json_flag, jsonl_flag, &all)? {
        return Ok(());
    }
    let clients = crm::load_clients(conn)?;
    let milestones = projects::load_milestones(conn, None)?;
    let rows = join_by_foreign_key(&all, &clients, |p| Some(p.client_id), |c| c.id)
        .into_iter()
        .map(|(p, client)| {
            let bal = project_balance(p, &milestones);
            vec![
                p.name.clone(),
                name_of(client, |c| c.name.as_str()),
                p.status.to_string(),
                p.payment_type.map(|t| t.to_string()).unwrap_or_default(),
                fmt_money(&bal.total, p.currency),
                fmt_money(&bal.paid, p.currency),
                fmt_money(&bal.remaining, p.currency),
                fmt_opt_date(p.start_date),
                fmt_opt_date(p.end_date),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &[
                "Project", "Client", "Status", "Payment", "Total", "Paid", "Remaining", "Start",
                "End"
            ],
            rows
        )
    );
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let id = id_for_project(conn, required(sub, "name")?)?;
    let (project, balance) = workflow::project_with_balance(conn, id)?;
    let milestones = projects::load_milestones(conn, Some(id))?;
    let payload = serde_json::json!({
        "project": project,
        "balance": balance,
        "milestones": milestones,
    });
    if maybe_print_json(json_flag, jsonl_flag, &payload)? {
        return Ok(());
    }
    println!(
        "{} [{}] {} paid {} remaining {}",
        project.name,
        project.status,
        fmt_money(&balance.total, project.currency),
        fmt_money(&balance.paid, project.currency),
        fmt_money(&balance.remaining, project.currency)
    );
    if !milestones.is_empty() {
        let rows = milestones
            .iter()
            .map(|m| {
                vec![
                    m.id.to_string(),
                    m.name.clone(),
                    fmt_money(&m.amount, project.currency),
                    m.status.to_string(),
                    fmt_money(&m.paid_amount, project.currency),
                    fmt_opt_date(m.due_date),
                    fmt_opt_date(m.paid_date),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Milestone", "Amount", "Status", "Paid", "Due", "Paid on"], rows)
        );
    }
    Ok(())
}
