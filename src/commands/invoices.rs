// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::get_base_currency;
use crate::error::CrmError;
use crate::joins::{join_by_foreign_key, name_of};
use crate::models::{Currency, Invoice, InvoiceStatus};
use crate::repo::{crm, projects};
use crate::utils::{
    fmt_money, fmt_opt_date, id_for_client, id_for_project, maybe_print_json, optional,
    parse_amount, parse_enum, parse_opt_date, pretty_table, required, today,
};
use crate::workflow;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("status", sub)) => {
            let status: InvoiceStatus = parse_enum(required(sub, "status")?)?;
            let inv = workflow::set_invoice_status(conn, required(sub, "number")?, status, today())?;
            println!("Invoice {} is {}", inv.number, inv.status);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let client_id = id_for_client(conn, required(sub, "client")?)?;
    let project_id = optional(sub, "project")
        .map(|n| id_for_project(conn, &n))
        .transpose()?;
    if let Some(pid) = project_id {
        let project = projects::get_project(conn, pid)?;
        if project.client_id != client_id {
            return Err(CrmError::validation(format!(
                "project '{}' belongs to another client",
                project.name
            ))
            .into());
        }
    }
    let currency: Currency = match optional(sub, "currency") {
        Some(c) => parse_enum(&c)?,
        None => get_base_currency(conn)?,
    };
    let issue_date = parse_opt_date(sub.get_one::<String>("issue"))?.unwrap_or_else(today);
    let due_date = parse_opt_date(sub.get_one::<String>("due"))?;
    if due_date.is_some_and(|d| d < issue_date) {
        return Err(CrmError::validation("invoice is due before it is issued").into());
    }
    let invoice = Invoice {
        id: 0,
        client_id,
        project_id,
        number: required(sub, "number")?.to_string(),
        amount: parse_amount(required(sub, "amount")?)?,
        currency,
        status: InvoiceStatus::Pending,
        issue_date,
        due_date,
        paid_date: None,
    };
    projects::insert_invoice(conn, &invoice)?;
    println!(
        "Issued invoice {} for {}",
        invoice.number,
        fmt_money(&invoice.amount, invoice.currency)
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let client_id = optional(sub, "client")
        .map(|n| id_for_client(conn, &n))
        .transpose()?;
    let status: Option<InvoiceStatus> = optional(sub, "status").map(|s| parse_enum(&s)).transpose()?;
    let invoices: Vec<Invoice> = projects::load_invoices(conn)?
        .into_iter()
        .filter(|i| client_id.is_none_or(|id| i.client_id == id))
        .filter(|i| status.is_none_or(|s| i.status == s))
        .collect();
    if maybe_print_json(json_flag, jsonl_flag, &invoices)? {
        return Ok(());
    }
    let clients = crm::load_clients(conn)?;
    let rows = join_by_foreign_key(&invoices, &clients, |i| Some(i.client_id), |c| c.id)
        .into_iter()
        .map(|(i, client)| {
            vec![
                i.number.clone(),
                name_of(client, |c| c.name.as_str()),
                fmt_money(&i.amount, i.currency),
                i.status.to_string(),
                i.issue_date.to_string(),
                fmt_opt_date(i.due_date),
                fmt_opt_date(i.paid_date),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Number", "Client", "Amount", "Status", "Issued", "Due", "Paid"],
            rows
        )
    );
    Ok(())
}
