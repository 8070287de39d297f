// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::get_base_currency;
use crate::error::CrmError;
use crate::filters::LeadFilter;
use crate::models::{Currency, Lead, LeadEventKind, LeadStatus};
use crate::repo::crm;
use crate::utils::{
    fmt_opt_date, id_for_lead, maybe_print_json, optional, parse_amount, parse_enum,
    parse_opt_date, pretty_table, required, today, validate_email,
};
use crate::workflow;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("status", sub)) => {
            let name = required(sub, "name")?;
            let status: LeadStatus = parse_enum(required(sub, "status")?)?;
            let on = parse_opt_date(sub.get_one::<String>("date"))?.unwrap_or_else(today);
            let lead = workflow::change_lead_status(conn, id_for_lead(conn, name)?, status, on)?;
            println!("Lead '{}' is now {}", lead.name, lead.status);
        }
        Some(("log", sub)) => {
            let name = required(sub, "name")?;
            let kind: LeadEventKind = parse_enum(required(sub, "kind")?)?;
            if kind == LeadEventKind::StatusChange {
                return Err(CrmError::validation("use 'lead status' to change the pipeline stage").into());
            }
            let on = parse_opt_date(sub.get_one::<String>("date"))?.unwrap_or_else(today);
            let lead = workflow::log_lead_activity(
                conn,
                id_for_lead(conn, name)?,
                kind,
                required(sub, "description")?,
                on,
            )?;
            println!(
                "Logged {} with '{}' ({} contacts, last {})",
                kind,
                lead.name,
                lead.contact_count,
                fmt_opt_date(lead.last_contact_date)
            );
        }
        Some(("history", sub)) => history(conn, sub)?,
        Some(("convert", sub)) => {
            let name = required(sub, "name")?;
            let lead_id = id_for_lead(conn, name)?;
            if let Some(client) = converted_client(conn, lead_id)? {
                return Err(CrmError::validation(format!(
                    "lead '{}' was already converted into client '{}'",
                    name, client
                ))
                .into());
            }
            let client_id = workflow::convert_lead(conn, lead_id)?;
            println!("Converted lead '{}' into client (id {})", name, client_id);
        }
        Some(("rm", sub)) => {
            let name = required(sub, "name")?;
            crm::delete_lead(conn, id_for_lead(conn, name)?)?;
            println!("Removed lead '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let email = optional(sub, "email");
    if let Some(ref e) = email {
        validate_email(e)?;
    }
    let currency: Currency = match optional(sub, "currency") {
        Some(c) => parse_enum(&c)?,
        None => get_base_currency(conn)?,
    };
    let lead = Lead {
        id: 0,
        name: required(sub, "name")?.to_string(),
        company: optional(sub, "company"),
        email,
        phone: optional(sub, "phone"),
        source: optional(sub, "source"),
        status: LeadStatus::New,
        value: optional(sub, "value").map(|v| parse_amount(&v)).transpose()?,
        currency,
        contact_count: 0,
        last_contact_date: None,
        next_follow_up: parse_opt_date(sub.get_one::<String>("follow-up"))?,
        notes: optional(sub, "notes"),
    };
    let id = crm::insert_lead(conn, &lead)?;
    println!("Added lead '{}' (id {})", lead.name, id);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let filter = LeadFilter {
        status: optional(sub, "status").map(|s| parse_enum(&s)).transpose()?,
        source: optional(sub, "source"),
        search: optional(sub, "search"),
        pattern: optional(sub, "match"),
        follow_up_by: parse_opt_date(sub.get_one::<String>("follow-up-by"))?,
        open_only: sub.get_flag("open"),
    };
    let leads = crm::load_leads(conn)?;
    let shown = filter.apply(&leads)?;
    if !maybe_print_json(json_flag, jsonl_flag, &shown)? {
        let rows = shown
            .iter()
            .map(|l| {
                vec![
                    l.name.clone(),
                    l.company.clone().unwrap_or_default(),
                    l.status.to_string(),
                    l.source.clone().unwrap_or_default(),
                    l.value
                        .map(|v| format!("{} {:.2}", l.currency, v))
                        .unwrap_or_default(),
                    l.contact_count.to_string(),
                    fmt_opt_date(l.last_contact_date),
                    fmt_opt_date(l.next_follow_up),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "Name", "Company", "Status", "Source", "Value", "Contacts", "Last", "Follow-up"
                ],
                rows
            )
        );
    }
    Ok(())
}

fn history(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let lead_id = id_for_lead(conn, required(sub, "name")?)?;
    let entries = crm::load_lead_activities(conn, lead_id)?;
    if !maybe_print_json(json_flag, jsonl_flag, &entries)? {
        let rows = entries
            .iter()
            .map(|e| vec![e.date.to_string(), e.kind.to_string(), e.description.clone()])
            .collect();
        println!("{}", pretty_table(&["Date", "Kind", "Description"], rows));
        if let Some(client) = converted_client(conn, lead_id)? {
            println!("Converted into client '{}'", client);
        }
    }
    Ok(())
}

/// Name of the client created from this lead, if it was converted.
fn converted_client(conn: &Connection, lead_id: i64) -> Result<Option<String>> {
    match crm::find_client_by_lead(conn, lead_id)? {
        Some(id) => Ok(Some(crm::get_client(conn, id)?.name)),
        None => Ok(None),
    }
}
