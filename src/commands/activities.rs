// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::filters::ActivityFilter;
use crate::joins::{join_by_foreign_key, name_of};
use crate::models::{Activity, ActivityKind, ActivityStatus};
use crate::repo::crm;
use crate::utils::{
    id_for_client, id_for_lead, maybe_print_json, now, optional, parse_date, parse_enum, parse_id,
    parse_opt_date, pretty_table, required, today,
};
use crate::workflow;
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("complete", sub)) => {
            let a = workflow::complete_activity(conn, parse_id(required(sub, "id")?)?, now())?;
            println!("Completed '{}'", a.title);
        }
        Some(("cancel", sub)) => {
            let a = workflow::cancel_activity(conn, parse_id(required(sub, "id")?)?, today())?;
            println!("Cancelled '{}'", a.title);
        }
        Some(("reschedule", sub)) => {
            let date = parse_date(required(sub, "date")?)?;
            let id = parse_id(required(sub, "id")?)?;
            let a = workflow::reschedule_activity(conn, id, date, today())?;
            println!("'{}' moved to {} ({})", a.title, a.scheduled_date, a.status);
        }
        Some(("rm", sub)) => {
            let id = parse_id(required(sub, "id")?)?;
            crm::delete_activity(conn, id)?;
            println!("Removed activity {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let kind: ActivityKind = parse_enum(required(sub, "kind")?)?;
    let lead_id = optional(sub, "lead")
        .map(|n| id_for_lead(conn, &n))
        .transpose()?;
    let client_id = optional(sub, "client")
        .map(|n| id_for_client(conn, &n))
        .transpose()?;
    let activity = Activity {
        id: 0,
        title: required(sub, "title")?.to_string(),
        kind,
        lead_id,
        client_id,
        scheduled_date: parse_date(required(sub, "date")?)?,
        status: ActivityStatus::Pending,
        completed_at: None,
        notes: optional(sub, "notes"),
    };
    let id = workflow::add_activity(conn, &activity, today())?;
    println!("Scheduled {} '{}' on {} (id {})", kind, activity.title, activity.scheduled_date, id);
    Ok(())
}

#[derive(Debug, Serialize)]
struct ActivityRow<'a> {
    #[serde(flatten)]
    activity: &'a Activity,
    lead: String,
    client: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let filter = ActivityFilter {
        status: optional(sub, "status").map(|s| parse_enum(&s)).transpose()?,
        kind: optional(sub, "kind").map(|s| parse_enum(&s)).transpose()?,
        lead_id: optional(sub, "lead")
            .map(|n| id_for_lead(conn, &n))
            .transpose()?,
        client_id: optional(sub, "client")
            .map(|n| id_for_client(conn, &n))
            .transpose()?,
        from: parse_opt_date(sub.get_one::<String>("from"))?,
        to: parse_opt_date(sub.get_one::<String>("to"))?,
    };

    let activities = workflow::load_activities(conn, today())?;
    let shown: Vec<Activity> = filter.apply(&activities).into_iter().cloned().collect();
    let leads = crm::load_leads(conn)?;
    let clients = crm::load_clients(conn)?;
    let with_leads = join_by_foreign_key(&shown, &leads, |a| a.lead_id, |l| l.id);
    let with_clients = join_by_foreign_key(&shown, &clients, |a| a.client_id, |c| c.id);

    let rows: Vec<ActivityRow> = with_leads
        .into_iter()
        .zip(with_clients)
        .map(|((a, lead), (_, client))| ActivityRow {
            activity: a,
            lead: name_of(lead, |l| l.name.as_str()),
            client: name_of(client, |c| c.name.as_str()),
        })
        .collect();

    if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
        let data = rows
            .iter()
            .map(|r| {
                vec![
                    r.activity.id.to_string(),
                    r.activity.scheduled_date.to_string(),
                    r.activity.kind.to_string(),
                    r.activity.title.clone(),
                    r.activity.status.to_string(),
                    r.lead.clone(),
                    r.client.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Kind", "Title", "Status", "Lead", "Client"],
                data
            )
        );
    }
    Ok(())
}
