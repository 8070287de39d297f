// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{MilestoneStatus, ProjectMilestone};
use crate::repo::projects;
use crate::utils::{
    fmt_opt_date, id_for_project, maybe_print_json, optional, parse_amount, parse_enum, parse_id,
    parse_opt_date, pretty_table, required, today,
};
use crate::workflow;
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let project_id = id_for_project(conn, required(sub, "project")?)?;
            let milestone = ProjectMilestone {
                id: 0,
                project_id,
                name: required(sub, "name")?.to_string(),
                amount: parse_amount(required(sub, "amount")?)?,
                due_date: parse_opt_date(sub.get_one::<String>("due"))?,
                status: MilestoneStatus::Pending,
                paid_amount: Decimal::ZERO,
                paid_date: None,
            };
            let id = workflow::add_milestone(conn, &milestone)?;
            println!("Added milestone '{}' (id {})", milestone.name, id);
        }
        Some(("list", sub)) => {
            let json_flag = sub.get_flag("json");
            let jsonl_flag = sub.get_flag("jsonl");
            let project_id = optional(sub, "project")
                .map(|n| id_for_project(conn, &n))
                .transpose()?;
            let items = projects::load_milestones(conn, project_id)?;
            if !maybe_print_json(json_flag, jsonl_flag, &items)? {
                let rows = items
                    .iter()
                    .map(|m| {
                        vec![
                            m.id.to_string(),
                            m.name.clone(),
                            format!("{:.2}", m.amount),
                            m.status.to_string(),
                            format!("{:.2}", m.paid_amount),
                            fmt_opt_date(m.due_date),
                            fmt_opt_date(m.paid_date),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["ID", "Name", "Amount", "Status", "Paid", "Due", "Paid on"],
                        rows
                    )
                );
            }
        }
        Some(("status", sub)) => {
            let id = parse_id(required(sub, "id")?)?;
            let status: MilestoneStatus = parse_enum(required(sub, "status")?)?;
            let partial = optional(sub, "paid-amount")
                .map(|v| parse_amount(&v))
                .transpose()?;
            let paid_date = parse_opt_date(sub.get_one::<String>("paid-date"))?;
            let m = workflow::set_milestone_status(conn, id, status, partial, paid_date, today())?;
            println!(
                "Milestone '{}' is {} ({:.2} of {:.2})",
                m.name, m.status, m.paid_amount, m.amount
            );
        }
        Some(("rm", sub)) => {
            let id = parse_id(required(sub, "id")?)?;
            projects::delete_milestone(conn, id)?;
            println!("Removed milestone {}", id);
        }
        _ => {}
    }
    Ok(())
}
