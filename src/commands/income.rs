// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::records::{filter_from_args, print_records, record_from_args};
use crate::models::ClientRevenue;
use crate::repo::records;
use crate::utils::{
    id_for_client, id_for_project, optional, parse_id, parse_opt_date, required, today,
};
use crate::workflow;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let client_id = id_for_client(conn, required(sub, "client")?)?;
            let project_id = optional(sub, "project")
                .map(|n| id_for_project(conn, &n))
                .transpose()?;
            let rec = record_from_args(
                conn,
                sub,
                ClientRevenue {
                    client_id,
                    project_id,
                },
            )?;
            let id = workflow::add_record(conn, &rec)?;
            println!("Added income '{}' (id {})", rec.name, id);
        }
        Some(("list", sub)) => {
            let client_id = optional(sub, "client")
                .map(|n| id_for_client(conn, &n))
                .transpose()?;
            let all = match client_id {
                Some(id) => records::load_client_records::<ClientRevenue>(conn, id)?,
                None => records::load_records::<ClientRevenue>(conn)?,
            };
            let filter = filter_from_args(conn, sub, client_id)?;
            print_records(sub, &filter.apply(&all))?;
        }
        Some(("pay", sub)) => {
            let id = parse_id(required(sub, "id")?)?;
            let on = parse_opt_date(sub.get_one::<String>("date"))?.unwrap_or_else(today);
            let rec = workflow::mark_record_paid::<ClientRevenue>(conn, id, on)?;
            println!("'{}' received on {}", rec.name, on);
        }
        Some(("rm", sub)) => {
            let id = parse_id(required(sub, "id")?)?;
            records::delete_record::<ClientRevenue>(conn, id)?;
            println!("Removed income {}", id);
        }
        _ => {}
    }
    Ok(())
}
