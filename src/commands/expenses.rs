// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::records::{filter_from_args, print_records, record_from_args};
use crate::models::{ClientCost, ClientExpense, Company, CompanyExpense, OwnerKind};
use crate::repo::records;
use crate::utils::{
    id_for_client, id_for_project, optional, parse_id, parse_opt_date, required, today,
};
use crate::workflow;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => {
            let client_id = optional(sub, "client")
                .map(|n| id_for_client(conn, &n))
                .transpose()?;
            if sub.get_flag("clients") || client_id.is_some() {
                let all = match client_id {
                    Some(id) => records::load_client_records::<ClientCost>(conn, id)?,
                    None => records::load_records::<ClientCost>(conn)?,
                };
                let filter = filter_from_args(conn, sub, client_id)?;
                print_records(sub, &filter.apply(&all))?;
            } else {
                let all = records::load_records::<Company>(conn)?;
                let filter = filter_from_args(conn, sub, None)?;
                print_records(sub, &filter.apply(&all))?;
            }
        }
        Some(("pay", sub)) => {
            let id = parse_id(required(sub, "id")?)?;
            let on = parse_opt_date(sub.get_one::<String>("date"))?.unwrap_or_else(today);
            if sub.get_flag("clients") {
                report_paid(&workflow::mark_record_paid::<ClientCost>(conn, id, on)?);
            } else {
                report_paid(&workflow::mark_record_paid::<Company>(conn, id, on)?);
            }
        }
        Some(("rm", sub)) => {
            let id = parse_id(required(sub, "id")?)?;
            if sub.get_flag("clients") {
                records::delete_record::<ClientCost>(conn, id)?;
            } else {
                records::delete_record::<Company>(conn, id)?;
            }
            println!("Removed expense {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn report_paid<K: OwnerKind>(rec: &crate::models::RecurringRecord<K>) {
    match rec.renewal_date {
        Some(next) => println!("'{}' paid, renews {}", rec.name, next),
        None => println!("'{}' paid", rec.name),
    }
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    match optional(sub, "client") {
        Some(client) => {
            let client_id = id_for_client(conn, &client)?;
            let project_id = optional(sub, "project")
                .map(|n| id_for_project(conn, &n))
                .transpose()?;
            let rec: ClientExpense = record_from_args(
                conn,
                sub,
                ClientCost {
                    client_id,
                    project_id,
                },
            )?;
            let id = workflow::add_record(conn, &rec)?;
            println!("Added client expense '{}' (id {})", rec.name, id);
        }
        None => {
            if optional(sub, "project").is_some() {
                return Err(crate::error::CrmError::validation(
                    "a project needs --client as well",
                )
                .into());
            }
            let rec: CompanyExpense = record_from_args(conn, sub, Company)?;
            let id = workflow::add_record(conn, &rec)?;
            println!("Added company expense '{}' (id {})", rec.name, id);
        }
    }
    Ok(())
}
