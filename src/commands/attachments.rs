// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::storage::{self, BlobStore};
use crate::utils::{maybe_print_json, optional, parse_id, pretty_table, required};
use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let store = BlobStore::open_default()?;
    handle_with(conn, &store, m)
}

/// Same as `handle`, against an explicit bucket.
pub fn handle_with(conn: &Connection, store: &BlobStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let entity = required(sub, "entity")?;
            let entity_id = parse_id(required(sub, "id")?)?;
            let file = Path::new(required(sub, "file")?);
            let id = storage::attach(conn, store, entity, entity_id, file)?;
            let a = storage::get_attachment(conn, id)?;
            println!("Attached {} to {} {} (id {})", a.file_name, entity, entity_id, id);
        }
        Some(("list", sub)) => {
            let entity = optional(sub, "entity");
            let entity_id = optional(sub, "id").map(|v| parse_id(&v)).transpose()?;
            let items = storage::list_attachments(conn, entity.as_deref(), entity_id)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
                let rows = items
                    .iter()
                    .map(|a| {
                        vec![
                            a.id.to_string(),
                            a.entity.clone(),
                            a.entity_id.to_string(),
                            a.file_name.clone(),
                            a.path.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Entity", "Record", "File", "Path"], rows)
                );
            }
        }
        Some(("url", sub)) => {
            let a = storage::get_attachment(conn, parse_id(required(sub, "id")?)?)?;
            println!("{}", store.public_url(&a.path)?);
        }
        _ => {}
    }
    Ok(())
}
