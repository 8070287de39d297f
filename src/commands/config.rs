// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{self, KNOWN_KEYS, Settings};
use crate::error::CrmError;
use crate::utils::{maybe_print_json, pretty_table, required};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let key = required(sub, "key")?;
            let value = required(sub, "value")?;
            config::set_setting(conn, key, value)?;
            println!("{} = {}", key, value);
        }
        Some(("get", sub)) => {
            let key = required(sub, "key")?;
            if !KNOWN_KEYS.contains(&key) {
                return Err(CrmError::UnknownVariant {
                    kind: "setting",
                    value: key.to_string(),
                }
                .into());
            }
            let settings = Settings::load(conn)?;
            let value = serde_json::to_value(&settings)?;
            match value.get(key) {
                Some(serde_json::Value::String(s)) => println!("{}", s),
                Some(v) => println!("{}", v),
                None => {}
            }
        }
        Some(("list", sub)) => {
            let settings = Settings::load(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &settings)? {
                let rows = vec![
                    vec![config::BASE_CURRENCY.into(), settings.base_currency.to_string()],
                    vec![config::BUSY_TIMEOUT_MS.into(), settings.busy_timeout_ms.to_string()],
                    vec![
                        config::HTTP_TIMEOUT_SECS.into(),
                        settings.http_timeout_secs.to_string(),
                    ],
                    vec![config::USER_ID.into(), settings.user_id.clone()],
                ];
                println!("{}", pretty_table(&["Key", "Value"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
