// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::CrmError;
use crate::models::Currency;
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

pub const BASE_CURRENCY: &str = "base_currency";
pub const BUSY_TIMEOUT_MS: &str = "busy_timeout_ms";
pub const HTTP_TIMEOUT_SECS: &str = "http_timeout_secs";
pub const USER_ID: &str = "user_id";

pub const KNOWN_KEYS: &[&str] = &[BASE_CURRENCY, BUSY_TIMEOUT_MS, HTTP_TIMEOUT_SECS, USER_ID];

/// Typed view over the `settings` table.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub base_currency: Currency,
    pub busy_timeout_ms: u64,
    pub http_timeout_secs: u64,
    pub user_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            base_currency: Currency::Chf,
            busy_timeout_ms: 5000,
            http_timeout_secs: 15,
            user_id: default_user(),
        }
    }
}

fn default_user() -> String {
    std::env::var("USER")
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| "local".to_string())
}

impl Settings {
    pub fn load(conn: &Connection) -> Result<Settings> {
        let mut s = Settings::default();
        if let Some(v) = get_setting(conn, BASE_CURRENCY)? {
            s.base_currency = v.parse()?;
        }
        if let Some(v) = get_setting(conn, BUSY_TIMEOUT_MS)? {
            s.busy_timeout_ms = v
                .trim()
                .parse()
                .with_context(|| format!("Invalid {} '{}'", BUSY_TIMEOUT_MS, v))?;
        }
        if let Some(v) = get_setting(conn, HTTP_TIMEOUT_SECS)? {
            s.http_timeout_secs = v
                .trim()
                .parse()
                .with_context(|| format!("Invalid {} '{}'", HTTP_TIMEOUT_SECS, v))?;
        }
        if let Some(v) = get_setting(conn, USER_ID)? {
            s.user_id = v;
        }
        Ok(s)
    }
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

/// Stores a setting after checking that it parses as its typed field.
pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let value = value.trim();
    match key {
        BASE_CURRENCY => {
            value.parse::<Currency>()?;
        }
        BUSY_TIMEOUT_MS | HTTP_TIMEOUT_SECS => {
            value
                .parse::<u64>()
                .map_err(|_| CrmError::validation(format!("{} must be a whole number", key)))?;
        }
        USER_ID => {
            if value.is_empty() {
                return Err(CrmError::validation("user_id cannot be empty").into());
            }
        }
        other => {
            return Err(CrmError::UnknownVariant {
                kind: "setting",
                value: other.to_string(),
            }
            .into());
        }
    }
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn get_base_currency(conn: &Connection) -> Result<Currency> {
    match get_setting(conn, BASE_CURRENCY)? {
        Some(v) => Ok(v.parse()?),
        None => Ok(Settings::default().base_currency),
    }
}

pub fn set_base_currency(conn: &Connection, ccy: Currency) -> Result<()> {
    set_setting(conn, BASE_CURRENCY, ccy.as_str())
}

/// Identity stamped into `user_id` on every insert.
pub fn current_user(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, USER_ID)?.unwrap_or_else(default_user))
}
