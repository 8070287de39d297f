// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{
    col_date, col_datetime, col_decimal, col_enum, col_req_date, date_col, datetime_col,
};
use crate::config::current_user;
use crate::error::CrmError;
use crate::models::{Activity, ActivityStatus, Client, Lead, LeadActivity};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

// ---- leads ----

const LEAD_COLUMNS: &str = "id, name, company, email, phone, source, status, value, currency, \
                            contact_count, last_contact_date, next_follow_up, notes";

fn read_lead(r: &Row) -> Result<Lead> {
    let value: Option<String> = r.get(7)?;
    Ok(Lead {
        id: r.get(0)?,
        name: r.get(1)?,
        company: r.get(2)?,
        email: r.get(3)?,
        phone: r.get(4)?,
        source: r.get(5)?,
        status: col_enum(r.get(6)?)?,
        value: value.map(|v| col_decimal(v, "value")).transpose()?,
        currency: col_enum(r.get(8)?)?,
        contact_count: r.get(9)?,
        last_contact_date: col_date(r.get(10)?, "last_contact_date")?,
        next_follow_up: col_date(r.get(11)?, "next_follow_up")?,
        notes: r.get(12)?,
    })
}

pub fn load_leads(conn: &Connection) -> Result<Vec<Lead>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM leads ORDER BY name", LEAD_COLUMNS))?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(read_lead(r)?);
    }
    Ok(out)
}

pub fn get_lead(conn: &Connection, id: i64) -> Result<Lead> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM leads WHERE id=?1", LEAD_COLUMNS))?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(r) => read_lead(r),
        None => Err(CrmError::not_found("Lead", id).into()),
    }
}

pub fn insert_lead(conn: &Connection, lead: &Lead) -> Result<i64> {
    conn.execute(
        "INSERT INTO leads(name, company, email, phone, source, status, value, currency, \
         contact_count, last_contact_date, next_follow_up, notes, user_id) \
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13)",
        params![
            lead.name,
            lead.company,
            lead.email,
            lead.phone,
            lead.source,
            lead.status.as_str(),
            lead.value.map(|v| v.to_string()),
            lead.currency.as_str(),
            lead.contact_count,
            date_col(lead.last_contact_date),
            date_col(lead.next_follow_up),
            lead.notes,
            current_user(conn)?,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_lead(conn: &Connection, lead: &Lead) -> Result<()> {
    let n = conn.execute(
        "UPDATE leads SET name=?1, company=?2, email=?3, phone=?4, source=?5, status=?6, value=?7, \
         currency=?8, contact_count=?9, last_contact_date=?10, next_follow_up=?11, notes=?12 \
         WHERE id=?13",
        params![
            lead.name,
            lead.company,
            lead.email,
            lead.phone,
            lead.source,
            lead.status.as_str(),
            lead.value.map(|v| v.to_string()),
            lead.currency.as_str(),
            lead.contact_count,
            date_col(lead.last_contact_date),
            date_col(lead.next_follow_up),
            lead.notes,
            lead.id,
        ],
    )?;
    if n == 0 {
        return Err(CrmError::not_found("Lead", lead.id).into());
    }
    Ok(())
}

pub fn delete_lead(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM leads WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(CrmError::not_found("Lead", id).into());
    }
    Ok(())
}

// ---- lead history ----

pub fn insert_lead_activity(conn: &Connection, entry: &LeadActivity) -> Result<i64> {
    conn.execute(
        "INSERT INTO lead_activities(lead_id, kind, description, date, user_id) VALUES (?1,?2,?3,?4,?5)",
        params![
            entry.lead_id,
            entry.kind.as_str(),
            entry.description,
            entry.date.to_string(),
            current_user(conn)?,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn load_lead_activities(conn: &Connection, lead_id: i64) -> Result<Vec<LeadActivity>> {
    let mut stmt = conn.prepare(
        "SELECT id, lead_id, kind, description, date FROM lead_activities \
         WHERE lead_id=?1 ORDER BY date DESC, id DESC",
    )?;
    let mut rows = stmt.query(params![lead_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(LeadActivity {
            id: r.get(0)?,
            lead_id: r.get(1)?,
            kind: col_enum(r.get(2)?)?,
            description: r.get(3)?,
            date: col_req_date(r.get(4)?, "date")?,
        });
    }
    Ok(out)
}

// ---- clients ----

const CLIENT_COLUMNS: &str =
    "id, name, company, email, phone, address, notes, contact_count, last_contact_date, lead_id";

fn read_client(r: &Row) -> Result<Client> {
    Ok(Client {
        id: r.get(0)?,
        name: r.get(1)?,
        company: r.get(2)?,
        email: r.get(3)?,
        phone: r.get(4)?,
        address: r.get(5)?,
        notes: r.get(6)?,
        contact_count: r.get(7)?,
        last_contact_date: col_date(r.get(8)?, "last_contact_date")?,
        lead_id: r.get(9)?,
    })
}

pub fn load_clients(conn: &Connection) -> Result<Vec<Client>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM clients ORDER BY name", CLIENT_COLUMNS))?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(read_client(r)?);
    }
    Ok(out)
}

pub fn get_client(conn: &Connection, id: i64) -> Result<Client> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM clients WHERE id=?1", CLIENT_COLUMNS))?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(r) => read_client(r),
        None => Err(CrmError::not_found("Client", id).into()),
    }
}

pub fn find_client_by_lead(conn: &Connection, lead_id: i64) -> Result<Option<i64>> {
    let id: Option<i64> = conn
        .query_row(
            "SELECT id FROM clients WHERE lead_id=?1",
            params![lead_id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(id)
}

pub fn insert_client(conn: &Connection, c: &Client) -> Result<i64> {
    conn.execute(
        "INSERT INTO clients(name, company, email, phone, address, notes, contact_count, \
         last_contact_date, lead_id, user_id) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
        params![
            c.name,
            c.company,
            c.email,
            c.phone,
            c.address,
            c.notes,
            c.contact_count,
            date_col(c.last_contact_date),
            c.lead_id,
            current_user(conn)?,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_client(conn: &Connection, c: &Client) -> Result<()> {
    let n = conn.execute(
        "UPDATE clients SET name=?1, company=?2, email=?3, phone=?4, address=?5, notes=?6, \
         contact_count=?7, last_contact_date=?8, lead_id=?9 WHERE id=?10",
        params![
            c.name,
            c.company,
            c.email,
            c.phone,
            c.address,
            c.notes,
            c.contact_count,
            date_col(c.last_contact_date),
            c.lead_id,
            c.id,
        ],
    )?;
    if n == 0 {
        return Err(CrmError::not_found("Client", c.id).into());
    }
    Ok(())
}

pub fn delete_client(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM clients WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(CrmError::not_found("Client", id).into());
    }
    Ok(())
}

// ---- activities ----

const ACTIVITY_COLUMNS: &str =
    "id, title, kind, lead_id, client_id, scheduled_date, status, completed_at, notes";

fn read_activity(r: &Row) -> Result<Activity> {
    Ok(Activity {
        id: r.get(0)?,
        title: r.get(1)?,
        kind: col_enum(r.get(2)?)?,
        lead_id: r.get(3)?,
        client_id: r.get(4)?,
        scheduled_date: col_req_date(r.get(5)?, "scheduled_date")?,
        status: col_enum(r.get(6)?)?,
        completed_at: col_datetime(r.get(7)?, "completed_at")?,
        notes: r.get(8)?,
    })
}

/// Raw rows, without the overdue pass. Callers wanting the user-visible list
/// go through `workflow::load_activities`.
pub fn load_activities(conn: &Connection) -> Result<Vec<Activity>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM activities ORDER BY scheduled_date, id",
        ACTIVITY_COLUMNS
    ))?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(read_activity(r)?);
    }
    Ok(out)
}

pub fn get_activity(conn: &Connection, id: i64) -> Result<Activity> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM activities WHERE id=?1",
        ACTIVITY_COLUMNS
    ))?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(r) => read_activity(r),
        None => Err(CrmError::not_found("Activity", id).into()),
    }
}

pub fn insert_activity(conn: &Connection, a: &Activity) -> Result<i64> {
    conn.execute(
        "INSERT INTO activities(title, kind, lead_id, client_id, scheduled_date, status, \
         completed_at, notes, user_id) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
        params![
            a.title,
            a.kind.as_str(),
            a.lead_id,
            a.client_id,
            a.scheduled_date.to_string(),
            a.status.as_str(),
            datetime_col(a.completed_at),
            a.notes,
            current_user(conn)?,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_activity(conn: &Connection, a: &Activity) -> Result<()> {
    let n = conn.execute(
        "UPDATE activities SET title=?1, kind=?2, lead_id=?3, client_id=?4, scheduled_date=?5, \
         status=?6, completed_at=?7, notes=?8 WHERE id=?9",
        params![
            a.title,
            a.kind.as_str(),
            a.lead_id,
            a.client_id,
            a.scheduled_date.to_string(),
            a.status.as_str(),
            datetime_col(a.completed_at),
            a.notes,
            a.id,
        ],
    )?;
    if n == 0 {
        return Err(CrmError::not_found("Activity", a.id).into());
    }
    Ok(())
}

pub fn set_activity_status(conn: &Connection, ids: &[i64], status: ActivityStatus) -> Result<usize> {
    let mut stmt = conn.prepare_cached("UPDATE activities SET status=?1 WHERE id=?2")?;
    let mut n = 0;
    for id in ids {
        n += stmt.execute(params![status.as_str(), id])?;
    }
    Ok(n)
}

pub fn delete_activity(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM activities WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(CrmError::not_found("Activity", id).into());
    }
    Ok(())
}
