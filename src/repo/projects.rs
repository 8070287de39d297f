// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{col_date, col_decimal, col_enum, col_req_date, date_col};
use crate::config::current_user;
use crate::error::CrmError;
use crate::models::{Invoice, Project, ProjectMilestone};
use anyhow::Result;
use rusqlite::{Connection, Row, params};

// ---- projects ----

const PROJECT_COLUMNS: &str = "id, client_id, name, status, total_amount, currency, payment_type, \
                               paid_amount, start_date, end_date";

fn read_project(r: &Row) -> Result<Project> {
    let payment_type: Option<String> = r.get(6)?;
    Ok(Project {
        id: r.get(0)?,
        client_id: r.get(1)?,
        name: r.get(2)?,
        status: col_enum(r.get(3)?)?,
        total_amount: col_decimal(r.get(4)?, "total_amount")?,
        currency: col_enum(r.get(5)?)?,
        payment_type: payment_type.map(col_enum).transpose()?,
        paid_amount: col_decimal(r.get(7)?, "paid_amount")?,
        start_date: col_date(r.get(8)?, "start_date")?,
        end_date: col_date(r.get(9)?, "end_date")?,
    })
}

pub fn load_projects(conn: &Connection) -> Result<Vec<Project>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM projects ORDER BY name",
        PROJECT_COLUMNS
    ))?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(read_project(r)?);
    }
    Ok(out)
}

pub fn get_project(conn: &Connection, id: i64) -> Result<Project> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM projects WHERE id=?1",
        PROJECT_COLUMNS
    ))?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(r) => read_project(r),
        None => Err(CrmError::not_found("Project", id).into()),
    }
}

pub fn insert_project(conn: &Connection, p: &Project) -> Result<i64> {
    conn.execute(
        "INSERT INTO projects(client_id, name, status, total_amount, currency, payment_type, \
         paid_amount, start_date, end_date, user_id) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
        params![
            p.client_id,
            p.name,
            p.status.as_str(),
            p.total_amount.to_string(),
            p.currency.as_str(),
            p.payment_type.map(|t| t.as_str()),
            p.paid_amount.to_string(),
            date_col(p.start_date),
            date_col(p.end_date),
            current_user(conn)?,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_project(conn: &Connection, p: &Project) -> Result<()> {
    let n = conn.execute(
        "UPDATE projects SET client_id=?1, name=?2, status=?3, total_amount=?4, currency=?5, \
         payment_type=?6, paid_amount=?7, start_date=?8, end_date=?9 WHERE id=?10",
        params![
            p.client_id,
            p.name,
            p.status.as_str(),
            p.total_amount.to_string(),
            p.currency.as_str(),
            p.payment_type.map(|t| t.as_str()),
            p.paid_amount.to_string(),
            date_col(p.start_date),
            date_col(p.end_date),
            p.id,
        ],
    )?;
    if n == 0 {
        return Err(CrmError::not_found("Project", p.id).into());
    }
    Ok(())
}

pub fn delete_project(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM projects WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(CrmError::not_found("Project", id).into());
    }
    Ok(())
}

// ---- milestones ----

const MILESTONE_COLUMNS: &str =
    "id, project_id, name, amount, due_date, status, paid_amount, paid_date";

fn read_milestone(r: &Row) -> Result<ProjectMilestone> {
    Ok(ProjectMilestone {
        id: r.get(0)?,
        project_id: r.get(1)?,
        name: r.get(2)?,
        amount: col_decimal(r.get(3)?, "amount")?,
        due_date: col_date(r.get(4)?, "due_date")?,
        status: col_enum(r.get(5)?)?,
        paid_amount: col_decimal(r.get(6)?, "paid_amount")?,
        paid_date: col_date(r.get(7)?, "paid_date")?,
    })
}

/// All milestones, or those of one project, ordered by due date.
pub fn load_milestones(conn: &Connection, project_id: Option<i64>) -> Result<Vec<ProjectMilestone>> {
    let mut out = Vec::new();
    match project_id {
        Some(pid) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM project_milestones WHERE project_id=?1 ORDER BY due_date, id",
                MILESTONE_COLUMNS
            ))?;
            let mut rows = stmt.query(params![pid])?;
            while let Some(r) = rows.next()? {
                out.push(read_milestone(r)?);
            }
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM project_milestones ORDER BY project_id, due_date, id",
                MILESTONE_COLUMNS
            ))?;
            let mut rows = stmt.query([])?;
            while let Some(r) = rows.next()? {
                out.push(read_milestone(r)?);
            }
        }
    }
    Ok(out)
}

pub fn get_milestone(conn: &Connection, id: i64) -> Result<ProjectMilestone> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM project_milestones WHERE id=?1",
        MILESTONE_COLUMNS
    ))?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(r) => read_milestone(r),
        None => Err(CrmError::not_found("Milestone", id).into()),
    }
}

pub fn insert_milestone(conn: &Connection, m: &ProjectMilestone) -> Result<i64> {
    conn.execute(
        "INSERT INTO project_milestones(project_id, name, amount, due_date, status, paid_amount, \
         paid_date, user_id) VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
        params![
            m.project_id,
            m.name,
            m.amount.to_string(),
            date_col(m.due_date),
            m.status.as_str(),
            m.paid_amount.to_string(),
            date_col(m.paid_date),
            current_user(conn)?,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_milestone(conn: &Connection, m: &ProjectMilestone) -> Result<()> {
    let n = conn.execute(
        "UPDATE project_milestones SET name=?1, amount=?2, due_date=?3, status=?4, \
         paid_amount=?5, paid_date=?6 WHERE id=?7",
        params![
            m.name,
            m.amount.to_string(),
            date_col(m.due_date),
            m.status.as_str(),
            m.paid_amount.to_string(),
            date_col(m.paid_date),
            m.id,
        ],
    )?;
    if n == 0 {
        return Err(CrmError::not_found("Milestone", m.id).into());
    }
    Ok(())
}

pub fn delete_milestone(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM project_milestones WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(CrmError::not_found("Milestone", id).into());
    }
    Ok(())
}

// ---- invoices ----

const INVOICE_COLUMNS: &str = "id, client_id, project_id, number, amount, currency, status, \
                               issue_date, due_date, paid_date";

fn read_invoice(r: &Row) -> Result<Invoice> {
    Ok(Invoice {
        id: r.get(0)?,
        client_id: r.get(1)?,
        project_id: r.get(2)?,
        number: r.get(3)?,
        amount: col_decimal(r.get(4)?, "amount")?,
        currency: col_enum(r.get(5)?)?,
        status: col_enum(r.get(6)?)?,
        issue_date: col_req_date(r.get(7)?, "issue_date")?,
        due_date: col_date(r.get(8)?, "due_date")?,
        paid_date: col_date(r.get(9)?, "paid_date")?,
    })
}

pub fn load_invoices(conn: &Connection) -> Result<Vec<Invoice>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM invoices ORDER BY issue_date DESC, id DESC",
        INVOICE_COLUMNS
    ))?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(read_invoice(r)?);
    }
    Ok(out)
}

pub fn get_invoice_by_number(conn: &Connection, number: &str) -> Result<Invoice> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM invoices WHERE number=?1",
        INVOICE_COLUMNS
    ))?;
    let mut rows = stmt.query(params![number.trim()])?;
    match rows.next()? {
        Some(r) => read_invoice(r),
        None => Err(CrmError::not_found("Invoice", number.trim()).into()),
    }
}

pub fn insert_invoice(conn: &Connection, inv: &Invoice) -> Result<i64> {
    conn.execute(
        "INSERT INTO invoices(client_id, project_id, number, amount, currency, status, issue_date, \
         due_date, paid_date, user_id) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
        params![
            inv.client_id,
            inv.project_id,
            inv.number,
            inv.amount.to_string(),
            inv.currency.as_str(),
            inv.status.as_str(),
            inv.issue_date.to_string(),
            date_col(inv.due_date),
            date_col(inv.paid_date),
            current_user(conn)?,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_invoice(conn: &Connection, inv: &Invoice) -> Result<()> {
    let n = conn.execute(
        "UPDATE invoices SET project_id=?1, amount=?2, currency=?3, status=?4, issue_date=?5, \
         due_date=?6, paid_date=?7 WHERE id=?8",
        params![
            inv.project_id,
            inv.amount.to_string(),
            inv.currency.as_str(),
            inv.status.as_str(),
            inv.issue_date.to_string(),
            date_col(inv.due_date),
            date_col(inv.paid_date),
            inv.id,
        ],
    )?;
    if n == 0 {
        return Err(CrmError::not_found("Invoice", inv.id).into());
    }
    Ok(())
}
