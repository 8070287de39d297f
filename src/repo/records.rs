// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{col_date, col_decimal, col_enum, date_col};
use crate::config::current_user;
use crate::error::CrmError;
use crate::models::{OwnerKind, RecurringRecord};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row, params};

const COLUMNS: &str = "id, name, category, amount, currency, frequency, status, start_date, \
                       end_date, payment_date, renewal_date, notes, user_id";

fn select_sql<K: OwnerKind>() -> String {
    let owner = if K::CLIENT_SCOPED {
        "client_id, project_id"
    } else {
        "NULL, NULL"
    };
    format!("SELECT {}, {} FROM {}", COLUMNS, owner, K::TABLE)
}

fn read_record<K: OwnerKind>(r: &Row) -> Result<RecurringRecord<K>> {
    let id: i64 = r.get(0)?;
    let client_id: Option<i64> = r.get(13)?;
    let project_id: Option<i64> = r.get(14)?;
    let owner = K::from_keys(client_id, project_id)
        .ok_or_else(|| anyhow!("{} {} has no client", K::LABEL, id))?;
    Ok(RecurringRecord {
        id,
        name: r.get(1)?,
        category: r.get(2)?,
        amount: col_decimal(r.get(3)?, "amount")?,
        currency: col_enum(r.get(4)?)?,
        frequency: col_enum(r.get(5)?)?,
        status: col_enum(r.get(6)?)?,
        start_date: col_date(r.get(7)?, "start_date")?,
        end_date: col_date(r.get(8)?, "end_date")?,
        payment_date: col_date(r.get(9)?, "payment_date")?,
        renewal_date: col_date(r.get(10)?, "renewal_date")?,
        owner,
        notes: r.get(11)?,
        user_id: r.get(12)?,
    })
}

fn collect<K: OwnerKind>(
    conn: &Connection,
    sql: &str,
    args: &[&dyn rusqlite::ToSql],
) -> Result<Vec<RecurringRecord<K>>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(args)?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(read_record::<K>(r)?);
    }
    Ok(out)
}

pub fn load_records<K: OwnerKind>(conn: &Connection) -> Result<Vec<RecurringRecord<K>>> {
    let sql = format!("{} ORDER BY id", select_sql::<K>());
    collect(conn, &sql, &[])
}

/// Records of one client; empty for company-level tables.
pub fn load_client_records<K: OwnerKind>(
    conn: &Connection,
    client_id: i64,
) -> Result<Vec<RecurringRecord<K>>> {
    if !K::CLIENT_SCOPED {
        return Ok(Vec::new());
    }
    let sql = format!("{} WHERE client_id=?1 ORDER BY id", select_sql::<K>());
    collect(conn, &sql, &[&client_id])
}

pub fn get_record<K: OwnerKind>(conn: &Connection, id: i64) -> Result<RecurringRecord<K>> {
    let sql = format!("{} WHERE id=?1", select_sql::<K>());
    collect::<K>(conn, &sql, &[&id])?
        .pop()
        .ok_or_else(|| CrmError::not_found(K::LABEL, id).into())
}

pub fn insert_record<K: OwnerKind>(conn: &Connection, rec: &RecurringRecord<K>) -> Result<i64> {
    let user = current_user(conn)?;
    if K::CLIENT_SCOPED {
        conn.execute(
            &format!(
                "INSERT INTO {}(name, category, amount, currency, frequency, status, start_date, \
                 end_date, payment_date, renewal_date, notes, user_id, client_id, project_id) \
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14)",
                K::TABLE
            ),
            params![
                rec.name,
                rec.category,
                rec.amount.to_string(),
                rec.currency.as_str(),
                rec.frequency.as_str(),
                rec.status.as_str(),
                date_col(rec.start_date),
                date_col(rec.end_date),
                date_col(rec.payment_date),
                date_col(rec.renewal_date),
                rec.notes,
                user,
                rec.owner.client_id(),
                rec.owner.project_id(),
            ],
        )?;
    } else {
        conn.execute(
            &format!(
                "INSERT INTO {}(name, category, amount, currency, frequency, status, start_date, \
                 end_date, payment_date, renewal_date, notes, user_id) \
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)",
                K::TABLE
            ),
            params![
                rec.name,
                rec.category,
                rec.amount.to_string(),
                rec.currency.as_str(),
                rec.frequency.as_str(),
                rec.status.as_str(),
                date_col(rec.start_date),
                date_col(rec.end_date),
                date_col(rec.payment_date),
                date_col(rec.renewal_date),
                rec.notes,
                user,
            ],
        )?;
    }
    Ok(conn.last_insert_rowid())
}

/// Overwrites the mutable columns of a record. Last write wins.
pub fn update_record<K: OwnerKind>(conn: &Connection, rec: &RecurringRecord<K>) -> Result<()> {
    let n = conn.execute(
        &format!(
            "UPDATE {} SET name=?1, category=?2, amount=?3, currency=?4, frequency=?5, status=?6, \
             start_date=?7, end_date=?8, payment_date=?9, renewal_date=?10, notes=?11 WHERE id=?12",
            K::TABLE
        ),
        params![
            rec.name,
            rec.category,
            rec.amount.to_string(),
            rec.currency.as_str(),
            rec.frequency.as_str(),
            rec.status.as_str(),
            date_col(rec.start_date),
            date_col(rec.end_date),
            date_col(rec.payment_date),
            date_col(rec.renewal_date),
            rec.notes,
            rec.id,
        ],
    )?;
    if n == 0 {
        return Err(CrmError::not_found(K::LABEL, rec.id).into());
    }
    Ok(())
}

pub fn delete_record<K: OwnerKind>(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute(&format!("DELETE FROM {} WHERE id=?1", K::TABLE), params![id])?;
    if n == 0 {
        return Err(CrmError::not_found(K::LABEL, id).into());
    }
    Ok(())
}
