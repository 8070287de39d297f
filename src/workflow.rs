// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Store-backed operations that combine a lifecycle rule with one or more writes.

use crate::error::CrmError;
use crate::lifecycle;
use crate::models::{
    Activity, ActivityStatus, ClientIncome, Invoice, InvoiceStatus, Lead, LeadActivity,
    LeadEventKind, LeadStatus, MilestoneStatus, OwnerKind, Project, ProjectMilestone,
    ProjectStatus, RecurringRecord,
};
use crate::recurring::{ProjectBalance, project_balance};
use crate::repo::{crm, projects, records};
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use log::{error, info};
use rust_decimal::Decimal;
use rusqlite::Connection;

/// Loads all activities, persisting any pending-to-overdue promotions before
/// returning so the caller never sees a stale status.
pub fn load_activities(conn: &Connection, today: NaiveDate) -> Result<Vec<Activity>> {
    let mut activities = crm::load_activities(conn)?;
    let changed = lifecycle::promote_overdue(&mut activities, today);
    if !changed.is_empty() {
        let tx = conn.unchecked_transaction()?;
        crm::set_activity_status(&tx, &changed, ActivityStatus::Overdue)?;
        tx.commit()?;
        info!("marked {} activities overdue", changed.len());
    }
    Ok(activities)
}

pub fn add_activity(conn: &Connection, activity: &Activity, today: NaiveDate) -> Result<i64> {
    if activity.title.trim().is_empty() {
        return Err(CrmError::validation("activity title is required").into());
    }
    if let Some(lead_id) = activity.lead_id {
        crm::get_lead(conn, lead_id)?;
    }
    if let Some(client_id) = activity.client_id {
        crm::get_client(conn, client_id)?;
    }
    let mut row = activity.clone();
    lifecycle::promote_overdue(std::slice::from_mut(&mut row), today);
    crm::insert_activity(conn, &row)
}

/// Reads one activity with its overdue status applied as of `today`.
fn get_activity(conn: &Connection, id: i64, today: NaiveDate) -> Result<Activity> {
    let mut activity = crm::get_activity(conn, id)?;
    lifecycle::promote_overdue(std::slice::from_mut(&mut activity), today);
    Ok(activity)
}

/// Completes an activity and, when it is linked, records the contact on the
/// lead (history entry plus counter) and on the client.
pub fn complete_activity(conn: &Connection, id: i64, now: NaiveDateTime) -> Result<Activity> {
    let tx = conn.unchecked_transaction()?;
    let mut activity = get_activity(&tx, id, now.date())?;
    lifecycle::complete_activity(&mut activity, now)?;
    crm::update_activity(&tx, &activity)?;

    let on = now.date();
    if let Some(lead_id) = activity.lead_id {
        let mut lead = crm::get_lead(&tx, lead_id)?;
        let description = match activity.notes.as_deref() {
            Some(n) if !n.trim().is_empty() => format!("{}: {}", activity.title, n.trim()),
            _ => activity.title.clone(),
        };
        crm::insert_lead_activity(
            &tx,
            &LeadActivity {
                id: 0,
                lead_id,
                kind: activity.kind.into(),
                description,
                date: on,
            },
        )?;
        lifecycle::touch_lead(&mut lead, on);
        crm::update_lead(&tx, &lead)?;
    }
    if let Some(client_id) = activity.client_id {
        let mut client = crm::get_client(&tx, client_id)?;
        lifecycle::touch_client(&mut client, on);
        crm::update_client(&tx, &client)?;
    }
    tx.commit()?;
    Ok(activity)
}

pub fn cancel_activity(conn: &Connection, id: i64, today: NaiveDate) -> Result<Activity> {
    let mut activity = get_activity(conn, id, today)?;
    lifecycle::cancel_activity(&mut activity)?;
    crm::update_activity(conn, &activity)?;
    Ok(activity)
}

/// Moves an activity to `new_date`. A pending activity already past due on
/// `today` counts as overdue and becomes `rescheduled`.
pub fn reschedule_activity(
    conn: &Connection,
    id: i64,
    new_date: NaiveDate,
    today: NaiveDate,
) -> Result<Activity> {
    let mut activity = get_activity(conn, id, today)?;
    lifecycle::reschedule_activity(&mut activity, new_date)?;
    crm::update_activity(conn, &activity)?;
    Ok(activity)
}

/// Appends an entry to a lead's history and counts it as one contact.
pub fn log_lead_activity(
    conn: &Connection,
    lead_id: i64,
    kind: LeadEventKind,
    description: &str,
    on: NaiveDate,
) -> Result<Lead> {
    if description.trim().is_empty() {
        return Err(CrmError::validation("description is required").into());
    }
    let tx = conn.unchecked_transaction()?;
    let mut lead = crm::get_lead(&tx, lead_id)?;
    crm::insert_lead_activity(
        &tx,
        &LeadActivity {
            id: 0,
            lead_id,
            kind,
            description: description.trim().to_string(),
            date: on,
        },
    )?;
    lifecycle::touch_lead(&mut lead, on);
    crm::update_lead(&tx, &lead)?;
    tx.commit()?;
    Ok(lead)
}

/// Moves a lead through the pipeline. Setting the current status again is a no-op.
pub fn change_lead_status(
    conn: &Connection,
    lead_id: i64,
    status: LeadStatus,
    on: NaiveDate,
) -> Result<Lead> {
    let tx = conn.unchecked_transaction()?;
    let mut lead = crm::get_lead(&tx, lead_id)?;
    if lead.status == status {
        return Ok(lead);
    }
    crm::insert_lead_activity(
        &tx,
        &LeadActivity {
            id: 0,
            lead_id,
            kind: LeadEventKind::StatusChange,
            description: format!("{} -> {}", lead.status, status),
            date: on,
        },
    )?;
    lead.status = status;
    lifecycle::touch_lead(&mut lead, on);
    crm::update_lead(&tx, &lead)?;
    tx.commit()?;
    Ok(lead)
}

/// Creates a client from an open lead and marks the lead won. Both writes
/// commit together; a failure in either leaves the store untouched.
pub fn convert_lead(conn: &Connection, lead_id: i64) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;
    let mut lead = crm::get_lead(&tx, lead_id)?;
    lifecycle::ensure_convertible(&lead)?;
    let client = lifecycle::client_from_lead(&lead);
    let client_id = crm::insert_client(&tx, &client)
        .with_context(|| format!("Create client from lead '{}'", lead.name))?;
    lead.status = LeadStatus::Won;
    crm::update_lead(&tx, &lead)?;
    tx.commit()?;
    info!("converted lead {} into client {}", lead_id, client_id);
    Ok(client_id)
}

#[derive(Debug)]
pub struct ProjectSave {
    pub project: Project,
    /// Id of the income row posted because the project just completed.
    pub posted_income: Option<i64>,
}

/// Inserts a new project. A project created directly as `completed` counts
/// as a transition from `planned` and posts its income.
pub fn create_project(conn: &Connection, project: Project, today: NaiveDate) -> Result<ProjectSave> {
    validate_project(&project)?;
    crm::get_client(conn, project.client_id)?;
    let mut project = project;
    project.id = projects::insert_project(conn, &project)?;
    let posted_income = match lifecycle::completion_income(ProjectStatus::Planned, &project, today) {
        Some(income) => post_income(conn, &income, &project),
        None => None,
    };
    Ok(ProjectSave {
        project,
        posted_income,
    })
}

/// Writes `after` over the stored project. When this write moves the project
/// into `completed`, one income row is posted; failing to post it is logged
/// and does not undo the project write.
pub fn save_project(conn: &Connection, after: Project, today: NaiveDate) -> Result<ProjectSave> {
    validate_project(&after)?;
    let before = projects::get_project(conn, after.id)?;
    projects::update_project(conn, &after)?;

    let posted_income = match lifecycle::completion_income(before.status, &after, today) {
        Some(income) => post_income(conn, &income, &after),
        None => None,
    };
    Ok(ProjectSave {
        project: after,
        posted_income,
    })
}

fn post_income(conn: &Connection, income: &ClientIncome, project: &Project) -> Option<i64> {
    match records::insert_record(conn, income) {
        Ok(id) => {
            info!(
                "posted {} {} {} income for completed project '{}'",
                income.frequency, income.amount, income.currency, project.name
            );
            Some(id)
        }
        Err(err) => {
            error!(
                "project '{}' completed but income could not be posted: {:#}",
                project.name, err
            );
            None
        }
    }
}

pub fn set_project_status(
    conn: &Connection,
    project_id: i64,
    status: ProjectStatus,
    today: NaiveDate,
) -> Result<ProjectSave> {
    let mut project = projects::get_project(conn, project_id)?;
    project.status = status;
    save_project(conn, project, today)
}

pub fn validate_project(p: &Project) -> Result<(), CrmError> {
    if p.name.trim().is_empty() {
        return Err(CrmError::validation("project name is required"));
    }
    if p.total_amount < Decimal::ZERO || p.paid_amount < Decimal::ZERO {
        return Err(CrmError::validation("project amounts must not be negative"));
    }
    if let (Some(start), Some(end)) = (p.start_date, p.end_date) {
        if end < start {
            return Err(CrmError::validation(format!(
                "project end {} is before start {}",
                end, start
            )));
        }
    }
    Ok(())
}

/// Adds a payment to a project billed without milestones.
pub fn record_project_payment(conn: &Connection, project_id: i64, amount: Decimal) -> Result<Project> {
    let mut project = projects::get_project(conn, project_id)?;
    if !lifecycle::bills_directly(&project) {
        return Err(CrmError::validation(format!(
            "project '{}' is paid through milestones",
            project.name
        ))
        .into());
    }
    if amount <= Decimal::ZERO {
        return Err(CrmError::validation("payment must be positive").into());
    }
    let paid = project.paid_amount + amount;
    if paid > project.total_amount {
        return Err(CrmError::validation(format!(
            "payment would bring '{}' to {} of {}",
            project.name, paid, project.total_amount
        ))
        .into());
    }
    project.paid_amount = paid;
    projects::update_project(conn, &project)?;
    Ok(project)
}

/// Project with its balance, recomputed from the current milestone rows.
pub fn project_with_balance(conn: &Connection, project_id: i64) -> Result<(Project, ProjectBalance)> {
    let project = projects::get_project(conn, project_id)?;
    let milestones = projects::load_milestones(conn, Some(project_id))?;
    let balance = project_balance(&project, &milestones);
    Ok((project, balance))
}

pub fn add_milestone(conn: &Connection, milestone: &ProjectMilestone) -> Result<i64> {
    if milestone.name.trim().is_empty() {
        return Err(CrmError::validation("milestone name is required").into());
    }
    lifecycle::validate_milestone(milestone)?;
    projects::get_project(conn, milestone.project_id)?;
    projects::insert_milestone(conn, milestone)
}

pub fn set_milestone_status(
    conn: &Connection,
    id: i64,
    status: MilestoneStatus,
    partial_amount: Option<Decimal>,
    paid_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<ProjectMilestone> {
    let mut m = projects::get_milestone(conn, id)?;
    lifecycle::set_milestone_status(&mut m, status, partial_amount, paid_date, today)?;
    projects::update_milestone(conn, &m)?;
    Ok(m)
}

pub fn add_record<K: OwnerKind>(conn: &Connection, rec: &RecurringRecord<K>) -> Result<i64> {
    validate_record(rec)?;
    if let Some(client_id) = rec.owner.client_id() {
        crm::get_client(conn, client_id)?;
    }
    if let Some(project_id) = rec.owner.project_id() {
        let project = projects::get_project(conn, project_id)?;
        if Some(project.client_id) != rec.owner.client_id() {
            return Err(CrmError::validation(format!(
                "project '{}' belongs to another client",
                project.name
            ))
            .into());
        }
    }
    records::insert_record(conn, rec)
}

pub fn validate_record<K: OwnerKind>(rec: &RecurringRecord<K>) -> Result<(), CrmError> {
    if rec.name.trim().is_empty() {
        return Err(CrmError::validation(format!("{} name is required", K::LABEL)));
    }
    if rec.amount < Decimal::ZERO {
        return Err(CrmError::validation(format!(
            "{} amount must not be negative",
            K::LABEL
        )));
    }
    if let (Some(start), Some(end)) = (rec.start_date, rec.end_date) {
        if end < start {
            return Err(CrmError::validation(format!(
                "{} ends {} before it starts {}",
                K::LABEL,
                end,
                start
            )));
        }
    }
    Ok(())
}

pub fn mark_record_paid<K: OwnerKind>(
    conn: &Connection,
    id: i64,
    on: NaiveDate,
) -> Result<RecurringRecord<K>> {
    let mut rec = records::get_record::<K>(conn, id)?;
    lifecycle::mark_record_paid(&mut rec, on);
    records::update_record(conn, &rec)?;
    Ok(rec)
}

pub fn set_invoice_status(
    conn: &Connection,
    number: &str,
    status: InvoiceStatus,
    today: NaiveDate,
) -> Result<Invoice> {
    let mut invoice = projects::get_invoice_by_number(conn, number)?;
    lifecycle::set_invoice_status(&mut invoice, status, today)?;
    projects::update_invoice(conn, &invoice)?;
    Ok(invoice)
}
