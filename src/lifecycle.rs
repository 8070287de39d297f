// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Status transitions for activities, milestones, leads and projects.
//! Everything here mutates in-memory rows; persistence lives in `workflow`.

use crate::error::CrmError;
use crate::models::{
    Activity, ActivityStatus, Client, ClientIncome, ClientRevenue, Invoice, InvoiceStatus, Lead,
    MilestoneStatus, OwnerKind, PaymentType, Project, ProjectMilestone, ProjectStatus,
    RecordStatus, RecurringRecord,
};
use crate::recurring::next_renewal;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// Flags every pending activity scheduled before `today` as overdue and
/// returns the ids that changed. Running it twice changes nothing the second time.
pub fn promote_overdue(activities: &mut [Activity], today: NaiveDate) -> Vec<i64> {
    let mut changed = Vec::new();
    for a in activities.iter_mut() {
        if a.status == ActivityStatus::Pending && a.scheduled_date < today {
            a.status = ActivityStatus::Overdue;
            changed.push(a.id);
        }
    }
    changed
}

fn activity_transition(a: &Activity, to: ActivityStatus) -> CrmError {
    CrmError::InvalidTransition {
        entity: "activity",
        from: a.status.to_string(),
        to: to.to_string(),
    }
}

fn is_open(status: ActivityStatus) -> bool {
    matches!(
        status,
        ActivityStatus::Pending | ActivityStatus::Overdue | ActivityStatus::Rescheduled
    )
}

pub fn complete_activity(a: &mut Activity, now: NaiveDateTime) -> Result<(), CrmError> {
    if !is_open(a.status) {
        return Err(activity_transition(a, ActivityStatus::Completed));
    }
    a.status = ActivityStatus::Completed;
    a.completed_at = Some(now);
    Ok(())
}

pub fn cancel_activity(a: &mut Activity) -> Result<(), CrmError> {
    if !is_open(a.status) {
        return Err(activity_transition(a, ActivityStatus::Cancelled));
    }
    a.status = ActivityStatus::Cancelled;
    Ok(())
}

/// Overdue activities become `rescheduled`; pending and already rescheduled
/// ones keep their status and only move date.
pub fn reschedule_activity(a: &mut Activity, new_date: NaiveDate) -> Result<(), CrmError> {
    match a.status {
        ActivityStatus::Overdue => a.status = ActivityStatus::Rescheduled,
        ActivityStatus::Pending | ActivityStatus::Rescheduled => {}
        ActivityStatus::Completed | ActivityStatus::Cancelled => {
            return Err(activity_transition(a, ActivityStatus::Rescheduled));
        }
    }
    a.scheduled_date = new_date;
    Ok(())
}

/// One contact event: the counter moves by exactly one and the last contact
/// date never goes backwards.
pub fn record_contact(count: &mut i64, last: &mut Option<NaiveDate>, on: NaiveDate) {
    *count += 1;
    *last = Some(last.map_or(on, |prev| prev.max(on)));
}

pub fn touch_lead(lead: &mut Lead, on: NaiveDate) {
    record_contact(&mut lead.contact_count, &mut lead.last_contact_date, on);
}

pub fn touch_client(client: &mut Client, on: NaiveDate) {
    record_contact(&mut client.contact_count, &mut client.last_contact_date, on);
}

/// Checks the paid/partial/pending invariant on a milestone as stored.
pub fn validate_milestone(m: &ProjectMilestone) -> Result<(), CrmError> {
    if m.amount < Decimal::ZERO {
        return Err(CrmError::validation(format!(
            "milestone '{}' has a negative amount",
            m.name
        )));
    }
    let ok = match m.status {
        MilestoneStatus::Paid => m.paid_amount == m.amount,
        MilestoneStatus::Pending => m.paid_amount.is_zero(),
        MilestoneStatus::Partial => m.paid_amount > Decimal::ZERO && m.paid_amount < m.amount,
    };
    if ok {
        Ok(())
    } else {
        Err(CrmError::validation(format!(
            "milestone '{}' is {} with paid amount {} of {}",
            m.name, m.status, m.paid_amount, m.amount
        )))
    }
}

/// Applies a user-chosen milestone status. Paid forces the full amount and
/// defaults the paid date to `today`; pending clears both.
pub fn set_milestone_status(
    m: &mut ProjectMilestone,
    status: MilestoneStatus,
    partial_amount: Option<Decimal>,
    paid_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(), CrmError> {
    match status {
        MilestoneStatus::Paid => {
            m.paid_amount = m.amount;
            m.paid_date = paid_date.or(m.paid_date).or(Some(today));
        }
        MilestoneStatus::Pending => {
            m.paid_amount = Decimal::ZERO;
            m.paid_date = None;
        }
        MilestoneStatus::Partial => {
            let amount = partial_amount.unwrap_or(m.paid_amount);
            if amount <= Decimal::ZERO || amount >= m.amount {
                return Err(CrmError::validation(format!(
                    "partial payment must be between 0 and {} (exclusive), got {}",
                    m.amount, amount
                )));
            }
            m.paid_amount = amount;
            m.paid_date = paid_date.or(m.paid_date).or(Some(today));
        }
    }
    m.status = status;
    Ok(())
}

pub fn ensure_convertible(lead: &Lead) -> Result<(), CrmError> {
    if lead.status.is_closed() {
        return Err(CrmError::InvalidTransition {
            entity: "lead",
            from: lead.status.to_string(),
            to: "client".into(),
        });
    }
    Ok(())
}

/// Client row carrying over the lead's name and contact fields.
pub fn client_from_lead(lead: &Lead) -> Client {
    Client {
        id: 0,
        name: lead.name.clone(),
        company: lead.company.clone(),
        email: lead.email.clone(),
        phone: lead.phone.clone(),
        address: None,
        notes: lead.notes.clone(),
        contact_count: 0,
        last_contact_date: lead.last_contact_date,
        lead_id: Some(lead.id),
    }
}

/// Income to post when a project crosses into `completed`. Returns `None` when
/// the project was already completed, has nothing to bill, or bills by milestone.
pub fn completion_income(
    previous: ProjectStatus,
    project: &Project,
    today: NaiveDate,
) -> Option<ClientIncome> {
    if previous == ProjectStatus::Completed || project.status != ProjectStatus::Completed {
        return None;
    }
    if project.total_amount <= Decimal::ZERO {
        return None;
    }
    let frequency = project.payment_type.and_then(|pt| pt.frequency())?;
    let payment_date = project.end_date.unwrap_or(today);
    let mut income = RecurringRecord::new(
        project.name.clone(),
        project.total_amount,
        frequency,
        ClientRevenue {
            client_id: project.client_id,
            project_id: Some(project.id),
        },
    );
    income.currency = project.currency;
    income.status = RecordStatus::Paid;
    income.payment_date = Some(payment_date);
    income.renewal_date = next_renewal(frequency, payment_date);
    Some(income)
}

/// Marks an expense or income paid on `on` and rolls the renewal date forward.
pub fn mark_record_paid<K: OwnerKind>(record: &mut RecurringRecord<K>, on: NaiveDate) {
    record.status = RecordStatus::Paid;
    record.payment_date = Some(on);
    record.renewal_date = next_renewal(record.frequency, on);
}

pub fn set_invoice_status(
    invoice: &mut Invoice,
    status: InvoiceStatus,
    today: NaiveDate,
) -> Result<(), CrmError> {
    if invoice.status == InvoiceStatus::Cancelled && status != InvoiceStatus::Cancelled {
        return Err(CrmError::InvalidTransition {
            entity: "invoice",
            from: invoice.status.to_string(),
            to: status.to_string(),
        });
    }
    match status {
        InvoiceStatus::Paid => {
            invoice.paid_date = invoice.paid_date.or(Some(today));
        }
        _ => invoice.paid_date = None,
    }
    invoice.status = status;
    Ok(())
}

/// Payment types that can settle a project without milestones.
pub fn bills_directly(project: &Project) -> bool {
    !matches!(project.payment_type, Some(PaymentType::Milestone))
}
