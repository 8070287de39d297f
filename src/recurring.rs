// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Normalisation and aggregation of recurring money: expenses, income and
//! project milestones.

use crate::models::{
    Frequency, MilestoneStatus, OwnerKind, PaymentType, Project, ProjectMilestone,
    RecurringRecord,
};
use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::convert::Infallible;

fn months_per_year() -> Decimal {
    Decimal::from(12u32)
}

/// Amount expressed as if billed monthly. One-time charges never recur.
pub fn monthly_equivalent(amount: Decimal, frequency: Frequency) -> Decimal {
    match frequency {
        Frequency::Monthly => amount,
        Frequency::Annual => amount / months_per_year(),
        Frequency::OneTime => Decimal::ZERO,
    }
}

/// Amount expressed as if billed annually.
pub fn annual_equivalent(amount: Decimal, frequency: Frequency) -> Decimal {
    match frequency {
        Frequency::Monthly => amount * months_per_year(),
        Frequency::Annual => amount,
        Frequency::OneTime => Decimal::ZERO,
    }
}

/// Next anniversary counted from `from`. Month arithmetic clamps to month end.
pub fn next_renewal(frequency: Frequency, from: NaiveDate) -> Option<NaiveDate> {
    match frequency {
        Frequency::Monthly => from.checked_add_months(Months::new(1)),
        Frequency::Annual => from.checked_add_months(Months::new(12)),
        Frequency::OneTime => None,
    }
}

pub fn is_active<K: OwnerKind>(record: &RecurringRecord<K>, reference: NaiveDate) -> bool {
    record.frequency != Frequency::OneTime
        && record.start_date.is_none_or(|start| start <= reference)
        && record.end_date.is_none_or(|end| end >= reference)
}

pub fn one_time_in_month<K: OwnerKind>(record: &RecurringRecord<K>, reference: NaiveDate) -> bool {
    record.frequency == Frequency::OneTime
        && record
            .own_date()
            .is_some_and(|d| d.year() == reference.year() && d.month() == reference.month())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// Monthly equivalent of records active at the reference date.
    pub monthly: Decimal,
    /// Annual equivalent of every record, active or not.
    pub annual: Decimal,
    /// Face value of one-time charges falling in the reference month.
    pub one_time: Decimal,
}

impl std::ops::AddAssign for Totals {
    fn add_assign(&mut self, rhs: Totals) {
        self.monthly += rhs.monthly;
        self.annual += rhs.annual;
        self.one_time += rhs.one_time;
    }
}

#[derive(Debug)]
pub struct RecurringSummary<'a, K> {
    pub active: Vec<&'a RecurringRecord<K>>,
    pub one_time: Vec<&'a RecurringRecord<K>>,
    pub totals: Totals,
}

/// Aggregates records as they are, without currency conversion.
pub fn summarize<K: OwnerKind>(
    records: &[RecurringRecord<K>],
    reference: NaiveDate,
) -> RecurringSummary<'_, K> {
    match summarize_with(records, reference, |_, amount| {
        Ok::<Decimal, Infallible>(amount)
    }) {
        Ok(summary) => summary,
        Err(never) => match never {},
    }
}

/// Aggregates records, passing every amount through `convert` first so that
/// mixed-currency collections can be totalled in one target currency.
pub fn summarize_with<'a, K, E, F>(
    records: &'a [RecurringRecord<K>],
    reference: NaiveDate,
    mut convert: F,
) -> Result<RecurringSummary<'a, K>, E>
where
    K: OwnerKind,
    F: FnMut(&RecurringRecord<K>, Decimal) -> Result<Decimal, E>,
{
    let mut summary = RecurringSummary {
        active: Vec::new(),
        one_time: Vec::new(),
        totals: Totals::default(),
    };
    for record in records {
        let amount = convert(record, record.amount)?;
        summary.totals.annual += annual_equivalent(amount, record.frequency);
        if is_active(record, reference) {
            summary.totals.monthly += monthly_equivalent(amount, record.frequency);
            summary.active.push(record);
        } else if one_time_in_month(record, reference) {
            summary.totals.one_time += amount;
            summary.one_time.push(record);
        }
    }
    Ok(summary)
}

#[derive(Debug)]
pub struct ProjectRollup<'a, K> {
    pub general: Vec<&'a RecurringRecord<K>>,
    pub per_project: BTreeMap<i64, Vec<&'a RecurringRecord<K>>>,
}

pub fn partition_by_project<K: OwnerKind>(records: &[RecurringRecord<K>]) -> ProjectRollup<'_, K> {
    let mut rollup = ProjectRollup {
        general: Vec::new(),
        per_project: BTreeMap::new(),
    };
    for record in records {
        match record.owner.project_id() {
            Some(pid) => rollup.per_project.entry(pid).or_default().push(record),
            None => rollup.general.push(record),
        }
    }
    rollup
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProjectBalance {
    pub total: Decimal,
    pub paid: Decimal,
    pub remaining: Decimal,
}

/// Paid so far on a project. Milestone projects sum their milestones on every
/// call; other projects use their stored `paid_amount`.
pub fn project_paid_total(project: &Project, milestones: &[ProjectMilestone]) -> Decimal {
    if project.payment_type == Some(PaymentType::Milestone) {
        milestones
            .iter()
            .filter(|m| m.project_id == project.id)
            .map(|m| m.paid_amount)
            .sum()
    } else {
        project.paid_amount
    }
}

pub fn project_balance(project: &Project, milestones: &[ProjectMilestone]) -> ProjectBalance {
    let paid = project_paid_total(project, milestones);
    ProjectBalance {
        total: project.total_amount,
        paid,
        remaining: project.total_amount - paid,
    }
}

/// Sum of milestone amounts that are not yet settled in full.
pub fn milestones_outstanding(milestones: &[ProjectMilestone]) -> Decimal {
    milestones
        .iter()
        .filter(|m| m.status != MilestoneStatus::Paid)
        .map(|m| m.amount - m.paid_amount)
        .sum()
}
