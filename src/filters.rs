// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! List view state. Each filter is plain data built from CLI flags (or
//! deserialised from JSON) and applied in memory to already-loaded rows.

use crate::error::CrmError;
use crate::models::{
    Activity, ActivityKind, ActivityStatus, Currency, Frequency, Lead, LeadStatus, OwnerKind,
    RecordStatus, RecurringRecord,
};
use crate::recurring::is_active;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

fn contains_ci(hay: Option<&str>, needle: &str) -> bool {
    hay.is_some_and(|h| h.to_lowercase().contains(needle))
}

fn compile(pattern: Option<&str>) -> Result<Option<Regex>, CrmError> {
    pattern
        .map(|p| {
            Regex::new(p)
                .map_err(|err| CrmError::validation(format!("Invalid pattern '{}': {}", p, err)))
        })
        .transpose()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub source: Option<String>,
    /// Case-insensitive substring over name, company and email.
    pub search: Option<String>,
    /// Regex over the same fields, for when a substring is not enough.
    pub pattern: Option<String>,
    /// Only leads whose follow-up date is on or before this day.
    pub follow_up_by: Option<NaiveDate>,
    /// Hide won/lost leads.
    pub open_only: bool,
}

impl LeadFilter {
    pub fn apply<'a>(&self, leads: &'a [Lead]) -> Result<Vec<&'a Lead>, CrmError> {
        let re = compile(self.pattern.as_deref())?;
        let needle = self.search.as_ref().map(|s| s.trim().to_lowercase());
        Ok(leads
            .iter()
            .filter(|l| self.status.is_none_or(|s| l.status == s))
            .filter(|l| !self.open_only || !l.status.is_closed())
            .filter(|l| {
                self.source.as_ref().is_none_or(|src| {
                    l.source
                        .as_deref()
                        .is_some_and(|ls| ls.eq_ignore_ascii_case(src.trim()))
                })
            })
            .filter(|l| {
                needle.as_ref().is_none_or(|n| {
                    contains_ci(Some(&l.name), n)
                        || contains_ci(l.company.as_deref(), n)
                        || contains_ci(l.email.as_deref(), n)
                })
            })
            .filter(|l| {
                re.as_ref().is_none_or(|re| {
                    re.is_match(&l.name)
                        || l.company.as_deref().is_some_and(|c| re.is_match(c))
                        || l.email.as_deref().is_some_and(|e| re.is_match(e))
                })
            })
            .filter(|l| {
                self.follow_up_by
                    .is_none_or(|by| l.next_follow_up.is_some_and(|f| f <= by))
            })
            .collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityFilter {
    pub status: Option<ActivityStatus>,
    pub kind: Option<ActivityKind>,
    pub lead_id: Option<i64>,
    pub client_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ActivityFilter {
    pub fn matches(&self, a: &Activity) -> bool {
        self.status.is_none_or(|s| a.status == s)
            && self.kind.is_none_or(|k| a.kind == k)
            && self.lead_id.is_none_or(|id| a.lead_id == Some(id))
            && self.client_id.is_none_or(|id| a.client_id == Some(id))
            && self.from.is_none_or(|d| a.scheduled_date >= d)
            && self.to.is_none_or(|d| a.scheduled_date <= d)
    }

    pub fn apply<'a>(&self, activities: &'a [Activity]) -> Vec<&'a Activity> {
        activities.iter().filter(|a| self.matches(a)).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub status: Option<RecordStatus>,
    pub frequency: Option<Frequency>,
    pub currency: Option<Currency>,
    pub client_id: Option<i64>,
    pub project_id: Option<i64>,
    /// Only records with no project (the client's general bucket).
    pub general_only: bool,
    pub category: Option<String>,
    pub search: Option<String>,
    /// Only recurring records active on this day.
    pub active_on: Option<NaiveDate>,
}

impl RecordFilter {
    pub fn matches<K: OwnerKind>(&self, r: &RecurringRecord<K>) -> bool {
        let needle = self.search.as_ref().map(|s| s.trim().to_lowercase());
        self.status.is_none_or(|s| r.status == s)
            && self.frequency.is_none_or(|f| r.frequency == f)
            && self.currency.is_none_or(|c| r.currency == c)
            && self.client_id.is_none_or(|id| r.owner.client_id() == Some(id))
            && self.project_id.is_none_or(|id| r.owner.project_id() == Some(id))
            && (!self.general_only || r.owner.project_id().is_none())
            && self.category.as_ref().is_none_or(|c| {
                r.category
                    .as_deref()
                    .is_some_and(|rc| rc.eq_ignore_ascii_case(c.trim()))
            })
            && needle.as_ref().is_none_or(|n| {
                contains_ci(Some(&r.name), n) || contains_ci(r.notes.as_deref(), n)
            })
            && self.active_on.is_none_or(|d| is_active(r, d))
    }

    pub fn apply<'a, K: OwnerKind>(
        &self,
        records: &'a [RecurringRecord<K>],
    ) -> Vec<&'a RecurringRecord<K>> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}
