// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use dealclip::filters::{ActivityFilter, LeadFilter, RecordFilter};
use dealclip::joins::{join_by_foreign_key, name_of};
use dealclip::models::{
    Activity, ActivityKind, ActivityStatus, Client, ClientCost, Currency, Frequency, Lead,
    LeadStatus, RecordStatus, RecurringRecord,
};
use rust_decimal::Decimal;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn lead(id: i64, name: &str, status: LeadStatus, source: &str) -> Lead {
    Lead {
        id,
        name: name.into(),
        company: None,
        email: Some(format!("{}@mail.test", name.to_lowercase())),
        phone: None,
        source: Some(source.into()),
        status,
        value: None,
        currency: Currency::Chf,
        contact_count: 0,
        last_contact_date: None,
        next_follow_up: Some(d(2024, 5, id as u32)),
        notes: None,
    }
}

fn leads() -> Vec<Lead> {
    vec![
        lead(1, "Alpha", LeadStatus::New, "website"),
        lead(2, "Beta", LeadStatus::Won, "referral"),
        lead(3, "Gamma", LeadStatus::Negotiation, "Website"),
        lead(4, "Delta", LeadStatus::Lost, "fair"),
    ]
}

fn names(v: &[&Lead]) -> Vec<String> {
    v.iter().map(|l| l.name.clone()).collect()
}

#[test]
fn lead_filter_combines_conditions() {
    let all = leads();
    let open = LeadFilter {
        open_only: true,
        ..LeadFilter::default()
    };
    assert_eq!(names(&open.apply(&all).unwrap()), vec!["Alpha", "Gamma"]);

    let site = LeadFilter {
        source: Some("WEBSITE".into()),
        ..LeadFilter::default()
    };
    assert_eq!(names(&site.apply(&all).unwrap()), vec!["Alpha", "Gamma"]);

    let search = LeadFilter {
        search: Some("ELT".into()),
        ..LeadFilter::default()
    };
    assert_eq!(names(&search.apply(&all).unwrap()), vec!["Delta"]);

    let due = LeadFilter {
        follow_up_by: Some(d(2024, 5, 2)),
        status: Some(LeadStatus::Won),
        ..LeadFilter::default()
    };
    assert_eq!(names(&due.apply(&all).unwrap()), vec!["Beta"]);
}

#[test]
fn lead_filter_regex() {
    let all = leads();
    let f = LeadFilter {
        pattern: Some("^(alpha|beta)@".into()),
        ..LeadFilter::default()
    };
    assert_eq!(names(&f.apply(&all).unwrap()), vec!["Alpha", "Beta"]);

    let bad = LeadFilter {
        pattern: Some("(".into()),
        ..LeadFilter::default()
    };
    assert!(bad.apply(&all).is_err());
}

#[test]
fn filters_are_plain_serialisable_state() {
    let f = LeadFilter {
        status: Some(LeadStatus::Proposal),
        open_only: true,
        ..LeadFilter::default()
    };
    let json = serde_json::to_string(&f).unwrap();
    assert!(json.contains("\"status\":\"proposal\""));
    let back: LeadFilter = serde_json::from_str(&json).unwrap();
    assert_eq!(back, f);
}

#[test]
fn activity_filter_by_window_and_link() {
    let mk = |id, date, lead_id, status| Activity {
        id,
        title: format!("a{}", id),
        kind: ActivityKind::Task,
        lead_id,
        client_id: None,
        scheduled_date: date,
        status,
        completed_at: None,
        notes: None,
    };
    let all = vec![
        mk(1, d(2024, 1, 1), Some(7), ActivityStatus::Overdue),
        mk(2, d(2024, 1, 10), Some(7), ActivityStatus::Pending),
        mk(3, d(2024, 1, 20), None, ActivityStatus::Pending),
    ];
    let f = ActivityFilter {
        lead_id: Some(7),
        from: Some(d(2024, 1, 5)),
        ..ActivityFilter::default()
    };
    let ids: Vec<i64> = f.apply(&all).iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![2]);

    let pending = ActivityFilter {
        status: Some(ActivityStatus::Pending),
        to: Some(d(2024, 1, 31)),
        ..ActivityFilter::default()
    };
    assert_eq!(pending.apply(&all).len(), 2);
}

#[test]
fn record_filter_general_bucket_and_active_window() {
    let owner = |project_id| ClientCost {
        client_id: 3,
        project_id,
    };
    let mut expired =
        RecurringRecord::new("Old tool", Decimal::new(10, 0), Frequency::Monthly, owner(None));
    expired.end_date = Some(d(2023, 12, 31));
    let mut paid =
        RecurringRecord::new("Fonts", Decimal::new(60, 0), Frequency::Annual, owner(Some(5)));
    paid.status = RecordStatus::Paid;
    let current = RecurringRecord::new("CI", Decimal::new(25, 0), Frequency::Monthly, owner(None));
    let all = vec![expired, paid, current];

    let general = RecordFilter {
        general_only: true,
        ..RecordFilter::default()
    };
    assert_eq!(general.apply(&all).len(), 2);

    let active_general = RecordFilter {
        general_only: true,
        active_on: Some(d(2024, 6, 1)),
        ..RecordFilter::default()
    };
    let hits = active_general.apply(&all);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "CI");

    let project = RecordFilter {
        project_id: Some(5),
        status: Some(RecordStatus::Paid),
        ..RecordFilter::default()
    };
    assert_eq!(project.apply(&all)[0].name, "Fonts");

    let other_client = RecordFilter {
        client_id: Some(4),
        ..RecordFilter::default()
    };
    assert!(other_client.apply(&all).is_empty());
}

#[test]
fn dangling_foreign_keys_join_to_none() {
    let clients = vec![Client {
        id: 1,
        name: "Acme".into(),
        ..Client::default()
    }];
    let rows: Vec<(i64, Option<i64>)> = vec![(10, Some(1)), (11, Some(99)), (12, None)];
    let joined = join_by_foreign_key(&rows, &clients, |r| r.1, |c| c.id);
    let shown: Vec<String> = joined
        .iter()
        .map(|(_, c)| name_of(*c, |c| c.name.as_str()))
        .collect();
    assert_eq!(shown, vec!["Acme", "", ""]);
}
