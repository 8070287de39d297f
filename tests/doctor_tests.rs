// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use dealclip::commands::{doctor, fx};
use dealclip::db;
use dealclip::models::{
    Activity, ActivityKind, ActivityStatus, Client, Currency, Lead, LeadStatus, MilestoneStatus,
    PaymentType, Project, ProjectMilestone, ProjectStatus,
};
use dealclip::repo::{crm, projects};
use rust_decimal::Decimal;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn codes(issues: &[doctor::Issue]) -> Vec<&'static str> {
    issues.iter().map(|i| i.code).collect()
}

#[test]
fn empty_store_is_clean() {
    let conn = db::open_in_memory().unwrap();
    assert!(doctor::check(&conn, d(2024, 6, 1)).unwrap().is_empty());
}

#[test]
fn finds_rows_written_around_the_workflow() {
    let conn = db::open_in_memory().unwrap();
    let client_id = crm::insert_client(
        &conn,
        &Client {
            name: "Acme".into(),
            ..Client::default()
        },
    )
    .unwrap();

    let project_id = projects::insert_project(
        &conn,
        &Project {
            id: 0,
            client_id,
            name: "Portal".into(),
            status: ProjectStatus::Active,
            total_amount: Decimal::new(1000, 0),
            currency: Currency::Chf,
            payment_type: Some(PaymentType::Milestone),
            paid_amount: Decimal::ZERO,
            start_date: Some(d(2024, 3, 1)),
            end_date: Some(d(2024, 2, 1)),
        },
    )
    .unwrap();
    projects::insert_milestone(
        &conn,
        &ProjectMilestone {
            id: 0,
            project_id,
            name: "Design".into(),
            amount: Decimal::new(600, 0),
            due_date: None,
            status: MilestoneStatus::Paid,
            paid_amount: Decimal::ZERO,
            paid_date: None,
        },
    )
    .unwrap();
    crm::insert_activity(
        &conn,
        &Activity {
            id: 0,
            title: "Send contract".into(),
            kind: ActivityKind::Task,
            lead_id: None,
            client_id: Some(client_id),
            scheduled_date: d(2024, 5, 1),
            status: ActivityStatus::Pending,
            completed_at: None,
            notes: None,
        },
    )
    .unwrap();
    crm::insert_lead(
        &conn,
        &Lead {
            id: 0,
            name: "Initech".into(),
            company: None,
            email: None,
            phone: None,
            source: None,
            status: LeadStatus::New,
            value: Some(Decimal::new(800, 0)),
            currency: Currency::Eur,
            contact_count: 0,
            last_contact_date: None,
            next_follow_up: None,
            notes: None,
        },
    )
    .unwrap();

    let issues = doctor::check(&conn, d(2024, 6, 1)).unwrap();
    let found = codes(&issues);
    for expected in [
        "milestone_invariant",
        "milestone_sum_mismatch",
        "end_before_start",
        "stale_pending_activity",
        "missing_fx",
    ] {
        assert!(found.contains(&expected), "missing {expected} in {found:?}");
    }
    let fx_issue = issues.iter().find(|i| i.code == "missing_fx").unwrap();
    assert!(fx_issue.detail.starts_with("CHF/EUR"));

    // A rate on or before the check date clears the fx finding.
    fx::set_rate(&conn, d(2024, 5, 31), Currency::Chf, Currency::Eur, Decimal::new(105, 2))
        .unwrap();
    let after = doctor::check(&conn, d(2024, 6, 1)).unwrap();
    assert!(!codes(&after).contains(&"missing_fx"));
    // The stale activity is only stale relative to the day checked.
    let earlier = doctor::check(&conn, d(2024, 5, 1)).unwrap();
    assert!(!codes(&earlier).contains(&"stale_pending_activity"));
}
