// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use dealclip::db;
use dealclip::error::CrmError;
use dealclip::models::{
    Client, ClientRevenue, Currency, Frequency, MilestoneStatus, PaymentType, Project,
    ProjectMilestone, ProjectStatus, RecordStatus,
};
use dealclip::repo::{crm, projects, records};
use dealclip::workflow;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn setup() -> (Connection, i64) {
    let conn = db::open_in_memory().unwrap();
    let client_id = crm::insert_client(
        &conn,
        &Client {
            name: "Acme".into(),
            ..Client::default()
        },
    )
    .unwrap();
    (conn, client_id)
}

fn project(client_id: i64, name: &str, total: &str, payment_type: Option<PaymentType>) -> Project {
    Project {
        id: 0,
        client_id,
        name: name.into(),
        status: ProjectStatus::Active,
        total_amount: dec(total),
        currency: Currency::Chf,
        payment_type,
        paid_amount: Decimal::ZERO,
        start_date: Some(d(2024, 1, 1)),
        end_date: None,
    }
}

fn milestone(project_id: i64, name: &str, amount: &str) -> ProjectMilestone {
    ProjectMilestone {
        id: 0,
        project_id,
        name: name.into(),
        amount: dec(amount),
        due_date: None,
        status: MilestoneStatus::Pending,
        paid_amount: Decimal::ZERO,
        paid_date: None,
    }
}

fn income_rows(conn: &Connection) -> usize {
    records::load_records::<ClientRevenue>(conn).unwrap().len()
}

#[test]
fn milestone_balance_sums_paid_amounts() {
    let (conn, client_id) = setup();
    let today = d(2024, 3, 1);
    let saved = workflow::create_project(
        &conn,
        project(client_id, "Portal", "5000", Some(PaymentType::Milestone)),
        today,
    )
    .unwrap();
    let pid = saved.project.id;

    let design = workflow::add_milestone(&conn, &milestone(pid, "Design", "2000")).unwrap();
    let build = workflow::add_milestone(&conn, &milestone(pid, "Build", "1500")).unwrap();
    workflow::add_milestone(&conn, &milestone(pid, "Launch", "1500")).unwrap();

    let paid =
        workflow::set_milestone_status(&conn, design, MilestoneStatus::Paid, None, None, today)
            .unwrap();
    assert_eq!(paid.paid_amount, dec("2000"));
    assert_eq!(paid.paid_date, Some(today));
    workflow::set_milestone_status(
        &conn,
        build,
        MilestoneStatus::Partial,
        Some(dec("500")),
        None,
        today,
    )
    .unwrap();

    let (_, balance) = workflow::project_with_balance(&conn, pid).unwrap();
    assert_eq!(balance.total, dec("5000"));
    assert_eq!(balance.paid, dec("2500"));
    assert_eq!(balance.remaining, dec("2500"));
}

#[test]
fn milestone_status_keeps_paid_amount_consistent() {
    let (conn, client_id) = setup();
    let today = d(2024, 3, 1);
    let pid = workflow::create_project(
        &conn,
        project(client_id, "Shop", "1000", Some(PaymentType::Milestone)),
        today,
    )
    .unwrap()
    .project
    .id;
    let id = workflow::add_milestone(&conn, &milestone(pid, "Kickoff", "1000")).unwrap();

    for bad in ["0", "1000", "1200"] {
        let err = workflow::set_milestone_status(
            &conn,
            id,
            MilestoneStatus::Partial,
            Some(dec(bad)),
            None,
            today,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CrmError>(),
            Some(CrmError::Validation(_))
        ));
    }
    // Rejected writes leave the row untouched.
    let stored = projects::get_milestone(&conn, id).unwrap();
    assert_eq!(stored.status, MilestoneStatus::Pending);
    assert!(stored.paid_amount.is_zero());

    workflow::set_milestone_status(&conn, id, MilestoneStatus::Paid, None, Some(d(2024, 2, 20)), today)
        .unwrap();
    let back =
        workflow::set_milestone_status(&conn, id, MilestoneStatus::Pending, None, None, today)
            .unwrap();
    assert!(back.paid_amount.is_zero());
    assert_eq!(back.paid_date, None);
}

#[test]
fn completing_one_time_project_posts_income_once() {
    let (conn, client_id) = setup();
    let mut p = project(client_id, "Rebrand", "3000", Some(PaymentType::OneTime));
    p.end_date = Some(d(2024, 6, 1));
    let pid = workflow::create_project(&conn, p, d(2024, 1, 10)).unwrap().project.id;
    assert_eq!(income_rows(&conn), 0);

    let saved =
        workflow::set_project_status(&conn, pid, ProjectStatus::Completed, d(2024, 6, 5)).unwrap();
    assert!(saved.posted_income.is_some());

    let income = records::load_records::<ClientRevenue>(&conn).unwrap();
    assert_eq!(income.len(), 1);
    let row = &income[0];
    assert_eq!(row.amount, dec("3000"));
    assert_eq!(row.frequency, Frequency::OneTime);
    assert_eq!(row.status, RecordStatus::Paid);
    assert_eq!(row.payment_date, Some(d(2024, 6, 1)));
    assert_eq!(row.renewal_date, None);
    assert_eq!(row.owner.client_id, client_id);
    assert_eq!(row.owner.project_id, Some(pid));

    // Editing an already completed project does not post again.
    let mut again = projects::get_project(&conn, pid).unwrap();
    again.total_amount = dec("3200");
    let saved = workflow::save_project(&conn, again, d(2024, 6, 6)).unwrap();
    assert!(saved.posted_income.is_none());
    assert_eq!(income_rows(&conn), 1);
}

#[test]
fn recurring_projects_post_income_with_renewal() {
    let (conn, client_id) = setup();
    let monthly = workflow::create_project(
        &conn,
        project(client_id, "Hosting", "90", Some(PaymentType::Monthly)),
        d(2024, 1, 1),
    )
    .unwrap()
    .project
    .id;
    let annual = workflow::create_project(
        &conn,
        project(client_id, "Licence", "1200", Some(PaymentType::Annual)),
        d(2024, 1, 1),
    )
    .unwrap()
    .project
    .id;

    let today = d(2024, 1, 31);
    workflow::set_project_status(&conn, monthly, ProjectStatus::Completed, today).unwrap();
    workflow::set_project_status(&conn, annual, ProjectStatus::Completed, today).unwrap();

    let income = records::load_records::<ClientRevenue>(&conn).unwrap();
    let by_name = |n: &str| income.iter().find(|r| r.name == n).unwrap();
    assert_eq!(by_name("Hosting").payment_date, Some(today));
    assert_eq!(by_name("Hosting").renewal_date, Some(d(2024, 2, 29)));
    assert_eq!(by_name("Licence").renewal_date, Some(d(2025, 1, 31)));
}

#[test]
fn milestone_and_zero_value_projects_post_nothing() {
    let (conn, client_id) = setup();
    let today = d(2024, 5, 1);
    let ms = workflow::create_project(
        &conn,
        project(client_id, "Platform", "8000", Some(PaymentType::Milestone)),
        today,
    )
    .unwrap()
    .project
    .id;
    let free = workflow::create_project(
        &conn,
        project(client_id, "Pro bono", "0", Some(PaymentType::OneTime)),
        today,
    )
    .unwrap()
    .project
    .id;
    let untyped = workflow::create_project(&conn, project(client_id, "Draft", "500", None), today)
        .unwrap()
        .project
        .id;
    for id in [ms, free, untyped] {
        let saved = workflow::set_project_status(&conn, id, ProjectStatus::Completed, today).unwrap();
        assert!(saved.posted_income.is_none());
    }
    assert_eq!(income_rows(&conn), 0);
}

#[test]
fn income_posting_failure_keeps_project_completed() {
    let (conn, client_id) = setup();
    let pid = workflow::create_project(
        &conn,
        project(client_id, "Audit", "3000", Some(PaymentType::OneTime)),
        d(2024, 5, 1),
    )
    .unwrap()
    .project
    .id;
    conn.execute_batch("DROP TABLE client_income;").unwrap();

    let saved =
        workflow::set_project_status(&conn, pid, ProjectStatus::Completed, d(2024, 6, 1)).unwrap();
    assert!(saved.posted_income.is_none());
    assert_eq!(saved.project.status, ProjectStatus::Completed);

    let stored = projects::get_project(&conn, pid).unwrap();
    assert_eq!(stored.status, ProjectStatus::Completed);
    let raw: String = conn
        .query_row("SELECT status FROM projects WHERE id=?1", [pid], |r| r.get(0))
        .unwrap();
    assert_eq!(raw, "completed");
}

#[test]
fn project_created_completed_posts_income() {
    let (conn, client_id) = setup();
    let mut p = project(client_id, "Logo", "700", Some(PaymentType::OneTime));
    p.status = ProjectStatus::Completed;
    let saved = workflow::create_project(&conn, p, d(2024, 7, 3)).unwrap();
    assert!(saved.posted_income.is_some());
    let income = records::load_records::<ClientRevenue>(&conn).unwrap();
    assert_eq!(income[0].payment_date, Some(d(2024, 7, 3)));
}

#[test]
fn direct_payments_are_capped_at_total() {
    let (conn, client_id) = setup();
    let today = d(2024, 2, 1);
    let pid = workflow::create_project(
        &conn,
        project(client_id, "Audit", "1000", Some(PaymentType::OneTime)),
        today,
    )
    .unwrap()
    .project
    .id;
    let p = workflow::record_project_payment(&conn, pid, dec("400")).unwrap();
    assert_eq!(p.paid_amount, dec("400"));
    assert!(workflow::record_project_payment(&conn, pid, dec("700")).is_err());
    let (_, bal) = workflow::project_with_balance(&conn, pid).unwrap();
    assert_eq!(bal.remaining, dec("600"));

    let ms = workflow::create_project(
        &conn,
        project(client_id, "Phased", "1000", Some(PaymentType::Milestone)),
        today,
    )
    .unwrap()
    .project
    .id;
    assert!(workflow::record_project_payment(&conn, ms, dec("100")).is_err());
}

#[test]
fn project_end_before_start_is_rejected() {
    let (conn, client_id) = setup();
    let mut p = project(client_id, "Backwards", "100", None);
    p.end_date = Some(d(2023, 12, 1));
    let err = workflow::create_project(&conn, p, d(2024, 1, 1)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CrmError>(),
        Some(CrmError::Validation(_))
    ));
    assert!(projects::load_projects(&conn).unwrap().is_empty());
}
