// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use dealclip::db;
use dealclip::error::CrmError;
use dealclip::models::{
    Client, ClientCost, ClientRevenue, Company, Currency, Frequency, PaymentType, Project,
    ProjectStatus, RecordStatus, RecurringRecord,
};
use dealclip::repo::{crm, records};
use dealclip::workflow;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn client(conn: &Connection, name: &str) -> i64 {
    crm::insert_client(
        conn,
        &Client {
            name: name.into(),
            ..Client::default()
        },
    )
    .unwrap()
}

fn project_for(conn: &Connection, client_id: i64, name: &str) -> i64 {
    workflow::create_project(
        conn,
        Project {
            id: 0,
            client_id,
            name: name.into(),
            status: ProjectStatus::Active,
            total_amount: dec("1000"),
            currency: Currency::Chf,
            payment_type: Some(PaymentType::OneTime),
            paid_amount: Decimal::ZERO,
            start_date: None,
            end_date: None,
        },
        d(2024, 1, 1),
    )
    .unwrap()
    .project
    .id
}

#[test]
fn company_expense_roundtrips_through_store() {
    let conn = db::open_in_memory().unwrap();
    let mut rec = RecurringRecord::new("Accounting", dec("240.50"), Frequency::Annual, Company);
    rec.category = Some("services".into());
    rec.start_date = Some(d(2024, 1, 1));
    let id = workflow::add_record(&conn, &rec).unwrap();
    let back = records::get_record::<Company>(&conn, id).unwrap();
    assert_eq!(back.amount, dec("240.50"));
    assert_eq!(back.frequency, Frequency::Annual);
    assert_eq!(back.category.as_deref(), Some("services"));
    assert!(back.user_id.is_some());
}

#[test]
fn invalid_records_are_rejected_before_writing() {
    let conn = db::open_in_memory().unwrap();
    let mut neg = RecurringRecord::new("Refund", dec("-5"), Frequency::OneTime, Company);
    let err = workflow::add_record(&conn, &neg).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CrmError>(),
        Some(CrmError::Validation(_))
    ));
    neg.amount = dec("5");
    neg.start_date = Some(d(2024, 5, 1));
    neg.end_date = Some(d(2024, 4, 1));
    assert!(workflow::add_record(&conn, &neg).is_err());
    assert!(records::load_records::<Company>(&conn).unwrap().is_empty());
}

#[test]
fn client_record_project_must_belong_to_client() {
    let conn = db::open_in_memory().unwrap();
    let acme = client(&conn, "Acme");
    let umbrella = client(&conn, "Umbrella");
    let acme_project = project_for(&conn, acme, "Acme site");

    let ok = RecurringRecord::new(
        "Plugin licence",
        dec("99"),
        Frequency::Annual,
        ClientCost {
            client_id: acme,
            project_id: Some(acme_project),
        },
    );
    workflow::add_record(&conn, &ok).unwrap();

    let wrong = RecurringRecord::new(
        "Hosting",
        dec("20"),
        Frequency::Monthly,
        ClientRevenue {
            client_id: umbrella,
            project_id: Some(acme_project),
        },
    );
    assert!(workflow::add_record(&conn, &wrong).is_err());
    assert!(records::load_client_records::<ClientRevenue>(&conn, umbrella)
        .unwrap()
        .is_empty());
    assert_eq!(
        records::load_client_records::<ClientCost>(&conn, acme)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn marking_paid_rolls_renewal_forward() {
    let conn = db::open_in_memory().unwrap();
    let acme = client(&conn, "Acme");
    let rec = RecurringRecord::new(
        "Retainer",
        dec("1500"),
        Frequency::Monthly,
        ClientRevenue {
            client_id: acme,
            project_id: None,
        },
    );
    let id = workflow::add_record(&conn, &rec).unwrap();
    let paid = workflow::mark_record_paid::<ClientRevenue>(&conn, id, d(2024, 3, 31)).unwrap();
    assert_eq!(paid.status, RecordStatus::Paid);
    assert_eq!(paid.payment_date, Some(d(2024, 3, 31)));
    assert_eq!(paid.renewal_date, Some(d(2024, 4, 30)));

    let stored = records::get_record::<ClientRevenue>(&conn, id).unwrap();
    assert_eq!(stored.renewal_date, Some(d(2024, 4, 30)));
}

#[test]
fn unknown_record_id_is_not_found() {
    let conn = db::open_in_memory().unwrap();
    let err = workflow::mark_record_paid::<Company>(&conn, 42, d(2024, 1, 1)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CrmError>(),
        Some(CrmError::NotFound { .. })
    ));
}
