// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use dealclip::cli;
use dealclip::commands::exporter;
use dealclip::db;
use dealclip::error::CrmError;
use dealclip::models::{Client, ClientRevenue, Company, Frequency, RecurringRecord};
use dealclip::repo::crm;
use dealclip::workflow;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn seeded() -> Connection {
    let conn = db::open_in_memory().unwrap();
    let client_id = crm::insert_client(
        &conn,
        &Client {
            name: "Acme".into(),
            ..Client::default()
        },
    )
    .unwrap();
    let mut retainer = RecurringRecord::new(
        "Retainer",
        Decimal::new(2000, 0),
        Frequency::Monthly,
        ClientRevenue {
            client_id,
            project_id: None,
        },
    );
    retainer.start_date = NaiveDate::from_ymd_opt(2024, 1, 1);
    retainer.notes = Some("net 30, invoiced monthly".into());
    workflow::add_record(&conn, &retainer).unwrap();

    let mut hosting =
        RecurringRecord::new("Hosting", Decimal::new(1999, 2), Frequency::Monthly, Company);
    hosting.category = Some("infra".into());
    workflow::add_record(&conn, &hosting).unwrap();
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["dealclip", "export", "records"];
    argv.extend_from_slice(args);
    let m = cli::build_cli().get_matches_from(argv);
    exporter::handle(conn, m.subcommand_matches("export").unwrap())
}

#[test]
fn income_exports_as_json() {
    let conn = seeded();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("income.json");
    run(
        &conn,
        &["--kind", "income", "--format", "json", "--out", out.to_str().unwrap()],
    )
    .unwrap();

    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let rows = v.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Retainer");
    assert_eq!(rows[0]["amount"], "2000");
    assert_eq!(rows[0]["frequency"], "monthly");
    assert_eq!(rows[0]["start_date"], "2024-01-01");
    assert!(rows[0]["client_id"].is_i64());
}

#[test]
fn company_expenses_export_as_csv() {
    let conn = seeded();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("company.csv");
    run(
        &conn,
        &["--kind", "company-expenses", "--format", "CSV", "--out", out.to_str().unwrap()],
    )
    .unwrap();

    let mut rdr = csv::Reader::from_path(&out).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "id");
    assert_eq!(&headers[13], "notes");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][1], "Hosting");
    assert_eq!(&rows[0][2], "infra");
    assert_eq!(&rows[0][3], "19.99");
    assert_eq!(&rows[0][11], "");
}

#[test]
fn unknown_format_or_kind_writes_nothing() {
    let conn = seeded();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.xml");
    let err = run(
        &conn,
        &["--kind", "income", "--format", "xml", "--out", out.to_str().unwrap()],
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CrmError>(),
        Some(CrmError::UnknownVariant { kind: "export format", .. })
    ));
    assert!(!out.exists());

    let err = run(
        &conn,
        &["--kind", "invoices", "--format", "csv", "--out", out.to_str().unwrap()],
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CrmError>(),
        Some(CrmError::UnknownVariant { kind: "export kind", .. })
    ));
    assert!(!out.exists());
}
