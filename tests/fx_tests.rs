// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use dealclip::commands::fx::set_rate;
use dealclip::commands::reports::summarize_in;
use dealclip::config::set_base_currency;
use dealclip::db;
use dealclip::models::{Company, Currency, Frequency, RecurringRecord};
use dealclip::utils::{fx_convert, has_fx_rate};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn setup() -> Connection {
    let conn = db::open_in_memory().unwrap();
    set_base_currency(&conn, Currency::Chf).unwrap();
    // CHF->EUR and CHF->USD available
    set_rate(&conn, d(2024, 8, 1), Currency::Chf, Currency::Eur, dec("1.05")).unwrap();
    set_rate(&conn, d(2024, 8, 1), Currency::Chf, Currency::Usd, dec("1.14")).unwrap();
    conn
}

#[test]
fn fx_triangulation_and_reciprocal() {
    let conn = setup();

    // EUR 105 -> USD via the CHF hub: 105 / 1.05 = 100 CHF; * 1.14 = 114 USD
    let res = fx_convert(&conn, d(2024, 8, 15), dec("105"), Currency::Eur, Currency::Usd).unwrap();
    assert_eq!(format!("{:.2}", res.round_dp(2)), "114.00");

    // USD -> CHF using only the CHF->USD rate
    let res2 = fx_convert(&conn, d(2024, 8, 15), dec("57"), Currency::Usd, Currency::Chf).unwrap();
    assert_eq!(format!("{:.2}", res2.round_dp(2)), "50.00");
}

#[test]
fn rates_apply_on_or_after_their_date_only() {
    let conn = setup();
    assert!(has_fx_rate(&conn, d(2024, 8, 1), Currency::Chf, Currency::Eur).unwrap());
    assert!(has_fx_rate(&conn, d(2024, 9, 1), Currency::Eur, Currency::Chf).unwrap());
    assert!(!has_fx_rate(&conn, d(2024, 7, 31), Currency::Chf, Currency::Eur).unwrap());

    // No rate yet: the amount passes through unchanged.
    let res = fx_convert(&conn, d(2024, 7, 1), dec("10"), Currency::Chf, Currency::Eur).unwrap();
    assert_eq!(res, dec("10"));
}

#[test]
fn manual_rate_replaces_same_day_entry() {
    let conn = setup();
    set_rate(&conn, d(2024, 8, 1), Currency::Chf, Currency::Eur, dec("1.10")).unwrap();
    let res = fx_convert(&conn, d(2024, 8, 2), dec("100"), Currency::Chf, Currency::Eur).unwrap();
    assert_eq!(res, dec("110"));
    assert!(set_rate(&conn, d(2024, 8, 1), Currency::Chf, Currency::Chf, dec("1")).is_err());
    assert!(set_rate(&conn, d(2024, 8, 1), Currency::Chf, Currency::Usd, dec("0")).is_err());
}

#[test]
fn mixed_currency_totals_are_converted_before_summing() {
    let conn = setup();
    let mut eur = RecurringRecord::new("Cloud", dec("105"), Frequency::Monthly, Company);
    eur.currency = Currency::Eur;
    let chf = RecurringRecord::new("Rent", dec("1000"), Frequency::Monthly, Company);
    let records = vec![eur, chf];
    let summary = summarize_in(&conn, &records, d(2024, 8, 20), Currency::Chf).unwrap();
    assert_eq!(summary.totals.monthly.round_dp(2), dec("1100.00"));
    assert_eq!(summary.totals.annual.round_dp(2), dec("13200.00"));
}
