// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use dealclip::models::{ClientRevenue, Company, CompanyExpense, Frequency, RecurringRecord};
use dealclip::recurring::{
    annual_equivalent, is_active, monthly_equivalent, next_renewal, one_time_in_month,
    partition_by_project, summarize,
};
use rust_decimal::Decimal;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn expense(name: &str, amount: &str, frequency: Frequency) -> CompanyExpense {
    RecurringRecord::new(name, dec(amount), frequency, Company)
}

#[test]
fn normalisation_per_frequency() {
    let x = dec("123.45");
    assert_eq!(monthly_equivalent(x, Frequency::Monthly), x);
    assert_eq!(annual_equivalent(x, Frequency::Monthly), x * dec("12"));
    assert_eq!(monthly_equivalent(x, Frequency::Annual), x / dec("12"));
    assert_eq!(annual_equivalent(x, Frequency::Annual), x);
    assert_eq!(monthly_equivalent(x, Frequency::OneTime), Decimal::ZERO);
    assert_eq!(annual_equivalent(x, Frequency::OneTime), Decimal::ZERO);
}

#[test]
fn annual_expense_without_window_is_ten_a_month_every_month() {
    let rec = expense("Domain", "120", Frequency::Annual);
    assert_eq!(
        monthly_equivalent(rec.amount, rec.frequency).round_dp(2),
        dec("10.00")
    );
    for (y, m) in [(2020, 1), (2024, 2), (2024, 12), (2031, 7)] {
        assert!(is_active(&rec, d(y, m, 15)));
        let s = summarize(std::slice::from_ref(&rec), d(y, m, 15));
        assert_eq!(s.active.len(), 1);
        assert_eq!(s.totals.monthly.round_dp(2), dec("10.00"));
    }
}

#[test]
fn active_window_is_inclusive() {
    let mut rec = expense("Office", "500", Frequency::Monthly);
    rec.start_date = Some(d(2024, 3, 1));
    rec.end_date = Some(d(2024, 5, 31));
    assert!(!is_active(&rec, d(2024, 2, 29)));
    assert!(is_active(&rec, d(2024, 3, 1)));
    assert!(is_active(&rec, d(2024, 5, 31)));
    assert!(!is_active(&rec, d(2024, 6, 1)));
}

#[test]
fn one_time_charges_land_in_their_own_month_only() {
    let mut rec = expense("Laptop", "1800", Frequency::OneTime);
    rec.payment_date = Some(d(2024, 4, 18));
    assert!(!is_active(&rec, d(2024, 4, 18)));
    assert!(one_time_in_month(&rec, d(2024, 4, 1)));
    assert!(!one_time_in_month(&rec, d(2024, 5, 1)));
    assert!(!one_time_in_month(&rec, d(2023, 4, 1)));

    // start_date is the fallback when nothing was paid yet
    let mut later = expense("Chair", "300", Frequency::OneTime);
    later.start_date = Some(d(2024, 5, 2));
    assert!(one_time_in_month(&later, d(2024, 5, 30)));
}

#[test]
fn annual_total_counts_expired_records_but_monthly_does_not() {
    let mut expired = expense("Old hosting", "50", Frequency::Monthly);
    expired.end_date = Some(d(2023, 12, 31));
    let current = expense("Hosting", "80", Frequency::Monthly);
    let mut once = expense("Setup", "200", Frequency::OneTime);
    once.payment_date = Some(d(2024, 6, 3));

    let records = vec![expired, current, once];
    let s = summarize(&records, d(2024, 6, 10));
    assert_eq!(s.active.len(), 1);
    assert_eq!(s.one_time.len(), 1);
    assert_eq!(s.totals.monthly, dec("80"));
    assert_eq!(s.totals.annual, dec("1560"));
    assert_eq!(s.totals.one_time, dec("200"));
}

#[test]
fn renewal_clamps_to_month_end() {
    assert_eq!(next_renewal(Frequency::Monthly, d(2024, 1, 31)), Some(d(2024, 2, 29)));
    assert_eq!(next_renewal(Frequency::Annual, d(2024, 2, 29)), Some(d(2025, 2, 28)));
    assert_eq!(next_renewal(Frequency::OneTime, d(2024, 2, 29)), None);
}

#[test]
fn rollup_splits_general_and_project_records() {
    let owner = |project_id| ClientRevenue {
        client_id: 1,
        project_id,
    };
    let records = vec![
        RecurringRecord::new("Retainer", dec("1000"), Frequency::Monthly, owner(None)),
        RecurringRecord::new("Build", dec("4000"), Frequency::OneTime, owner(Some(7))),
        RecurringRecord::new("Support", dec("1200"), Frequency::Annual, owner(Some(7))),
        RecurringRecord::new("Audit", dec("900"), Frequency::OneTime, owner(Some(9))),
    ];
    let rollup = partition_by_project(&records);
    assert_eq!(rollup.general.len(), 1);
    assert_eq!(rollup.general[0].name, "Retainer");
    assert_eq!(rollup.per_project.get(&7).map(Vec::len), Some(2));
    assert_eq!(rollup.per_project.get(&9).map(Vec::len), Some(1));
}
