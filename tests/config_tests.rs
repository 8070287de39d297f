// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use dealclip::cli;
use dealclip::commands::config as config_cmd;
use dealclip::config::{self, Settings};
use dealclip::db;
use dealclip::error::CrmError;
use dealclip::models::Currency;

#[test]
fn defaults_apply_to_an_empty_store() {
    let conn = db::open_in_memory().unwrap();
    let s = Settings::load(&conn).unwrap();
    assert_eq!(s.base_currency, Currency::Chf);
    assert_eq!(s.busy_timeout_ms, 5000);
    assert_eq!(s.http_timeout_secs, 15);
    assert!(!s.user_id.is_empty());
}

#[test]
fn stored_values_override_defaults() {
    let conn = db::open_in_memory().unwrap();
    config::set_setting(&conn, config::HTTP_TIMEOUT_SECS, " 30 ").unwrap();
    config::set_setting(&conn, config::USER_ID, "ana").unwrap();
    config::set_base_currency(&conn, Currency::Eur).unwrap();

    let s = Settings::load(&conn).unwrap();
    assert_eq!(s.http_timeout_secs, 30);
    assert_eq!(s.user_id, "ana");
    assert_eq!(config::get_base_currency(&conn).unwrap(), Currency::Eur);
    assert_eq!(config::current_user(&conn).unwrap(), "ana");
}

#[test]
fn bad_values_are_rejected_before_storing() {
    let conn = db::open_in_memory().unwrap();

    let err = config::set_setting(&conn, config::BUSY_TIMEOUT_MS, "soon").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CrmError>(),
        Some(CrmError::Validation(_))
    ));
    let err = config::set_setting(&conn, config::BASE_CURRENCY, "GBP").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CrmError>(),
        Some(CrmError::UnknownVariant { kind: "currency", .. })
    ));
    assert!(config::set_setting(&conn, config::USER_ID, "  ").is_err());
    assert!(config::get_setting(&conn, config::BUSY_TIMEOUT_MS).unwrap().is_none());
}

#[test]
fn unknown_keys_error_through_the_cli() {
    let conn = db::open_in_memory().unwrap();
    let m = cli::build_cli().get_matches_from(["dealclip", "config", "get", "--key", "theme"]);
    let err = config_cmd::handle(&conn, m.subcommand_matches("config").unwrap()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<CrmError>(),
        Some(&CrmError::UnknownVariant {
            kind: "setting",
            value: "theme".into()
        })
    );

    let m = cli::build_cli().get_matches_from([
        "dealclip", "config", "set", "--key", "colour", "--value", "blue",
    ]);
    assert!(config_cmd::handle(&conn, m.subcommand_matches("config").unwrap()).is_err());
}
