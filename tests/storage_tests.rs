// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use dealclip::cli;
use dealclip::commands::attachments;
use dealclip::db;
use dealclip::error::CrmError;
use dealclip::storage::{self, BlobStore};
use std::fs;

#[test]
fn attach_copies_into_the_bucket_and_links_the_record() {
    let conn = db::open_in_memory().unwrap();
    let bucket = tempfile::tempdir().unwrap();
    let src = tempfile::tempdir().unwrap();
    let file = src.path().join("receipt.pdf");
    fs::write(&file, b"%PDF-1.4").unwrap();

    let store = BlobStore::new(bucket.path());
    let id = storage::attach(&conn, &store, "invoice", 7, &file).unwrap();

    let stored = bucket.path().join("invoice").join("7").join("receipt.pdf");
    assert_eq!(fs::read(stored).unwrap(), b"%PDF-1.4");

    let a = storage::get_attachment(&conn, id).unwrap();
    assert_eq!(a.path, "invoice/7/receipt.pdf");
    assert_eq!(a.file_name, "receipt.pdf");
    assert_eq!(
        storage::list_attachments(&conn, Some("invoice"), Some(7))
            .unwrap()
            .len(),
        1
    );
    assert!(storage::list_attachments(&conn, Some("lead"), None).unwrap().is_empty());

    let url = store.public_url(&a.path).unwrap();
    assert!(url.starts_with("file://"));
    assert!(url.ends_with("receipt.pdf"));
}

#[test]
fn existing_objects_are_not_overwritten() {
    let conn = db::open_in_memory().unwrap();
    let bucket = tempfile::tempdir().unwrap();
    let src = tempfile::tempdir().unwrap();
    let file = src.path().join("contract.txt");
    fs::write(&file, "v1").unwrap();
    let store = BlobStore::new(bucket.path());

    storage::attach(&conn, &store, "client", 1, &file).unwrap();
    fs::write(&file, "v2").unwrap();
    assert!(storage::attach(&conn, &store, "client", 1, &file).is_err());
    let kept = fs::read_to_string(bucket.path().join("client/1/contract.txt")).unwrap();
    assert_eq!(kept, "v1");
    assert_eq!(storage::list_attachments(&conn, None, None).unwrap().len(), 1);
}

#[test]
fn failed_insert_removes_the_uploaded_object() {
    let conn = db::open_in_memory().unwrap();
    let bucket = tempfile::tempdir().unwrap();
    let src = tempfile::tempdir().unwrap();
    let file = src.path().join("x.txt");
    fs::write(&file, "x").unwrap();
    let store = BlobStore::new(bucket.path());

    conn.execute_batch("DROP TABLE attachments;").unwrap();
    assert!(storage::attach(&conn, &store, "lead", 3, &file).is_err());
    assert!(!bucket.path().join("lead/3/x.txt").exists());

    // Nothing is left behind to block the next upload under the same key.
    let fresh = db::open_in_memory().unwrap();
    storage::attach(&fresh, &store, "lead", 3, &file).unwrap();
    assert!(bucket.path().join("lead/3/x.txt").exists());
}

#[test]
fn object_keys_cannot_escape_the_bucket() {
    let bucket = tempfile::tempdir().unwrap();
    let src = tempfile::tempdir().unwrap();
    let file = src.path().join("x.txt");
    fs::write(&file, "x").unwrap();
    let store = BlobStore::new(bucket.path().join("files"));

    assert!(store.upload("../x.txt", &file).is_err());
    assert!(store.upload("/tmp/x.txt", &file).is_err());
    assert!(store.upload("", &file).is_err());
    assert!(store.public_url("a/../../b").is_err());
}

#[test]
fn unknown_entities_are_rejected() {
    let conn = db::open_in_memory().unwrap();
    let bucket = tempfile::tempdir().unwrap();
    let file = bucket.path().join("note.txt");
    fs::write(&file, "n").unwrap();
    let store = BlobStore::new(bucket.path().join("files"));

    let err = storage::attach(&conn, &store, "widget", 1, &file).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CrmError>(),
        Some(CrmError::UnknownVariant { .. })
    ));
    let err = storage::get_attachment(&conn, 42).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CrmError>(),
        Some(CrmError::NotFound { entity: "Attachment", .. })
    ));
}

#[test]
fn attach_command_uses_the_given_store() {
    let conn = db::open_in_memory().unwrap();
    let bucket = tempfile::tempdir().unwrap();
    let file = bucket.path().join("brief.md");
    fs::write(&file, "# brief").unwrap();
    let store = BlobStore::new(bucket.path().join("files"));

    let path = file.to_str().unwrap();
    let m = cli::build_cli().get_matches_from([
        "dealclip", "attach", "add", "--entity", "lead", "--id", "3", "--file", path,
    ]);
    attachments::handle_with(&conn, &store, m.subcommand_matches("attach").unwrap()).unwrap();

    let all = storage::list_attachments(&conn, Some("lead"), Some(3)).unwrap();
    assert_eq!(all.len(), 1);
    assert!(bucket.path().join("files/lead/3/brief.md").exists());
}
