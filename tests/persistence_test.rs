#![cfg(feature = "storage-rocksdb")]

mod common;

use assert_cmd::cargo_bin;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: create and submit a financing
    let first = common::commands_file(&[
        "create, 1, 10, , , 1200, 0.01, 12, french,",
        "transition, 1, , operador, pending_approval, , , , ,",
    ]);

    let mut cmd1 = Command::new(cargo_bin!("agrofin"));
    cmd1.arg("process")
        .arg(first.path())
        .arg("--db-path")
        .arg(&db_path);

    let output1 = cmd1.output().expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("1,10,pending_approval,french,1200,0.01,12,1"));

    // 2. Second run: approve it against the same DB path
    let second = common::commands_file(&["transition, 1, , admin, approved, , , , , 1"]);

    let mut cmd2 = Command::new(cargo_bin!("agrofin"));
    cmd2.arg("process")
        .arg(second.path())
        .arg("--db-path")
        .arg(&db_path);

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);
    assert!(stdout2.contains("1,10,approved,french,1200,0.01,12,2"));
}
