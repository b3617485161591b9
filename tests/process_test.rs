mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_process_fixture() {
    let mut cmd = Command::new(cargo_bin!("agrofin"));
    cmd.args(["process", "tests/fixtures/commands.csv"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "financing,farmer,status,method,principal,rate,months,version",
        ))
        .stdout(predicate::str::contains("1,10,approved,french,1200,0.01,12,2"))
        .stdout(predicate::str::contains("2,11,rejected,linear,5000,0.02,24,2"));
}

#[test]
fn test_process_refuses_unauthorized_role() {
    let file = common::commands_file(&[
        "create, 1, 10, , , 1200, 0.01, 12, french,",
        "transition, 1, , productor, pending_approval, , , , ,",
    ]);

    let mut cmd = Command::new(cargo_bin!("agrofin"));
    cmd.arg("process").arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error processing command"))
        .stdout(predicate::str::contains("1,10,draft,french,1200,0.01,12,0"));
}

#[test]
fn test_process_terminal_state_is_final() {
    let file = common::commands_file(&[
        "create, 1, 10, , , 1200, 0.01, 12, french,",
        "transition, 1, , admin, cancelled, , , , ,",
        "transition, 1, , admin, draft, , , , ,",
        "transition, 1, , admin, pending_approval, , , , ,",
    ]);

    let mut cmd = Command::new(cargo_bin!("agrofin"));
    cmd.arg("process").arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1,10,cancelled,french,1200,0.01,12,1"));
}

#[test]
fn test_process_stale_version() {
    let file = common::commands_file(&[
        "create, 1, 10, , , 1200, 0.01, 12, french,",
        "transition, 1, , operador, pending_approval, , , , , 0",
        "transition, 1, , admin, approved, , , , , 0",
    ]);

    let mut cmd = Command::new(cargo_bin!("agrofin"));
    cmd.arg("process").arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Version conflict"))
        .stdout(predicate::str::contains(
            "1,10,pending_approval,french,1200,0.01,12,1",
        ));
}

#[test]
fn test_process_skips_malformed_rows() {
    let file = common::commands_file(&[
        "create, 1, 10, , , 1200, 0.01, 12, french,",
        "archive, 1, , admin, , , , , ,",
        "create, 2, 10, , , not_a_number, 0.01, 12, french,",
        "create, 3, 10, , , 900, -0.01, 12, french,",
        "transition, 1, , admin, pending_approval, , , , ,",
    ]);

    let mut cmd = Command::new(cargo_bin!("agrofin"));
    cmd.arg("process").arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading command"))
        .stderr(predicate::str::contains("Rate must not be negative"))
        .stdout(predicate::str::contains(
            "1,10,pending_approval,french,1200,0.01,12,1",
        ))
        .stdout(predicate::str::contains("\n2,").not())
        .stdout(predicate::str::contains("\n3,").not());
}

#[test]
fn test_process_installment_payments() {
    let file = common::commands_file(&[
        "create, 1, 10, , , 1200, 0.01, 12, french, ,",
        "transition, 1, , operador, pending_approval, , , , , ,",
        "pay, 1, , , , , , , , , 1",
        "transition, 1, , Admin, Approved, , , , , ,",
        "transition, 1, , operador, in_progress, , , , , ,",
        "pay, 1, , , , , , , , , 1",
        "pay, 1, , , , , , , , , 1",
        "pay, 1, , , , , , , , , 13",
    ]);

    let mut cmd = Command::new(cargo_bin!("agrofin"));
    cmd.arg("process").arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("is not in repayment"))
        .stderr(predicate::str::contains("installment paid"))
        .stderr(predicate::str::contains("is already paid"))
        .stderr(predicate::str::contains("has no installment 13"))
        .stdout(predicate::str::contains("1,10,in_progress,french,1200,0.01,12,3"));
}

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let file = common::commands_file(&["create, 1, 10, , , 1200, 0.01, 12, french,"]);

    let mut cmd = Command::new(cargo_bin!("agrofin"));
    cmd.arg("process")
        .arg(file.path())
        .arg("--db-path")
        .arg("some_db");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains(
            "'storage-rocksdb' feature is not enabled",
        ))
        .stdout(predicate::str::contains("1,10,draft"));
}
