use std::io::Write;

use assert_cmd::Command;
use predicates::str::contains;

fn em() -> Command {
    Command::cargo_bin("em").unwrap()
}

#[test]
fn test_reads_stdin_when_not_a_tty() {
    em().write_stdin("1 + 1").assert().success().stdout("2\n");
}

#[test]
fn test_stdin_errors_name_the_source() {
    em().write_stdin("undef")
        .assert()
        .failure()
        .stderr(contains("in <stdin> at line 1"));
}

#[test]
fn test_code_flag_conflicts_with_files() {
    em().args(["-c", "1", "script.m"]).assert().code(2);
    em().args(["-c", "1", "-i"]).assert().code(2);
}

#[test]
fn test_disassembly() {
    em().args(["-d", "-c", "x = 1"])
        .assert()
        .success()
        .stdout(contains("load_scalar"))
        .stdout(contains("store"))
        .stdout(contains("function"));
}

#[test]
fn test_executes_files_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.m");
    let second = dir.path().join("second.m");
    writeln!(std::fs::File::create(&first).unwrap(), "x = 1; x").unwrap();
    writeln!(std::fs::File::create(&second).unwrap(), "x + 1").unwrap();

    em().arg(&first)
        .arg(&second)
        .assert()
        .success()
        .stdout("1\n2\n");
}

#[test]
fn test_first_failing_file_stops_the_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.m");
    let second = dir.path().join("second.m");
    writeln!(std::fs::File::create(&first).unwrap(), "1; undef").unwrap();
    writeln!(std::fs::File::create(&second).unwrap(), "2").unwrap();

    em().arg(&first).arg(&second).assert().code(1).stdout("1\n");
}

#[test]
fn test_missing_file() {
    em().arg("no-such-file.m").assert().code(1);
}
