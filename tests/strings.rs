use assert_cmd::Command;
use predicates::str::contains;

fn em(code: &str) -> Command {
    let mut cmd = Command::cargo_bin("em").unwrap();
    cmd.arg("-c").arg(code);
    cmd
}

#[test]
fn test_literal() {
    em("\"hello\"").assert().success().stdout("hello\n");
}

#[test]
fn test_escapes() {
    em("\"a\\nb\"").assert().success().stdout("a\nb\n");
    em("\"say \\q hi \\q\"").assert().success().stdout("say \" hi \"\n");
    em("\"back\\\\slash\"").assert().success().stdout("back\\slash\n");
}

#[test]
fn test_cat() {
    em("Cat(\"x = \", 1.5)").assert().success().stdout("x = 1.5\n");
    em("Cat(\"m: \", [1, 2; 3, 4])")
        .assert()
        .success()
        .stdout("m: [1, 2; 3, 4]\n");
    em("Cat(\"n: \", [] == [])").assert().success().stdout("n: 1\n");
}

#[test]
fn test_kind() {
    em("Kind(\"s\")").assert().success().stdout("string\n");
}

#[test]
fn test_equality_is_by_bytes() {
    em("\"a\" == \"a\"").assert().success().stdout("1\n");
    em("\"a\" != \"b\"").assert().success().stdout("1\n");
    em("\"a\" == 1").assert().success().stdout("0\n");
}

#[test]
fn test_empty_string_is_falsy() {
    em("if \"\" then 1 else 2 end").assert().success().stdout("2\n");
    em("if \"x\" then 1 else 2 end").assert().success().stdout("1\n");
}

#[test]
fn test_unterminated_literal() {
    em("\"abc")
        .assert()
        .failure()
        .stderr(contains("unterminated string"));
}

#[test]
fn test_strings_do_not_add() {
    em("\"a\" + \"b\"")
        .assert()
        .failure()
        .stderr(contains("cannot add string to string"));
}
