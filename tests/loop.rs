use assert_cmd::Command;

fn em(code: &str) -> Command {
    let mut cmd = Command::cargo_bin("em").unwrap();
    cmd.arg("-c").arg(code);
    cmd
}

#[test]
fn test_while() {
    em("x := 0; while x < 3 do x := x + 1 end; x")
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn test_while_with_break() {
    em("x := 0; while 1 do x := x + 1; if x == 4 then break end end; x")
        .assert()
        .success()
        .stdout("4\n");
}

#[test]
fn test_while_with_continue() {
    em("x := 0; s := 0; while x < 5 do x := x + 1; \
        if x == 3 then continue end; s := s + x end; s")
        .assert()
        .success()
        .stdout("12\n");
}

#[test]
fn test_for() {
    em("s := 0; for i | 1; i <= 4; i + 1 do s := s + i end; s")
        .assert()
        .success()
        .stdout("10\n");
}

#[test]
fn test_for_continue_still_steps() {
    em("s := 0; for i | 1; i <= 5; i + 1 do \
        if i == 3 then continue end; \
        if i == 5 then break end; \
        s := s + i end; s")
        .assert()
        .success()
        .stdout("7\n");
}

#[test]
fn test_nested_for() {
    em("s := 0; for i | 1; i <= 2; i + 1 do \
        for j | 1; j <= 2; j + 1 do s := s + i * j end end; s")
        .assert()
        .success()
        .stdout("9\n");
}

#[test]
fn test_loop_body_never_runs_on_false_condition() {
    em("while 0 do 1 end; 2").assert().success().stdout("2\n");
    em("for i | 1; 0; i do 1 end; 2").assert().success().stdout("2\n");
}

#[test]
fn test_if_elif_else() {
    em("if 0 then 1 elif 1 then 2 else 3 end").assert().success().stdout("2\n");
    em("if 0 then 1 elif 0 then 2 else 3 end").assert().success().stdout("3\n");
    em("if 1 then 1 elif 1 then 2 else 3 end").assert().success().stdout("1\n");
    em("if 0 then 1 end; 9").assert().success().stdout("9\n");
}
