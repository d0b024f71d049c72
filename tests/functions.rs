use assert_cmd::Command;
use predicates::str::contains;

fn em(code: &str) -> Command {
    let mut cmd = Command::cargo_bin("em").unwrap();
    cmd.arg("-c").arg(code);
    cmd
}

#[test]
fn test_definition_and_call() {
    em("fu f(x) return x*x end; f(5)").assert().success().stdout("25\n");
}

#[test]
fn test_recursion() {
    em("fu fact(n) if n <= 1 then return 1 end; return n * fact(n - 1) end; fact(5)")
        .assert()
        .success()
        .stdout("120\n");
}

#[test]
fn test_functions_call_functions() {
    em("fu g() return 1 end; fu h() return g() + 1 end; h()")
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_function_values_are_first_class() {
    em("fu f(x) return x + 1 end; g = f; g(1)")
        .assert()
        .success()
        .stdout("2\n");
    em("fu f() return 0 end; Kind(f)").assert().success().stdout("function\n");
}

#[test]
fn test_falling_off_the_end_returns_nil() {
    // printing nil prints nothing
    em("fu f() x = 1 end; f()").assert().success().stdout("");
    em("fu f() return 0 end; Kind(f())").assert().success().stdout("scalar\n");
}

#[test]
fn test_arity_is_checked() {
    em("fu f(x) return x end; f()")
        .assert()
        .failure()
        .stderr(contains("wrong number of arguments"));
    em("fu f(x) return x end; f(1, 2)")
        .assert()
        .failure()
        .stderr(contains("wrong number of arguments"));
}

#[test]
fn test_parameters_shadow_globals() {
    em("x = 10; fu f(x) return x + 1 end; f(1)")
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_max_parameter_count() {
    let params = (0..33).map(|i| format!("p{i}")).collect::<Vec<_>>().join(", ");
    em(&format!("fu f({params}) return 0 end"))
        .assert()
        .failure()
        .stderr(contains("too many parameters"));
}
