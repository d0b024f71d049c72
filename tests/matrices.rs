use assert_cmd::Command;
use predicates::str::contains;

fn em(code: &str) -> Command {
    let mut cmd = Command::cargo_bin("em").unwrap();
    cmd.arg("-c").arg(code);
    cmd
}

#[test]
fn test_literal_and_indexing() {
    em("m = [1,2;3,4]; m[2,1]").assert().success().stdout("3\n");
}

#[test]
fn test_linear_indexing_is_row_major() {
    em("m = [1,2;3,4]; m[3]").assert().success().stdout("3\n");
}

#[test]
fn test_printing() {
    em("[1, 2; 3, 4]")
        .assert()
        .success()
        .stdout("[\n\t1\t2\n\t3\t4\n]\n");
    em("[]").assert().success().stdout("[\n]\n");
}

#[test]
fn test_addition_and_subtraction() {
    em("[1, 2] + [10, 20]").assert().success().stdout("[\n\t11\t22\n]\n");
    em("[5, 5] - [1, 2]").assert().success().stdout("[\n\t4\t3\n]\n");
}

#[test]
fn test_product() {
    em("[1, 2; 3, 4] * [5; 6]").assert().success().stdout("[\n\t17\n\t39\n]\n");
}

#[test]
fn test_scaling() {
    em("2 * [1, 2]").assert().success().stdout("[\n\t2\t4\n]\n");
    em("[1, 2] * 2").assert().success().stdout("[\n\t2\t4\n]\n");
}

#[test]
fn test_builtins() {
    em("Dim(Mat(3, 4))").assert().success().stdout("[\n\t3\t4\n]\n");
    em("Trans([1, 2])").assert().success().stdout("[\n\t1\n\t2\n]\n");
    em("Kind([1])").assert().success().stdout("matrix\n");
}

#[test]
fn test_handles_alias_the_same_matrix() {
    em("a = [0, 0]; b = a; b[1] = 9; a[1]").assert().success().stdout("9\n");
}

#[test]
fn test_equality() {
    em("[1, 2] == [1, 2]").assert().success().stdout("1\n");
    em("[1, 2] == [1, 2; 1, 2]").assert().success().stdout("0\n");
}

#[test]
fn test_truthiness() {
    em("if [0, 0] then 1 else 2 end").assert().success().stdout("2\n");
    em("if [0, 1] then 1 else 2 end").assert().success().stdout("1\n");
}

#[test]
fn test_ragged_literal_is_a_compile_error() {
    em("[1,2;3]")
        .assert()
        .failure()
        .stderr(contains("wrong row length"));
}

#[test]
fn test_unconformable_dimensions() {
    em("[1, 2] + [1; 2]")
        .assert()
        .failure()
        .stderr(contains("matrices unconformable for addition"));
    em("[1, 2] * [1, 2]")
        .assert()
        .failure()
        .stderr(contains("matrices unconformable for multiplication"));
}

#[test]
fn test_index_errors() {
    em("m = [1, 2]; m[3]")
        .assert()
        .failure()
        .stderr(contains("element number out of range"));
    em("m = [1, 2]; m[1, 1, 1]")
        .assert()
        .failure()
        .stderr(contains("number of indices is greater than 2"));
    em("m = [1, 2]; m[[1]]")
        .assert()
        .failure()
        .stderr(contains("cannot index matrix with matrix value"));
}

#[test]
fn test_elements_must_be_scalars() {
    em("[1, \"x\"]")
        .assert()
        .failure()
        .stderr(contains("matrix element is string (scalar expected)"));
}
