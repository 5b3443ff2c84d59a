
use assert_cmd::prelude::*;
use cli_helpers::*;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn report_sells_all_while_running_loss_stays_negative() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "gains.csv", SCENARIO_A);

    base_cmd(&dir)
        .arg("gains.csv")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total money: $600.00"))
        .stdout(predicate::str::contains("Total stocks: 3"))
        .stdout(predicate::str::contains("Loss left to harvest: -$30.00"))
        .stdout(predicate::str::contains("Gamma Corp"))
        .stdout(predicate::str::contains("\u{001b}[").not());
}

#[test]
fn named_file_option_is_accepted() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "gains.csv", SCENARIO_B);

    base_cmd(&dir)
        .arg("--file")
        .arg("gains.csv")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loss left to harvest: -$50.00"))
        .stdout(predicate::str::contains("Alpha Corp"))
        .stdout(predicate::str::contains("Beta Corp").not());
}

#[test]
fn report_without_losses_says_nothing_to_sell() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "gains.csv", SCENARIO_C);

    base_cmd(&dir)
        .arg("gains.csv")
        .assert()
        .success()
        .stdout(predicate::str::contains("No stocks to sell"))
        .stdout(predicate::str::contains("Loss left to harvest: $0.00"));
}

#[test]
fn json_output_matches_plan() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "gains.csv", SCENARIO_B);

    let plan = run_json(&dir, "gains.csv");
    assert_eq!(plan["total"], "300.00");
    assert_eq!(plan["sell"]["count"], 1);
    assert_eq!(plan["keep"]["count"], 1);
    assert_eq!(plan["realized"], "-50.00");
    assert_eq!(plan["to_sell"][0]["symbol"], "A");
}

#[test]
fn export_writes_default_file_in_working_directory() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "gains.csv", SCENARIO_A);

    base_cmd(&dir)
        .arg("gains.csv")
        .arg("--export")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote stocks.csv"));

    let exported = std::fs::read_to_string(dir.path().join("stocks.csv")).unwrap();
    let mut lines = exported.lines();
    assert_eq!(
        lines.next(),
        Some("Symbol,Name,Market Value,Gain/Loss($),Gain/Loss(%),sell")
    );
    assert_eq!(lines.next(), Some("A,Alpha Corp,$100.00,-$50.00,-10.00%,True"));
}

#[test]
fn missing_input_file_fails_with_message() {
    let dir = TempDir::new().unwrap();

    base_cmd(&dir)
        .arg("nope.csv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open"));
}

#[test]
fn bad_number_names_column_and_row() {
    let dir = TempDir::new().unwrap();
    write_input(
        &dir,
        "gains.csv",
        "Symbol,Name,Market Value,Gain/Loss($),Gain/Loss(%)\nA,Alpha,$1.00,oops,1%\n",
    );

    base_cmd(&dir)
        .arg("gains.csv")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "invalid number in column 'Gain/Loss($)' at row 2: 'oops'",
        ));
}

#[test]
fn missing_column_fails() {
    let dir = TempDir::new().unwrap();
    write_input(
        &dir,
        "gains.csv",
        "Symbol,Name,Market Value,Gain/Loss($)\nA,Alpha,$1.00,$1.00\n",
    );

    base_cmd(&dir)
        .arg("gains.csv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing expected column 'Gain/Loss(%)'"));
}

#[test]
fn no_input_is_a_usage_error() {
    let dir = TempDir::new().unwrap();

    base_cmd(&dir).assert().failure();
}
