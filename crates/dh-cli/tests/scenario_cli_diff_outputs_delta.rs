use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn write_yaml(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn scenario_cli_diff_outputs_delta() {
    let old = write_yaml(
        r#"
battle_card: 10
support_cards:
  1: 2
  2: 1
"#,
    );
    let new = write_yaml(
        r#"
battle_card: 11
support_cards:
  1: 1
  3: 4
"#,
    );

    Command::cargo_bin("deckhand")
        .unwrap()
        .arg("diff")
        .arg(old.path())
        .arg(new.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"to_add\""))
        .stdout(predicate::str::contains("\"3\": 4"))
        .stdout(predicate::str::contains("\"to_remove\""))
        .stdout(predicate::str::contains("\"2\": 1"))
        .stdout(predicate::str::contains("\"Set\": 11"));
}

#[test]
fn scenario_cli_diff_of_identical_selections_is_empty() {
    let selection = r#"
battle_card: 10
support_cards:
  1: 2
"#;
    let old = write_yaml(selection);
    let new = write_yaml(selection);

    Command::cargo_bin("deckhand")
        .unwrap()
        .arg("diff")
        .arg(old.path())
        .arg(new.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Unchanged\""))
        .stdout(predicate::str::contains("\"to_add\": {}"))
        .stdout(predicate::str::contains("\"to_remove\": {}"));
}
