//! CLI test cases.
//!
//! These run the real binary against the files in `tests/fixtures/`.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

/// Create a new `Command` with our binary.
fn cmd() -> Command {
    Command::cargo_bin("question-miner").unwrap()
}

#[test]
fn test_help() {
    cmd().arg("--help").assert().success();
}

#[test]
fn test_version() {
    cmd().arg("--version").assert().success();
}

#[test]
fn test_extract_auto_detect() {
    cmd()
        .arg("extract")
        .arg("tests/fixtures/page.txt")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Order the following: Seed, Sprout, Flower, Fruit",
        ))
        .stdout(predicate::str::contains(
            "In the Capital row, given Country: Japan, Continent: Asia",
        ))
        .stdout(predicate::str::contains("\"graphic-organizer\""));
}

#[test]
fn test_extract_text_only() {
    cmd()
        .args(["extract", "tests/fixtures/page.txt"])
        .args(["--mode", "questions", "--text-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("What is the capital of France?\n"))
        .stdout(predicate::str::contains("\"id\"").not());
}

#[test]
fn test_extract_empty_stdin() {
    cmd()
        .arg("extract")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"questions\": []"));
}

#[test]
fn test_extract_rejects_unknown_mode() {
    cmd()
        .args(["extract", "tests/fixtures/page.txt", "--mode", "essay"])
        .assert()
        .failure();
}

#[test]
fn test_batch_jsonl_input() {
    cmd()
        .args(["batch", "tests/fixtures/pages.jsonl"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "\"text\":\"Order the following: Apple, Banana, Cherry\"",
        ))
        .stdout(predicate::str::contains("\"mode\":\"matching\""))
        .stdout(predicate::str::contains(
            "Match the following: cat - animal, rose - flower",
        ));
}

#[test]
fn test_batch_csv_input_take_first() {
    cmd()
        .args(["batch", "tests/fixtures/pages.csv", "--take-first", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\":\"p1\""))
        .stdout(predicate::str::contains("\"text\":\"What is respiration?\""))
        .stdout(predicate::str::contains("\"id\":\"p2\"").not());
}

#[test]
fn test_batch_stdin_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.jsonl");
    let input = fs::read_to_string("tests/fixtures/pages.jsonl").unwrap();
    cmd()
        .args(["batch", "--jobs", "1", "--out"])
        .arg(&out)
        .write_stdin(input)
        .assert()
        .success()
        .stderr(predicate::str::contains("on 2 pages"));
    let output = fs::read_to_string(&out).unwrap();
    assert_eq!(output.lines().count(), 2);
    assert!(output.lines().next().unwrap().contains("\"id\":\"p1\""));
}

#[test]
fn test_prompt_chat_messages() {
    cmd()
        .args(["prompt", "tests/fixtures/page.txt", "-s", "quiz-quiz-trade"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"role\": \"system\""))
        .stdout(predicate::str::contains("Quiz-Quiz-Trade strips"))
        .stdout(predicate::str::contains("Comprehension Questions:"));
}

#[test]
fn test_prompt_plain_with_templates() {
    cmd()
        .args(["prompt", "tests/fixtures/page.txt", "--structure", "fan-n-pick"])
        .args(["--templates", "tests/fixtures/templates.toml", "--plain"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "You are a friendly science teacher.\n\nWrite one question card",
        ))
        .stdout(predicate::str::contains("1. "))
        .stdout(predicate::str::contains("Please generate the materials now."));
}

#[test]
fn test_prompt_without_questions_fails() {
    cmd()
        .args(["prompt", "-s", "find-someone-who"])
        .write_stdin("ok")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no questions found"));
}

#[test]
fn test_schema() {
    for (schema_type, field) in [
        ("BatchInput", "\"text\""),
        ("BatchOutput", "\"detected_types\""),
        ("Extraction", "\"questions\""),
        ("PromptTemplates", "\"fan-n-pick\""),
    ] {
        println!("Testing schema: {}", schema_type);
        cmd()
            .args(["schema", schema_type])
            .assert()
            .success()
            .stdout(predicate::str::contains(field));
    }
}
