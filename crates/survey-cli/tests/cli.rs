use assert_cmd::Command;
use assert_fs::prelude::*;
use serde_json::{Value, json};

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("feedback-survey").expect("binary");
    cmd.env_remove("SURVEY_CATALOG")
        .env_remove("SURVEY_COUNTDOWN_SECS")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn describe_prints_builtin_catalog() -> Result<(), Box<dyn std::error::Error>> {
    let output = cli().arg("describe").output()?;
    assert!(output.status.success());
    let catalog: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(catalog["id"], "customer-feedback");
    assert_eq!(catalog["questions"].as_array().map(Vec::len), Some(5));
    Ok(())
}

#[test]
fn describe_reads_catalog_from_env() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let file = dir.child("catalog.json");
    file.write_str(
        &json!({
            "id": "env-survey",
            "title": "Env",
            "version": "0.1.0",
            "questions": [{ "id": 1, "text": "Rate us", "type": "rating-10", "required": true }]
        })
        .to_string(),
    )?;

    let output = cli()
        .env("SURVEY_CATALOG", file.path())
        .arg("describe")
        .output()?;
    assert!(output.status.success());
    let catalog: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(catalog["id"], "env-survey");
    Ok(())
}

#[test]
fn schema_lists_catalog_properties() -> Result<(), Box<dyn std::error::Error>> {
    let output = cli().arg("schema").output()?;
    assert!(output.status.success());
    let schema: Value = serde_json::from_slice(&output.stdout)?;
    assert!(schema["properties"]["questions"].is_object());
    Ok(())
}

#[test]
fn validate_accepts_complete_answers() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let answers = dir.child("answers.json");
    answers.write_str(r#"{"1": 4, "2": 9, "3": null, "5": "Great service"}"#)?;

    let output = cli()
        .arg("validate")
        .arg("--answers")
        .arg(answers.path())
        .output()?;
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Catalog: built-in"));
    assert!(stdout.contains("Validation result: valid"));
    Ok(())
}

#[test]
fn validate_reports_missing_required() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let answers = dir.child("answers.json");
    answers.write_str(r#"{"2": 11}"#)?;

    let output = cli()
        .arg("validate")
        .arg("--answers")
        .arg(answers.path())
        .output()?;
    assert!(!output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Validation result: invalid"));
    assert!(stdout.contains("Missing required answers: 1"));
    assert!(stdout.contains("question 2 - rating must be between 1 and 10"));
    Ok(())
}

#[test]
fn validate_reports_oversized_rating() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let answers = dir.child("answers.json");
    answers.write_str(r#"{"1": 300, "2": 9}"#)?;

    let output = cli()
        .arg("validate")
        .arg("--answers")
        .arg(answers.path())
        .output()?;
    assert!(!output.status.success());
    assert!(stdout_of(&output).contains("question 1 - rating must be between 1 and 5"));
    Ok(())
}

#[test]
fn run_walks_through_survey_and_returns_to_start() -> Result<(), Box<dyn std::error::Error>> {
    let script = ["", "4", "", "9", "", "/skip", "/skip", "Great service", "", "y"];
    let stdin = format!("{}\n", script.join("\n"));

    let output = cli()
        .args(["run", "--once", "--countdown", "1", "--answers-json"])
        .write_stdin(stdin)
        .timeout(std::time::Duration::from_secs(30))
        .output()?;
    assert!(output.status.success());

    let stdout = stdout_of(&output);
    assert!(stdout.contains("Question 1 of 5"));
    assert!(stdout.contains("Question 5 of 5"));
    assert!(stdout.contains("Are you sure you want to submit your responses?"));
    assert!(stdout.contains("Thank You!"));
    assert!(stdout.contains("\"status\": \"COMPLETED\""));
    assert!(stdout.contains("\"5\": \"Great service\""));
    assert!(stdout.contains("\"3\": null"));
    Ok(())
}

#[test]
fn run_quits_on_command() -> Result<(), Box<dyn std::error::Error>> {
    let output = cli()
        .arg("run")
        .write_stdin("\n/quit\n")
        .timeout(std::time::Duration::from_secs(30))
        .output()?;
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Welcome to Customer Feedback!"));
    assert!(!stdout.contains("Thank You!"));
    Ok(())
}

#[test]
fn run_rejects_out_of_range_rating() -> Result<(), Box<dyn std::error::Error>> {
    let output = cli()
        .arg("run")
        .write_stdin("\n7\n")
        .timeout(std::time::Duration::from_secs(30))
        .output()?;
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid answer: rating 7 is outside 1..=5"));
    Ok(())
}
