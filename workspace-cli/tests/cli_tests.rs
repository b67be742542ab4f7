use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

fn cli(db_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ai-workspace").unwrap();
    cmd.env_remove("CONFIG_FILE")
        .env_remove("RUST_LOG")
        .env("DATABASE_URL", format!("sqlite://{}", db_dir.join("ws.sqlite").display()))
        .env("LOG_LEVEL", "error");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn test_help_lists_commands() {
    let temp = TempDir::new().unwrap();
    let help = stdout_of(cli(temp.path()).arg("--help"));
    for command in ["create", "list", "assign", "layout", "watch", "onboard"] {
        assert!(help.contains(command), "missing {command} in help");
    }
}

#[test]
fn test_create_rename_list_delete() {
    let temp = TempDir::new().unwrap();

    let created = stdout_of(cli(temp.path()).args(["create", "  Outbound Q3  "]));
    let id = created.split('\t').next().unwrap().to_string();
    assert!(created.contains("Outbound Q3\tonboarding"));

    stdout_of(cli(temp.path()).args(["rename", &id, "Outbound Q4"]));
    let listed = stdout_of(cli(temp.path()).arg("list"));
    assert!(listed.contains(&format!("{id}\tOutbound Q4\tonboarding")));

    stdout_of(cli(temp.path()).args(["delete", &id]));
    assert!(stdout_of(cli(temp.path()).arg("list")).trim().is_empty());
}

#[test]
fn test_blank_name_is_rejected() {
    let temp = TempDir::new().unwrap();
    cli(temp.path()).args(["create", "   "]).assert().failure();
}

#[test]
fn test_unknown_agent_is_rejected_by_parser() {
    let temp = TempDir::new().unwrap();
    cli(temp.path())
        .args(["assign", "ws-1", "zoe", "Gmail"])
        .assert()
        .failure();
}

#[test]
fn test_layout_prints_board_scene() {
    let temp = TempDir::new().unwrap();
    let out = stdout_of(cli(temp.path()).args([
        "layout",
        "--width",
        "1256",
        "--height",
        "600",
    ]));

    let scene: serde_json::Value = serde_json::from_str(&out).unwrap();
    let scene = &scene["Scene"];
    assert_eq!(scene["size"]["width"], 1000.0);
    assert_eq!(scene["nodes"].as_array().unwrap().len(), 6);
    assert!(scene["connectors"].as_array().unwrap().is_empty());
}

#[test]
fn test_onboard_from_answers_file() {
    let temp = TempDir::new().unwrap();
    let created = stdout_of(cli(temp.path()).args(["create", "Pipeline"]));
    let id = created.split('\t').next().unwrap().to_string();

    let answers = temp.path().join("answers.toml");
    std::fs::write(
        &answers,
        r#"
[[steps]]
targetCustomers = 500

[[steps]]
companySize = "51-200"
jobTitles = "VP Sales, Head of Growth"

[[steps]]
channel = "Email"
channelDetails = "Warm intro sequence"

[[steps]]
valueProposition = "Book more qualified meetings"
"#,
    )
    .unwrap();

    let out = stdout_of(cli(temp.path()).args(["onboard", &id, "--answers"]).arg(&answers));
    assert!(out.contains("step 4 committed"));
    assert!(out.contains("onboarding complete"));

    let listed = stdout_of(cli(temp.path()).arg("list"));
    assert!(listed.contains(&format!("{id}\tPipeline\tboard")));

    cli(temp.path())
        .args(["onboard", &id, "--answers"])
        .arg(&answers)
        .assert()
        .failure();
}

#[test]
fn test_incomplete_answers_fail() {
    let temp = TempDir::new().unwrap();
    let created = stdout_of(cli(temp.path()).args(["create", "Pipeline"]));
    let id = created.split('\t').next().unwrap().to_string();

    let answers = temp.path().join("answers.toml");
    std::fs::write(&answers, "[[steps]]\ntargetCustomers = 10\n").unwrap();

    cli(temp.path())
        .args(["onboard", &id, "--answers"])
        .arg(&answers)
        .assert()
        .failure();

    let listed = stdout_of(cli(temp.path()).arg("list"));
    assert!(listed.contains("\tonboarding"));
}
