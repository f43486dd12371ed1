mod support;

use predicates::prelude::*;
use predicates::str::contains;
use support::TestEnv;

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn todo_help_works() {
    let env = TestEnv::new();
    env.todo_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("personal task list"));
}

#[test]
fn subcommand_help_works() {
    let env = TestEnv::new();
    let subcommands = [
        "add", "edit", "done", "remove", "clear", "search", "list", "stats", "backups", "shell",
    ];
    for cmd in subcommands {
        env.todo_cmd().arg(cmd).arg("--help").assert().success();
    }
}

#[test]
fn add_then_list_as_json() {
    let env = TestEnv::new();
    let output = env
        .todo_cmd()
        .args(["--json", "add", "buy", "milk", "--priority", "high"])
        .output()
        .expect("run add");
    assert!(output.status.success());
    let payload = stdout_json(&output);
    assert_eq!(payload["schema_version"], "todo.v1");
    assert_eq!(payload["command"], "add");
    assert_eq!(payload["data"]["id"], 1);
    assert_eq!(payload["data"]["content"], "buy milk");
    assert_eq!(payload["data"]["priority"], "high");
    assert_eq!(payload["data"]["status"], "pending");

    env.todo_cmd()
        .args(["add", "write report"])
        .assert()
        .success()
        .stdout(contains("Task 2 added"));

    let output = env
        .todo_cmd()
        .args(["--json", "ls"])
        .output()
        .expect("run list");
    let payload = stdout_json(&output);
    assert_eq!(payload["command"], "list");
    assert_eq!(payload["data"]["total"], 2);
    assert_eq!(payload["data"]["tasks"][0]["content"], "buy milk");
}

#[test]
fn done_and_search_from_the_command_line() {
    let env = TestEnv::new();
    env.todo_cmd().args(["add", "Buy milk"]).assert().success();
    env.todo_cmd().args(["add", "plan trip"]).assert().success();

    env.todo_cmd()
        .args(["done", "1"])
        .assert()
        .success()
        .stdout(contains("Task 1 done"));
    env.todo_cmd()
        .args(["done", "1"])
        .assert()
        .code(2)
        .stderr(contains("already done"));

    env.todo_cmd()
        .args(["search", "buy"])
        .assert()
        .success()
        .stdout(contains("-> Buy milk").and(contains("plan trip").not()));
}

#[test]
fn unknown_id_exits_with_user_error() {
    let env = TestEnv::new();
    env.todo_cmd().args(["add", "only task"]).assert().success();

    env.todo_cmd()
        .args(["remove", "5"])
        .assert()
        .code(2)
        .stderr(contains("task 5 not found (available ids: 1)"));

    let output = env
        .todo_cmd()
        .args(["--json", "rm", "5"])
        .output()
        .expect("run remove");
    assert_eq!(output.status.code(), Some(2));
    let payload = stdout_json(&output);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["command"], "rm");
    assert_eq!(payload["error"]["kind"], "not_found");
    assert_eq!(payload["error"]["details"]["available_ids"][0], 1);
}

#[test]
fn overlong_content_is_rejected() {
    let env = TestEnv::new();
    let long = "x".repeat(201);
    env.todo_cmd()
        .args(["add", long.as_str()])
        .assert()
        .code(2)
        .stderr(contains("max 200"));
    assert!(!env.data_file().exists());
}

#[test]
fn clear_on_empty_list_fails() {
    let env = TestEnv::new();
    env.todo_cmd()
        .arg("clear")
        .assert()
        .code(2)
        .stderr(contains("already empty"));
}

#[test]
fn corrupted_file_warns_and_continues() {
    let env = TestEnv::new();
    env.write_data("[{\"id\": 1,");

    env.todo_cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("No tasks"))
        .stderr(contains("warning: data file is corrupted"));
    assert_eq!(env.read_data(), "[]");
    assert_eq!(env.backup_count(), 1);
}

#[test]
fn stats_reports_counts() {
    let env = TestEnv::new();
    env.todo_cmd().args(["add", "a", "-p", "low"]).assert().success();
    env.todo_cmd().args(["add", "b"]).assert().success();
    env.todo_cmd().args(["done", "2"]).assert().success();

    let output = env
        .todo_cmd()
        .args(["--json", "stats"])
        .output()
        .expect("run stats");
    let payload = stdout_json(&output);
    assert_eq!(payload["data"]["total"], 2);
    assert_eq!(payload["data"]["done"], 1);
    assert_eq!(payload["data"]["priority"]["low"], 1);
    assert_eq!(payload["data"]["completed_today"], 1);
}

#[test]
fn backups_lists_snapshots() {
    let env = TestEnv::new();
    env.todo_cmd().args(["add", "a"]).assert().success();
    env.todo_cmd().args(["add", "b"]).assert().success();

    let output = env
        .todo_cmd()
        .args(["--json", "backups"])
        .output()
        .expect("run backups");
    let payload = stdout_json(&output);
    assert_eq!(payload["data"]["keep"], 5);
    let listed = payload["data"]["backups"].as_array().expect("array").len();
    assert_eq!(listed, env.backup_count());
    assert!(listed >= 2);
}

#[test]
fn invalid_record_warning_names_backup() {
    let env = TestEnv::new();
    env.write_data(
        r#"[{"id": 0, "content": "bad id", "priority": "normal", "status": "pending",
            "created": "2026-10-01 09:00", "modified": "2026-10-01 09:00"}]"#,
    );

    env.todo_cmd()
        .arg("list")
        .assert()
        .success()
        .stderr(contains("Invalid task record #1").and(contains("previous contents saved to")));
    assert_eq!(env.read_data(), "[]");
}
