//! End-to-end tests for the `saferdb` binary.
//!
//! Each test runs in its own temp directory so no `saferdb.toml` from the
//! working tree is picked up.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn saferdb(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_saferdb"))
        .current_dir(dir)
        .arg("--database")
        .arg(dir.join("cli.sqlite"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("SAFERDB_TRACE_FILE")
        .output()
        .expect("failed to run saferdb")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "saferdb failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn create_users(dir: &Path) {
    stdout(&saferdb(
        dir,
        &["exec", "--sql", "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, age INTEGER)"],
    ));
}

#[test]
fn test_insert_prints_result() {
    let temp = TempDir::new().unwrap();
    create_users(temp.path());

    let output = saferdb(
        temp.path(),
        &["insert", "--table", "users", "--data", r#"{"name": "foo", "age": 10}"#],
    );
    assert_eq!(stdout(&output), r#"{"affected_rows":1,"insert_id":1}"#);
}

#[test]
fn test_exec_with_bindings() {
    let temp = TempDir::new().unwrap();
    create_users(temp.path());
    for (name, age) in [("a", 10), ("b", 20), ("c", 30)] {
        let data = format!(r#"{{"name": "{name}", "age": {age}}}"#);
        stdout(&saferdb(temp.path(), &["insert", "--table", "users", "--data", &data]));
    }

    let output = saferdb(
        temp.path(),
        &["exec", "--sql", "delete from users where age > ?", "--bind", "[15]"],
    );
    assert_eq!(stdout(&output), r#"{"affected_rows":2,"last_insert_id":0}"#);

    let conn = rusqlite::Connection::open(temp.path().join("cli.sqlite")).unwrap();
    let left: i64 = conn
        .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
        .unwrap();
    assert_eq!(left, 1);
}

#[test]
fn test_list_payload_exits_non_zero() {
    let temp = TempDir::new().unwrap();
    create_users(temp.path());

    let output = saferdb(temp.path(), &["insert", "--table", "users", "--data", r#"[{"a":1}]"#]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("non-empty-string"));
}

#[test]
fn test_database_error_exits_non_zero() {
    let temp = TempDir::new().unwrap();
    let output = saferdb(temp.path(), &["insert", "--table", "missing", "--data", r#"{"a":1}"#]);
    assert!(!output.status.success());
}

#[test]
fn test_invalid_bind_exits_non_zero() {
    let temp = TempDir::new().unwrap();
    create_users(temp.path());
    let output = saferdb(temp.path(), &["exec", "--sql", "delete from users", "--bind", "{}"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--bind"));
}
