//! Run the `user-admin` binary against a live mock server.

use std::net::SocketAddr;

use assert_cmd::Command;
use mock_server::AppState;
use predicates::prelude::*;

fn start_server(state: AppState) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with_state(listener, state).await
        })
        .unwrap();
    });

    addr
}

fn user_admin(addr: SocketAddr) -> Command {
    let mut cmd = Command::cargo_bin("user-admin").unwrap();
    cmd.env("USER_API_BASE_URL", format!("http://{addr}"))
        .env("USER_API_RETRY_DELAY_MS", "0")
        .env_remove("RUST_LOG");
    cmd
}

fn users(state: &AppState) -> Vec<mock_server::User> {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(state.users())
}

#[test]
fn missing_base_url_fails_fast() {
    Command::cargo_bin("user-admin")
        .unwrap()
        .env_remove("USER_API_BASE_URL")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("USER_API_BASE_URL"));
}

#[test]
fn invalid_base_url_fails_fast() {
    Command::cargo_bin("user-admin")
        .unwrap()
        .args(["--base-url", "not a url", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid API base URL"));
}

#[test]
fn list_on_empty_server() {
    let addr = start_server(AppState::new());
    user_admin(addr)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No users found."));
}

#[test]
fn add_update_delete_round() {
    let state = AppState::new();
    let addr = start_server(state.clone());

    user_admin(addr)
        .args(["add", "--user-id", "u1", "--username", "Ann", "--age", "30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("User u1 added successfully"))
        .stdout(predicate::str::contains("USER ID"))
        .stdout(predicate::str::contains("Ann"));

    user_admin(addr)
        .args(["update", "u1", "--username", "Ann2", "--age", "31"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ann2"));

    user_admin(addr)
        .args(["show", "u1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Age:      31"));

    user_admin(addr)
        .args(["delete", "u1", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No users found."));

    assert!(users(&state).is_empty());
}

#[test]
fn invalid_age_is_rejected_before_any_request() {
    let state = AppState::new();
    let addr = start_server(state.clone());

    user_admin(addr)
        .args(["add", "--user-id", "u1", "--username", "Ann", "--age", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("age: Age must be greater than 0"));

    // Only the initial list request reached the server.
    assert_eq!(state.hits(), 1);
}

#[test]
fn declined_delete_keeps_the_user() {
    let state = AppState::new();
    let addr = start_server(state.clone());

    user_admin(addr)
        .args(["add", "--user-id", "u1", "--username", "Ann", "--age", "30"])
        .assert()
        .success();

    user_admin(addr)
        .args(["delete", "u1"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled."));

    assert_eq!(users(&state).len(), 1);
}

#[test]
fn exhausted_retries_report_the_server_message() {
    let state = AppState::new();
    let addr = start_server(state.clone());
    state.fail_next(3);

    user_admin(addr)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Service temporarily unavailable"));

    assert_eq!(state.hits(), 3);
}

#[test]
fn update_of_unknown_user_fails() {
    let addr = start_server(AppState::new());
    user_admin(addr)
        .args(["update", "ghost", "--age", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no user with id"));
}
