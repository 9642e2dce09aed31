//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port in its own thread, then
//! drives the core over real HTTP with `UreqTransport`. Backoff waits go
//! through `ManualClock`, so retry scenarios finish instantly while still
//! recording how long the client would have slept.

use std::net::SocketAddr;
use std::time::Duration;

use mock_server::{AppState, UNAVAILABLE_MESSAGE};
use user_core::{
    ApiConfig, ApiError, Field, ManualClock, Outcome, User, UserApi, UserClient, UserController,
    UreqTransport,
};

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

fn api_for(addr: SocketAddr, clock: &ManualClock) -> UserApi<UreqTransport, &ManualClock> {
    let config = ApiConfig::new(&format!("http://{addr}")).unwrap();
    UserApi::new(
        UserClient::new(config.base_url()),
        UreqTransport::new(Duration::from_secs(5)),
        clock,
    )
    .with_retry(config.retry())
}

fn seed(state: &AppState, users: Vec<mock_server::User>) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    rt.block_on(state.seed(users));
}

#[test]
fn crud_scenario_through_controller() {
    let addr = start_server(AppState::new());
    let clock = ManualClock::new();
    let mut ctl = UserController::new(api_for(addr, &clock));

    // Step 1: initial list is empty.
    assert!(ctl.load());
    assert!(ctl.users().is_empty());

    // Step 2: create u1.
    ctl.set_field(Field::UserId, "u1");
    ctl.set_field(Field::Username, "Ann");
    ctl.set_field(Field::Age, "30");
    assert_eq!(
        ctl.submit_new(),
        Outcome::Applied("User u1 added successfully".to_string())
    );
    assert_eq!(ctl.users(), &[User::new("u1", "Ann", 30)]);

    // Step 3: update u1.
    let mut session = ctl.begin_edit("u1").unwrap();
    session.set(Field::Username, "Ann2");
    session.set(Field::Age, "31");
    assert!(ctl.save_edit(&session).is_applied());
    assert_eq!(ctl.users(), &[User::new("u1", "Ann2", 31)]);

    // Step 4: delete u1 after confirmation.
    assert!(ctl.delete("u1", |_| true).is_applied());
    assert!(ctl.users().is_empty());

    assert!(ctl.error().is_none());
    assert_eq!(clock.slept(), Duration::ZERO);
}

#[test]
fn get_user_over_http() {
    let state = AppState::new();
    seed(
        &state,
        vec![mock_server::User {
            user_id: "u 1".to_string(),
            username: "Ann".to_string(),
            age: 30,
        }],
    );
    let addr = start_server(state);
    let clock = ManualClock::new();
    let api = api_for(addr, &clock);

    assert_eq!(api.get_user("u 1").unwrap(), User::new("u 1", "Ann", 30));

    let err = api.get_user("ghost").unwrap_err();
    assert_eq!(
        err,
        ApiError::Http {
            status: 404,
            message: "User not found".to_string()
        }
    );
}

#[test]
fn recovers_after_two_injected_failures() {
    let state = AppState::new();
    state.fail_next(2);
    let addr = start_server(state.clone());
    let clock = ManualClock::new();

    let users = api_for(addr, &clock).list_users().unwrap();

    assert!(users.is_empty());
    assert_eq!(state.hits(), 3);
    assert!(clock.slept() >= Duration::from_millis(1000 + 2000));
}

#[test]
fn exhaustion_surfaces_server_message_and_keeps_list() {
    let state = AppState::new();
    seed(
        &state,
        vec![mock_server::User {
            user_id: "u0".to_string(),
            username: "Zed".to_string(),
            age: 40,
        }],
    );
    let addr = start_server(state.clone());
    let clock = ManualClock::new();
    let mut ctl = UserController::new(api_for(addr, &clock));
    assert!(ctl.load());

    state.fail_next(3);
    ctl.set_field(Field::UserId, "u1");
    ctl.set_field(Field::Username, "Ann");
    ctl.set_field(Field::Age, "30");

    assert_eq!(
        ctl.submit_new(),
        Outcome::Failed(UNAVAILABLE_MESSAGE.to_string())
    );
    assert_eq!(ctl.users(), &[User::new("u0", "Zed", 40)]);
    assert_eq!(ctl.error(), Some(UNAVAILABLE_MESSAGE));
    // One load plus three failed create attempts.
    assert_eq!(state.hits(), 4);
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let clock = ManualClock::new();

    let err = api_for(addr, &clock).list_users().unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
    assert_eq!(clock.slept(), Duration::from_millis(3000));
}
