//! `user-admin`: terminal host for the user view-state controller.
//!
//! Every invocation loads the full list first, then performs one action
//! and prints the resulting state, the same way the page re-renders after
//! each action.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use user_core::config::BASE_URL_VAR;
use user_core::{ApiConfig, Field, Outcome, SystemClock, UreqTransport, UserApi, UserController};

mod args;
mod render;

use args::{Cli, Commands};

type Controller = UserController<UreqTransport, SystemClock>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let base_url = cli.base_url;
    let config = ApiConfig::from_lookup(|key| {
        if key == BASE_URL_VAR {
            base_url.clone()
        } else {
            std::env::var(key).ok()
        }
    })
    .context("cannot start without a valid API configuration")?;
    tracing::info!(base_url = config.base_url(), "using user API");

    let mut progress = render::Progress::default();
    let mut ctl: Controller = UserController::new(UserApi::from_config(&config))
        .with_listener(move |state| progress.update(state));
    if !ctl.load() {
        eprintln!("error: {}", ctl.error().unwrap_or("failed to load users"));
        return Ok(ExitCode::FAILURE);
    }

    let outcome = match cli.command {
        Commands::List => {
            render::table(ctl.users());
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Show { user_id } => {
            return Ok(match ctl.api().get_user(&user_id) {
                Ok(user) => {
                    render::user(&user);
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("error: {err}");
                    ExitCode::FAILURE
                }
            });
        }
        Commands::Add {
            user_id,
            username,
            age,
        } => {
            ctl.set_field(Field::UserId, user_id);
            ctl.set_field(Field::Username, username);
            ctl.set_field(Field::Age, age);
            ctl.submit_new()
        }
        Commands::Update {
            user_id,
            username,
            age,
        } => {
            let Some(mut session) = ctl.begin_edit(&user_id) else {
                eprintln!("error: no user with id {user_id:?}");
                return Ok(ExitCode::FAILURE);
            };
            if let Some(username) = username {
                session.set(Field::Username, username);
            }
            if let Some(age) = age {
                session.set(Field::Age, age);
            }
            ctl.save_edit(&session)
        }
        Commands::Delete { user_id, yes } => {
            ctl.delete(&user_id, |id| yes || render::confirm(&format!("Delete user {id}?")))
        }
    };

    Ok(report(&ctl, outcome))
}

fn report(ctl: &Controller, outcome: Outcome) -> ExitCode {
    match outcome {
        Outcome::Applied(_) => {
            if let Some(message) = ctl.success_message() {
                println!("{message}");
            }
            if let Some(error) = ctl.error() {
                eprintln!("warning: list refresh failed: {error}");
            }
            render::table(ctl.users());
            ExitCode::SUCCESS
        }
        Outcome::Rejected(errors) => {
            render::field_errors(&errors);
            ExitCode::FAILURE
        }
        Outcome::Declined => {
            println!("Cancelled.");
            ExitCode::SUCCESS
        }
        Outcome::Failed(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}
