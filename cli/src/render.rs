use std::io::{self, BufRead, Write};
use std::time::Duration;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use indicatif::ProgressBar;
use user_core::{FieldErrors, User, ViewState};

const SPINNER_TICK: Duration = Duration::from_millis(100);

pub fn table(users: &[User]) {
    if users.is_empty() {
        println!("No users found.");
        return;
    }

    println!("{}", user_table(users));
}

fn user_table(users: &[User]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            header_cell("USER ID"),
            header_cell("USERNAME"),
            header_cell("AGE"),
        ]);
    for user in users {
        table.add_row(vec![
            Cell::new(&user.user_id),
            Cell::new(&user.username),
            Cell::new(user.age).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

pub fn user(user: &User) {
    println!("User ID:  {}", user.user_id);
    println!("Username: {}", user.username);
    println!("Age:      {}", user.age);
}

pub fn field_errors(errors: &FieldErrors) {
    for (field, message) in errors {
        eprintln!("{field}: {message}");
    }
}

/// Spinner shown while a request is in flight.
///
/// Fed from the controller listener; indicatif hides it when stderr is not
/// a terminal.
#[derive(Default)]
pub struct Progress {
    spinner: Option<ProgressBar>,
}

impl Progress {
    pub fn update(&mut self, state: &ViewState) {
        if state.loading {
            if self.spinner.is_none() {
                let spinner = ProgressBar::new_spinner();
                spinner.set_message("Working...");
                spinner.enable_steady_tick(SPINNER_TICK);
                self.spinner = Some(spinner);
            }
        } else if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

/// Ask for a yes/no answer on stdin; anything but y/yes declines.
pub fn confirm(prompt: &str) -> bool {
    eprint!("{prompt} [y/N] ");
    let _ = io::stderr().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
