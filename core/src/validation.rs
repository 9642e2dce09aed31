//! Local input validation for the add form and the edit session.
//!
//! Inputs are held as raw text, the way a form field holds them, and only
//! become a `User` once every rule passes. Nothing here touches the network.

use std::collections::BTreeMap;
use std::fmt;
use std::num::IntErrorKind;

use crate::types::User;

pub const USER_ID_REQUIRED: &str = "User ID is required";
pub const USERNAME_REQUIRED: &str = "Username is required";
pub const AGE_OUT_OF_RANGE: &str = "Age must be greater than 0";
pub const AGE_TOO_LARGE: &str = "Age is too large";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    UserId,
    Username,
    Age,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::UserId => "userId",
            Field::Username => "username",
            Field::Age => "age",
        })
    }
}

/// Per-field validation messages, ordered by field.
pub type FieldErrors = BTreeMap<Field, String>;

/// Raw text of the "add user" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub user_id: String,
    pub username: String,
    pub age: String,
}

impl UserForm {
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::UserId => &mut self.user_id,
            Field::Username => &mut self.username,
            Field::Age => &mut self.age,
        };
        *slot = value.into();
    }

    /// Check every field and build a trimmed `User`.
    pub fn validate(&self) -> Result<User, FieldErrors> {
        let mut errors = FieldErrors::new();
        let user_id = self.user_id.trim();
        if user_id.is_empty() {
            errors.insert(Field::UserId, USER_ID_REQUIRED.to_string());
        }
        let username = check_username(&self.username, &mut errors);
        let age = check_age(&self.age, &mut errors);
        match age {
            Some(age) if errors.is_empty() => Ok(User::new(user_id, username, age)),
            _ => Err(errors),
        }
    }
}

/// An in-progress edit of one record.
///
/// `user_id` identifies the target and cannot be changed; `username` and
/// `age` hold whatever the user has typed so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    user_id: String,
    pub username: String,
    pub age: String,
}

impl EditSession {
    pub fn new(user: &User) -> Self {
        Self {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            age: user.age.to_string(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        match field {
            // Identity is fixed for the lifetime of the session.
            Field::UserId => {}
            Field::Username => self.username = value.into(),
            Field::Age => self.age = value.into(),
        }
    }

    /// Check the editable fields; identity is not re-validated.
    pub fn validate(&self) -> Result<User, FieldErrors> {
        let mut errors = FieldErrors::new();
        let username = check_username(&self.username, &mut errors);
        let age = check_age(&self.age, &mut errors);
        match age {
            Some(age) if errors.is_empty() => Ok(User::new(self.user_id.clone(), username, age)),
            _ => Err(errors),
        }
    }
}

fn check_username<'a>(raw: &'a str, errors: &mut FieldErrors) -> &'a str {
    let username = raw.trim();
    if username.is_empty() {
        errors.insert(Field::Username, USERNAME_REQUIRED.to_string());
    }
    username
}

fn check_age(raw: &str, errors: &mut FieldErrors) -> Option<u32> {
    match parse_age(raw) {
        Ok(age) => Some(age),
        Err(message) => {
            errors.insert(Field::Age, message.to_string());
            None
        }
    }
}

/// Parse a strictly positive integer that fits in a `u32`.
///
/// The error is the message to show next to the age field.
pub fn parse_age(raw: &str) -> Result<u32, &'static str> {
    match raw.trim().parse::<u32>() {
        Ok(age) if age > 0 => Ok(age),
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => Err(AGE_TOO_LARGE),
        _ => Err(AGE_OUT_OF_RANGE),
    }
}
