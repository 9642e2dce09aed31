//! View-state controller: validation, in-flight tracking and reconciliation.
//!
//! # Design
//! The controller owns the only copy of the record list and the transient
//! banners. Every mutating action follows the same path: validate locally,
//! mark the view as loading, call the API (retries included), then refetch
//! the whole list before showing the success message. Failures never touch
//! the list; they only set the error banner.
//!
//! Actions take `&mut self` and run to completion, so two actions on one
//! controller cannot interleave. Hosts that need to render the in-flight
//! state register a listener, which is called when `loading` flips.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::api::UserApi;
use crate::clock::{Clock, SystemClock};
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::User;
use crate::validation::{EditSession, Field, FieldErrors, UserForm, USER_ID_REQUIRED};

/// How long a success message stays visible.
pub const SUCCESS_MESSAGE_TTL: Duration = Duration::from_millis(3000);

/// A success banner with its expiry time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    message: String,
    expires_at: Instant,
}

impl Flash {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Everything a host needs to render the page.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub users: Vec<User>,
    pub loading: bool,
    pub error: Option<String>,
    pub success: Option<Flash>,
    pub form: UserForm,
    pub form_errors: FieldErrors,
    pub editing: Option<User>,
}

/// Result of a user-initiated action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The server accepted the change; carries its confirmation message.
    Applied(String),
    /// Local validation failed; no request was sent.
    Rejected(FieldErrors),
    /// The user declined the confirmation prompt.
    Declined,
    /// The request failed after all retries; carries the error message.
    Failed(String),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }
}

type Listener = Box<dyn FnMut(&ViewState)>;

pub struct UserController<T, C = SystemClock> {
    api: UserApi<T, C>,
    state: ViewState,
    listener: Option<Listener>,
}

impl<T: Transport, C: Clock> UserController<T, C> {
    pub fn new(api: UserApi<T, C>) -> Self {
        Self {
            api,
            state: ViewState::default(),
            listener: None,
        }
    }

    /// Register a callback invoked whenever `loading` changes.
    pub fn with_listener(mut self, listener: impl FnMut(&ViewState) + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn api(&self) -> &UserApi<T, C> {
        &self.api
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn users(&self) -> &[User] {
        &self.state.users
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    /// The success banner, if it has not expired yet.
    pub fn success_message(&self) -> Option<&str> {
        let now = self.api.clock().now();
        self.state
            .success
            .as_ref()
            .filter(|flash| flash.is_visible_at(now))
            .map(Flash::message)
    }

    pub fn form(&self) -> &UserForm {
        &self.state.form
    }

    pub fn form_errors(&self) -> &FieldErrors {
        &self.state.form_errors
    }

    pub fn editing(&self) -> Option<&User> {
        self.state.editing.as_ref()
    }

    /// Drop the success banner once its time is up.
    pub fn tick(&mut self) {
        let now = self.api.clock().now();
        if self
            .state
            .success
            .as_ref()
            .is_some_and(|flash| !flash.is_visible_at(now))
        {
            self.state.success = None;
        }
    }

    /// Replace the collection with a fresh fetch. Returns false on failure,
    /// in which case the previous collection is kept and `error` is set.
    pub fn load(&mut self) -> bool {
        self.set_loading(true);
        let loaded = match self.api.list_users() {
            Ok(users) => {
                debug!(count = users.len(), "loaded users");
                self.state.users = users;
                self.state.error = None;
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to load users");
                self.state.error = Some(err.to_string());
                false
            }
        };
        self.set_loading(false);
        loaded
    }

    /// Edit one field of the add form, clearing that field's error.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.state.form.set(field, value);
        self.state.form_errors.remove(&field);
    }

    /// Validate the add form and create the user.
    pub fn submit_new(&mut self) -> Outcome {
        let user = match self.state.form.validate() {
            Ok(user) => user,
            Err(errors) => {
                debug!(?errors, "add form rejected");
                self.state.form_errors.extend(errors.clone());
                return Outcome::Rejected(errors);
            }
        };
        let outcome = self.mutate("create", |api| api.create_user(&user));
        if outcome.is_applied() {
            self.state.form = UserForm::default();
        }
        outcome
    }

    /// Open an edit session for a record in the current collection.
    pub fn begin_edit(&mut self, user_id: &str) -> Option<EditSession> {
        let user = self.state.users.iter().find(|u| u.user_id == user_id)?.clone();
        let session = EditSession::new(&user);
        self.state.editing = Some(user);
        Some(session)
    }

    pub fn cancel_edit(&mut self) {
        self.state.editing = None;
    }

    /// Validate and apply an edit session.
    ///
    /// On a validation failure the edit stays open and `error` holds the
    /// first message. Once a request has been sent the edit is closed,
    /// whatever its result.
    pub fn save_edit(&mut self, session: &EditSession) -> Outcome {
        let user = match session.validate() {
            Ok(user) => user,
            Err(errors) => {
                self.state.error = errors.values().next().cloned();
                return Outcome::Rejected(errors);
            }
        };
        let outcome = self.mutate("update", |api| api.update_user(&user));
        self.state.editing = None;
        outcome
    }

    /// Delete a record after `confirm` approves it.
    pub fn delete<F>(&mut self, user_id: &str, confirm: F) -> Outcome
    where
        F: FnOnce(&str) -> bool,
    {
        if user_id.trim().is_empty() {
            let errors = FieldErrors::from([(Field::UserId, USER_ID_REQUIRED.to_string())]);
            return Outcome::Rejected(errors);
        }
        if !confirm(user_id) {
            debug!(user_id, "delete declined");
            return Outcome::Declined;
        }
        self.mutate("delete", |api| api.delete_user(user_id))
    }

    fn mutate<F>(&mut self, action: &'static str, call: F) -> Outcome
    where
        F: FnOnce(&UserApi<T, C>) -> Result<String, ApiError>,
    {
        self.set_loading(true);
        let outcome = match call(&self.api) {
            Ok(message) => {
                self.reconcile(action);
                info!(action, %message, "change applied");
                self.show_success(message.clone());
                Outcome::Applied(message)
            }
            Err(err) => {
                warn!(action, error = %err, "change failed");
                let message = err.to_string();
                self.state.error = Some(message.clone());
                Outcome::Failed(message)
            }
        };
        self.set_loading(false);
        outcome
    }

    // The change is already on the server, so a failed refetch only sets the
    // error banner; the success message is still shown.
    fn reconcile(&mut self, action: &'static str) {
        match self.api.list_users() {
            Ok(users) => {
                self.state.users = users;
                self.state.error = None;
            }
            Err(err) => {
                warn!(action, error = %err, "refetch after change failed");
                self.state.error = Some(err.to_string());
            }
        }
    }

    fn show_success(&mut self, message: String) {
        let expires_at = self.api.clock().now() + SUCCESS_MESSAGE_TTL;
        self.state.success = Some(Flash {
            message,
            expires_at,
        });
    }

    fn set_loading(&mut self, loading: bool) {
        self.state.loading = loading;
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.state);
        }
    }
}
