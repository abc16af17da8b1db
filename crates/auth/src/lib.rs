//! Registration and login for the loginreg service.
//!
//! [`Authenticator`] validates form input, hashes and verifies passwords, and
//! talks to the [`UserStore`]. It never touches the session; the HTTP layer
//! records the returned user's id in the caller's [`Session`].

use std::sync::Arc;

use loginreg_database::{DatabaseError, NewUser, User, UserStore};
use thiserror::Error;
use tracing::{debug, info};

pub mod password;
pub mod session;
pub mod validation;

pub use session::{Session, SessionChange, SessionManager, USER_ID_KEY};
pub use validation::{
    FieldError, FieldErrors, LoginCredentials, RegistrationForm, EMAIL_FIELD, PASSWORD_FIELD,
};

/// Message for both an unknown email and a wrong password.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid Email/Password";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("Invalid Email/Password")]
    InvalidCredentials,
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
}

impl AuthError {
    /// Field-level messages for the recoverable variants.
    ///
    /// Credential failures land on the email field whichever check failed.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            AuthError::Validation(errors) => Some(errors.clone()),
            AuthError::InvalidCredentials => {
                let mut errors = FieldErrors::new();
                errors.add(EMAIL_FIELD, INVALID_CREDENTIALS_MESSAGE);
                Some(errors)
            }
            AuthError::Database(_) | AuthError::PasswordHash(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct Authenticator {
    users: Arc<dyn UserStore>,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Validate, hash and persist a new user.
    pub async fn register(&self, form: &RegistrationForm) -> Result<User, AuthError> {
        form.validate().map_err(AuthError::Validation)?;

        let password_hash = password::hash_password(&form.password)?;
        let user = self
            .users
            .create(NewUser {
                email: form.email.clone(),
                password_hash,
            })
            .await?;

        info!(user_id = user.id, "registered user");
        Ok(user)
    }

    /// Resolve credentials to a user.
    ///
    /// Unknown email and wrong password both yield
    /// [`AuthError::InvalidCredentials`].
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User, AuthError> {
        credentials.validate().map_err(AuthError::Validation)?;

        let Some(user) = self.users.find_by_email(&credentials.email).await? else {
            debug!("login rejected: no matching user");
            password::verify_against_dummy(&credentials.password);
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify_password(&user.password_hash, &credentials.password) {
            debug!(user_id = user.id, "login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = user.id, "user logged in");
        Ok(user)
    }

    pub async fn user_profile(&self, user_id: i64) -> Result<Option<User>, AuthError> {
        Ok(self.users.find_by_id(user_id).await?)
    }
}
