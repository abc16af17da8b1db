//! Input validation for the registration and login forms.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

pub const EMAIL_FIELD: &str = "email";
pub const PASSWORD_FIELD: &str = "password";

const MAX_EMAIL_LENGTH: usize = 255;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("invalid email regex")
});

/// Registration input. The password is plaintext until hashed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login input; lives only for the duration of one request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginCredentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Field-level messages shown next to form inputs, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Messages attached to `field`
    pub fn messages_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |error| error.field == field)
            .map(|error| error.message.as_str())
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.errors.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

fn check_email(email: &str, errors: &mut FieldErrors) {
    if email.trim().is_empty() {
        errors.add(EMAIL_FIELD, "Email is required.");
    } else if email.len() > MAX_EMAIL_LENGTH {
        errors.add(EMAIL_FIELD, "Email must be at most 255 characters.");
    } else if !EMAIL_REGEX.is_match(email) {
        errors.add(EMAIL_FIELD, "Please enter a valid email address.");
    }
}

fn check_password(password: &str, errors: &mut FieldErrors) {
    if password.is_empty() {
        errors.add(PASSWORD_FIELD, "Password is required.");
    }
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&self.email, &mut errors);
        check_password(&self.password, &mut errors);
        errors.into_result()
    }
}

impl LoginCredentials {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&self.email, &mut errors);
        check_password(&self.password, &mut errors);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(email: &str, password: &str) -> RegistrationForm {
        RegistrationForm {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn accepts_well_formed_input() {
        assert!(registration("a@b.com", "secret1").validate().is_ok());
        assert!(registration("user.name+tag@domain.co.uk", "x").validate().is_ok());
    }

    #[test]
    fn rejects_missing_and_malformed_email() {
        for email in ["", "   ", "invalid-email", "@example.com", "test@", "a b@c.com"] {
            let errors = registration(email, "secret1").validate().unwrap_err();
            assert_eq!(errors.messages_for(EMAIL_FIELD).count(), 1, "email {email:?}");
            assert_eq!(errors.messages_for(PASSWORD_FIELD).count(), 0);
        }
    }

    #[test]
    fn rejects_overlong_email() {
        let email = format!("{}@example.com", "a".repeat(250));
        let errors = registration(&email, "secret1").validate().unwrap_err();
        assert_eq!(
            errors.messages_for(EMAIL_FIELD).collect::<Vec<_>>(),
            vec!["Email must be at most 255 characters."]
        );
    }

    #[test]
    fn reports_every_failing_field() {
        let credentials = LoginCredentials::default();
        let errors = credentials.validate().unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.messages_for(EMAIL_FIELD).collect::<Vec<_>>(),
            vec!["Email is required."]
        );
        assert_eq!(
            errors.messages_for(PASSWORD_FIELD).collect::<Vec<_>>(),
            vec!["Password is required."]
        );
        assert_eq!(
            errors.to_string(),
            "email: Email is required.; password: Password is required."
        );
    }

    #[test]
    fn whitespace_password_is_accepted() {
        assert!(registration("a@b.com", " ").validate().is_ok());
    }
}
