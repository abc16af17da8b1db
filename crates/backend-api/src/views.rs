//! Server-rendered HTML pages.

use loginreg_auth::{FieldErrors, EMAIL_FIELD, PASSWORD_FIELD};

/// Values and messages to show on one of the index page forms.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub email: String,
    pub errors: FieldErrors,
}

impl FormState {
    pub fn rejected(email: &str, errors: FieldErrors) -> Self {
        Self {
            email: email.to_string(),
            errors,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndexView {
    pub registration: FormState,
    pub login: FormState,
}

impl IndexView {
    pub fn with_registration(registration: FormState) -> Self {
        Self {
            registration,
            ..Self::default()
        }
    }

    pub fn with_login(login: FormState) -> Self {
        Self {
            login,
            ..Self::default()
        }
    }
}

pub fn index_page(view: &IndexView) -> String {
    let body = format!(
        r#"<div class="columns">
  <div class="card">
    <h2>Register</h2>
    {registration}
  </div>
  <div class="card">
    <h2>Login</h2>
    {login}
  </div>
</div>"#,
        registration = render_form("/users/create", "Register", "new-password", &view.registration),
        login = render_form("/users/login", "Login", "current-password", &view.login),
    );

    layout("Login and Registration", &body)
}

pub fn success_page(email: Option<&str>) -> String {
    let greeting = match email {
        Some(email) => format!("Welcome, {}!", escape(email)),
        None => "Welcome!".to_string(),
    };

    let body = format!(
        r#"<div class="card">
  <h1>Success</h1>
  <p>{greeting}</p>
  <form method="POST" action="/users/logout">
    <button type="submit">Logout</button>
  </form>
</div>"#
    );

    layout("Success", &body)
}

pub fn error_page(correlation_id: &str) -> String {
    let body = format!(
        r#"<div class="card">
  <h1 class="error">Error.</h1>
  <h2 class="error">An error occurred while processing your request.</h2>
  <p><strong>Request ID:</strong> <code>{}</code></p>
</div>"#,
        escape(correlation_id)
    );

    layout("Error", &body)
}

fn render_form(action: &str, submit: &str, password_autocomplete: &str, state: &FormState) -> String {
    format!(
        r#"<form method="POST" action="{action}">
      {summary}
      <div class="form-group">
        <label>Email</label>
        <input type="email" name="email" value="{email}" autocomplete="email">
        {email_errors}
      </div>
      <div class="form-group">
        <label>Password</label>
        <input type="password" name="password" autocomplete="{password_autocomplete}">
        {password_errors}
      </div>
      <button type="submit">{submit}</button>
    </form>"#,
        summary = if state.errors.is_empty() {
            ""
        } else {
            r#"<div class="error" role="alert">Please correct the errors below.</div>"#
        },
        email = escape(&state.email),
        email_errors = render_errors(&state.errors, EMAIL_FIELD),
        password_errors = render_errors(&state.errors, PASSWORD_FIELD),
    )
}

fn render_errors(errors: &FieldErrors, field: &str) -> String {
    errors
        .messages_for(field)
        .map(|message| format!(r#"<span class="error">{}</span>"#, escape(message)))
        .collect()
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en"><head>
<meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title}</title>
<style>{style}</style>
</head><body>
{body}
</body></html>"#,
        style = base_style(),
    )
}

fn base_style() -> &'static str {
    "body{font-family:sans-serif;background:#f4f4f7;margin:0;padding:2rem}\
     .columns{display:flex;gap:2rem;flex-wrap:wrap}\
     .card{background:#fff;border-radius:8px;padding:1.5rem;min-width:280px}\
     .form-group{margin-bottom:1rem;display:flex;flex-direction:column}\
     .error{color:#b00020}"
}

/// Escape text for use in element content and quoted attributes.
pub fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
