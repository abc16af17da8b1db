use axum_extra::extract::cookie::{Cookie, SameSite};
use loginreg_auth::{Authenticator, SessionManager};
use loginreg_config::AuthConfig;

#[derive(Clone)]
pub struct AppState {
    authenticator: Authenticator,
    sessions: SessionManager,
    cookie: SessionCookie,
}

impl AppState {
    pub fn new(authenticator: Authenticator, sessions: SessionManager, config: &AuthConfig) -> Self {
        Self {
            authenticator,
            sessions,
            cookie: SessionCookie::from_config(config),
        }
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn cookie(&self) -> &SessionCookie {
        &self.cookie
    }
}

/// Shape of the cookie carrying the session token.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
}

impl SessionCookie {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            name: config.session_cookie_name.clone(),
            secure: config.secure_cookie,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn issue(&self, token: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build()
    }

    /// Cookie matching the issued one's name and path, for removal.
    pub fn removal(&self) -> Cookie<'static> {
        Cookie::build((self.name.clone(), "")).path("/").build()
    }
}
