//! Credential state for an authenticated nation
//!
//! A session starts from a password, an autologin or both. After every
//! request the server may hand back a pin (short-lived, cheapest to validate)
//! and an autologin (long-lived, safe to store); both are captured here and
//! sent on the following requests.

use std::fmt;

use reqwest::header::HeaderMap;

use crate::constants::headers;
use crate::errors::{ApiError, ApiResult};

/// Password, autologin and pin of one nation
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    password: Option<String>,
    autologin: Option<String>,
    pin: Option<String>,
}

impl AuthSession {
    /// Create a session from a password and/or an autologin
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingCredentials` if neither credential is given
    pub fn new(password: Option<String>, autologin: Option<String>) -> ApiResult<Self> {
        let password = password.filter(|p| !p.is_empty());
        let autologin = autologin.filter(|a| !a.is_empty());
        if password.is_none() && autologin.is_none() {
            return Err(ApiError::MissingCredentials);
        }
        Ok(Self {
            password,
            autologin,
            pin: None,
        })
    }

    /// Session bootstrapped from a password
    pub fn with_password(password: impl Into<String>) -> ApiResult<Self> {
        Self::new(Some(password.into()), None)
    }

    /// Session bootstrapped from a stored autologin
    pub fn with_autologin(autologin: impl Into<String>) -> ApiResult<Self> {
        Self::new(None, Some(autologin.into()))
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn autologin(&self) -> Option<&str> {
        self.autologin.as_deref()
    }

    pub fn pin(&self) -> Option<&str> {
        self.pin.as_deref()
    }

    /// The three auth headers, pin first; unset values are sent empty
    pub fn headers(&self) -> [(&'static str, &str); 3] {
        [
            (headers::PIN, self.pin.as_deref().unwrap_or_default()),
            (headers::AUTOLOGIN, self.autologin.as_deref().unwrap_or_default()),
            (headers::PASSWORD, self.password.as_deref().unwrap_or_default()),
        ]
    }

    /// Capture the pin and autologin issued in a response
    ///
    /// A blank value never replaces a known credential.
    pub fn update(&mut self, response_headers: &HeaderMap) {
        if let Some(pin) = header_value(response_headers, headers::PIN) {
            self.pin = Some(pin);
        }
        if let Some(autologin) = header_value(response_headers, headers::AUTOLOGIN) {
            self.autologin = Some(autologin);
        }
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("AuthSession")
            .field("password", &redact(&self.password))
            .field("autologin", &redact(&self.autologin))
            .field("pin", &redact(&self.pin))
            .finish()
    }
}

fn header_value(response_headers: &HeaderMap, name: &str) -> Option<String> {
    response_headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
