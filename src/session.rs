use std::collections::BTreeMap;
use std::time::SystemTime;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Session context
// ---------------------------------------------------------------------------

/// Per-user interaction context. Created when the dashboard starts, reset on
/// logout, dropped when the window closes; every handler receives it
/// explicitly.
#[derive(Debug, Clone)]
pub struct Session {
    user: Option<String>,
    started: SystemTime,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginError {
    #[error("Usuario o contraseña incorrectos")]
    InvalidCredentials,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            user: None,
            started: SystemTime::now(),
        }
    }

    /// Check `user`/`password` against the fixed credential table.
    pub fn login(
        &mut self,
        user: &str,
        password: &str,
        credentials: &BTreeMap<String, String>,
    ) -> Result<(), LoginError> {
        match credentials.get(user) {
            Some(expected) if expected == password => {
                log::info!("User '{user}' logged in");
                self.user = Some(user.to_string());
                Ok(())
            }
            _ => {
                log::warn!("Rejected login for '{user}'");
                Err(LoginError::InvalidCredentials)
            }
        }
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            log::info!("User '{user}' logged out");
        }
        self.started = SystemTime::now();
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn started(&self) -> SystemTime {
        self.started
    }
}
