//! Store configuration and credential validation rules.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AuthError, Result};

/// Default pattern for usernames: alphanumerics, `+`, `.` and `_`.
pub const DEFAULT_USERNAME_PATTERN: &str = r"[a-zA-Z0-9+._]+";

/// Default pattern for passwords: any non-empty string.
pub const DEFAULT_PASSWORD_PATTERN: &str = r"(?s).+";

/// Per-user policy settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserSettings {
    /// Maximum concurrent sessions per user. Zero means unlimited.
    pub max_sessions: usize,
    /// Whether users may change their own password.
    pub allow_password_change: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            max_sessions: 0,
            allow_password_change: true,
        }
    }
}

/// Configuration for a [`crate::Store`].
///
/// Both patterns must match the whole input, so a supplied pattern `p` is
/// compiled as `^(?:p)$`.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    username_pattern: Regex,
    password_pattern: Regex,
    settings: UserSettings,
}

impl StoreConfig {
    /// Returns a builder starting from the defaults.
    #[must_use]
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Returns the user settings.
    #[must_use]
    pub const fn settings(&self) -> &UserSettings {
        &self.settings
    }

    /// Returns the anchored username pattern.
    #[must_use]
    pub const fn username_pattern(&self) -> &Regex {
        &self.username_pattern
    }

    /// Returns the anchored password pattern.
    #[must_use]
    pub const fn password_pattern(&self) -> &Regex {
        &self.password_pattern
    }

    /// Checks a username/password pair against both patterns.
    ///
    /// The same rule applies to registration, login and password changes.
    pub fn validate(&self, username: &str, password: &str) -> Result<()> {
        if self.username_pattern.is_match(username) && self.password_pattern.is_match(password) {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

// Compiled once; both patterns are constants exercised by the tests below.
static DEFAULT_CONFIG: LazyLock<StoreConfig> = LazyLock::new(|| StoreConfig {
    username_pattern: anchored(DEFAULT_USERNAME_PATTERN)
        .expect("default username pattern compiles"),
    password_pattern: anchored(DEFAULT_PASSWORD_PATTERN)
        .expect("default password pattern compiles"),
    settings: UserSettings::default(),
});

impl Default for StoreConfig {
    fn default() -> Self {
        DEFAULT_CONFIG.clone()
    }
}

/// Builder for [`StoreConfig`]. Every field defaults independently.
#[derive(Debug, Clone, Default)]
pub struct StoreConfigBuilder {
    username_pattern: Option<String>,
    password_pattern: Option<String>,
    settings: UserSettings,
}

impl StoreConfigBuilder {
    /// Sets the username pattern.
    #[must_use]
    pub fn username_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.username_pattern = Some(pattern.into());
        self
    }

    /// Sets the password pattern.
    #[must_use]
    pub fn password_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.password_pattern = Some(pattern.into());
        self
    }

    /// Replaces the user settings.
    #[must_use]
    pub const fn settings(mut self, settings: UserSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the maximum number of concurrent sessions (0 = unlimited).
    #[must_use]
    pub const fn max_sessions(mut self, max_sessions: usize) -> Self {
        self.settings.max_sessions = max_sessions;
        self
    }

    /// Enables or disables password changes.
    #[must_use]
    pub const fn allow_password_change(mut self, allow: bool) -> Self {
        self.settings.allow_password_change = allow;
        self
    }

    /// Compiles the patterns and builds the configuration.
    pub fn build(self) -> Result<StoreConfig> {
        let username = self
            .username_pattern
            .as_deref()
            .unwrap_or(DEFAULT_USERNAME_PATTERN);
        let password = self
            .password_pattern
            .as_deref()
            .unwrap_or(DEFAULT_PASSWORD_PATTERN);

        Ok(StoreConfig {
            username_pattern: anchored(username)?,
            password_pattern: anchored(password)?,
            settings: self.settings,
        })
    }
}

fn anchored(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})$"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_username_pattern() {
        let config = StoreConfig::default();
        assert!(config.validate("alice", "pw").is_ok());
        assert!(config.validate("a.b+c_d9", "pw").is_ok());
        assert!(config.validate("@u ser", "pw").is_err());
        assert!(config.validate("", "pw").is_err());
    }

    #[test]
    fn test_default_password_pattern() {
        let config = StoreConfig::default();
        assert!(config.validate("alice", "").is_err());
        assert!(config.validate("alice", " ").is_ok());
        assert!(config.validate("alice", "multi\nline").is_ok());
    }

    #[test]
    fn test_patterns_match_whole_input() {
        let config = StoreConfig::builder()
            .username_pattern("[a-z]+")
            .password_pattern(r"\d{4}")
            .build()
            .unwrap();
        assert!(config.validate("abc", "1234").is_ok());
        assert!(config.validate("abc1", "1234").is_err());
        assert!(config.validate("abc", "12345").is_err());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = StoreConfig::builder().username_pattern("[unclosed").build();
        assert!(matches!(result, Err(AuthError::InvalidPattern(_))));
    }

    #[test]
    fn test_settings_defaults() {
        let config = StoreConfig::builder().max_sessions(3).build().unwrap();
        assert_eq!(config.settings().max_sessions, 3);
        assert!(config.settings().allow_password_change);
    }
}
