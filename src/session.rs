//! Signed-in user context
//!
//! The session is read-only once built and is handed to every component that
//! needs it (API client, scheduling view-model) instead of living in a global.

use crate::config::SessionConfig;
use serde::{Deserialize, Serialize};

/// Image shown when a user or provider has no avatar
pub const PLACEHOLDER_AVATAR_URL: &str =
    "https://arquivos-gobarber.s3.eu-west-2.amazonaws.com/placeholder-user-400x400.png";

/// Resolve an optional avatar URL to something displayable
pub fn avatar_or_placeholder(avatar_url: Option<&str>) -> &str {
    match avatar_url {
        Some(url) if !url.trim().is_empty() => url,
        _ => PLACEHOLDER_AVATAR_URL,
    }
}

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl User {
    pub fn avatar_or_placeholder(&self) -> &str {
        avatar_or_placeholder(self.avatar_url.as_deref())
    }
}

/// Session shared with the screens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    user: Option<User>,
    token: Option<String>,
}

impl SessionContext {
    /// Create a session for a signed-in user
    pub fn new(user: User, token: impl Into<String>) -> Self {
        Self {
            user: Some(user),
            token: Some(token.into()),
        }
    }

    /// Session with nobody signed in
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build the session from configuration; a user needs at least an id
    pub fn from_config(config: &SessionConfig) -> Self {
        let user = config.user_id.as_ref().map(|id| User {
            id: id.clone(),
            name: config.user_name.clone().unwrap_or_default(),
            email: config.user_email.clone().unwrap_or_default(),
            avatar_url: config.avatar_url.clone(),
        });

        Self {
            user,
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Welcome line shown above the provider list
    pub fn greeting(&self) -> String {
        match self.user.as_ref().map(|u| u.name.trim()) {
            Some(name) if !name.is_empty() => format!("Welcome, {}", name),
            _ => "Welcome".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            avatar_url: None,
        }
    }

    #[test]
    fn test_placeholder_for_missing_avatar() {
        assert_eq!(avatar_or_placeholder(None), PLACEHOLDER_AVATAR_URL);
        assert_eq!(avatar_or_placeholder(Some("")), PLACEHOLDER_AVATAR_URL);
        assert_eq!(
            avatar_or_placeholder(Some("https://cdn.test/a.png")),
            "https://cdn.test/a.png"
        );
        assert_eq!(sample_user().avatar_or_placeholder(), PLACEHOLDER_AVATAR_URL);
    }

    #[test]
    fn test_greeting() {
        let session = SessionContext::new(sample_user(), "tok");
        assert_eq!(session.greeting(), "Welcome, Ana");
        assert_eq!(SessionContext::anonymous().greeting(), "Welcome");
    }

    #[test]
    fn test_from_config() {
        let config = SessionConfig {
            token: Some("tok".to_string()),
            user_id: Some("u1".to_string()),
            user_name: Some("Ana".to_string()),
            user_email: None,
            avatar_url: None,
        };
        let session = SessionContext::from_config(&config);
        assert!(session.is_authenticated());
        assert_eq!(session.user().map(|u| u.id.as_str()), Some("u1"));
        assert_eq!(session.token(), Some("tok"));
    }

    #[test]
    fn test_from_empty_config_is_anonymous() {
        let session = SessionContext::from_config(&SessionConfig::default());
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }
}
