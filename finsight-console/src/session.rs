//! Current-user session context
//!
//! Report assembly needs to know who is generating the report (for the
//! "prepared by" line) without reaching into any global session state, so
//! the user is supplied through an injected provider.

use serde::{Deserialize, Serialize};

/// The authenticated operator of the console
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
}

impl CurrentUser {
    /// Name to render, falling back to the email address
    pub fn preferred_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

/// Source of the current user, injected wherever reports are assembled
pub trait CurrentUserProvider: Send + Sync {
    /// `None` when no operator is authenticated
    fn current_user(&self) -> Option<CurrentUser>;
}

/// Provider backed by a value fixed at construction
///
/// Used by the binary (single operator from config) and by tests.
#[derive(Debug, Clone, Default)]
pub struct StaticUserProvider {
    user: Option<CurrentUser>,
}

impl StaticUserProvider {
    pub fn new(user: CurrentUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn anonymous() -> Self {
        Self { user: None }
    }
}

impl CurrentUserProvider for StaticUserProvider {
    fn current_user(&self) -> Option<CurrentUser> {
        self.user.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_provider_returns_configured_user() {
        let provider = StaticUserProvider::new(CurrentUser {
            id: "user_1".to_string(),
            email: "ops@example.com".to_string(),
            display_name: Some("Ops".to_string()),
        });

        let user = provider.current_user().unwrap();
        assert_eq!(user.preferred_name(), "Ops");
    }

    #[test]
    fn test_anonymous_provider_returns_none() {
        assert!(StaticUserProvider::anonymous().current_user().is_none());
    }

    #[test]
    fn test_preferred_name_falls_back_to_email() {
        let user = CurrentUser {
            id: "user_2".to_string(),
            email: "ops@example.com".to_string(),
            display_name: None,
        };
        assert_eq!(user.preferred_name(), "ops@example.com");
    }
}
