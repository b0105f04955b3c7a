//! In-memory session state
//!
//! The session holds the bearer token and the profile it was exchanged for.
//! It is absent until login or rehydration succeeds and is dropped whole on
//! teardown; there is no partially authenticated state.

use crate::auth::models::UserInfo;

/// An authenticated session
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: UserInfo,
}

/// Session slot with an explicit lifecycle
#[derive(Debug, Default)]
pub struct SessionContext {
    session: Option<Session>,
}

impl SessionContext {
    pub fn establish(&mut self, token: String, user: UserInfo) {
        self.session = Some(Session { token, user });
    }

    pub fn teardown(&mut self) {
        self.session = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.user.role == "ADMIN")
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn user(&self) -> Option<&UserInfo> {
        self.session.as_ref().map(|s| &s.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> UserInfo {
        UserInfo {
            id: "u1".to_string(),
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn test_lifecycle() {
        let mut ctx = SessionContext::default();
        assert!(!ctx.is_authenticated());
        assert!(ctx.token().is_none());

        ctx.establish("tok".to_string(), user("USER"));
        assert!(ctx.is_authenticated());
        assert!(!ctx.is_admin());
        assert_eq!(ctx.token(), Some("tok"));
        assert_eq!(ctx.user().unwrap().email, "a@x.com");

        ctx.teardown();
        assert!(!ctx.is_authenticated());
        assert!(ctx.token().is_none());
    }

    #[test]
    fn test_admin_role() {
        let mut ctx = SessionContext::default();
        ctx.establish("tok".to_string(), user("ADMIN"));
        assert!(ctx.is_admin());
    }
}
