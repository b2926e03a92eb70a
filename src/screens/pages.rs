//! Views that only read the session.

use serde_json::Value;

use crate::guard::View;
use crate::models::Role;
use crate::session::Session;

pub const APP_NAME: &str = "Microservices App";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeView {
    SignedIn {
        username: String,
        email: String,
        roles: String,
    },
    SignedOut,
}

impl HomeView {
    pub fn from_session(session: &Session) -> Self {
        if !session.authenticated {
            return HomeView::SignedOut;
        }
        let claims = &session.claims;
        HomeView::SignedIn {
            username: claims.display_name().to_string(),
            email: claims.email.clone().unwrap_or_else(|| "N/A".to_string()),
            roles: claims
                .roles
                .joined()
                .unwrap_or_else(|| "No roles".to_string()),
        }
    }
}

/// Sign-in choices offered to an anonymous user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginAction {
    Login,
    Register,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginView {
    pub actions: Vec<LoginAction>,
}

impl LoginView {
    pub fn new() -> Self {
        LoginView {
            actions: vec![LoginAction::Login, LoginAction::Register],
        }
    }
}

impl Default for LoginView {
    fn default() -> Self {
        Self::new()
    }
}

/// The admin dashboard: who is signed in and the decoded token.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminView {
    pub username: String,
    pub token: Value,
}

impl AdminView {
    pub fn from_session(session: &Session) -> Self {
        AdminView {
            username: session.claims.display_name().to_string(),
            token: session.claims.raw.clone(),
        }
    }

    pub fn token_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.token).unwrap_or_else(|_| self.token.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavbarAuth {
    SignedIn { username: String, badges: Vec<Role> },
    SignedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navbar {
    pub links: Vec<View>,
    pub auth: NavbarAuth,
}

impl Navbar {
    pub fn from_session(session: &Session) -> Self {
        let mut links = vec![View::Home, View::Companies, View::StockMarkets];
        if session.is_admin() {
            links.push(View::Admin);
        }

        let auth = if session.authenticated {
            let badges = [Role::Admin, Role::Client]
                .into_iter()
                .filter(|role| session.has_role(role))
                .collect();
            NavbarAuth::SignedIn {
                username: session.claims.display_name().to_string(),
                badges,
            }
        } else {
            NavbarAuth::SignedOut
        };

        Navbar { links, auth }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Claims;
    use serde_json::json;

    fn signed_in(roles: &[&str], email: Option<&str>) -> Session {
        Session::signed_in(
            "token",
            Claims {
                subject: "abc".to_string(),
                username: Some("alice".to_string()),
                email: email.map(str::to_string),
                roles: roles.iter().copied().collect(),
                raw: json!({"preferred_username": "alice"}),
                ..Claims::default()
            },
        )
    }

    #[test]
    fn home_falls_back_for_missing_claims() {
        assert_eq!(
            HomeView::from_session(&signed_in(&[], None)),
            HomeView::SignedIn {
                username: "alice".to_string(),
                email: "N/A".to_string(),
                roles: "No roles".to_string(),
            }
        );
        assert_eq!(
            HomeView::from_session(&Session::anonymous()),
            HomeView::SignedOut
        );
    }

    #[test]
    fn home_lists_roles() {
        let view = HomeView::from_session(&signed_in(&["CLIENT", "ADMIN"], Some("a@x.io")));
        let HomeView::SignedIn { email, roles, .. } = view else {
            panic!("expected a signed-in view");
        };
        assert_eq!(email, "a@x.io");
        assert_eq!(roles, "ADMIN, CLIENT");
    }

    #[test]
    fn navbar_shows_admin_link_only_to_admins() {
        let admin = Navbar::from_session(&signed_in(&["ADMIN"], None));
        assert!(admin.links.contains(&View::Admin));
        assert_eq!(
            admin.auth,
            NavbarAuth::SignedIn {
                username: "alice".to_string(),
                badges: vec![Role::Admin],
            }
        );

        let client = Navbar::from_session(&signed_in(&["CLIENT"], None));
        assert!(!client.links.contains(&View::Admin));

        let anonymous = Navbar::from_session(&Session::anonymous());
        assert_eq!(anonymous.auth, NavbarAuth::SignedOut);
        assert_eq!(anonymous.links.len(), 3);
    }

    #[test]
    fn admin_view_prints_the_token() {
        let view = AdminView::from_session(&signed_in(&["ADMIN"], None));
        assert_eq!(view.username, "alice");
        assert!(view.token_pretty().contains("\"preferred_username\": \"alice\""));
    }
}
