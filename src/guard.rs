//! Route guard: which views exist and who may see them.
//!
//! Every check here is a pure function of a [`Session`] snapshot, evaluated
//! at navigation time. Nothing waits for initialization to finish.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::models::Role;
use crate::session::Session;

/// The navigable views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Login,
    Companies,
    StockMarkets,
    Admin,
}

/// What a view demands of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Public,
    /// A session but no particular role. No current view asks for only
    /// this; [`require_authenticated`] is also the first half of `Role`.
    Authenticated,
    Role(Role),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(View),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("no view at '{0}'")]
    UnknownPath(String),
}

impl View {
    pub const ALL: [View; 5] = [
        View::Home,
        View::Login,
        View::Companies,
        View::StockMarkets,
        View::Admin,
    ];

    pub fn path(self) -> &'static str {
        match self {
            View::Home => "/",
            View::Login => "/login",
            View::Companies => "/companies",
            View::StockMarkets => "/stock-markets",
            View::Admin => "/admin",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Login => "Login",
            View::Companies => "Companies",
            View::StockMarkets => "Stock Markets",
            View::Admin => "Admin Panel",
        }
    }

    pub fn access(self) -> Access {
        match self {
            View::Admin => Access::Role(Role::Admin),
            View::Home | View::Login | View::Companies | View::StockMarkets => Access::Public,
        }
    }
}

impl FromStr for View {
    type Err = NavigationError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let normalized = match path.trim_end_matches('/') {
            "" => "/",
            other => other,
        };
        View::ALL
            .into_iter()
            .find(|view| view.path() == normalized)
            .ok_or_else(|| NavigationError::UnknownPath(path.to_string()))
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A signed-in session, otherwise off to the login view.
pub fn require_authenticated(session: &Session) -> GuardDecision {
    if session.authenticated {
        GuardDecision::Proceed
    } else {
        GuardDecision::Redirect(View::Login)
    }
}

/// Signed in first, and then the role, otherwise back to the home view.
pub fn require_role(session: &Session, role: &Role) -> GuardDecision {
    match require_authenticated(session) {
        GuardDecision::Proceed if session.has_role(role) => GuardDecision::Proceed,
        GuardDecision::Proceed => GuardDecision::Redirect(View::Home),
        redirect => redirect,
    }
}

/// Decide whether `view` may be shown to `session`.
pub fn evaluate(view: View, session: &Session) -> GuardDecision {
    let decision = match view.access() {
        Access::Public => GuardDecision::Proceed,
        Access::Authenticated => require_authenticated(session),
        Access::Role(role) => require_role(session, &role),
    };

    // The login view sends signed-in users home.
    match (view, &decision) {
        (View::Login, GuardDecision::Proceed) if session.authenticated => {
            GuardDecision::Redirect(View::Home)
        }
        _ => decision,
    }
}

/// Resolve a path to the view that will actually be shown, following redirects.
pub fn navigate(path: &str, session: &Session) -> Result<View, NavigationError> {
    let mut view: View = path.parse()?;
    // Redirect targets are public or self-resolving, so this settles within a few hops.
    for _ in 0..View::ALL.len() {
        match evaluate(view, session) {
            GuardDecision::Proceed => return Ok(view),
            GuardDecision::Redirect(target) => {
                debug!("Navigation to {} redirected to {}", view, target);
                view = target;
            }
        }
    }
    Ok(view)
}
