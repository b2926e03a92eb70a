//! Plain-text rendering of screen state for the terminal.

use std::fmt::Write as _;

use inline_colorization::*;

use crate::guard::View;
use crate::models::{Company, StockRecord};
use crate::screens::{
    AdminView, CrudScreen, HomeView, LoginAction, LoginView, Navbar, NavbarAuth, Resource,
    ScreenStatus,
};

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    pub color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Renderer { color }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.color {
            format!("{color}{text}{color_reset}")
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            format!("{style_bold}{text}{style_reset}")
        } else {
            text.to_string()
        }
    }

    pub fn navbar(&self, navbar: &Navbar) -> String {
        let links = navbar
            .links
            .iter()
            .map(|view| view.title())
            .collect::<Vec<_>>()
            .join(" | ");
        let auth = match &navbar.auth {
            NavbarAuth::SignedIn { username, badges } => {
                let mut line = format!("Welcome, {}", username);
                for badge in badges {
                    let _ = write!(line, " [{}]", self.paint(color_cyan, badge.as_str()));
                }
                line
            }
            NavbarAuth::SignedOut => "Not signed in (stockdesk login)".to_string(),
        };
        format!("{} :: {}\n{}\n", self.heading(crate::screens::pages::APP_NAME), links, auth)
    }

    pub fn status(&self, status: &ScreenStatus) -> Option<String> {
        match status {
            ScreenStatus::Loading => Some("Loading...".to_string()),
            ScreenStatus::Submitting => Some("Saving...".to_string()),
            ScreenStatus::Error(message) => Some(self.paint(color_red, message)),
            ScreenStatus::Success(message) => Some(self.paint(color_green, message)),
            ScreenStatus::MissingIds(count) => Some(self.paint(
                color_yellow,
                &format!("{} record(s) have no ID and cannot be edited or deleted", count),
            )),
            ScreenStatus::Editing(Some(id)) => Some(format!("Editing #{}", id)),
            ScreenStatus::Editing(None) | ScreenStatus::Idle => None,
        }
    }

    pub fn home(&self, home: &HomeView) -> String {
        let mut out = format!("{}\n\n", self.heading("Welcome to Microservices Dashboard"));
        match home {
            HomeView::SignedIn {
                username,
                email,
                roles,
            } => {
                let _ = writeln!(out, "Logged in as: {}", username);
                let _ = writeln!(out, "Email: {}", email);
                let _ = writeln!(out, "Roles: {}", roles);
            }
            HomeView::SignedOut => out.push_str("Please login to access the application.\n"),
        }
        out
    }

    pub fn login(&self, login: &LoginView) -> String {
        let mut out = format!("{}\n", self.heading("Login Required"));
        out.push_str("You need to authenticate to access this application.\n\n");
        for action in &login.actions {
            let line = match action {
                LoginAction::Login => "  stockdesk login      Login with Keycloak",
                LoginAction::Register => "  stockdesk register   Register New Account",
            };
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    pub fn admin(&self, admin: &AdminView) -> String {
        format!(
            "{}\n\nWelcome, {}! You have administrator access.\n\nToken claims:\n{}\n",
            self.heading(View::Admin.title()),
            admin.username,
            admin.token_pretty()
        )
    }

    pub fn companies(&self, screen: &CrudScreen<Company>) -> String {
        self.table(
            screen,
            &["ID", "Name", "Sector", "Country", "Link"],
            |company| {
                vec![
                    company.name.clone(),
                    company.sector.clone().unwrap_or_default(),
                    company.country.clone().unwrap_or_default(),
                    company.self_href().unwrap_or_default().to_string(),
                ]
            },
        )
    }

    pub fn company(&self, company: &Company) -> String {
        let mut out = String::new();
        let id = company.id.map(|id| id.to_string()).unwrap_or_default();
        let _ = writeln!(out, "ID:      {}", id);
        let _ = writeln!(out, "Name:    {}", company.name);
        let _ = writeln!(out, "Sector:  {}", company.sector.as_deref().unwrap_or(""));
        let _ = writeln!(out, "Country: {}", company.country.as_deref().unwrap_or(""));
        if let Some(href) = company.self_href() {
            let _ = writeln!(out, "Link:    {}", href);
        }
        out
    }

    pub fn stock_markets(&self, screen: &CrudScreen<StockRecord>) -> String {
        self.table(
            screen,
            &["ID", "Date", "Open", "Close", "Volume", "Company"],
            |stock| {
                vec![
                    stock.date.format("%Y-%m-%d").to_string(),
                    format!("{:.2}", stock.open_value),
                    format!("{:.2}", stock.close_value),
                    stock.volume.map(|v| v.to_string()).unwrap_or_default(),
                    stock
                        .company_id
                        .map(|id| id.to_string())
                        .unwrap_or_default(),
                ]
            },
        )
    }

    /// A column-aligned listing; the first column is always the id, blank
    /// for records the server sent without one.
    fn table<R: Resource>(
        &self,
        screen: &CrudScreen<R>,
        headers: &[&str],
        cells: impl Fn(&R) -> Vec<String>,
    ) -> String {
        let mut out = String::new();
        let title = R::MESSAGES.plural;
        let role = if screen.is_admin() { " (ADMIN)" } else { "" };
        let _ = writeln!(out, "{}{}", self.heading(&capitalize(title)), role);

        if let Some(status) = self.status(&screen.status()) {
            let _ = writeln!(out, "{}", status);
        }

        let rows: Vec<Vec<String>> = screen
            .rows()
            .iter()
            .map(|row| {
                let mut line = vec![row.id.map(|id| id.to_string()).unwrap_or_default()];
                line.extend(cells(row.record));
                line
            })
            .collect();

        if rows.is_empty() {
            let _ = writeln!(out, "No {} found.", title);
            return out;
        }

        let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        for line in std::iter::once(&header).chain(rows.iter()) {
            let cells: Vec<String> = line
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = width))
                .collect();
            let _ = writeln!(out, "{}", cells.join("  ").trim_end());
        }
        out
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::config::ApiConfig;
    use crate::models::Claims;
    use crate::screens::CompaniesScreen;
    use crate::session::context::tests::signed_in_context;
    use crate::session::Session;
    use mockito::Server;
    use serde_json::json;

    #[test]
    fn home_without_color() {
        let out = Renderer::new(false).home(&HomeView::SignedIn {
            username: "alice".to_string(),
            email: "N/A".to_string(),
            roles: "CLIENT".to_string(),
        });
        assert!(out.contains("Logged in as: alice\nEmail: N/A\nRoles: CLIENT\n"));
    }

    #[test]
    fn navbar_lists_links_and_badges() {
        let session = Session::signed_in(
            "t",
            Claims {
                username: Some("root".to_string()),
                roles: ["ADMIN"].into_iter().collect(),
                ..Claims::default()
            },
        );
        let out = Renderer::new(false).navbar(&Navbar::from_session(&session));
        assert!(out.contains("Home | Companies | Stock Markets | Admin Panel"));
        assert!(out.contains("Welcome, root [ADMIN]"));
    }

    #[test]
    fn statuses_are_colored_when_asked() {
        let painted = Renderer::new(true)
            .status(&ScreenStatus::Error("boom".to_string()))
            .unwrap();
        assert_eq!(painted, format!("{color_red}boom{color_reset}"));
        assert_eq!(Renderer::new(false).status(&ScreenStatus::Idle), None);
    }

    #[tokio::test]
    async fn company_table_links_records_and_leaves_missing_ids_blank() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/api/companies")
            .with_status(200)
            .with_body(
                json!({"_embedded": {"companies": [
                    {"id": 7, "name": "Acme",
                     "_links": {"self": {"href": "http://api/companies/7"}}},
                    {"name": "Ghost"}
                ]}})
                .to_string(),
            )
            .create_async()
            .await;
        let (session, _) = signed_in_context("admin", &["ADMIN"]).await;
        let api = ApiClient::new(
            &ApiConfig {
                base_url: server.url(),
                timeout_in_ms: 2_000,
            },
            session,
        )
        .unwrap();

        let screen = CompaniesScreen::mount(api).await;
        let out = Renderer::new(false).companies(&screen);
        let lines: Vec<&str> = out.lines().collect();

        assert!(lines.contains(&"1 record(s) have no ID and cannot be edited or deleted"));
        assert!(lines.iter().any(|l| l.starts_with("ID  Name") && l.ends_with("Link")));
        assert!(lines
            .iter()
            .any(|l| l.starts_with("7 ") && l.ends_with("http://api/companies/7")));
        assert!(lines.iter().any(|l| l.starts_with("    Ghost")));
        assert!(!out.contains('?'));
    }

    #[test]
    fn capitalizes_titles() {
        assert_eq!(capitalize("companies"), "Companies");
        assert_eq!(capitalize(""), "");
    }
}
