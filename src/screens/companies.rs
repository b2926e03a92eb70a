use super::crud::{AfterDelete, CrudScreen, Messages, Resource};
use crate::api::ListEnvelope;
use crate::models::{Company, CompanyDraft, CompanyPayload, DraftError, ResourceId};

pub type CompaniesScreen = CrudScreen<Company>;

impl Resource for Company {
    type Draft = CompanyDraft;
    type Payload = CompanyPayload;

    const COLLECTION: &'static str = "/api/companies";
    const ENVELOPE: ListEnvelope = ListEnvelope::Embedded("companies");
    const AFTER_DELETE: AfterDelete = AfterDelete::Refetch;
    const MESSAGES: Messages = Messages {
        singular: "company",
        plural: "companies",
        created: "Company created successfully!",
        updated: "Company updated successfully!",
        deleted: "Company deleted successfully!",
        load_failed: "Failed to load companies",
        duplicate: "A company with this name already exists",
        has_dependents: "Cannot delete company: It may have associated records",
        not_found: "Company not found",
        confirm_delete: "Are you sure you want to delete this company?",
    };

    fn id(&self) -> Option<ResourceId> {
        self.id
    }

    fn to_draft(&self) -> CompanyDraft {
        CompanyDraft::from_record(self)
    }

    fn validate(draft: &CompanyDraft) -> Result<CompanyPayload, DraftError> {
        draft.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::config::ApiConfig;
    use crate::screens::crud::ScreenStatus;
    use crate::session::context::tests::signed_in_context;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;
    use std::time::Duration;

    const YES: fn(&str) -> bool = |_| true;
    const NO: fn(&str) -> bool = |_| false;

    async fn client(server: &ServerGuard, roles: &[&str]) -> ApiClient {
        let (session, _) = signed_in_context("tester", roles).await;
        ApiClient::new(
            &ApiConfig {
                base_url: server.url(),
                timeout_in_ms: 2_000,
            },
            session,
        )
        .unwrap()
    }

    fn listing(items: serde_json::Value) -> String {
        json!({"_embedded": {"companies": items}, "_links": {}}).to_string()
    }

    async fn mock_list(server: &mut ServerGuard, items: serde_json::Value) -> mockito::Mock {
        server
            .mock("GET", "/api/companies")
            .with_status(200)
            .with_header("content-type", "application/hal+json")
            .with_body(listing(items))
            .create_async()
            .await
    }

    #[tokio::test]
    async fn mount_loads_the_embedded_list() {
        let mut server = Server::new_async().await;
        let m = mock_list(&mut server, json!([{"id": 1, "name": "Acme"}])).await;

        let screen = CompaniesScreen::mount(client(&server, &["CLIENT"]).await).await;
        m.assert_async().await;

        assert_eq!(screen.status(), ScreenStatus::Idle);
        assert_eq!(screen.records().len(), 1);
        let rows = screen.rows();
        assert!(!rows[0].can_edit && !rows[0].can_delete);
    }

    #[tokio::test]
    async fn load_failures_clear_the_list() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/api/companies")
            .with_status(500)
            .create_async()
            .await;

        let screen = CompaniesScreen::mount(client(&server, &["ADMIN"]).await).await;
        m.assert_async().await;

        assert!(screen.records().is_empty());
        assert_eq!(
            screen.status(),
            ScreenStatus::Error("Failed to load companies".to_string())
        );
    }

    #[tokio::test]
    async fn records_without_ids_cannot_be_touched() {
        let mut server = Server::new_async().await;
        let _list = mock_list(
            &mut server,
            json!([{"id": 1, "name": "Acme"}, {"name": "Ghost"}]),
        )
        .await;

        let screen = CompaniesScreen::mount(client(&server, &["ADMIN"]).await).await;
        assert_eq!(screen.status(), ScreenStatus::MissingIds(1));

        let rows = screen.rows();
        assert!(rows[0].can_edit && rows[0].can_delete);
        assert!(!rows[1].can_edit && !rows[1].can_delete);
    }

    #[tokio::test]
    async fn create_posts_then_refetches() {
        let mut server = Server::new_async().await;
        let initial = mock_list(&mut server, json!([])).await;
        let mut screen = CompaniesScreen::mount(client(&server, &["ADMIN"]).await).await;
        initial.assert_async().await;
        initial.remove_async().await;

        let post = server
            .mock("POST", "/api/companies")
            .match_body(Matcher::Json(
                json!({"name": "Acme", "sector": "Tech", "country": "USA"}),
            ))
            .with_status(201)
            .expect(1)
            .create_async()
            .await;
        let refetch = mock_list(&mut server, json!([{"id": 7, "name": "Acme"}])).await;

        *screen.draft_mut() = CompanyDraft {
            name: "Acme".to_string(),
            sector: "Tech".to_string(),
            country: "USA".to_string(),
        };
        screen.submit().await;

        post.assert_async().await;
        refetch.assert_async().await;
        assert_eq!(
            screen.status(),
            ScreenStatus::Success("Company created successfully!".to_string())
        );
        assert_eq!(screen.draft(), &CompanyDraft::default());
        assert_eq!(screen.records()[0].id, ResourceId::new(7));
    }

    #[tokio::test]
    async fn update_puts_to_the_item_path() {
        let mut server = Server::new_async().await;
        let _list = mock_list(&mut server, json!([{"id": 5, "name": "Old", "sector": "Retail"}])).await;
        let mut screen = CompaniesScreen::mount(client(&server, &["ADMIN"]).await).await;

        let put = server
            .mock("PUT", "/api/companies/5")
            .match_body(Matcher::Json(
                json!({"name": "New", "sector": "Retail", "country": ""}),
            ))
            .with_status(200)
            .create_async()
            .await;

        assert!(screen.edit_by_id(ResourceId::new(5).unwrap()));
        assert_eq!(screen.status(), ScreenStatus::Editing(ResourceId::new(5)));
        screen.draft_mut().name = "New".to_string();
        screen.submit().await;

        put.assert_async().await;
        assert_eq!(screen.editing_id(), None);
        assert_eq!(
            screen.status(),
            ScreenStatus::Success("Company updated successfully!".to_string())
        );
    }

    #[tokio::test]
    async fn submit_failures_are_mapped_by_status() {
        let cases = [
            (409, "", "Error: A company with this name already exists"),
            (400, "", "Error: Invalid data. Please check your input."),
            (500, "Database down", "Error: Database down"),
            (500, "", "Error: Operation failed"),
        ];

        for (status, body, expected) in cases {
            let mut server = Server::new_async().await;
            let _list = mock_list(&mut server, json!([])).await;
            let _m = server
                .mock("POST", "/api/companies")
                .with_status(status)
                .with_body(body)
                .create_async()
                .await;

            let mut screen = CompaniesScreen::mount(client(&server, &["ADMIN"]).await).await;
            screen.draft_mut().name = "Acme".to_string();
            screen.submit().await;

            assert_eq!(screen.status(), ScreenStatus::Error(expected.to_string()));
            assert_eq!(screen.draft().name, "Acme");
        }
    }

    #[tokio::test]
    async fn non_admins_are_rejected_before_any_request() {
        let mut server = Server::new_async().await;
        let _list = mock_list(&mut server, json!([{"id": 1, "name": "Acme"}])).await;
        let post = server
            .mock("POST", "/api/companies")
            .expect(0)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/api/companies/1")
            .expect(0)
            .create_async()
            .await;

        let mut screen = CompaniesScreen::mount(client(&server, &["CLIENT"]).await).await;
        screen.draft_mut().name = "Acme".to_string();
        screen.submit().await;
        assert_eq!(
            screen.status(),
            ScreenStatus::Error("Only admins can create companies".to_string())
        );

        screen.delete("1", &YES).await;
        assert_eq!(
            screen.status(),
            ScreenStatus::Error("Only admins can delete companies".to_string())
        );

        post.assert_async().await;
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn non_admin_update_is_refused_as_an_edit() {
        let mut server = Server::new_async().await;
        let _list = mock_list(&mut server, json!([{"id": 1, "name": "Acme"}])).await;
        let put = server
            .mock("PUT", "/api/companies/1")
            .expect(0)
            .create_async()
            .await;

        let mut screen = CompaniesScreen::mount(client(&server, &["CLIENT"]).await).await;
        let id = "1".parse().unwrap();
        assert!(!screen.edit_by_id(id));
        assert_eq!(screen.editing_id(), None);
        assert_eq!(
            screen.status(),
            ScreenStatus::Error("Only admins can edit companies".to_string())
        );

        put.assert_async().await;
    }

    #[tokio::test]
    async fn blank_names_never_leave_the_screen() {
        let mut server = Server::new_async().await;
        let _list = mock_list(&mut server, json!([])).await;
        let post = server
            .mock("POST", "/api/companies")
            .expect(0)
            .create_async()
            .await;

        let mut screen = CompaniesScreen::mount(client(&server, &["ADMIN"]).await).await;
        screen.draft_mut().name = "   ".to_string();
        screen.submit().await;

        post.assert_async().await;
        assert_eq!(
            screen.status(),
            ScreenStatus::Error("Company name is required".to_string())
        );
    }

    #[tokio::test]
    async fn invalid_ids_are_refused_locally() {
        let mut server = Server::new_async().await;
        let _list = mock_list(&mut server, json!([{"name": "Ghost"}])).await;
        let any_delete = server
            .mock("DELETE", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let mut screen = CompaniesScreen::mount(client(&server, &["ADMIN"]).await).await;
        for raw in ["0", "-3", "abc", ""] {
            screen.delete(raw, &YES).await;
            assert_eq!(
                screen.status(),
                ScreenStatus::Error(format!("Cannot delete: Invalid company ID ({})", raw))
            );
        }

        let ghost = screen.records()[0].clone();
        screen.delete_record(&ghost, &YES).await;
        assert_eq!(
            screen.status(),
            ScreenStatus::Error("Cannot delete: Invalid company ID (undefined)".to_string())
        );
        any_delete.assert_async().await;
    }

    #[tokio::test]
    async fn declined_confirmation_sends_nothing() {
        let mut server = Server::new_async().await;
        let _list = mock_list(&mut server, json!([{"id": 2, "name": "Acme"}])).await;
        let delete = server
            .mock("DELETE", "/api/companies/2")
            .expect(0)
            .create_async()
            .await;

        let mut screen = CompaniesScreen::mount(client(&server, &["ADMIN"]).await).await;
        screen.delete("2", &NO).await;

        delete.assert_async().await;
        assert_eq!(screen.status(), ScreenStatus::Idle);
    }

    #[tokio::test]
    async fn delete_refetches_and_maps_failures() {
        let mut server = Server::new_async().await;
        let list = server
            .mock("GET", "/api/companies")
            .with_status(200)
            .with_body(listing(json!([{"id": 2, "name": "Acme"}])))
            .expect(2)
            .create_async()
            .await;
        let _m = server
            .mock("DELETE", "/api/companies/2")
            .with_status(204)
            .create_async()
            .await;
        let _m = server
            .mock("DELETE", "/api/companies/3")
            .with_status(409)
            .create_async()
            .await;
        let _m = server
            .mock("DELETE", "/api/companies/4")
            .with_status(404)
            .create_async()
            .await;
        let _m = server
            .mock("DELETE", "/api/companies/5")
            .with_status(503)
            .create_async()
            .await;

        let mut screen = CompaniesScreen::mount(client(&server, &["ADMIN"]).await).await;
        screen.delete("2", &YES).await;
        list.assert_async().await;
        assert_eq!(
            screen.status(),
            ScreenStatus::Success("Company deleted successfully!".to_string())
        );

        screen.delete("3", &YES).await;
        assert_eq!(
            screen.status(),
            ScreenStatus::Error("Cannot delete company: It may have associated records".into())
        );
        screen.delete("4", &YES).await;
        assert_eq!(
            screen.status(),
            ScreenStatus::Error("Company not found".into())
        );
        screen.delete("5", &YES).await;
        assert_eq!(
            screen.status(),
            ScreenStatus::Error("Delete failed: 503".into())
        );
    }

    #[tokio::test]
    async fn show_fetches_a_single_company() {
        let mut server = Server::new_async().await;
        let _list = mock_list(&mut server, json!([])).await;
        let _m = server
            .mock("GET", "/api/companies/9")
            .with_status(200)
            .with_body(r#"{"id": 9, "name": "Nine", "sector": "Energy"}"#)
            .create_async()
            .await;
        let _m = server
            .mock("GET", "/api/companies/10")
            .with_status(404)
            .create_async()
            .await;

        let mut screen = CompaniesScreen::mount(client(&server, &["CLIENT"]).await).await;
        let company = screen.show("9").await.unwrap();
        assert_eq!(company.name, "Nine");

        assert!(screen.show("10").await.is_none());
        assert_eq!(
            screen.status(),
            ScreenStatus::Error("Company not found".to_string())
        );
    }

    #[tokio::test]
    async fn cancel_drops_the_draft() {
        let mut server = Server::new_async().await;
        let _list = mock_list(&mut server, json!([{"id": 1, "name": "Acme"}])).await;

        let mut screen = CompaniesScreen::mount(client(&server, &["ADMIN"]).await).await;
        screen.edit_by_id(ResourceId::new(1).unwrap());
        screen.draft_mut().name = "Changed".to_string();
        screen.cancel();

        assert_eq!(screen.editing_id(), None);
        assert_eq!(screen.draft(), &CompanyDraft::default());
        assert_eq!(screen.status(), ScreenStatus::Idle);
    }

    #[tokio::test]
    async fn success_message_clears_after_three_seconds() {
        let mut server = Server::new_async().await;
        let _list = mock_list(&mut server, json!([])).await;
        let _m = server
            .mock("POST", "/api/companies")
            .with_status(201)
            .create_async()
            .await;

        let mut screen = CompaniesScreen::mount(client(&server, &["ADMIN"]).await).await;
        screen.draft_mut().name = "Acme".to_string();
        screen.submit().await;
        assert!(matches!(screen.status(), ScreenStatus::Success(_)));

        let mut updates = screen.watch_status();
        assert!(matches!(*updates.borrow_and_update(), ScreenStatus::Success(_)));

        // Freeze the clock only once the requests are done.
        tokio::time::pause();
        tokio::time::advance(Duration::from_millis(2_500)).await;
        assert!(matches!(screen.status(), ScreenStatus::Success(_)));
        assert!(!updates.has_changed().unwrap());

        tokio::time::advance(Duration::from_millis(600)).await;
        assert_eq!(screen.status(), ScreenStatus::Idle);
        updates.changed().await.unwrap();
        assert_eq!(*updates.borrow_and_update(), ScreenStatus::Idle);
    }
}
