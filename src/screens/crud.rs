use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, ListEnvelope};
use crate::models::{DraftError, ResourceId};

/// How long a success message stays up.
pub const SUCCESS_TTL: Duration = Duration::from_secs(3);

pub const INVALID_DATA: &str = "Invalid data. Please check your input.";
pub const OPERATION_FAILED: &str = "Operation failed";

/// User-facing wording for one resource type.
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    /// Lower case, e.g. "company".
    pub singular: &'static str,
    /// Lower case, e.g. "companies".
    pub plural: &'static str,
    pub created: &'static str,
    pub updated: &'static str,
    pub deleted: &'static str,
    pub load_failed: &'static str,
    pub duplicate: &'static str,
    pub has_dependents: &'static str,
    pub not_found: &'static str,
    pub confirm_delete: &'static str,
}

/// What to do with the cached list once a delete went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterDelete {
    Refetch,
    RemoveLocally,
}

/// A record type managed by a [`CrudScreen`].
pub trait Resource: Clone + Debug + DeserializeOwned + Send + Sync + 'static {
    type Draft: Clone + Debug + Default + PartialEq + Send + Sync;
    type Payload: Serialize + Send + Sync;

    /// Collection path, e.g. `/api/companies`.
    const COLLECTION: &'static str;
    const ENVELOPE: ListEnvelope;
    const AFTER_DELETE: AfterDelete;
    const MESSAGES: Messages;

    fn id(&self) -> Option<ResourceId>;
    fn to_draft(&self) -> Self::Draft;
    fn validate(draft: &Self::Draft) -> Result<Self::Payload, DraftError>;

    fn item_path(id: ResourceId) -> String {
        format!("{}/{}", Self::COLLECTION, id)
    }
}

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// The externally visible state of a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenStatus {
    Loading,
    Idle,
    /// `None` while composing a new record.
    Editing(Option<ResourceId>),
    Submitting,
    Error(String),
    Success(String),
    /// The server returned records that carry no usable id.
    MissingIds(usize),
}

#[derive(Debug, Clone)]
enum Notice {
    Error(String),
    Success { message: String, expires_at: Instant },
}

/// One list entry and what the current user may do with it.
#[derive(Debug)]
pub struct Row<'a, R> {
    pub record: &'a R,
    pub id: Option<ResourceId>,
    pub can_edit: bool,
    pub can_delete: bool,
}

/// List/create/update/delete state for one resource type.
///
/// Operations take `&mut self`, so a screen runs at most one request at a
/// time and a dropped screen never sees a late response.
pub struct CrudScreen<R: Resource> {
    api: ApiClient,
    list_path: String,
    records: Vec<R>,
    loaded: bool,
    draft: R::Draft,
    editing_id: Option<ResourceId>,
    notice: Option<Notice>,
    status_tx: Arc<watch::Sender<ScreenStatus>>,
    /// Publishes the settled status once a success message expires.
    clear_timer: Option<JoinHandle<()>>,
}

impl<R: Resource> CrudScreen<R> {
    /// Mount the screen on the full collection.
    pub async fn mount(api: ApiClient) -> Self {
        Self::mount_at(api, R::COLLECTION.to_string()).await
    }

    /// Mount the screen on a filtered listing path of the same resource.
    pub async fn mount_at(api: ApiClient, list_path: String) -> Self {
        let (status_tx, _) = watch::channel(ScreenStatus::Loading);
        let mut screen = CrudScreen {
            api,
            list_path,
            records: Vec::new(),
            loaded: false,
            draft: R::Draft::default(),
            editing_id: None,
            notice: None,
            status_tx: Arc::new(status_tx),
            clear_timer: None,
        };
        screen.reload().await;
        screen
    }

    pub fn status(&self) -> ScreenStatus {
        if !self.loaded {
            return ScreenStatus::Loading;
        }
        match &self.notice {
            Some(Notice::Error(message)) => return ScreenStatus::Error(message.clone()),
            Some(Notice::Success {
                message,
                expires_at,
            }) if Instant::now() < *expires_at => {
                return ScreenStatus::Success(message.clone())
            }
            _ => {}
        }
        self.settled_status()
    }

    /// The status once any success message has gone.
    fn settled_status(&self) -> ScreenStatus {
        if self.editing_id.is_some() || self.draft != R::Draft::default() {
            return ScreenStatus::Editing(self.editing_id);
        }
        match self.missing_ids() {
            0 => ScreenStatus::Idle,
            n => ScreenStatus::MissingIds(n),
        }
    }

    /// Status transitions, including `Submitting` while a request is out.
    pub fn watch_status(&self) -> watch::Receiver<ScreenStatus> {
        self.status_tx.subscribe()
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn rows(&self) -> Vec<Row<'_, R>> {
        let admin = self.is_admin();
        self.records
            .iter()
            .map(|record| {
                let id = record.id();
                Row {
                    record,
                    id,
                    can_edit: admin && id.is_some(),
                    can_delete: admin && id.is_some(),
                }
            })
            .collect()
    }

    pub fn missing_ids(&self) -> usize {
        self.records.iter().filter(|r| r.id().is_none()).count()
    }

    pub fn is_admin(&self) -> bool {
        self.api.session().snapshot().is_admin()
    }

    pub fn draft(&self) -> &R::Draft {
        &self.draft
    }

    /// The form fields, for the user to type into.
    pub fn draft_mut(&mut self) -> &mut R::Draft {
        &mut self.draft
    }

    pub fn editing_id(&self) -> Option<ResourceId> {
        self.editing_id
    }

    /// Fetch the full list again. Only signed-in sessions fetch anything.
    pub async fn reload(&mut self) {
        if !self.api.session().is_authenticated() {
            debug!("Not signed in; skipping fetch of {}", self.list_path);
            self.records.clear();
            self.loaded = true;
            self.publish();
            return;
        }

        let messages = R::MESSAGES;
        let result = self.api.get_json(&self.list_path).await.and_then(|body| {
            R::ENVELOPE
                .decode::<R>(body)
                .map_err(|message| ApiError::Decode {
                    path: self.list_path.clone(),
                    message,
                })
        });

        match result {
            Ok(records) => {
                debug!("Loaded {} {}", records.len(), messages.plural);
                let missing = records.iter().filter(|r| r.id().is_none()).count();
                if missing > 0 {
                    warn!("{} {} returned without an id", missing, messages.plural);
                }
                self.records = records;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", messages.plural, e);
                self.records.clear();
                self.notice = Some(Notice::Error(messages.load_failed.to_string()));
            }
        }
        self.loaded = true;
        self.publish();
    }

    /// Fetch a single record by id; failures become the screen's error.
    pub async fn show(&mut self, raw_id: &str) -> Option<R> {
        let messages = R::MESSAGES;
        let Ok(id) = raw_id.parse::<ResourceId>() else {
            self.fail(format!("Invalid {} ID ({})", messages.singular, raw_id));
            return None;
        };

        let path = R::item_path(id);
        let result = self.api.get_json(&path).await.and_then(|body| {
            serde_json::from_value::<R>(body).map_err(|e| ApiError::Decode {
                path: path.clone(),
                message: e.to_string(),
            })
        });
        match result {
            Ok(record) => Some(record),
            Err(e) => {
                let message = match e.status() {
                    Some(StatusCode::NOT_FOUND) => messages.not_found.to_string(),
                    _ => failure_detail(&e),
                };
                self.fail(message);
                None
            }
        }
    }

    /// Copy a record into the draft and switch to update mode.
    ///
    /// Returns whether update mode was entered.
    pub fn edit(&mut self, record: &R) -> bool {
        self.notice = None;
        if !self.is_admin() {
            self.fail(admin_only("edit", R::MESSAGES));
            return false;
        }
        let Some(id) = record.id() else {
            self.fail(format!("Cannot edit: {} has no ID", R::MESSAGES.singular));
            return false;
        };
        self.draft = record.to_draft();
        self.editing_id = Some(id);
        self.publish();
        true
    }

    /// Start editing the cached record with this id.
    pub fn edit_by_id(&mut self, id: ResourceId) -> bool {
        match self.records.iter().find(|r| r.id() == Some(id)).cloned() {
            Some(record) => self.edit(&record),
            None => {
                self.fail(R::MESSAGES.not_found.to_string());
                false
            }
        }
    }

    /// Create or update, depending on whether an id is being edited.
    pub async fn submit(&mut self) {
        let messages = R::MESSAGES;
        self.notice = None;

        if !self.is_admin() {
            let action = if self.editing_id.is_some() { "update" } else { "create" };
            self.fail(admin_only(action, messages));
            return;
        }

        let payload = match R::validate(&self.draft) {
            Ok(payload) => payload,
            Err(e) => {
                self.fail(e.to_string());
                return;
            }
        };

        self.status_tx.send_replace(ScreenStatus::Submitting);
        let (result, success) = match self.editing_id {
            Some(id) => {
                info!("Updating {} {}", messages.singular, id);
                (
                    self.api.put_json(&R::item_path(id), &payload).await,
                    messages.updated,
                )
            }
            None => {
                info!("Creating {}", messages.singular);
                (
                    self.api.post_json(R::COLLECTION, &payload).await,
                    messages.created,
                )
            }
        };

        match result {
            Ok(()) => {
                self.draft = R::Draft::default();
                self.editing_id = None;
                self.succeed(success);
                // Only after the mutation's response, so the list reflects it.
                self.reload().await;
            }
            Err(e) => {
                warn!("Saving {} failed: {}", messages.singular, e);
                self.fail(format!("Error: {}", submit_failure(&e, messages)));
            }
        }
    }

    /// Delete by an id as typed or as found on a record.
    pub async fn delete(&mut self, raw_id: &str, confirm: &dyn Confirm) {
        let messages = R::MESSAGES;
        self.notice = None;

        let Ok(id) = raw_id.parse::<ResourceId>() else {
            warn!("Refusing to delete {} with id '{}'", messages.singular, raw_id);
            self.fail(format!(
                "Cannot delete: Invalid {} ID ({})",
                messages.singular, raw_id
            ));
            return;
        };

        if !self.is_admin() {
            self.fail(admin_only("delete", messages));
            return;
        }

        if !confirm.confirm(messages.confirm_delete) {
            debug!("Delete of {} {} declined", messages.singular, id);
            self.publish();
            return;
        }

        self.status_tx.send_replace(ScreenStatus::Submitting);
        info!("Deleting {} {}", messages.singular, id);
        match self.api.delete(&R::item_path(id)).await {
            Ok(()) => {
                if self.editing_id == Some(id) {
                    self.draft = R::Draft::default();
                    self.editing_id = None;
                }
                self.succeed(messages.deleted);
                match R::AFTER_DELETE {
                    AfterDelete::Refetch => self.reload().await,
                    AfterDelete::RemoveLocally => {
                        self.records.retain(|r| r.id() != Some(id));
                        self.publish();
                    }
                }
            }
            Err(e) => {
                warn!("Deleting {} {} failed: {}", messages.singular, id, e);
                self.fail(delete_failure(&e, messages));
            }
        }
    }

    /// Delete a listed record; records without an id are refused locally.
    pub async fn delete_record(&mut self, record: &R, confirm: &dyn Confirm) {
        let raw = record
            .id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "undefined".to_string());
        self.delete(&raw, confirm).await;
    }

    /// Drop the draft and leave update mode without touching the server.
    pub fn cancel(&mut self) {
        self.draft = R::Draft::default();
        self.editing_id = None;
        self.notice = None;
        self.publish();
    }

    fn fail(&mut self, message: String) {
        self.notice = Some(Notice::Error(message));
        self.publish();
    }

    fn succeed(&mut self, message: &str) {
        self.notice = Some(Notice::Success {
            message: message.to_string(),
            expires_at: Instant::now() + SUCCESS_TTL,
        });
        self.publish();
    }

    fn publish(&mut self) {
        if let Some(timer) = self.clear_timer.take() {
            timer.abort();
        }
        let status = self.status();
        let expires_at = match (&status, &self.notice) {
            (ScreenStatus::Success(_), Some(Notice::Success { expires_at, .. })) => {
                Some(*expires_at)
            }
            _ => None,
        };
        if let Some(expires_at) = expires_at {
            self.arm_clear_timer(expires_at, status.clone());
        }
        self.status_tx.send_replace(status);
    }

    fn arm_clear_timer(&mut self, expires_at: Instant, shown: ScreenStatus) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let settled = self.settled_status();
        let status_tx = Arc::clone(&self.status_tx);
        self.clear_timer = Some(runtime.spawn(async move {
            tokio::time::sleep_until(expires_at).await;
            status_tx.send_if_modified(|current| {
                if *current == shown {
                    *current = settled;
                    true
                } else {
                    false
                }
            });
        }));
    }
}

impl<R: Resource> Drop for CrudScreen<R> {
    fn drop(&mut self) {
        if let Some(timer) = self.clear_timer.take() {
            timer.abort();
        }
    }
}

fn admin_only(action: &str, messages: Messages) -> String {
    format!("Only admins can {} {}", action, messages.plural)
}

/// Server detail when there is one, otherwise the transport error text.
fn failure_detail(err: &ApiError) -> String {
    match err.status() {
        Some(_) => err
            .server_detail()
            .unwrap_or_else(|| OPERATION_FAILED.to_string()),
        None => err.to_string(),
    }
}

fn submit_failure(err: &ApiError, messages: Messages) -> String {
    match err.status() {
        Some(StatusCode::CONFLICT) => messages.duplicate.to_string(),
        Some(StatusCode::BAD_REQUEST) => INVALID_DATA.to_string(),
        Some(StatusCode::NOT_FOUND) => messages.not_found.to_string(),
        _ => failure_detail(err),
    }
}

fn delete_failure(err: &ApiError, messages: Messages) -> String {
    match err.status() {
        Some(StatusCode::BAD_REQUEST) => format!("Invalid {} ID", messages.singular),
        Some(StatusCode::CONFLICT) => messages.has_dependents.to_string(),
        Some(StatusCode::NOT_FOUND) => messages.not_found.to_string(),
        Some(status) => err
            .server_detail()
            .unwrap_or_else(|| format!("Delete failed: {}", status.as_u16())),
        None => format!("Failed to delete {}", messages.singular),
    }
}
