use super::crud::{AfterDelete, CrudScreen, Messages, Resource};
use crate::api::{ApiClient, ListEnvelope};
use crate::models::{DraftError, ResourceId, StockDraft, StockPayload, StockRecord};

pub type StockMarketsScreen = CrudScreen<StockRecord>;

impl Resource for StockRecord {
    type Draft = StockDraft;
    type Payload = StockPayload;

    const COLLECTION: &'static str = "/api/stockMarkets";
    const ENVELOPE: ListEnvelope = ListEnvelope::Flat;
    const AFTER_DELETE: AfterDelete = AfterDelete::RemoveLocally;
    const MESSAGES: Messages = Messages {
        singular: "stock",
        plural: "stocks",
        created: "Stock created successfully",
        updated: "Stock updated successfully",
        deleted: "Stock deleted successfully",
        load_failed: "Failed to load stocks",
        duplicate: "A stock record for this company and date already exists",
        has_dependents: "Cannot delete stock: It may have associated records",
        not_found: "Stock not found",
        confirm_delete: "Are you sure you want to delete this stock record?",
    };

    fn id(&self) -> Option<ResourceId> {
        self.id
    }

    fn to_draft(&self) -> StockDraft {
        StockDraft::from_record(self)
    }

    fn validate(draft: &StockDraft) -> Result<StockPayload, DraftError> {
        draft.validate()
    }
}

/// Listing path for one company's stock records.
pub fn company_listing_path(company_id: ResourceId) -> String {
    format!("{}/company/{}", StockRecord::COLLECTION, company_id)
}

impl CrudScreen<StockRecord> {
    /// Mount the screen on a single company's records.
    pub async fn mount_for_company(api: ApiClient, company_id: ResourceId) -> Self {
        Self::mount_at(api, company_listing_path(company_id)).await
    }
}
