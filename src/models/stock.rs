use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::draft::{required, required_number, DraftError};
use super::id::{lenient_id, ResourceId};

/// One day of market data for a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<ResourceId>,
    pub date: NaiveDate,
    pub open_value: f64,
    pub close_value: f64,
    #[serde(default)]
    pub volume: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub company_id: Option<ResourceId>,
}

/// Form strings for a stock record; numbers are only parsed on submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockDraft {
    pub date: String,
    pub open_value: String,
    pub close_value: String,
    pub volume: String,
    pub company_id: String,
}

/// Request body for create and update, with every number already coerced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPayload {
    pub date: NaiveDate,
    pub open_value: f64,
    pub close_value: f64,
    pub volume: Option<i64>,
    pub company_id: ResourceId,
}

impl StockDraft {
    pub fn from_record(stock: &StockRecord) -> Self {
        StockDraft {
            date: stock.date.format("%Y-%m-%d").to_string(),
            open_value: stock.open_value.to_string(),
            close_value: stock.close_value.to_string(),
            volume: stock.volume.map(|v| v.to_string()).unwrap_or_default(),
            company_id: stock
                .company_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<StockPayload, DraftError> {
        let date = NaiveDate::parse_from_str(required(&self.date, "Date")?, "%Y-%m-%d")
            .map_err(|_| DraftError::NotADate("Date"))?;
        let open_value = required_number(&self.open_value, "Open value")?;
        let close_value = required_number(&self.close_value, "Close value")?;

        let volume = match self.volume.trim() {
            "" => None,
            raw => Some(
                raw.parse::<i64>()
                    .map_err(|_| DraftError::NotAnInteger("Volume"))?,
            ),
        };

        let company_id = required(&self.company_id, "Company ID")?
            .parse::<ResourceId>()
            .map_err(|_| DraftError::NotAnId("Company ID"))?;

        Ok(StockPayload {
            date,
            open_value,
            close_value,
            volume,
            company_id,
        })
    }
}
