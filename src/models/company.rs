use serde::{Deserialize, Serialize};

use super::draft::{required, DraftError};
use super::id::{lenient_id, ResourceId};

/// A company as returned by the company service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<ResourceId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
}

/// Hypermedia links attached to an embedded item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Links {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

impl Company {
    /// The record's own API URL, when the server advertised one.
    pub fn self_href(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|links| links.self_link.as_ref())
            .map(|link| link.href.as_str())
    }
}

/// Editable company fields, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyDraft {
    pub name: String,
    pub sector: String,
    pub country: String,
}

/// Request body for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyPayload {
    pub name: String,
    pub sector: String,
    pub country: String,
}

impl CompanyDraft {
    pub fn from_record(company: &Company) -> Self {
        CompanyDraft {
            name: company.name.clone(),
            sector: company.sector.clone().unwrap_or_default(),
            country: company.country.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<CompanyPayload, DraftError> {
        let name = required(&self.name, "Company name")?;
        Ok(CompanyPayload {
            name: name.to_string(),
            sector: self.sector.trim().to_string(),
            country: self.country.trim().to_string(),
        })
    }
}
