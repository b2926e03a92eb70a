//! Data carried between the identity provider, the resource API and the screens.

pub mod claims;
pub mod company;
pub mod draft;
pub mod id;
pub mod stock;

pub use claims::{Claims, ClaimsError, Role, Roles};
pub use company::{Company, CompanyDraft, CompanyPayload};
pub use draft::DraftError;
pub use id::{InvalidId, ResourceId};
pub use stock::{StockDraft, StockPayload, StockRecord};
