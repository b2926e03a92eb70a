//! Screen state: what each view holds and how user actions change it.

pub mod companies;
pub mod crud;
pub mod pages;
pub mod stock_markets;

pub use companies::CompaniesScreen;
pub use crud::{AfterDelete, Confirm, CrudScreen, Messages, Resource, Row, ScreenStatus};
pub use pages::{AdminView, HomeView, LoginAction, LoginView, Navbar, NavbarAuth};
pub use stock_markets::{company_listing_path, StockMarketsScreen};
