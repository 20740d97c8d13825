//! Typed client for the admin backend REST API.

pub mod client;
pub mod error;
pub mod fiscal;
pub mod lawyers;
pub mod models;
pub mod offices;
pub mod partners;
pub mod session;
pub mod subscriptions;

pub use client::BackendClient;
pub use error::{BackendError, BackendResult};
pub use fiscal::FiscalNotes;
pub use lawyers::Lawyers;
pub use models::*;
pub use offices::Offices;
pub use partners::Partners;
pub use session::{MemorySessionStore, Session, SessionStore};
pub use subscriptions::Subscriptions;

impl BackendClient {
    pub fn offices(&self) -> Offices<'_> {
        Offices::new(self)
    }

    pub fn lawyers(&self) -> Lawyers<'_> {
        Lawyers::new(self)
    }

    pub fn partners(&self) -> Partners<'_> {
        Partners::new(self)
    }

    pub fn subscriptions(&self) -> Subscriptions<'_> {
        Subscriptions::new(self)
    }

    pub fn fiscal_notes(&self) -> FiscalNotes<'_> {
        FiscalNotes::new(self)
    }
}
