use serde::Serialize;

use super::client::BackendClient;
use super::error::BackendResult;
use super::models::{Lawyer, LawyerUpdate, NewLawyer};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OfficeLink<'a> {
    office_id: &'a str,
}

/// Lawyer accounts (`/admin/lawyers`)
pub struct Lawyers<'a> {
    client: &'a BackendClient,
}

impl<'a> Lawyers<'a> {
    pub(crate) fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> BackendResult<Vec<Lawyer>> {
        self.client.get("/admin/lawyers").await
    }

    pub async fn create(&self, lawyer: &NewLawyer) -> BackendResult<Lawyer> {
        self.client.post("/admin/lawyers", lawyer).await
    }

    pub async fn update(&self, id: &str, changes: &LawyerUpdate) -> BackendResult<Lawyer> {
        self.client.put(&format!("/admin/lawyers/{id}"), changes).await
    }

    pub async fn link_office(&self, id: &str, office_id: &str) -> BackendResult<Lawyer> {
        self.client
            .patch(&format!("/admin/lawyers/{id}/link-office"), &OfficeLink { office_id })
            .await
    }

    /// Ask the backend to send a password-recovery e-mail
    pub async fn recover_password(&self, id: &str) -> BackendResult<()> {
        let _: serde_json::Value = self
            .client
            .post(&format!("/admin/lawyers/{id}/recover-password"), &serde_json::json!({}))
            .await?;
        Ok(())
    }
}
