use super::client::BackendClient;
use super::error::BackendResult;
use super::models::{ListParams, NewPartner, Paginated, Partner, PartnerUpdate};

/// Referral partners (`/partner`)
pub struct Partners<'a> {
    client: &'a BackendClient,
}

impl<'a> Partners<'a> {
    pub(crate) fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: &ListParams) -> BackendResult<Paginated<Partner>> {
        self.client.get_with_query("/partner", &params.to_query()).await
    }

    pub async fn create(&self, partner: &NewPartner) -> BackendResult<Partner> {
        self.client.post("/partner", partner).await
    }

    pub async fn update(&self, id: &str, changes: &PartnerUpdate) -> BackendResult<Partner> {
        self.client.put(&format!("/partner/{id}"), changes).await
    }

    pub async fn delete(&self, id: &str) -> BackendResult<()> {
        let _: serde_json::Value = self.client.delete(&format!("/partner/{id}")).await?;
        Ok(())
    }
}
