use super::client::BackendClient;
use super::error::BackendResult;
use super::models::{NewOffice, Office, OfficeUpdate};

/// Law offices (`/admin/offices`)
pub struct Offices<'a> {
    client: &'a BackendClient,
}

impl<'a> Offices<'a> {
    pub(crate) fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> BackendResult<Vec<Office>> {
        self.client.get("/admin/offices").await
    }

    pub async fn create(&self, office: &NewOffice) -> BackendResult<Office> {
        self.client.post("/admin/offices", office).await
    }

    pub async fn update(&self, id: &str, changes: &OfficeUpdate) -> BackendResult<Office> {
        self.client.put(&format!("/admin/offices/{id}"), changes).await
    }
}
