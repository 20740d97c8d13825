use serde_json::Value;

use super::client::BackendClient;
use super::error::{BackendError, BackendResult};
use super::models::{
    ListParams, NewSubscription, Paginated, PlanChange, Receipt, ReceiptPdf, SignaturePlan, Subscription,
};

/// Law-firm subscriptions (`/admin/signature`)
///
/// Lifecycle actions return the backend's payload untouched; its shape
/// differs per action.
pub struct Subscriptions<'a> {
    client: &'a BackendClient,
}

impl<'a> Subscriptions<'a> {
    pub(crate) fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: &ListParams) -> BackendResult<Paginated<Subscription>> {
        self.client
            .get_with_query("/admin/signature", &params.to_query())
            .await
    }

    /// Active plans; this endpoint does not require a session
    pub async fn plans(&self) -> BackendResult<Vec<SignaturePlan>> {
        self.client.get_public("/signature-plan").await
    }

    pub async fn create(
        &self,
        law_firm_id: &str,
        plan_id: &str,
        subscription: &NewSubscription,
    ) -> BackendResult<Value> {
        self.client
            .post(
                &format!("/admin/signature/create/{law_firm_id}/{plan_id}"),
                subscription,
            )
            .await
    }

    pub async fn renew(&self, id: &str) -> BackendResult<Value> {
        self.action("renew", id).await
    }

    pub async fn renew_yearly(&self, id: &str) -> BackendResult<Value> {
        self.action("renew-yearly", id).await
    }

    /// Issue a new charge for the current period
    pub async fn charge(&self, id: &str) -> BackendResult<Value> {
        self.action("charge", id).await
    }

    pub async fn cancel(&self, id: &str) -> BackendResult<Value> {
        self.action("cancel", id).await
    }

    pub async fn reactivate(&self, id: &str) -> BackendResult<Value> {
        self.action("reactivate", id).await
    }

    pub async fn change_plan(&self, id: &str, change: &PlanChange) -> BackendResult<Value> {
        self.client
            .post(&format!("/admin/signature/change-plan/{id}"), change)
            .await
    }

    pub async fn history(&self, id: &str) -> BackendResult<Vec<Value>> {
        self.client.get(&format!("/admin/signature/{id}/history")).await
    }

    pub async fn receipt(&self, id: &str) -> BackendResult<Receipt> {
        let receipt: Option<Receipt> = self
            .client
            .get(&format!("/admin/signature/{id}/receipt"))
            .await?;

        receipt
            .filter(|r| !r.base64.is_empty())
            .ok_or_else(|| BackendError::InvalidResponse("receipt without PDF data".to_string()))
    }

    /// Fetch the receipt and decode it into PDF bytes with a download name.
    pub async fn receipt_pdf(&self, id: &str) -> BackendResult<ReceiptPdf> {
        let receipt = self.receipt(id).await?;
        Ok(ReceiptPdf {
            filename: receipt.filename_or(id),
            bytes: receipt.pdf_bytes()?,
        })
    }

    async fn action(&self, action: &str, id: &str) -> BackendResult<Value> {
        self.client
            .post(&format!("/admin/signature/{action}/{id}"), &serde_json::json!({}))
            .await
    }
}
