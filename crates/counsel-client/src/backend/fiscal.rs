use serde::Deserialize;

use super::client::BackendClient;
use super::error::BackendResult;
use super::models::{FiscalNote, NewFiscalNote};

/// Invoice as the payment provider reports it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInvoice {
    id: String,
    #[serde(default)]
    simple_id: Option<String>,
    #[serde(default)]
    customer: Option<String>,
    #[serde(default)]
    client_name: Option<String>,
    #[serde(default)]
    value: f64,
    #[serde(default)]
    effective_date: Option<String>,
    #[serde(default)]
    date_created: Option<String>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    taxes: Option<RawTaxes>,
    #[serde(default)]
    pdf_url: Option<String>,
    #[serde(default)]
    invoice_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTaxes {
    #[serde(default)]
    iss: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct InvoiceList {
    #[serde(default)]
    data: Vec<RawInvoice>,
}

impl From<RawInvoice> for FiscalNote {
    fn from(raw: RawInvoice) -> Self {
        let number = raw
            .simple_id
            .unwrap_or_else(|| raw.id.replace("inv_", ""));
        FiscalNote {
            number,
            client_name: raw.client_name.or_else(|| raw.customer.clone()),
            client_id: raw.customer,
            value: raw.value,
            issue_date: raw.effective_date.or(raw.date_created),
            status: raw.status,
            taxes: raw.taxes.and_then(|t| t.iss).unwrap_or(0.0),
            pdf_url: raw.pdf_url.or(raw.invoice_url),
            id: raw.id,
        }
    }
}

/// Service invoices (`/admin/signature/invoices`)
pub struct FiscalNotes<'a> {
    client: &'a BackendClient,
}

impl<'a> FiscalNotes<'a> {
    pub(crate) fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> BackendResult<Vec<FiscalNote>> {
        let list: Option<InvoiceList> = self.client.get("/admin/signature/invoices").await?;
        Ok(list
            .unwrap_or_default()
            .data
            .into_iter()
            .map(FiscalNote::from)
            .collect())
    }

    pub async fn generate(&self, note: &NewFiscalNote) -> BackendResult<()> {
        let _: serde_json::Value = self.client.post("/admin/signature/invoices", note).await?;
        Ok(())
    }

    pub async fn cancel(&self, id: &str) -> BackendResult<()> {
        let _: serde_json::Value = self
            .client
            .delete(&format!("/admin/signature/invoices/{id}"))
            .await?;
        Ok(())
    }
}
