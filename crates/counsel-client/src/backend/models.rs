use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// LISTING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Pagination, search, sort and free-form filters for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub filters: BTreeMap<String, String>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn sort(mut self, by: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(by.into());
        self.sort_order = Some(order);
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Query pairs in the backend's naming; blank search is omitted.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query.push(("search".to_string(), search.to_string()));
        }
        if let Some(sort_by) = &self.sort_by {
            query.push(("sortBy".to_string(), sort_by.clone()));
        }
        if let Some(order) = self.sort_order {
            query.push(("sortOrder".to_string(), order.as_str().to_string()));
        }
        for (key, value) in &self.filters {
            query.push((key.clone(), value.clone()));
        }
        query
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: PageMeta,
}

// ============================================================================
// OFFICES & LAWYERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentType {
    Cpf,
    Cnpj,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficeCounts {
    #[serde(default)]
    pub lawyers: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Office {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cnpj: Option<String>,
    #[serde(default)]
    pub payment_type: Option<PaymentType>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default, rename = "_count")]
    pub counts: Option<OfficeCounts>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOffice {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cnpj: Option<String>,
    pub payment_type: PaymentType,
    pub address: String,
    pub number: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cnpj: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<PaymentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LawyerRole {
    Admin,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawFirmRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lawyer {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub role: LawyerRole,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub law_firm_id: Option<String>,
    #[serde(default)]
    pub law_firm: Option<LawFirmRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLawyer {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub law_firm_id: String,
    pub role: LawyerRole,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LawyerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub law_firm_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<LawyerRole>,
}

// ============================================================================
// PARTNERS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub id: String,
    pub name: String,
    pub email: String,
    pub code: String,
    #[serde(default)]
    pub wallet_id: Option<String>,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub commission: f64,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPartner {
    pub name: String,
    pub email: String,
    pub code: String,
    pub wallet_id: String,
    pub discount: f64,
    pub commission: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// ============================================================================
// SUBSCRIPTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionFirm {
    pub name: String,
    #[serde(default)]
    pub payment_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub name: String,
    #[serde(default)]
    pub pix_price: f64,
    #[serde(default)]
    pub credit_card_price: f64,
    #[serde(default)]
    pub yearly_discount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerSummary {
    pub name: String,
    #[serde(default)]
    pub discount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub law_firm_id: String,
    #[serde(default)]
    pub law_firm: Option<SubscriptionFirm>,
    pub signature_plan_id: String,
    #[serde(default)]
    pub signature_plan: Option<PlanSummary>,
    #[serde(default)]
    pub partner: Option<PartnerSummary>,
    #[serde(default)]
    pub applied_partner_discount: Option<f64>,
    pub status: String,
    #[serde(default)]
    pub expiration_date: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub yearly: bool,
    #[serde(default)]
    pub is_auto_renew_activated: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub payment_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignaturePlan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub credit_card_price: f64,
    #[serde(default)]
    pub pix_price: f64,
    #[serde(default)]
    pub yearly_discount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
    pub yearly: bool,
    pub is_trial: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanChange {
    pub plan_id: String,
    pub yearly: bool,
}

/// Subscription receipt as a base64-encoded PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub base64: String,
    #[serde(default)]
    pub filename: Option<String>,
}

impl Receipt {
    /// The decoded PDF document
    pub fn pdf_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.base64.trim())
    }

    /// Download name, falling back to `receipt-{subscription_id}.pdf`
    pub fn filename_or(&self, subscription_id: &str) -> String {
        match self.filename.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("receipt-{subscription_id}.pdf"),
        }
    }
}

/// A receipt ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptPdf {
    pub filename: String,
    pub bytes: Vec<u8>,
}

// ============================================================================
// FISCAL NOTES
// ============================================================================

/// Service invoice as shown in the admin listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalNote {
    pub id: String,
    pub number: String,
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub value: f64,
    pub issue_date: Option<String>,
    pub status: String,
    pub taxes: f64,
    pub pdf_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFiscalNote {
    pub customer_id: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_query() {
        let params = ListParams::new()
            .page(2)
            .limit(20)
            .search("silva")
            .sort("name", SortOrder::Asc)
            .filter("isActive", "true");

        assert_eq!(
            params.to_query(),
            vec![
                ("page".to_string(), "2".to_string()),
                ("limit".to_string(), "20".to_string()),
                ("search".to_string(), "silva".to_string()),
                ("sortBy".to_string(), "name".to_string()),
                ("sortOrder".to_string(), "asc".to_string()),
                ("isActive".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_blank_search_is_omitted() {
        assert!(ListParams::new().search("  ").to_query().is_empty());
    }

    #[test]
    fn test_paginated_partners() {
        let page: Paginated<Partner> = serde_json::from_str(
            r#"{"data":[{"id":"p1","name":"Ana","email":"a@x.com","code":"ANA10","walletId":"w1","discount":10,"commission":5,"isActive":true}],
                "meta":{"total":1,"page":1,"limit":20,"totalPages":1}}"#,
        )
        .unwrap();

        assert_eq!(page.data[0].code, "ANA10");
        assert!(page.data[0].is_active);
        assert_eq!(page.meta.total_pages, 1);
    }

    #[test]
    fn test_office_with_lawyer_count() {
        let office: Office = serde_json::from_str(
            r#"{"id":"o1","name":"Silva","paymentType":"CNPJ","address":"Rua A","number":"10","postalCode":"01000-000","_count":{"lawyers":3}}"#,
        )
        .unwrap();

        assert_eq!(office.payment_type, Some(PaymentType::Cnpj));
        assert_eq!(office.counts.map(|c| c.lawyers), Some(3));
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let update = LawyerUpdate {
            phone: Some("11999999999".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(update).unwrap(),
            serde_json::json!({ "phone": "11999999999" })
        );
    }

    #[test]
    fn test_receipt_filename_fallback() {
        let receipt = Receipt {
            base64: "JVBERi0=".into(),
            filename: Some("  ".into()),
        };

        assert_eq!(receipt.filename_or("s9"), "receipt-s9.pdf");
        assert_eq!(receipt.pdf_bytes().unwrap(), b"%PDF-");
    }
}
