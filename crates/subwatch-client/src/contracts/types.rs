use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AmountToleranceSummary {
    pub kind: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PolicySummary {
    pub policy_version: String,
    pub sign_convention: String,
    pub amount_tolerance: AmountToleranceSummary,
    pub interval_tolerance_days: f64,
    pub config_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    pub source_kind: String,
    pub source_ref: Option<String>,
    pub rows_read: usize,
    pub rows_accepted: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    pub transactions_seen: usize,
    pub transactions_grouped: usize,
    pub skipped: BTreeMap<String, usize>,
    pub groups_formed: usize,
    pub groups_rejected: BTreeMap<String, usize>,
    pub subscriptions_detected: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterSummary {
    pub status: String,
    pub frequency: Option<String>,
    pub min_confidence: Option<u8>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpendSummaryRow {
    pub total_count: usize,
    pub active_count: usize,
    pub monthly_cost: f64,
    pub annual_cost: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupportingTransactionRow {
    pub id: String,
    pub merchant: String,
    pub amount: f64,
    pub date: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionRow {
    pub id: String,
    pub merchant: String,
    pub merchant_key: String,
    pub average_amount: f64,
    pub frequency: String,
    pub frequency_label: String,
    pub frequency_color: String,
    pub last_payment_date: String,
    pub next_estimated_payment_date: String,
    pub confidence: u8,
    pub category: String,
    pub is_active: bool,
    pub average_gap_days: f64,
    pub days_since_last_payment: i64,
    pub occurrence_count: usize,
    pub supporting_transactions: Vec<SupportingTransactionRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectData {
    pub today: String,
    pub policy: PolicySummary,
    pub source: SourceSummary,
    pub filter: FilterSummary,
    pub summary: SpendSummaryRow,
    pub stats: StatsSummary,
    pub subscriptions: Vec<SubscriptionRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpcomingBillRow {
    pub days_until_due: i64,
    pub subscription: SubscriptionRow,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpcomingData {
    pub today: String,
    pub within_days: i64,
    pub policy: PolicySummary,
    pub source: SourceSummary,
    pub total_due: f64,
    pub bills: Vec<UpcomingBillRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DemoData {
    pub topic: String,
    pub sample: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detect: Option<DetectData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upcoming: Option<UpcomingData>,
}
