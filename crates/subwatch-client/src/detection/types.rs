use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::detection::date::Frequency;

/// A transaction that passed boundary validation: non-empty id and
/// merchant label, finite amount, real calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: String,
    pub merchant_label: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub category: Option<String>,
}

impl Transaction {
    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedSubscription {
    pub id: String,
    pub merchant: String,
    pub merchant_key: String,
    /// Mean of the absolute charge amounts, rounded to 2 decimals.
    pub average_amount: f64,
    pub frequency: Frequency,
    pub last_payment_date: NaiveDate,
    pub next_estimated_payment_date: NaiveDate,
    pub confidence: u8,
    pub category: String,
    pub is_active: bool,
    pub average_gap_days: f64,
    pub days_since_last_payment: i64,
    pub occurrence_count: usize,
    pub supporting_transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingId,
    MissingMerchant,
    InvalidDate,
    InvalidAmount,
    EmptyMerchantKey,
    NotOutflow,
}

impl SkipReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingId => "missing_id",
            Self::MissingMerchant => "missing_merchant",
            Self::InvalidDate => "invalid_date",
            Self::InvalidAmount => "invalid_amount",
            Self::EmptyMerchantKey => "empty_merchant_key",
            Self::NotOutflow => "not_outflow",
        }
    }
}

/// The gate a merchant group failed. Rejected groups never produce output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRejection {
    Undersampled,
    AmountInconsistent,
    IrregularInterval,
    UnmappedFrequency,
}

impl GroupRejection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undersampled => "undersampled",
            Self::AmountInconsistent => "amount_inconsistent",
            Self::IrregularInterval => "irregular_interval",
            Self::UnmappedFrequency => "unmapped_frequency",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetectionStats {
    pub transactions_seen: usize,
    pub transactions_grouped: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
    pub groups_formed: usize,
    pub groups_rejected: BTreeMap<GroupRejection, usize>,
    pub subscriptions_detected: usize,
}

impl DetectionStats {
    pub fn record_skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }

    pub fn record_rejection(&mut self, rejection: GroupRejection) {
        *self.groups_rejected.entry(rejection).or_insert(0) += 1;
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn rejected_total(&self) -> usize {
        self.groups_rejected.values().sum()
    }

    /// Folds in counts gathered at the ingestion boundary.
    pub fn merge_skips(&mut self, other: &BTreeMap<SkipReason, usize>) {
        for (reason, count) in other {
            *self.skipped.entry(*reason).or_insert(0) += count;
        }
        self.transactions_seen += other.values().sum::<usize>();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport {
    pub subscriptions: Vec<DetectedSubscription>,
    pub stats: DetectionStats,
}
