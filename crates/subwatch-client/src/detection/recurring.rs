use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::ClientResult;
use crate::detection::date::Frequency;
use crate::detection::interval::classify_interval;
use crate::detection::normalize::merchant_key;
use crate::detection::policy::{DetectionPolicy, MIN_GROUP_SIZE, confidence_score, is_active};
use crate::detection::types::{
    DetectedSubscription, DetectionReport, DetectionStats, GroupRejection, SkipReason, Transaction,
};

const FALLBACK_CATEGORY: &str = "Other";

/// Subscription detector bound to one validated policy. Construction is the
/// only fallible step; detection itself never fails.
#[derive(Debug, Clone)]
pub struct Detector {
    policy: DetectionPolicy,
}

#[derive(Debug, Clone)]
struct MerchantGroup {
    key: String,
    rows: Vec<Transaction>,
}

#[derive(Debug, Clone, Copy)]
struct AmountStats {
    average_amount: f64,
}

impl Default for Detector {
    fn default() -> Self {
        Self {
            policy: DetectionPolicy::default(),
        }
    }
}

impl Detector {
    pub fn new(policy: DetectionPolicy) -> ClientResult<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &DetectionPolicy {
        &self.policy
    }

    pub fn detect(&self, transactions: &[Transaction], today: NaiveDate) -> Vec<DetectedSubscription> {
        self.detect_with_report(transactions, today).subscriptions
    }

    pub fn detect_with_report(
        &self,
        transactions: &[Transaction],
        today: NaiveDate,
    ) -> DetectionReport {
        let mut stats = DetectionStats {
            transactions_seen: transactions.len(),
            ..DetectionStats::default()
        };

        let groups = self.group_outflows(transactions, &mut stats);
        stats.groups_formed = groups.len();

        let mut subscriptions: Vec<DetectedSubscription> = Vec::new();
        for group in groups {
            match self.evaluate_group(group, today) {
                Ok(subscription) => subscriptions.push(subscription),
                Err((key, rejection)) => {
                    debug!(merchant_key = %key, gate = rejection.as_str(), "merchant group rejected");
                    stats.record_rejection(rejection);
                }
            }
        }

        subscriptions.sort_by(compare_subscriptions);
        stats.subscriptions_detected = subscriptions.len();

        info!(
            transactions = stats.transactions_seen,
            grouped = stats.transactions_grouped,
            skipped = stats.skipped_total(),
            groups = stats.groups_formed,
            rejected = stats.rejected_total(),
            subscriptions = stats.subscriptions_detected,
            "subscription detection complete"
        );

        DetectionReport {
            subscriptions,
            stats,
        }
    }

    /// Outflow filter, normalizer and grouper in one pass. Groups come back in
    /// merchant-key order with rows sorted newest first.
    fn group_outflows(
        &self,
        transactions: &[Transaction],
        stats: &mut DetectionStats,
    ) -> Vec<MerchantGroup> {
        let mut groups: BTreeMap<String, Vec<Transaction>> = BTreeMap::new();
        for transaction in transactions {
            if let Some(reason) = self.skip_reason(transaction) {
                debug!(txn_id = %transaction.id, reason = reason.as_str(), "transaction skipped");
                stats.record_skip(reason);
                continue;
            }
            let key = merchant_key(&transaction.merchant_label);
            if key.is_empty() {
                debug!(
                    txn_id = %transaction.id,
                    reason = SkipReason::EmptyMerchantKey.as_str(),
                    "transaction skipped"
                );
                stats.record_skip(SkipReason::EmptyMerchantKey);
                continue;
            }
            stats.transactions_grouped += 1;
            groups.entry(key).or_default().push(transaction.clone());
        }

        groups
            .into_iter()
            .map(|(key, mut rows)| {
                rows.sort_by(|left, right| {
                    right
                        .date
                        .cmp(&left.date)
                        .then_with(|| left.id.cmp(&right.id))
                });
                MerchantGroup { key, rows }
            })
            .collect()
    }

    fn skip_reason(&self, transaction: &Transaction) -> Option<SkipReason> {
        if transaction.id.trim().is_empty() {
            return Some(SkipReason::MissingId);
        }
        if transaction.merchant_label.trim().is_empty() {
            return Some(SkipReason::MissingMerchant);
        }
        if !transaction.amount.is_finite() {
            return Some(SkipReason::InvalidAmount);
        }
        if !self.policy.sign_convention.is_spend(transaction.amount) {
            return Some(SkipReason::NotOutflow);
        }
        None
    }

    fn evaluate_group(
        &self,
        group: MerchantGroup,
        today: NaiveDate,
    ) -> Result<DetectedSubscription, (String, GroupRejection)> {
        let MerchantGroup { key, rows } = group;
        if rows.len() < MIN_GROUP_SIZE {
            return Err((key, GroupRejection::Undersampled));
        }

        let Some(amounts) = self.check_amounts(&rows) else {
            return Err((key, GroupRejection::AmountInconsistent));
        };

        let interval = match classify_interval(&rows, &self.policy) {
            Ok(fit) => fit,
            Err(rejection) => return Err((key, rejection)),
        };

        let latest = &rows[0];
        let last_payment_date = latest.date;
        let days_since_last_payment = (today - last_payment_date).num_days();
        let category = rows
            .iter()
            .find_map(|row| {
                row.category
                    .as_deref()
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
            })
            .unwrap_or(FALLBACK_CATEGORY)
            .to_string();

        Ok(DetectedSubscription {
            id: subscription_id(&key, interval.frequency),
            merchant: latest.merchant_label.trim().to_string(),
            average_amount: round_to(amounts.average_amount, 2),
            frequency: interval.frequency,
            last_payment_date,
            next_estimated_payment_date: interval.frequency.advance(last_payment_date),
            confidence: confidence_score(interval.frequency, rows.len()),
            category,
            is_active: is_active(days_since_last_payment, interval.average_gap_days),
            average_gap_days: round_to(interval.average_gap_days, 2),
            days_since_last_payment,
            occurrence_count: rows.len(),
            merchant_key: key,
            supporting_transactions: rows,
        })
    }

    fn check_amounts(&self, rows: &[Transaction]) -> Option<AmountStats> {
        let absolute_amounts: Vec<f64> = rows.iter().map(Transaction::abs_amount).collect();
        let average_amount = mean(&absolute_amounts)?;
        if !self
            .policy
            .amounts_consistent(&absolute_amounts, average_amount)
        {
            return None;
        }
        Some(AmountStats { average_amount })
    }
}

/// Stable across runs for the same merchant key and frequency.
pub fn subscription_id(merchant_key: &str, frequency: Frequency) -> String {
    let mut hasher = Sha256::new();
    hasher.update(merchant_key.as_bytes());
    hasher.update(b"|");
    hasher.update(frequency.as_str().as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("sub_{}", &digest[..16])
}

fn compare_subscriptions(left: &DetectedSubscription, right: &DetectedSubscription) -> Ordering {
    right
        .confidence
        .cmp(&left.confidence)
        .then_with(|| right.average_amount.total_cmp(&left.average_amount))
        .then_with(|| left.merchant_key.cmp(&right.merchant_key))
        .then_with(|| left.id.cmp(&right.id))
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / (values.len() as f64))
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let exponent = i32::try_from(decimals).unwrap_or(2);
    let factor = 10_f64.powi(exponent);
    (value * factor).round() / factor
}
