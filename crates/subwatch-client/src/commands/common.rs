use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;

use crate::ClientResult;
use crate::config::{PolicyOverrides, ResolvedPolicy, load_policy};
use crate::contracts::types::{
    AmountToleranceSummary, PolicySummary, SourceSummary, SpendSummaryRow, StatsSummary,
    SubscriptionRow, SupportingTransactionRow,
};
use crate::detection::date::{format_iso_date, parse_iso_date_strict};
use crate::detection::policy::SUBSCRIPTION_POLICY_VERSION;
use crate::detection::recurring::Detector;
use crate::detection::types::{DetectedSubscription, DetectionReport, DetectionStats, Transaction};
use crate::detection::view::SpendSummary;
use crate::source::input::{ResolvedSource, resolve_source};
use crate::source::load_transactions;

/// Inputs shared by every command that reads a transaction history.
#[derive(Debug, Default, Clone)]
pub struct SourceOptions<'a> {
    pub path: Option<String>,
    pub stdin_override: Option<String>,
    pub config_path: Option<&'a Path>,
    pub overrides: PolicyOverrides,
    pub today: Option<String>,
}

pub(crate) struct DetectionRun {
    pub resolved_policy: ResolvedPolicy,
    pub source: SourceSummary,
    pub today: NaiveDate,
    pub report: DetectionReport,
}

pub(crate) fn run_detection(
    command: &str,
    options: SourceOptions<'_>,
) -> ClientResult<DetectionRun> {
    let resolved_policy = load_policy(options.config_path, &options.overrides, command)?;
    let source = resolve_source(options.path, options.stdin_override)?;
    detect_source(
        command,
        resolved_policy,
        &source,
        options.today.as_deref(),
    )
}

pub(crate) fn detect_source(
    command: &str,
    resolved_policy: ResolvedPolicy,
    source: &ResolvedSource,
    today: Option<&str>,
) -> ClientResult<DetectionRun> {
    let detector = Detector::new(resolved_policy.policy)?;
    let validated = load_transactions(source)?;
    let today = resolve_today(today, &validated.rows, command)?;

    let mut report = detector.detect_with_report(&validated.rows, today);
    report.stats.merge_skips(&validated.skipped);

    Ok(DetectionRun {
        resolved_policy,
        source: SourceSummary {
            source_kind: source.source_kind.as_str().to_string(),
            source_ref: source.source_ref.clone(),
            rows_read: validated.rows_read,
            rows_accepted: validated.rows.len(),
        },
        today,
        report,
    })
}

/// An explicit date wins. Otherwise the newest transaction date stands in,
/// so a history is judged relative to its own end.
pub(crate) fn resolve_today(
    today: Option<&str>,
    transactions: &[Transaction],
    command: &str,
) -> ClientResult<NaiveDate> {
    if let Some(value) = today {
        return parse_iso_date_strict(value.trim(), "--today", command);
    }
    Ok(transactions
        .iter()
        .map(|transaction| transaction.date)
        .max()
        .unwrap_or_default())
}

pub(crate) fn policy_summary(resolved: &ResolvedPolicy) -> PolicySummary {
    let policy = &resolved.policy;
    PolicySummary {
        policy_version: SUBSCRIPTION_POLICY_VERSION.to_string(),
        sign_convention: policy.sign_convention.as_str().to_string(),
        amount_tolerance: AmountToleranceSummary {
            kind: policy.amount_tolerance.kind().to_string(),
            value: policy.amount_tolerance.value(),
        },
        interval_tolerance_days: policy.interval_tolerance_days,
        config_path: resolved
            .config_path
            .as_ref()
            .map(|path| path.display().to_string()),
    }
}

pub(crate) fn stats_summary(stats: &DetectionStats) -> StatsSummary {
    StatsSummary {
        transactions_seen: stats.transactions_seen,
        transactions_grouped: stats.transactions_grouped,
        skipped: stats
            .skipped
            .iter()
            .map(|(reason, count)| (reason.as_str().to_string(), *count))
            .collect::<BTreeMap<String, usize>>(),
        groups_formed: stats.groups_formed,
        groups_rejected: stats
            .groups_rejected
            .iter()
            .map(|(gate, count)| (gate.as_str().to_string(), *count))
            .collect::<BTreeMap<String, usize>>(),
        subscriptions_detected: stats.subscriptions_detected,
    }
}

pub(crate) fn spend_summary_row(summary: SpendSummary) -> SpendSummaryRow {
    SpendSummaryRow {
        total_count: summary.total_count,
        active_count: summary.active_count,
        monthly_cost: summary.monthly_cost,
        annual_cost: summary.annual_cost,
    }
}

pub(crate) fn subscription_row(subscription: &DetectedSubscription) -> SubscriptionRow {
    SubscriptionRow {
        id: subscription.id.clone(),
        merchant: subscription.merchant.clone(),
        merchant_key: subscription.merchant_key.clone(),
        average_amount: subscription.average_amount,
        frequency: subscription.frequency.as_str().to_string(),
        frequency_label: subscription.frequency.label().to_string(),
        frequency_color: subscription.frequency.color().to_string(),
        last_payment_date: format_iso_date(&subscription.last_payment_date),
        next_estimated_payment_date: format_iso_date(&subscription.next_estimated_payment_date),
        confidence: subscription.confidence,
        category: subscription.category.clone(),
        is_active: subscription.is_active,
        average_gap_days: subscription.average_gap_days,
        days_since_last_payment: subscription.days_since_last_payment,
        occurrence_count: subscription.occurrence_count,
        supporting_transactions: subscription
            .supporting_transactions
            .iter()
            .map(|transaction| SupportingTransactionRow {
                id: transaction.id.clone(),
                merchant: transaction.merchant_label.clone(),
                amount: transaction.amount,
                date: format_iso_date(&transaction.date),
                category: transaction.category.clone(),
            })
            .collect(),
    }
}
