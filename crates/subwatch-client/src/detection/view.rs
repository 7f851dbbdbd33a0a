//! Read-only views layered over detector output. None of these re-run
//! detection; they only filter, reorder or total what it produced.

use chrono::NaiveDate;
use serde::Serialize;

use crate::detection::date::Frequency;
use crate::detection::types::DetectedSubscription;

pub const DEFAULT_UPCOMING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }

    fn matches(self, subscription: &DetectedSubscription) -> bool {
        match self {
            Self::All => true,
            Self::Active => subscription.is_active,
            Self::Inactive => !subscription.is_active,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubscriptionFilter {
    pub status: StatusFilter,
    pub frequency: Option<Frequency>,
    pub min_confidence: Option<u8>,
    pub limit: Option<usize>,
}

impl SubscriptionFilter {
    pub fn apply<'a>(&self, subscriptions: &'a [DetectedSubscription]) -> Vec<&'a DetectedSubscription> {
        let matching = subscriptions.iter().filter(|subscription| {
            self.status.matches(subscription)
                && self
                    .frequency
                    .is_none_or(|frequency| subscription.frequency == frequency)
                && self
                    .min_confidence
                    .is_none_or(|minimum| subscription.confidence >= minimum)
        });
        match self.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingBill<'a> {
    pub days_until_due: i64,
    pub subscription: &'a DetectedSubscription,
}

/// Active subscriptions whose next charge lands within `[today, today + within_days]`.
pub fn upcoming_bills(
    subscriptions: &[DetectedSubscription],
    today: NaiveDate,
    within_days: i64,
) -> Vec<UpcomingBill<'_>> {
    let mut bills = subscriptions
        .iter()
        .filter(|subscription| subscription.is_active)
        .filter_map(|subscription| {
            let days_until_due = (subscription.next_estimated_payment_date - today).num_days();
            if (0..=within_days).contains(&days_until_due) {
                return Some(UpcomingBill {
                    days_until_due,
                    subscription,
                });
            }
            None
        })
        .collect::<Vec<UpcomingBill<'_>>>();

    bills.sort_by(|left, right| {
        left.days_until_due
            .cmp(&right.days_until_due)
            .then_with(|| left.subscription.merchant.cmp(&right.subscription.merchant))
            .then_with(|| left.subscription.id.cmp(&right.subscription.id))
    });
    bills
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpendSummary {
    pub total_count: usize,
    pub active_count: usize,
    pub monthly_cost: f64,
    pub annual_cost: f64,
}

/// Costs cover active subscriptions only, normalized by charges per year.
pub fn spend_summary(subscriptions: &[DetectedSubscription]) -> SpendSummary {
    let active = subscriptions
        .iter()
        .filter(|subscription| subscription.is_active)
        .collect::<Vec<&DetectedSubscription>>();
    let annual_cost: f64 = active
        .iter()
        .map(|subscription| subscription.average_amount * subscription.frequency.charges_per_year())
        .sum();

    SpendSummary {
        total_count: subscriptions.len(),
        active_count: active.len(),
        monthly_cost: round_cents(annual_cost / 12.0),
        annual_cost: round_cents(annual_cost),
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
