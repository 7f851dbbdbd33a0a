use serde::{Deserialize, Serialize};

use crate::detection::date::Frequency;
use crate::{ClientError, ClientResult};

/// Emitted with detection results so threshold changes stay auditable.
pub const SUBSCRIPTION_POLICY_VERSION: &str = "subscriptions/v1";

pub const MIN_GROUP_SIZE: usize = 2;
pub const CONFIDENCE_BASE: i32 = 60;
pub const CONFIDENCE_MIN: i32 = 0;
pub const CONFIDENCE_MAX: i32 = 100;

/// A subscription stays active while the time since its last charge is at
/// most this multiple of its average gap.
pub const ACTIVE_GAP_MULTIPLIER: f64 = 1.5;

pub const DEFAULT_ABSOLUTE_TOLERANCE: f64 = 5.0;
/// Slack for float noise on cent-valued amounts; far below one cent.
const AMOUNT_EPSILON: f64 = 1e-9;
pub const DEFAULT_INTERVAL_TOLERANCE_DAYS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignConvention {
    #[default]
    NegativeIsSpend,
    PositiveIsSpend,
}

impl SignConvention {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NegativeIsSpend => "negative_is_spend",
            Self::PositiveIsSpend => "positive_is_spend",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "negative_is_spend" | "negative" => Some(Self::NegativeIsSpend),
            "positive_is_spend" | "positive" => Some(Self::PositiveIsSpend),
            _ => None,
        }
    }

    /// Zero amounts are never spend under either convention.
    pub fn is_spend(self, amount: f64) -> bool {
        match self {
            Self::NegativeIsSpend => amount < 0.0,
            Self::PositiveIsSpend => amount > 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AmountTolerance {
    /// Fixed currency band around the group mean.
    Absolute(f64),
    /// Fraction of the group mean (0.10 = ±10%).
    Relative(f64),
}

impl Default for AmountTolerance {
    fn default() -> Self {
        Self::Absolute(DEFAULT_ABSOLUTE_TOLERANCE)
    }
}

impl AmountTolerance {
    pub const fn kind(self) -> &'static str {
        match self {
            Self::Absolute(_) => "absolute",
            Self::Relative(_) => "relative",
        }
    }

    pub const fn value(self) -> f64 {
        match self {
            Self::Absolute(value) | Self::Relative(value) => value,
        }
    }

    pub fn band(self, average_amount: f64) -> f64 {
        match self {
            Self::Absolute(amount) => amount,
            Self::Relative(ratio) => average_amount * ratio,
        }
    }

    fn validate(self) -> ClientResult<()> {
        let value = self.value();
        if !value.is_finite() || value < 0.0 {
            return Err(ClientError::invalid_config(
                "amount_tolerance",
                &format!("{} tolerance must be a finite, non-negative number; got {value}", self.kind()),
            ));
        }
        if let Self::Relative(ratio) = self
            && ratio > 1.0
        {
            return Err(ClientError::invalid_config(
                "amount_tolerance",
                &format!("relative tolerance is a fraction of the mean and must be at most 1.0; got {ratio}"),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectionPolicy {
    pub sign_convention: SignConvention,
    pub amount_tolerance: AmountTolerance,
    pub interval_tolerance_days: f64,
}

impl Default for DetectionPolicy {
    fn default() -> Self {
        Self {
            sign_convention: SignConvention::default(),
            amount_tolerance: AmountTolerance::default(),
            interval_tolerance_days: DEFAULT_INTERVAL_TOLERANCE_DAYS,
        }
    }
}

impl DetectionPolicy {
    pub fn validate(&self) -> ClientResult<()> {
        self.amount_tolerance.validate()?;
        let days = self.interval_tolerance_days;
        if !days.is_finite() || days < 0.0 {
            return Err(ClientError::invalid_config(
                "interval_tolerance_days",
                &format!("must be a finite, non-negative number of days; got {days}"),
            ));
        }
        Ok(())
    }

    pub fn amounts_consistent(&self, absolute_amounts: &[f64], average_amount: f64) -> bool {
        let band = self.amount_tolerance.band(average_amount) + AMOUNT_EPSILON;
        absolute_amounts
            .iter()
            .all(|amount| (amount - average_amount).abs() <= band)
    }

    pub fn gaps_consistent(&self, gaps: &[i64], average_gap: f64) -> bool {
        gaps.iter()
            .all(|gap| ((*gap as f64) - average_gap).abs() <= self.interval_tolerance_days)
    }
}

pub const fn frequency_bonus(frequency: Frequency) -> i32 {
    match frequency {
        Frequency::Monthly => 30,
        Frequency::Quarterly | Frequency::Yearly => 25,
        Frequency::Weekly => 20,
    }
}

pub fn sample_size_bonus(occurrences: usize) -> i32 {
    let mut bonus = 0;
    if occurrences >= 3 {
        bonus += 10;
    }
    if occurrences >= 5 {
        bonus += 10;
    }
    if occurrences >= 10 {
        bonus += 10;
    }
    bonus
}

/// UI ranking heuristic, not a calibrated probability.
pub fn confidence_score(frequency: Frequency, occurrences: usize) -> u8 {
    let raw = CONFIDENCE_BASE + frequency_bonus(frequency) + sample_size_bonus(occurrences);
    let clamped = raw.clamp(CONFIDENCE_MIN, CONFIDENCE_MAX);
    u8::try_from(clamped).unwrap_or(u8::MAX)
}

pub fn is_active(days_since_last_payment: i64, average_gap_days: f64) -> bool {
    (days_since_last_payment as f64) <= ACTIVE_GAP_MULTIPLIER * average_gap_days
}
