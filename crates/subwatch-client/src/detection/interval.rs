use crate::detection::date::Frequency;
use crate::detection::policy::DetectionPolicy;
use crate::detection::types::{GroupRejection, Transaction};

#[derive(Debug, Clone, PartialEq)]
pub struct IntervalFit {
    pub frequency: Frequency,
    pub average_gap_days: f64,
}

/// Day gaps between consecutive charges. Order-independent because each gap
/// is taken as an absolute difference.
pub fn day_gaps(rows: &[Transaction]) -> Vec<i64> {
    rows.windows(2)
        .map(|pair| (pair[0].date - pair[1].date).num_days().abs())
        .collect()
}

pub fn mean_gap(gaps: &[i64]) -> Option<f64> {
    if gaps.is_empty() {
        return None;
    }
    let total: i64 = gaps.iter().sum();
    Some((total as f64) / (gaps.len() as f64))
}

/// Every gap must sit within the interval tolerance of the mean; one outlier
/// disqualifies the whole group. The mean is then mapped onto a bucket.
pub fn classify_interval(
    rows: &[Transaction],
    policy: &DetectionPolicy,
) -> Result<IntervalFit, GroupRejection> {
    let gaps = day_gaps(rows);
    let Some(average_gap_days) = mean_gap(&gaps) else {
        return Err(GroupRejection::Undersampled);
    };

    if !policy.gaps_consistent(&gaps, average_gap_days) {
        return Err(GroupRejection::IrregularInterval);
    }

    let Some(frequency) = Frequency::from_average_gap(average_gap_days) else {
        return Err(GroupRejection::UnmappedFrequency);
    };

    Ok(IntervalFit {
        frequency,
        average_gap_days,
    })
}
